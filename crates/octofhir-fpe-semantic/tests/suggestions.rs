//! Suggestion engine tests

use octofhir_fpe_ast::{Operator, Program, Token};
use octofhir_fpe_diagnostics::TokenLocation;
use octofhir_fpe_model::{
    FieldMap, QuestionnaireItem, QuestionnaireItems, SchemaRegistry, ValueKind,
};
use octofhir_fpe_semantic::{
    Candidate, CandidateCategory, Scope, SuggestOptions, Suggester, TypeInferrer,
};
use octofhir_fpe_types::FpType;
use pretty_assertions::assert_eq;

fn registry() -> SchemaRegistry {
    let mut patient = FieldMap::new();
    patient.insert("name".into(), FpType::record(["HumanName"]));
    patient.insert("active".into(), FpType::single(FpType::boolean()));
    let mut name = FieldMap::new();
    name.insert("family".into(), FpType::single(FpType::string()));
    SchemaRegistry::unloaded()
        .with_fields(["Patient"], patient)
        .with_fields(["HumanName"], name)
}

fn scope() -> Scope<'static> {
    let mut scope = Scope::new();
    scope.define("patient", FpType::single(FpType::record(["Patient"])));
    scope.define("weight", FpType::single(FpType::Quantity));
    scope.define("limit", FpType::single(FpType::integer()));
    scope.define("qr", FpType::single(FpType::record(["QuestionnaireResponse"])));
    scope
}

fn labels(candidates: &[Candidate], category: CandidateCategory) -> Vec<&str> {
    candidates
        .iter()
        .filter(|c| c.category == category)
        .map(|c| c.label.as_str())
        .collect()
}

fn categories(candidates: &[Candidate]) -> Vec<CandidateCategory> {
    let mut seen: Vec<CandidateCategory> = Vec::new();
    for candidate in candidates {
        if seen.last() != Some(&candidate.category) {
            seen.push(candidate.category);
        }
    }
    seen
}

#[test]
fn test_category_order_after_a_value() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let expression = vec![Token::variable("patient")];

    let candidates = suggester.suggest(&expression, 1, &FpType::Any, &scope(), &SuggestOptions::default());
    assert_eq!(
        categories(&candidates),
        vec![
            CandidateCategory::Field,
            CandidateCategory::Index,
            CandidateCategory::Operator,
            CandidateCategory::Function,
        ]
    );
    assert_eq!(labels(&candidates, CandidateCategory::Field), vec!["name", "active"]);

    let functions = labels(&candidates, CandidateCategory::Function);
    assert!(functions.contains(&"where"));
    assert!(!functions.contains(&"upper"));

    let operators = labels(&candidates, CandidateCategory::Operator);
    assert!(operators.contains(&"="));
    assert!(!operators.contains(&"and"));
}

#[test]
fn test_incompatible_candidates_are_flagged() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let options = SuggestOptions {
        include_incompatible: true,
        ..SuggestOptions::default()
    };
    let expression = vec![Token::variable("patient")];

    let candidates = suggester.suggest(&expression, 1, &FpType::Any, &scope(), &options);
    let upper = candidates.iter().find(|c| c.label == "upper").unwrap();
    assert!(upper.incompatible);
    let and = candidates.iter().find(|c| c.label == "and").unwrap();
    assert!(and.incompatible);
    let where_fn = candidates.iter().find(|c| c.label == "where").unwrap();
    assert!(!where_fn.incompatible);
}

#[test]
fn test_right_operand_filters_variables_and_literals() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let expression = vec![Token::number("2"), Token::operator(Operator::Add)];

    let candidates = suggester.suggest(&expression, 2, &FpType::Any, &scope(), &SuggestOptions::default());
    assert_eq!(labels(&candidates, CandidateCategory::Variable), vec!["%limit"]);
    assert_eq!(labels(&candidates, CandidateCategory::Literal), vec!["Number"]);
    assert!(labels(&candidates, CandidateCategory::Operator).is_empty());
}

#[test]
fn test_type_literals_after_is() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let expression = vec![Token::variable("limit"), Token::operator(Operator::Is)];

    let candidates = suggester.suggest(&expression, 2, &FpType::Any, &scope(), &SuggestOptions::default());
    let literals = labels(&candidates, CandidateCategory::Literal);
    assert!(literals.contains(&"Integer"));
    assert!(literals.contains(&"Quantity"));
    assert!(candidates
        .iter()
        .filter(|c| c.category == CandidateCategory::Literal)
        .all(|c| matches!(c.template, Token::TypeLiteral { .. })));
}

#[test]
fn test_answers_on_response() {
    let registry = registry();
    let items: QuestionnaireItems = [QuestionnaireItem {
        link_id: "weight".into(),
        text: Some("Body weight".into()),
        value_kind: ValueKind::QuantityLike,
        value_type: FpType::decimal(),
        repeats: false,
    }]
    .into_iter()
    .collect();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let expression = vec![Token::variable("qr")];

    let candidates = suggester.suggest(&expression, 1, &FpType::Any, &scope(), &SuggestOptions::default());
    let answer = candidates.last().unwrap();
    assert_eq!(answer.category, CandidateCategory::Answer);
    assert_eq!(answer.template, Token::answer("weight"));
    assert_eq!(answer.ty, FpType::single(FpType::decimal()));
    assert_eq!(answer.detail.as_deref(), Some("Body weight"));

    let on_patient = suggester.suggest(
        &[Token::variable("patient")],
        1,
        &FpType::Any,
        &scope(),
        &SuggestOptions::default(),
    );
    assert!(labels(&on_patient, CandidateCategory::Answer).is_empty());
}

#[test]
fn test_binding_sees_only_earlier_bindings() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let program = Program::default()
        .with_binding("first", vec![Token::number("1")])
        .with_binding("second", vec![])
        .with_binding("third", vec![Token::number("3")]);

    let candidates = suggester
        .suggest_at(
            &program,
            &TokenLocation::binding("second"),
            &FpType::Any,
            &Scope::new(),
            &SuggestOptions::default(),
        )
        .unwrap();
    assert_eq!(labels(&candidates, CandidateCategory::Variable), vec!["%first"]);
}

#[test]
fn test_suggest_inside_lambda_argument() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let program = Program::new(vec![
        Token::variable("patient"),
        Token::field("name"),
        Token::function("where", vec![Program::default()]),
    ]);

    let candidates = suggester
        .suggest_at(
            &program,
            &TokenLocation::output().in_argument(2, 0),
            &FpType::Any,
            &scope(),
            &SuggestOptions::default(),
        )
        .unwrap();
    assert_eq!(labels(&candidates, CandidateCategory::Field), vec!["family"]);
}

#[test]
fn test_suggestions_are_stable() {
    let registry = registry();
    let items = QuestionnaireItems::new();
    let inferrer = TypeInferrer::new(&registry, &items);
    let suggester = Suggester::new(&inferrer);
    let expression = vec![Token::variable("patient"), Token::field("name")];
    let options = SuggestOptions::default();

    let first = suggester.suggest(&expression, 2, &FpType::Any, &scope(), &options);
    let second = suggester.suggest(&expression, 2, &FpType::Any, &scope(), &options);
    assert_eq!(first, second);
}
