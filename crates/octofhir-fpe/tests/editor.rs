//! Editor facade tests

use octofhir_fpe::model::{QuestionnaireItems, SchemaRegistry};
use octofhir_fpe::semantic::{BindingError, CandidateCategory};
use octofhir_fpe::{
    Editor, EditorConfig, EditorDocument, ExternalBinding, FpType, FpeError, Operator, Program,
    Token, TokenLocation,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[fixture]
fn editor() -> Editor {
    let schema = SchemaRegistry::from_json_file(fixture_path("schemas.json")).unwrap();
    let items = QuestionnaireItems::from_json_file(fixture_path("questionnaire.json")).unwrap();
    Editor::new(Arc::new(schema), Arc::new(items))
        .with_context(FpType::single(FpType::record(["Patient"])))
        .with_externals(vec![ExternalBinding::new(
            "qr",
            FpType::single(FpType::record(["QuestionnaireResponse"])),
        )])
}

#[rstest]
fn test_document_round_trip(editor: Editor) {
    let document = EditorDocument::from_file(fixture_path("document.json")).unwrap();
    assert_eq!(document.program.bindings.len(), 1);

    let reloaded = EditorDocument::from_json(&document.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, document);

    let from_document = Editor::for_document(
        &document,
        Arc::new(SchemaRegistry::unloaded()),
        Arc::new(QuestionnaireItems::new()),
    );
    assert_eq!(from_document.context(), editor.context());
    assert_eq!(from_document.externals(), editor.externals());
    assert_eq!(from_document.config(), &EditorConfig::default());
}

#[rstest]
fn test_document_program(editor: Editor) {
    let program = EditorDocument::from_file(fixture_path("document.json"))
        .unwrap()
        .program;

    let types = editor.program_types(&program);
    assert_eq!(types.bindings[0].name, "w");
    assert_eq!(types.bindings[0].ty, FpType::single(FpType::decimal()));
    assert_eq!(types.output, FpType::single(FpType::boolean()));

    assert_eq!(
        editor.stringify(&program),
        "defineVariable('w', %qr.repeat(item).where(linkId = 'weight').answer.value.value).\nselect(%w > 80.0)"
    );
    assert!(editor.check(&program).is_empty());
    assert!(editor.validate(&program).is_ok());
}

#[rstest]
fn test_token_types_at_location(editor: Editor) {
    let program = Program::new(vec![
        Token::field("name"),
        Token::function(
            "where",
            vec![Program::new(vec![
                Token::field("family"),
                Token::operator(Operator::Equal),
                Token::string("Smith"),
            ])],
        ),
    ]);

    let output = editor
        .token_types(&program, &TokenLocation::output())
        .unwrap();
    assert_eq!(output.types[0], FpType::record(["HumanName"]));
    assert_eq!(output.first_invalid, None);

    let argument = editor
        .token_types(&program, &TokenLocation::output().in_argument(1, 0))
        .unwrap();
    assert_eq!(argument.types[0], FpType::single(FpType::string()));
    assert_eq!(argument.types[2], FpType::single(FpType::boolean()));

    assert!(editor
        .token_types(&program, &TokenLocation::binding("missing"))
        .is_none());
}

#[rstest]
fn test_suggest_uses_configured_options(editor: Editor) {
    let program = Program::new(vec![Token::variable("qr")]);
    let candidates = editor.suggest(&program, &TokenLocation::output()).unwrap();
    let answers: Vec<_> = candidates
        .iter()
        .filter(|c| c.category == CandidateCategory::Answer)
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(answers, vec!["weight", "pain"]);

    let mut config = EditorConfig::default();
    config.suggest.search = Some("wei".into());
    let filtered = editor
        .with_config(config)
        .suggest(&program, &TokenLocation::output())
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].label, "weight");
}

#[rstest]
fn test_check_reports_problems(editor: Editor) {
    let program = Program::new(vec![
        Token::number("2"),
        Token::operator(Operator::Add),
        Token::variable("qr"),
    ]);
    let diagnostics = editor.check(&program);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].location,
        Some(TokenLocation::output().at_token(2))
    );
    assert!(matches!(
        editor.validate(&program),
        Err(FpeError::Diagnostics(found)) if found == diagnostics
    ));
}

#[rstest]
fn test_binding_operations(editor: Editor) {
    let program = editor.name_expression(&Program::new(vec![Token::field("active")]));
    assert_eq!(program.bindings[0].name, "var1");

    let program = editor.add_binding(&program);
    assert_eq!(program.bindings[1].name, "var2");
    assert!(editor.can_move(&program, 1, 0));
    assert!(!editor.is_deletable(&program, 0));
    assert!(editor.is_deletable(&program, 1));

    let id = program.bindings[0].id.clone();
    assert_eq!(
        editor.rename_binding(&program, &id, "qr").unwrap_err(),
        BindingError::ExternalCollision { name: "qr".into() }
    );
    let renamed = editor.rename_binding(&program, &id, "isActive").unwrap();
    assert_eq!(renamed.expression, vec![Token::variable("isActive")]);

    let duplicated = editor.duplicate_binding(&renamed, &id).unwrap();
    assert_eq!(duplicated.bindings[1].name, "isActive_copy");

    let second = renamed.bindings[1].id.clone();
    let moved = editor.move_binding(&renamed, &second, 0).unwrap();
    assert_eq!(moved.bindings[0].name, "var2");
    let deleted = editor.delete_binding(&moved, &second).unwrap();
    assert_eq!(deleted.bindings.len(), 1);
    assert!(editor.delete_binding(&deleted, &id).is_err());
}
