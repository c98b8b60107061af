//! Type-directed completion candidates
//!
//! Candidates for a cursor position come in a fixed category order: fields,
//! index, operators, variables, functions, literals, answers. Each category
//! keeps declaration order, so the list is stable for a given input.

use crate::inference::{Fold, TypeInferrer};
use crate::operators::{accepts_left, resolve_operator, right_operand_type};
use crate::scope::Scope;
use chrono::{DateTime, NaiveDateTime, Utc};
use octofhir_fpe_ast::{Operator, Program, Token, TokenKind};
use octofhir_fpe_diagnostics::TokenLocation;
use octofhir_fpe_model::FunctionSignature;
use octofhir_fpe_types::{
    FpType, PrimitiveKind, TypeBindings, match_pattern, unwrap_single, wrap_single,
};
use serde::{Deserialize, Serialize};

/// Candidate categories, in the order they are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateCategory {
    Field,
    Index,
    Operator,
    Variable,
    Function,
    Literal,
    Answer,
}

impl CandidateCategory {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Field => "Fields",
            Self::Index => "Index",
            Self::Operator => "Operators",
            Self::Variable => "Variables",
            Self::Function => "Functions",
            Self::Literal => "Literals",
            Self::Answer => "Answers",
        }
    }
}

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub label: String,
    pub category: CandidateCategory,
    /// Type annotation shown next to the label
    #[serde(rename = "type")]
    pub ty: FpType,
    /// Token inserted when the candidate is picked
    pub template: Token,
    /// Set on operators and functions kept by `include_incompatible`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub incompatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl Candidate {
    fn new(label: impl Into<String>, category: CandidateCategory, ty: FpType, template: Token) -> Self {
        Self {
            label: label.into(),
            category,
            ty,
            template,
            incompatible: false,
            detail: None,
            debug: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn incompatible(mut self, incompatible: bool) -> Self {
        self.incompatible = incompatible;
        self
    }
}

/// Suggestion toggles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestOptions {
    /// Attach a debug string to each candidate
    pub debug: bool,
    /// Keep incompatible operators and functions, flagged
    pub include_incompatible: bool,
    /// Instant used for date, datetime and time templates; the Unix epoch
    /// when unset
    pub reference_time: Option<NaiveDateTime>,
    /// Case-insensitive substring filter on labels
    pub search: Option<String>,
}

impl SuggestOptions {
    fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| DateTime::<Utc>::default().naive_utc())
    }
}

/// Template token for a literal kind
pub fn literal_template(kind: TokenKind, now: NaiveDateTime) -> Option<Token> {
    let token = match kind {
        TokenKind::String => Token::string(""),
        TokenKind::Number => Token::number("0"),
        TokenKind::Boolean => Token::boolean(true),
        TokenKind::Date => Token::date(now.format("%Y-%m-%d").to_string()),
        TokenKind::DateTime => Token::datetime(now.format("%Y-%m-%dT%H:%M").to_string()),
        TokenKind::Time => Token::time(now.format("%H:%M").to_string()),
        TokenKind::Quantity => Token::quantity("0", "seconds"),
        TokenKind::TypeLiteral => Token::type_literal(FpType::string()),
        _ => return None,
    };
    Some(token)
}

/// Type literals offered as the right operand of `is` and `as`
fn type_literal_candidates() -> Vec<Candidate> {
    PrimitiveKind::SYSTEM
        .into_iter()
        .map(FpType::Primitive)
        .chain(std::iter::once(FpType::Quantity))
        .map(|ty| {
            let literal = FpType::type_literal(ty.clone());
            Candidate::new(ty.describe(), CandidateCategory::Literal, literal.clone(), Token::type_literal(ty))
        })
        .collect()
}

/// Computes candidates for a cursor position
pub struct Suggester<'i, 'a> {
    inferrer: &'i TypeInferrer<'a>,
}

impl<'i, 'a> Suggester<'i, 'a> {
    pub fn new(inferrer: &'i TypeInferrer<'a>) -> Self {
        Self { inferrer }
    }

    /// Candidates for inserting a token at `cursor`
    pub fn suggest(
        &self,
        expression: &[Token],
        cursor: usize,
        context: &FpType,
        scope: &Scope<'_>,
        options: &SuggestOptions,
    ) -> Vec<Candidate> {
        let fold = self.inferrer.fold_prefix(expression, cursor, context, scope);
        let value = fold.value_type();
        log::debug!("suggesting at {cursor} after {value}");

        let mut candidates = Vec::new();
        candidates.extend(self.fields(&fold, &value));
        candidates.extend(self.operators(&fold, options));
        candidates.extend(self.variables(&fold, scope));
        candidates.extend(self.functions(&value, options));
        candidates.extend(self.literals(&fold, context, scope, options));
        candidates.extend(self.answers(&value));

        if let Some(search) = options.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            candidates.retain(|c| c.label.to_lowercase().contains(&needle));
        }
        if options.debug {
            for candidate in &mut candidates {
                candidate.debug = Some(format!(
                    "{} {:?} on {value}: {}",
                    candidate.category.label(),
                    candidate.label,
                    candidate.ty
                ));
            }
        }
        candidates
    }

    /// Candidates at a location inside a program
    ///
    /// The cursor is the location's token index, or the end of the
    /// expression. Returns `None` when the location does not exist.
    pub fn suggest_at(
        &self,
        program: &Program,
        location: &TokenLocation,
        context: &FpType,
        scope: &Scope<'_>,
        options: &SuggestOptions,
    ) -> Option<Vec<Candidate>> {
        self.inferrer
            .with_focus(program, location, context, scope, |focus| {
                let cursor = location
                    .token
                    .unwrap_or(focus.expression.len())
                    .min(focus.expression.len());
                self.suggest(focus.expression, cursor, focus.context, focus.scope, options)
            })
    }

    fn fields(&self, fold: &Fold, value: &FpType) -> Vec<Candidate> {
        if fold.is_latched() {
            return Vec::new();
        }
        let mut candidates: Vec<Candidate> = self
            .inferrer
            .fields_of(value)
            .into_iter()
            .map(|(name, ty)| {
                let template = Token::field(name.clone());
                Candidate::new(name, CandidateCategory::Field, ty, template)
            })
            .collect();

        if !fold.at_chain_start() {
            candidates.push(Candidate::new(
                "[ ]",
                CandidateCategory::Index,
                wrap_single(unwrap_single(value.clone())),
                Token::index(0),
            ));
        }
        candidates
    }

    fn operators(&self, fold: &Fold, options: &SuggestOptions) -> Vec<Candidate> {
        if fold.at_chain_start() || fold.is_latched() {
            return Vec::new();
        }
        let left = fold.result();
        Operator::ALL
            .into_iter()
            .filter_map(|op| {
                let compatible = accepts_left(op, &left);
                (compatible || options.include_incompatible).then(|| {
                    Candidate::new(
                        op.symbol(),
                        CandidateCategory::Operator,
                        right_operand_type(op, &left),
                        Token::operator(op),
                    )
                    .with_detail(op.label())
                    .incompatible(!compatible)
                })
            })
            .collect()
    }

    fn fits_pending(fold: &Fold, ty: &FpType) -> bool {
        match &fold.pending {
            Some(pending) => !resolve_operator(pending.operator, &pending.left, ty).is_invalid(),
            None => true,
        }
    }

    fn variables(&self, fold: &Fold, scope: &Scope<'_>) -> Vec<Candidate> {
        if !fold.at_chain_start() || fold.is_latched() {
            return Vec::new();
        }
        scope
            .visible()
            .into_iter()
            .filter(|(_, ty)| !ty.is_invalid() && Self::fits_pending(fold, ty))
            .map(|(name, ty)| {
                Candidate::new(
                    format!("%{name}"),
                    CandidateCategory::Variable,
                    ty.clone(),
                    Token::variable(name),
                )
            })
            .collect()
    }

    fn function_candidate(&self, signature: &FunctionSignature, value: &FpType) -> Candidate {
        let bindings = match_pattern(&signature.input, value, &TypeBindings::new())
            .unwrap_or_default();
        let supplied = vec![false; signature.params.len()];
        let returns = signature
            .returns
            .resolve(value, &bindings, &supplied, &signature.params);
        let template = Token::function(
            signature.name.clone(),
            vec![Program::default(); signature.params.len()],
        );
        Candidate::new(signature.name.clone(), CandidateCategory::Function, returns, template)
            .with_detail(signature.category.label())
    }

    fn functions(&self, value: &FpType, options: &SuggestOptions) -> Vec<Candidate> {
        if value.is_invalid() && !options.include_incompatible {
            return Vec::new();
        }
        self.inferrer
            .provider()
            .functions()
            .iter()
            .filter_map(|signature| {
                let compatible = self.inferrer.accepts_input(signature, value);
                (compatible || options.include_incompatible)
                    .then(|| self.function_candidate(signature, value).incompatible(!compatible))
            })
            .collect()
    }

    fn literals(
        &self,
        fold: &Fold,
        context: &FpType,
        scope: &Scope<'_>,
        options: &SuggestOptions,
    ) -> Vec<Candidate> {
        if !fold.at_chain_start() || fold.is_latched() {
            return Vec::new();
        }
        if let Some(pending) = &fold.pending {
            if pending.operator.takes_type_operand() {
                return type_literal_candidates();
            }
        }

        let now = options.reference_time();
        let mut candidates: Vec<Candidate> = TokenKind::LITERALS
            .into_iter()
            .filter_map(|kind| {
                let template = literal_template(kind, now)?;
                let ty = self.inferrer.type_of_token(&template, None, context, scope);
                Self::fits_pending(fold, &ty)
                    .then(|| Candidate::new(kind.label(), CandidateCategory::Literal, ty, template))
            })
            .collect();

        if fold.pending.is_none() {
            if let Some(template) = literal_template(TokenKind::TypeLiteral, now) {
                let ty = self.inferrer.type_of_token(&template, None, context, scope);
                candidates.push(Candidate::new(
                    TokenKind::TypeLiteral.label(),
                    CandidateCategory::Literal,
                    ty,
                    template,
                ));
            }
        }
        candidates
    }

    fn answers(&self, value: &FpType) -> Vec<Candidate> {
        let items = self.inferrer.items();
        if items.is_empty() || !self.inferrer.is_document(value) {
            return Vec::new();
        }
        items
            .iter()
            .map(|item| {
                let candidate = Candidate::new(
                    item.link_id.clone(),
                    CandidateCategory::Answer,
                    self.inferrer.answer_type(value, &item.link_id),
                    Token::answer(item.link_id.clone()),
                );
                match &item.text {
                    Some(text) => candidate.with_detail(text.clone()),
                    None => candidate,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fpe_model::{FieldMap, QuestionnaireItems, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        let mut patient = FieldMap::new();
        patient.insert("name".into(), FpType::record(["HumanName"]));
        patient.insert("active".into(), FpType::single(FpType::boolean()));
        SchemaRegistry::unloaded().with_fields(["Patient"], patient)
    }

    #[test]
    fn test_start_of_expression_offers_fields_variables_literals() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let suggester = Suggester::new(&inferrer);
        let mut scope = Scope::new();
        scope.define("limit", FpType::single(FpType::integer()));

        let context = FpType::single(FpType::record(["Patient"]));
        let candidates = suggester.suggest(&[], 0, &context, &scope, &SuggestOptions::default());

        let first: Vec<_> = candidates.iter().take(2).map(|c| c.label.as_str()).collect();
        assert_eq!(first, vec!["name", "active"]);
        assert!(candidates.iter().all(|c| c.category != CandidateCategory::Operator));
        assert!(candidates.iter().any(|c| c.label == "%limit"));
        assert!(candidates.iter().any(|c| c.label == "Quantity" && c.category == CandidateCategory::Literal));
    }

    #[test]
    fn test_search_filters_labels() {
        let registry = registry();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let suggester = Suggester::new(&inferrer);
        let options = SuggestOptions {
            search: Some("WHE".into()),
            ..SuggestOptions::default()
        };
        let expression = vec![Token::field("name")];
        let context = FpType::single(FpType::record(["Patient"]));
        let labels: Vec<_> = suggester
            .suggest(&expression, 1, &context, &Scope::new(), &options)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["where".to_string()]);
    }

    #[test]
    fn test_literal_templates_use_reference_time() {
        let now = NaiveDateTime::parse_from_str("2024-03-05 08:09:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(literal_template(TokenKind::Date, now), Some(Token::date("2024-03-05")));
        assert_eq!(
            literal_template(TokenKind::DateTime, now),
            Some(Token::datetime("2024-03-05T08:09"))
        );
        assert_eq!(literal_template(TokenKind::Time, now), Some(Token::time("08:09")));
        assert_eq!(literal_template(TokenKind::Field, now), None);
    }
}
