//! Schema registry tests against a small FHIR schema fixture

use octofhir_fpe_model::*;
use octofhir_fpe_types::{FpType, PrimitiveKind};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> SchemaRegistry {
    SchemaRegistry::from_json(include_str!("fixtures/schemas.json")).unwrap()
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

#[rstest]
fn test_repeating_complex_field_is_bare(registry: SchemaRegistry) {
    let fields = registry.resolve_fields(&path(&["Patient"])).unwrap();
    assert_eq!(fields.get("name"), Some(&FpType::record(["HumanName"])));
    assert_eq!(fields.get("active"), Some(&FpType::single(FpType::boolean())));
}

#[rstest]
fn test_base_chain_elements_follow_own(registry: SchemaRegistry) {
    let fields = registry.resolve_fields(&path(&["Patient"])).unwrap();
    let names: Vec<_> = fields.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["active", "name", "birthDate", "contact", "extension", "id", "meta"]
    );
    assert_eq!(
        fields.get("id"),
        Some(&FpType::single(FpType::primitive(PrimitiveKind::Id)))
    );
}

#[rstest]
fn test_backbone_elements_get_nested_paths(registry: SchemaRegistry) {
    let fields = registry.resolve_fields(&path(&["Patient"])).unwrap();
    assert_eq!(fields.get("contact"), Some(&FpType::record(["Patient", "contact"])));

    let contact = registry.resolve_fields(&path(&["Patient", "contact"])).unwrap();
    assert_eq!(
        contact.get("gender"),
        Some(&FpType::single(FpType::primitive(PrimitiveKind::Code)))
    );
    assert!(contact.contains_key("modifierExtension"));
}

#[rstest]
fn test_choice_element(registry: SchemaRegistry) {
    let fields = registry.resolve_fields(&path(&["Observation"])).unwrap();
    assert_eq!(
        fields.get("value"),
        Some(&FpType::single(FpType::choice(vec![
            FpType::Quantity,
            FpType::string(),
            FpType::boolean(),
        ])))
    );
}

#[rstest]
fn test_element_reference(registry: SchemaRegistry) {
    let item = registry
        .resolve_fields(&path(&["QuestionnaireResponse", "item"]))
        .unwrap();
    assert_eq!(
        item.get("item"),
        Some(&FpType::record(["QuestionnaireResponse", "item"]))
    );
    let answer = registry
        .resolve_fields(&path(&["QuestionnaireResponse", "item", "answer"]))
        .unwrap();
    assert_eq!(
        answer.get("item"),
        Some(&FpType::record(["QuestionnaireResponse", "item"]))
    );
}

#[rstest]
fn test_unknown_type(registry: SchemaRegistry) {
    let err = registry.resolve_fields(&path(&["Encounter"])).unwrap_err();
    assert_eq!(err.to_string(), "Type not found: Encounter");
}

#[test]
fn test_invalid_document() {
    let err = SchemaRegistry::from_json("{\"schemas\": 3}").unwrap_err();
    assert!(matches!(err, ModelProviderError::ParseError(_)));
}
