//! Document shape of tokens and programs

use octofhir_fpe_ast::*;
use octofhir_fpe_types::FpType;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Token::number("1.5"), json!({"type": "number", "value": "1.5"}))]
#[case(Token::boolean(true), json!({"type": "boolean", "value": true}))]
#[case(Token::datetime("2024-01-01T10:00:00"), json!({"type": "datetime", "value": "2024-01-01T10:00:00"}))]
#[case(Token::quantity("5", "mg"), json!({"type": "quantity", "value": {"value": "5", "unit": "mg"}}))]
#[case(Token::index(0), json!({"type": "index", "value": 0}))]
#[case(Token::operator(Operator::Union), json!({"type": "operator", "value": "|"}))]
#[case(Token::variable("x"), json!({"type": "variable", "value": "x"}))]
#[case(Token::answer("weight"), json!({"type": "answer", "linkId": "weight"}))]
#[case(
    Token::type_literal(FpType::string()),
    json!({"type": "type", "value": {"type": "Primitive", "of": "String"}})
)]
fn test_token_shape(#[case] token: Token, #[case] expected: serde_json::Value) {
    assert_eq!(serde_json::to_value(&token).unwrap(), expected);
    let back: Token = serde_json::from_value(expected).unwrap();
    assert_eq!(back, token);
}

#[test]
fn test_program_document() {
    let doc = json!({
        "bindings": [
            {"id": "a", "name": "names", "expression": [{"type": "field", "value": "name"}]}
        ],
        "expression": [
            {"type": "variable", "value": "names"},
            {"type": "function", "value": "where", "args": [
                {"expression": [
                    {"type": "field", "value": "use"},
                    {"type": "operator", "value": "="},
                    {"type": "string", "value": "official"}
                ]}
            ]},
            {"type": "function", "value": "count"}
        ]
    });

    let program: Program = serde_json::from_value(doc).unwrap();
    assert_eq!(program.bindings[0].name, "names");
    match &program.expression[1] {
        Token::Function { name, args } => {
            assert_eq!(name, "where");
            assert!(args[0].bindings.is_empty());
            assert_eq!(args[0].expression.len(), 3);
        }
        other => panic!("expected function token, got {other:?}"),
    }
    assert_eq!(
        program.expression[2],
        Token::function("count", Vec::new())
    );
}
