//! Type model tests
//!
//! Covers assignability, unification, choice normalization and generic
//! matching, plus property tests for the algebraic laws the editor relies on.

use octofhir_fpe_types::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn single(ty: FpType) -> FpType {
    FpType::single(ty)
}

// === Assignability ===

#[rstest]
#[case(FpType::primitive(PrimitiveKind::Code), FpType::string(), true)]
#[case(FpType::primitive(PrimitiveKind::Canonical), FpType::primitive(PrimitiveKind::Uri), true)]
#[case(FpType::string(), FpType::primitive(PrimitiveKind::Code), false)]
#[case(FpType::integer(), FpType::decimal(), false)]
#[case(single(FpType::integer()), FpType::integer(), true)]
#[case(FpType::integer(), single(FpType::integer()), false)]
#[case(FpType::Quantity, FpType::record(["Quantity"]), true)]
#[case(FpType::record(["Patient"]), FpType::record(["Observation"]), false)]
#[case(FpType::Null, single(FpType::string()), true)]
#[case(FpType::record(["Patient"]), FpType::Any, true)]
#[case(FpType::Any, FpType::record(["Patient"]), false)]
fn test_assignability(#[case] from: FpType, #[case] to: FpType, #[case] expected: bool) {
    assert_eq!(is_assignable(&from, &to), expected, "{from} -> {to}");
}

#[test]
fn test_lambda_assignability_is_contravariant_in_context() {
    let narrow = FpType::lambda(FpType::string(), FpType::boolean());
    let wide = FpType::lambda(FpType::primitive(PrimitiveKind::Code), FpType::boolean());
    assert!(is_assignable(&narrow, &wide));
    assert!(!is_assignable(&wide, &narrow));
}

#[test]
fn test_choice_source_requires_every_option() {
    let choice = FpType::choice(vec![FpType::primitive(PrimitiveKind::Code), FpType::string()]);
    assert!(is_assignable(&choice, &FpType::string()));

    let mixed = FpType::choice(vec![FpType::string(), FpType::Quantity]);
    assert!(!is_assignable(&mixed, &FpType::string()));
}

// === Unification ===

#[test]
fn test_unify_number_with_quantity() {
    assert_eq!(unify(&FpType::integer(), &FpType::Quantity), FpType::Quantity);
}

#[test]
fn test_unify_keeps_first_invalid() {
    let err = FpType::invalid(TypeError::SchemaNotLoaded);
    assert_eq!(unify(&err, &FpType::string()), err);
    assert_eq!(unify(&FpType::string(), &err), err);
}

#[test]
fn test_unify_subtypes_to_parent() {
    assert_eq!(
        unify(&FpType::primitive(PrimitiveKind::Code), &FpType::string()),
        FpType::string()
    );
    assert_eq!(
        unify(
            &FpType::primitive(PrimitiveKind::Code),
            &FpType::primitive(PrimitiveKind::Id)
        ),
        FpType::string()
    );
}

// === Generic matching ===

#[test]
fn test_choice_actual_matches_option_by_option() {
    let pattern = FpType::choice(vec![FpType::integer(), FpType::decimal(), FpType::Quantity]);
    let actual = FpType::choice(vec![single(FpType::integer()), single(FpType::decimal())]);
    assert!(match_pattern(&pattern, &actual, &TypeBindings::new()).is_some());

    let bad = FpType::choice(vec![FpType::integer(), FpType::string()]);
    assert!(match_pattern(&pattern, &bad, &TypeBindings::new()).is_none());
}

#[test]
fn test_invalid_never_matches() {
    let invalid = FpType::invalid(TypeError::SchemaNotLoaded);
    assert!(match_pattern(&FpType::Any, &invalid, &TypeBindings::new()).is_none());
    assert!(match_pattern(&FpType::generic("T"), &invalid, &TypeBindings::new()).is_none());
}

// === Properties ===

fn arb_primitive() -> impl Strategy<Value = PrimitiveKind> {
    prop_oneof![
        Just(PrimitiveKind::Boolean),
        Just(PrimitiveKind::Integer),
        Just(PrimitiveKind::Decimal),
        Just(PrimitiveKind::String),
        Just(PrimitiveKind::DateTime),
        Just(PrimitiveKind::Code),
        Just(PrimitiveKind::PositiveInt),
    ]
}

fn arb_type() -> impl Strategy<Value = FpType> {
    let leaf = prop_oneof![
        arb_primitive().prop_map(FpType::primitive),
        Just(FpType::Quantity),
        Just(FpType::Null),
        Just(FpType::Any),
        prop::sample::select(vec!["Patient", "HumanName", "Quantity"]).prop_map(|n| FpType::record([n])),
        Just(FpType::invalid(TypeError::SchemaNotLoaded)),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(FpType::single),
            prop::collection::vec(inner.clone(), 1..3).prop_map(FpType::choice),
            (inner.clone(), inner.clone()).prop_map(|(c, r)| FpType::lambda(c, r)),
            inner.prop_map(FpType::type_literal),
        ]
    })
}

fn contains_invalid(ty: &FpType) -> bool {
    match ty {
        FpType::Invalid(_) => true,
        FpType::Single(inner) | FpType::TypeLiteral(inner) => contains_invalid(inner),
        FpType::Choice(options) => options.iter().any(contains_invalid),
        FpType::Lambda { context, returns } => contains_invalid(context) || contains_invalid(returns),
        _ => false,
    }
}

proptest! {
    #[test]
    fn prop_assignability_is_reflexive(ty in arb_type()) {
        prop_assert!(is_assignable(&ty, &ty));
    }

    #[test]
    fn prop_single_is_assignable_to_inner(ty in arb_type()) {
        prop_assume!(!contains_invalid(&ty));
        prop_assert!(is_assignable(&FpType::single(ty.clone()), &ty));
    }

    #[test]
    fn prop_unify_absorbs_invalid(ty in arb_type()) {
        let invalid = FpType::invalid(TypeError::SchemaNotLoaded);
        prop_assert!(unify(&invalid, &ty).is_invalid());
        prop_assert!(unify(&ty, &invalid).is_invalid());
    }

    #[test]
    fn prop_unify_is_reflexive(ty in arb_type()) {
        prop_assert_eq!(unify(&ty, &ty), ty);
    }
}
