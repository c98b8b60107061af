//! Operator overload resolution
//!
//! Overloads are declared on single values; operands are matched with their
//! `Single` layer removed. The result is single-valued when the operands that
//! determine its cardinality are.

use octofhir_fpe_ast::Operator;
use octofhir_fpe_types::{
    FpType, TypeBindings, TypeError, match_pattern, normalize_choice, promote,
    substitute_generics, unwrap_single, wrap_single,
};
use std::sync::LazyLock;

#[derive(Debug, Clone)]
enum OverloadResult {
    /// The given type with generics substituted
    Fixed(FpType),
    /// Union of the `A` and `B` bindings
    Union,
    /// The type bound to `X`
    Cast,
}

#[derive(Debug, Clone)]
struct Overload {
    operator: Operator,
    left: FpType,
    right: FpType,
    result: OverloadResult,
}

fn overload(operator: Operator, left: FpType, right: FpType, result: FpType) -> Overload {
    Overload {
        operator,
        left,
        right,
        result: OverloadResult::Fixed(result),
    }
}

static OVERLOADS: LazyLock<Vec<Overload>> = LazyLock::new(|| {
    use Operator::*;

    let int = FpType::integer;
    let dec = FpType::decimal;
    let string = FpType::string;
    let boolean = FpType::boolean;
    let quantity = || FpType::Quantity;
    let t = || FpType::generic("T");
    let type_of_x = || FpType::type_literal(FpType::generic("X"));

    let mut table = Vec::new();

    // Numeric arithmetic
    for op in [Add, Subtract, Multiply] {
        table.push(overload(op, int(), int(), int()));
        table.push(overload(op, int(), dec(), dec()));
        table.push(overload(op, dec(), int(), dec()));
        table.push(overload(op, dec(), dec(), dec()));
    }
    for (left, right) in [(int(), int()), (int(), dec()), (dec(), int()), (dec(), dec())] {
        table.push(overload(Divide, left.clone(), right.clone(), dec()));
        table.push(overload(TruncatedDivide, left.clone(), right.clone(), int()));
    }
    table.push(overload(Modulo, int(), int(), int()));
    for (left, right) in [(int(), dec()), (dec(), int()), (dec(), dec())] {
        table.push(overload(Modulo, left, right, dec()));
    }

    // Quantities
    table.push(overload(Add, quantity(), quantity(), quantity()));
    table.push(overload(Subtract, quantity(), quantity(), quantity()));
    for op in [Multiply, Divide] {
        table.push(overload(op, quantity(), quantity(), quantity()));
        table.push(overload(op, quantity(), int(), quantity()));
        table.push(overload(op, quantity(), dec(), quantity()));
    }
    table.push(overload(Multiply, int(), quantity(), quantity()));
    table.push(overload(Multiply, dec(), quantity(), quantity()));

    // Temporal arithmetic
    for op in [Add, Subtract] {
        for temporal in [FpType::date(), FpType::datetime(), FpType::time()] {
            table.push(overload(op, temporal.clone(), quantity(), temporal));
        }
    }

    // Strings
    table.push(overload(Add, string(), string(), string()));
    table.push(overload(Concatenate, string(), string(), string()));

    // Equality and comparison
    for op in [
        Equal,
        NotEqual,
        Equivalent,
        NotEquivalent,
        Less,
        Greater,
        LessOrEqual,
        GreaterOrEqual,
    ] {
        table.push(overload(op, t(), t(), boolean()));
    }

    // Logical
    for op in [And, Or, Xor, Implies] {
        table.push(overload(op, boolean(), boolean(), boolean()));
    }

    // Membership
    table.push(overload(In, t(), t(), boolean()));
    table.push(overload(Contains, t(), t(), boolean()));

    // Union
    table.push(Overload {
        operator: Union,
        left: FpType::generic("A"),
        right: FpType::generic("B"),
        result: OverloadResult::Union,
    });

    // Type operators
    table.push(overload(Is, t(), type_of_x(), boolean()));
    table.push(Overload {
        operator: As,
        left: t(),
        right: type_of_x(),
        result: OverloadResult::Cast,
    });

    table
});

fn overloads_of(operator: Operator) -> impl Iterator<Item = &'static Overload> {
    OVERLOADS.iter().filter(move |o| o.operator == operator)
}

fn is_single_result(operator: Operator, left: &FpType, right: &FpType) -> bool {
    match operator {
        Operator::Union => false,
        Operator::In | Operator::Is | Operator::As => left.is_single(),
        Operator::Contains => right.is_single(),
        _ => left.is_single() && right.is_single(),
    }
}

fn union_of(bindings: &TypeBindings) -> FpType {
    let (Some(a), Some(b)) = (bindings.get("A"), bindings.get("B")) else {
        return FpType::Any;
    };
    if a == b {
        return a.clone();
    }
    promote(a, b).unwrap_or_else(|| normalize_choice(vec![a.clone(), b.clone()]))
}

/// Resolve the result type of `left <operator> right`
pub fn resolve_operator(operator: Operator, left: &FpType, right: &FpType) -> FpType {
    if left.is_invalid() {
        return left.clone();
    }
    if right.is_invalid() {
        return right.clone();
    }

    let left_value = unwrap_single(left.clone());
    let right_value = unwrap_single(right.clone());

    for candidate in overloads_of(operator) {
        let Some(bindings) = match_pattern(&candidate.left, &left_value, &TypeBindings::new())
        else {
            continue;
        };
        let Some(bindings) = match_pattern(&candidate.right, &right_value, &bindings) else {
            continue;
        };

        let result = match &candidate.result {
            OverloadResult::Fixed(ty) => substitute_generics(ty, &bindings),
            OverloadResult::Union => union_of(&bindings),
            OverloadResult::Cast => bindings
                .get("X")
                .map(|x| normalize_choice(vec![x.clone()]))
                .unwrap_or(FpType::Any),
        };

        return if is_single_result(operator, left, right) {
            wrap_single(result)
        } else {
            result
        };
    }

    FpType::invalid(TypeError::NoOverload {
        operator: operator.symbol().to_string(),
        left: left.describe(),
        right: right.describe(),
    })
}

/// Check if some overload of `operator` accepts `left` as its left operand
pub fn accepts_left(operator: Operator, left: &FpType) -> bool {
    if left.is_invalid() {
        return false;
    }
    let left_value = unwrap_single(left.clone());
    overloads_of(operator)
        .any(|o| match_pattern(&o.left, &left_value, &TypeBindings::new()).is_some())
}

/// The types the right operand may take once `left` is fixed
///
/// Returns `Null` when no overload accepts `left`.
pub fn right_operand_type(operator: Operator, left: &FpType) -> FpType {
    if left.is_invalid() {
        return FpType::Null;
    }
    let left_value = unwrap_single(left.clone());
    let options = overloads_of(operator)
        .filter_map(|o| {
            match_pattern(&o.left, &left_value, &TypeBindings::new())
                .map(|bindings| substitute_generics(&o.right, &bindings))
        })
        .collect();
    normalize_choice(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fpe_types::PrimitiveKind;

    fn one(ty: FpType) -> FpType {
        FpType::single(ty)
    }

    #[test]
    fn test_numeric_arithmetic() {
        assert_eq!(
            resolve_operator(Operator::Add, &one(FpType::integer()), &one(FpType::integer())),
            one(FpType::integer())
        );
        assert_eq!(
            resolve_operator(Operator::Add, &one(FpType::integer()), &one(FpType::decimal())),
            one(FpType::decimal())
        );
        assert_eq!(
            resolve_operator(Operator::Divide, &one(FpType::integer()), &one(FpType::integer())),
            one(FpType::decimal())
        );
        assert_eq!(
            resolve_operator(Operator::TruncatedDivide, &one(FpType::decimal()), &one(FpType::integer())),
            one(FpType::integer())
        );
    }

    #[test]
    fn test_number_plus_quantity_has_no_overload() {
        let result = resolve_operator(
            Operator::Add,
            &one(FpType::integer()),
            &one(FpType::Quantity),
        );
        assert!(result.is_invalid());
        assert_eq!(
            result.error().map(ToString::to_string),
            Some("no overload of '+' for Single<Integer> and Single<Quantity>".to_string())
        );
    }

    #[test]
    fn test_collection_operand_drops_single() {
        assert_eq!(
            resolve_operator(Operator::Add, &FpType::integer(), &one(FpType::integer())),
            FpType::integer()
        );
        assert_eq!(
            resolve_operator(Operator::Equal, &one(FpType::string()), &one(FpType::string())),
            one(FpType::boolean())
        );
    }

    #[test]
    fn test_subtypes_match_system_overloads() {
        let code = one(FpType::primitive(PrimitiveKind::Code));
        assert_eq!(
            resolve_operator(Operator::Concatenate, &code, &one(FpType::string())),
            one(FpType::string())
        );
    }

    #[test]
    fn test_union() {
        assert_eq!(
            resolve_operator(Operator::Union, &one(FpType::integer()), &one(FpType::integer())),
            FpType::integer()
        );
        assert_eq!(
            resolve_operator(Operator::Union, &FpType::integer(), &FpType::decimal()),
            FpType::decimal()
        );
        assert_eq!(
            resolve_operator(Operator::Union, &FpType::string(), &FpType::boolean()),
            FpType::choice(vec![FpType::string(), FpType::boolean()])
        );
    }

    #[test]
    fn test_type_operators() {
        let patient = FpType::type_literal(FpType::record(["Patient"]));
        assert_eq!(
            resolve_operator(Operator::Is, &one(FpType::record(["Resource"])), &patient),
            one(FpType::boolean())
        );
        assert_eq!(
            resolve_operator(Operator::As, &FpType::record(["Resource"]), &patient),
            FpType::record(["Patient"])
        );
        assert!(resolve_operator(Operator::Is, &FpType::string(), &one(FpType::string())).is_invalid());
    }

    #[test]
    fn test_logical_requires_boolean() {
        assert!(
            resolve_operator(Operator::And, &one(FpType::boolean()), &one(FpType::integer()))
                .is_invalid()
        );
        assert!(accepts_left(Operator::And, &one(FpType::boolean())));
        assert!(!accepts_left(Operator::And, &one(FpType::string())));
    }

    #[test]
    fn test_right_operand_type() {
        assert_eq!(
            right_operand_type(Operator::Concatenate, &one(FpType::string())),
            FpType::string()
        );
        assert_eq!(
            right_operand_type(Operator::Subtract, &one(FpType::date())),
            FpType::Quantity
        );
        assert_eq!(right_operand_type(Operator::And, &one(FpType::string())), FpType::Null);
    }
}
