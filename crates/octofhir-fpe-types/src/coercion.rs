//! Assignability, unification and cardinality helpers
//!
//! Rules:
//! - `Single(X)` is assignable to `X` (cardinality is forgotten covariantly),
//!   a bare `X` never satisfies `Single(X)`
//! - a choice is assignable when every option is, and accepts any option
//! - FHIR primitive kinds are assignable to their parent kinds
//! - `Invalid` is only assignable to an identical `Invalid`

use crate::{FpType, PrimitiveKind, TypeError};

/// Check whether a value of type `from` may be used where `to` is expected
pub fn is_assignable(from: &FpType, to: &FpType) -> bool {
    if from == to {
        return true;
    }

    match (from, to) {
        (FpType::Invalid(_), _) | (_, FpType::Invalid(_)) => false,
        (_, FpType::Any) | (_, FpType::Generic(_)) => true,
        (FpType::Null, _) => true,

        (FpType::Choice(options), _) => options.iter().all(|option| is_assignable(option, to)),
        (_, FpType::Choice(options)) => {
            options.iter().any(|option| is_assignable(from, option))
                || matches!(from, FpType::Single(inner) if is_assignable(inner, to))
        }

        (FpType::Single(a), FpType::Single(b)) => is_assignable(a, b),
        (FpType::Single(inner), _) => is_assignable(inner, to),
        (_, FpType::Single(_)) => false,

        (FpType::Primitive(a), FpType::Primitive(b)) => a.is_subtype_of(*b),
        (FpType::Quantity, FpType::Record(path)) | (FpType::Record(path), FpType::Quantity) => {
            is_quantity_path(path)
        }
        (
            FpType::Lambda {
                context: from_context,
                returns: from_returns,
            },
            FpType::Lambda {
                context: to_context,
                returns: to_returns,
            },
        ) => is_assignable(to_context, from_context) && is_assignable(from_returns, to_returns),
        (FpType::TypeLiteral(a), FpType::TypeLiteral(b)) => is_assignable(a, b),

        _ => false,
    }
}

fn is_quantity_path(path: &[String]) -> bool {
    matches!(path, [name] if name == "Quantity")
}

/// Check if two types are compatible in either direction, or promotable
///
/// Used to decide whether a generic variable bound to one type accepts another.
pub fn is_compatible(a: &FpType, b: &FpType) -> bool {
    matches!(a, FpType::Generic(_))
        || matches!(b, FpType::Generic(_))
        || is_assignable(a, b)
        || is_assignable(b, a)
        || promote(a, b).is_some()
}

/// Combine two types into the narrowest type both are assignable to
///
/// Returns `Invalid` naming both inputs when no such type exists. An `Invalid`
/// input is returned unchanged.
pub fn unify(a: &FpType, b: &FpType) -> FpType {
    if a.is_invalid() {
        return a.clone();
    }
    if b.is_invalid() {
        return b.clone();
    }
    if a == b {
        return a.clone();
    }

    let unified = match (a, b) {
        (FpType::Single(x), FpType::Single(y)) => wrap_single(unify(x, y)),
        (FpType::Single(x), _) => unify(x, b),
        (_, FpType::Single(y)) => unify(a, y),
        _ if is_assignable(a, b) => b.clone(),
        _ if is_assignable(b, a) => a.clone(),
        _ => promote(a, b).unwrap_or(FpType::Invalid(None)),
    };

    if unified.is_invalid() {
        FpType::invalid(TypeError::CannotUnify {
            left: a.describe(),
            right: b.describe(),
        })
    } else {
        unified
    }
}

/// Implicit promotion between distinct primitive-like types
///
/// - Integer and Decimal promote to Decimal
/// - a number and a Quantity promote to Quantity
/// - Date and DateTime promote to DateTime
/// - two specializations of the same kind promote to that kind
pub fn promote(a: &FpType, b: &FpType) -> Option<FpType> {
    match (a.unwrapped(), b.unwrapped()) {
        (FpType::Primitive(x), FpType::Primitive(y)) => {
            let (x, y) = (x.system_kind(), y.system_kind());
            match (x, y) {
                _ if x == y => Some(FpType::Primitive(x)),
                (PrimitiveKind::Integer, PrimitiveKind::Decimal)
                | (PrimitiveKind::Decimal, PrimitiveKind::Integer) => Some(FpType::decimal()),
                (PrimitiveKind::Date, PrimitiveKind::DateTime)
                | (PrimitiveKind::DateTime, PrimitiveKind::Date) => Some(FpType::datetime()),
                _ => None,
            }
        }
        (FpType::Primitive(kind), FpType::Quantity) | (FpType::Quantity, FpType::Primitive(kind))
            if kind.is_numeric() =>
        {
            Some(FpType::Quantity)
        }
        _ => None,
    }
}

/// Flatten, deduplicate and collapse a list of choice options
///
/// An empty list becomes `Null`, a single option becomes that option, and an
/// `Invalid` option makes the whole choice invalid.
pub fn normalize_choice(options: Vec<FpType>) -> FpType {
    let mut flat: Vec<FpType> = Vec::with_capacity(options.len());
    let mut pending = options;
    pending.reverse();

    while let Some(option) = pending.pop() {
        match option {
            FpType::Choice(nested) => pending.extend(nested.into_iter().rev()),
            FpType::Invalid(_) => return option,
            other if !flat.contains(&other) => flat.push(other),
            _ => {}
        }
    }

    match flat.len() {
        0 => FpType::Null,
        1 => flat.remove(0),
        _ => FpType::Choice(flat),
    }
}

/// Mark a type as single-valued
pub fn wrap_single(ty: FpType) -> FpType {
    match ty {
        FpType::Single(_)
        | FpType::Invalid(_)
        | FpType::Null
        | FpType::Lambda { .. }
        | FpType::TypeLiteral(_) => ty,
        other => FpType::single(other),
    }
}

/// Forget that a type is single-valued
pub fn unwrap_single(ty: FpType) -> FpType {
    match ty {
        FpType::Single(inner) => *inner,
        FpType::Choice(options) => {
            normalize_choice(options.into_iter().map(unwrap_single).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_covariance() {
        let int = FpType::integer();
        let single = FpType::single(int.clone());
        assert!(is_assignable(&single, &int));
        assert!(!is_assignable(&int, &single));
    }

    #[test]
    fn test_choice_assignability() {
        let choice = FpType::choice(vec![FpType::integer(), FpType::string()]);
        assert!(!is_assignable(&choice, &FpType::integer()));
        assert!(is_assignable(&FpType::integer(), &choice));
        assert!(is_assignable(&FpType::single(choice.clone()), &choice));
    }

    #[test]
    fn test_unify_promotes_numbers() {
        assert_eq!(
            unify(&FpType::single(FpType::integer()), &FpType::single(FpType::decimal())),
            FpType::single(FpType::decimal())
        );
        assert_eq!(
            unify(&FpType::single(FpType::integer()), &FpType::integer()),
            FpType::integer()
        );
    }

    #[test]
    fn test_unify_incompatible_names_both() {
        let result = unify(&FpType::string(), &FpType::boolean());
        assert_eq!(
            result.error().map(ToString::to_string).as_deref(),
            Some("cannot unify String with Boolean")
        );
    }

    #[test]
    fn test_normalize_choice() {
        let nested = vec![
            FpType::string(),
            FpType::choice(vec![FpType::string(), FpType::integer()]),
        ];
        assert_eq!(
            normalize_choice(nested),
            FpType::choice(vec![FpType::string(), FpType::integer()])
        );
        assert_eq!(normalize_choice(vec![FpType::boolean()]), FpType::boolean());
        assert_eq!(normalize_choice(vec![]), FpType::Null);
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let single = wrap_single(FpType::string());
        assert_eq!(wrap_single(single.clone()), single);
        assert_eq!(unwrap_single(single), FpType::string());
        assert!(wrap_single(FpType::Invalid(None)).is_invalid());
    }
}
