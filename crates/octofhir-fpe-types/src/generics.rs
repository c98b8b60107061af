//! Generic type variables in function and operator signatures

use crate::coercion::{is_assignable, is_compatible, normalize_choice};
use crate::FpType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Generic variable bindings collected while matching a signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBindings(IndexMap<String, FpType>);

impl TypeBindings {
    /// Create empty bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the type bound to a variable
    pub fn get(&self, name: &str) -> Option<&FpType> {
        self.0.get(name)
    }

    /// Bind a variable, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, ty: FpType) {
        self.0.insert(name.into(), ty);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over bindings in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FpType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Merge two sets of bindings, failing on a conflicting variable
    pub fn merge(&self, other: &TypeBindings) -> Option<TypeBindings> {
        let mut merged = self.clone();
        for (name, ty) in other.iter() {
            match merged.get(name) {
                Some(existing) if !is_compatible(existing, ty) => return None,
                Some(_) => {}
                None => merged.bind(name, ty.clone()),
            }
        }
        Some(merged)
    }
}

/// Match a signature pattern against an actual type
///
/// Returns the extended bindings on success. Generic variables bind to the
/// first type they meet; later occurrences must be compatible with it. A
/// `Single` actual matches a non-`Single` pattern through its inner type, and
/// a choice actual must match option by option.
pub fn match_pattern(
    pattern: &FpType,
    actual: &FpType,
    bindings: &TypeBindings,
) -> Option<TypeBindings> {
    if actual.is_invalid() {
        return None;
    }

    match pattern {
        FpType::Generic(name) => {
            return match bindings.get(name) {
                Some(bound) if is_compatible(bound, actual) => Some(bindings.clone()),
                Some(_) => None,
                None => {
                    let mut extended = bindings.clone();
                    extended.bind(name.clone(), actual.clone());
                    Some(extended)
                }
            };
        }
        FpType::Any => return Some(bindings.clone()),
        _ => {}
    }

    match (pattern, actual) {
        (_, FpType::Null) => Some(bindings.clone()),
        (_, FpType::Choice(options)) => options
            .iter()
            .try_fold(bindings.clone(), |acc, option| match_pattern(pattern, option, &acc)),
        (FpType::Choice(options), _) => options
            .iter()
            .find_map(|option| match_pattern(option, actual, bindings)),
        (FpType::Single(p), FpType::Single(a)) => match_pattern(p, a, bindings),
        (FpType::Single(_), _) => None,
        (_, FpType::Single(inner)) => match_pattern(pattern, inner, bindings),
        (
            FpType::Lambda {
                context: pattern_context,
                returns: pattern_returns,
            },
            FpType::Lambda { context, returns },
        ) => match_pattern(pattern_returns, returns, bindings)
            .and_then(|extended| match_pattern(pattern_context, context, &extended)),
        (FpType::TypeLiteral(p), FpType::TypeLiteral(a)) => match_pattern(p, a, bindings),
        _ => is_assignable(actual, pattern).then(|| bindings.clone()),
    }
}

/// Replace bound generic variables, leaving unbound ones in place
pub fn substitute_generics(ty: &FpType, bindings: &TypeBindings) -> FpType {
    match ty {
        FpType::Generic(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        FpType::Single(inner) => crate::wrap_single(substitute_generics(inner, bindings)),
        FpType::Choice(options) => normalize_choice(
            options
                .iter()
                .map(|option| substitute_generics(option, bindings))
                .collect(),
        ),
        FpType::Lambda { context, returns } => FpType::lambda(
            substitute_generics(context, bindings),
            substitute_generics(returns, bindings),
        ),
        FpType::TypeLiteral(inner) => FpType::type_literal(substitute_generics(inner, bindings)),
        other => other.clone(),
    }
}
