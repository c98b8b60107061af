//! Editor type model
//!
//! This crate defines the types that flow through a structured expression:
//! - primitive kinds (system kinds plus FHIR primitive specializations)
//! - record types addressed by schema path, `Single` cardinality, choices
//! - generics and lambda types used by function signatures
//! - assignability, unification and generic matching
//!
//! Types are immutable values compared structurally. A type error is not a
//! Rust error: it is the absorbing [`FpType::Invalid`] type carrying a
//! [`TypeError`].

pub mod coercion;
pub mod error;
pub mod generics;
pub mod type_system;

pub use coercion::{
    is_assignable, is_compatible, normalize_choice, promote, unify, unwrap_single, wrap_single,
};
pub use error::TypeError;
pub use generics::{TypeBindings, match_pattern, substitute_generics};
pub use type_system::{FpType, PrimitiveKind, SchemaPath};
