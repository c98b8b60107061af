//! Semantic analysis for the structured FHIRPath expression editor
//!
//! This crate provides:
//! - Binding scopes chained through function argument programs
//! - The operator overload table
//! - Prefix type inference over token sequences
//! - Type-directed completion candidates
//! - The binding dependency graph and its checked mutations
//! - Program checks producing diagnostics

pub mod check;
pub mod error;
pub mod graph;
pub mod inference;
pub mod operators;
pub mod scope;
pub mod suggest;

pub use check::*;
pub use error::*;
pub use graph::*;
pub use inference::*;
pub use operators::{accepts_left, resolve_operator, right_operand_type};
pub use scope::*;
pub use suggest::*;
