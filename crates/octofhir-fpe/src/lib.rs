//! Structured FHIRPath expression editor core
//!
//! Expressions are edited as token sequences instead of text. This crate
//! bundles the editor's building blocks:
//! - the token and program model
//! - type inference with per-token flowing types
//! - type-directed completion candidates
//! - the local binding dependency graph
//! - compilation to FHIRPath text, expanding questionnaire answer shortcuts
//!
//! # Example
//!
//! ```ignore
//! use octofhir_fpe::{Editor, Program, Token};
//!
//! let editor = Editor::new(schema, items).with_context(context);
//! let program = Program::new(vec![Token::variable("x")])
//!     .with_binding("x", vec![Token::number("1")]);
//! assert_eq!(editor.stringify(&program), "defineVariable('x', 1).\nselect(%x)");
//! ```

pub use octofhir_fpe_ast as ast;
pub use octofhir_fpe_compiler as compiler;
pub use octofhir_fpe_diagnostics as diagnostics;
pub use octofhir_fpe_model as model;
pub use octofhir_fpe_semantic as semantic;
pub use octofhir_fpe_types as types;

mod config;
mod document;
mod editor;

pub use config::*;
pub use document::*;
pub use editor::*;

// Convenience re-exports
pub use octofhir_fpe_ast::{ExternalBinding, Operator, Program, Token};
pub use octofhir_fpe_diagnostics::{Diagnostic, FpeError, Result, TokenLocation};
pub use octofhir_fpe_types::FpType;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
