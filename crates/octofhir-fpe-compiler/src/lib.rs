//! FHIRPath text generation for structured expression programs
//!
//! This crate provides:
//! - [`CompileOptions`] controlling grouping and debug annotations
//! - The [`Stringifier`], rendering tokens and programs as FHIRPath text
//! - Expansion of the `answer` shortcut into its questionnaire response path

pub mod macros;
pub mod options;
pub mod stringify;

pub use macros::expand_answer;
pub use options::*;
pub use stringify::*;
