//! Structured expression model
//!
//! Expressions are not parsed from text. They are edited as ordered token
//! sequences, and a [`Program`] is a list of named local bindings followed by
//! an output expression. Function arguments are programs themselves, so the
//! model is recursive.

mod operator;
mod program;
mod token;

pub use operator::*;
pub use program::*;
pub use token::*;
