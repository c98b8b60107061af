//! CLI functionality for the `fpe` tool
//!
//! Every command reads an editor document, builds an [`Editor`](crate::Editor)
//! for it and renders its result as text, JSON or a table.

pub mod check;
pub mod compile;
pub mod loader;
pub mod output;
pub mod suggest;
pub mod types;
