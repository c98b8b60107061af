//! Compiler options

use serde::{Deserialize, Serialize};

/// Options for rendering programs as FHIRPath text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Parenthesize the accumulated left operand wherever FHIRPath precedence
    /// would regroup the left-to-right reading
    pub explicit_grouping: bool,
    /// Append a `/* type */` comment after each binding definition
    pub debug: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            explicit_grouping: true,
            debug: false,
        }
    }
}

impl CompileOptions {
    pub fn debug() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }
}
