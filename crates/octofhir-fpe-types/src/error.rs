//! Type errors carried by the `Invalid` type

use octofhir_fpe_diagnostics::{
    ErrorCode, FPE0100, FPE0101, FPE0102, FPE0103, FPE0104, FPE0110, FPE0111, FPE0112, FPE0113,
    FPE0114, FPE0115, FPE0116, FPE0117, FPE0118, FPE0300, FPE0301,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a position in an expression has no valid type
///
/// Type names inside the variants are already rendered with
/// [`FpType::describe`](crate::FpType::describe), so the error stays a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "kebab-case")]
pub enum TypeError {
    #[error("unknown variable %{name}")]
    UnknownVariable { name: String },

    #[error("unknown function {name}()")]
    UnknownFunction { name: String },

    #[error("no field '{field}' on {on}")]
    UnknownField { field: String, on: String },

    #[error("cannot read field '{field}' from {on}")]
    NotARecord { field: String, on: String },

    #[error("answers can only be read from a {expected}")]
    AnswerOutsideResponse { expected: String },

    #[error("expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("cannot unify {left} with {right}")]
    CannotUnify { left: String, right: String },

    #[error("missing required argument '{argument}' of {function}()")]
    MissingArgument { function: String, argument: String },

    #[error("argument '{argument}' of {function}() expects {expected}, got {actual}")]
    ArgumentMismatch {
        function: String,
        argument: String,
        expected: String,
        actual: String,
    },

    #[error("argument '{argument}' of {function}() conflicts with an earlier argument")]
    BindingConflict { function: String, argument: String },

    #[error("circular reference through %{name}")]
    CircularReference { name: String },

    #[error("{function}() expects input {expected}, got {actual}")]
    InputMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("no overload of '{operator}' for {left} and {right}")]
    NoOverload {
        operator: String,
        left: String,
        right: String,
    },

    #[error("operator '{operator}' is missing its left operand")]
    MissingOperand { operator: String },

    #[error("operator '{operator}' is missing its right operand")]
    MissingRightOperand { operator: String },

    #[error("{kind} token cannot appear here")]
    Misplaced { kind: String },

    #[error("malformed {kind} literal '{text}'")]
    MalformedLiteral { kind: String, text: String },

    #[error("schema not loaded")]
    SchemaNotLoaded,

    #[error("type {path} not found in schema")]
    SchemaTypeNotFound { path: String },

    #[error("{message}")]
    Other { message: String },
}

impl TypeError {
    /// Diagnostic code reported for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownVariable { .. } => FPE0100,
            Self::UnknownFunction { .. } => FPE0101,
            Self::UnknownField { .. } => FPE0102,
            Self::NotARecord { .. } => FPE0103,
            Self::AnswerOutsideResponse { .. } => FPE0104,
            Self::Mismatch { .. } | Self::CannotUnify { .. } | Self::Other { .. } => FPE0110,
            Self::MissingArgument { .. } => FPE0111,
            Self::ArgumentMismatch { .. } => FPE0112,
            Self::BindingConflict { .. } => FPE0113,
            Self::CircularReference { .. } => FPE0114,
            Self::InputMismatch { .. } => FPE0115,
            Self::NoOverload { .. } => FPE0116,
            Self::MissingOperand { .. } | Self::MissingRightOperand { .. } => FPE0117,
            Self::Misplaced { .. } => FPE0110,
            Self::MalformedLiteral { .. } => FPE0118,
            Self::SchemaNotLoaded => FPE0300,
            Self::SchemaTypeNotFound { .. } => FPE0301,
        }
    }
}
