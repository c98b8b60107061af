//! Schema provider trait consumed by the type inference engine

use crate::functions::{FunctionSignature, standard_function};
use indexmap::IndexMap;
use octofhir_fpe_diagnostics::{ErrorCode, FPE0300, FPE0301, FPE0302, FPE0303, FPE0401};
use octofhir_fpe_types::{FpType, SchemaPath};
use std::sync::Arc;

/// Fields of a record type, in schema order
///
/// Field types are given as seen from a single parent value: scalar fields are
/// `Single`, repeating fields are bare. Readers of a collection drop the
/// `Single` layer.
pub type FieldMap = IndexMap<String, FpType>;

/// Source of record field types and function signatures
///
/// Implementations must be immutable after construction; inference may call
/// them from any thread.
pub trait SchemaProvider: Send + Sync {
    /// Resolve the fields of the record at `path`
    fn resolve_fields(&self, path: &[String]) -> Result<Arc<FieldMap>, ModelProviderError>;

    /// Resolve a function signature by name
    fn resolve_function(&self, name: &str) -> Option<&FunctionSignature> {
        standard_function(name)
    }

    /// All function signatures, in catalog order
    fn functions(&self) -> &[FunctionSignature] {
        crate::functions::standard_functions()
    }

    /// Whether any schema data is available
    fn is_loaded(&self) -> bool;
}

/// Model provider error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelProviderError {
    #[error("Type not found: {}", .0.join("."))]
    TypeNotFound(SchemaPath),

    #[error("Schema not loaded")]
    NotLoaded,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid questionnaire: {0}")]
    QuestionnaireError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl ModelProviderError {
    /// Diagnostic code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TypeNotFound(_) => FPE0301,
            Self::NotLoaded => FPE0300,
            Self::ParseError(_) => FPE0302,
            Self::QuestionnaireError(_) => FPE0303,
            Self::IoError(_) => FPE0401,
        }
    }
}

impl From<ModelProviderError> for octofhir_fpe_diagnostics::FpeError {
    fn from(err: ModelProviderError) -> Self {
        let code = err.code();
        match err {
            ModelProviderError::IoError(_) => Self::system(code, err.to_string()),
            other => Self::registry(code, other.to_string()),
        }
    }
}
