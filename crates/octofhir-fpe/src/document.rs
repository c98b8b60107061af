//! Editor documents
//!
//! A document is the JSON form of one editing session: the context type, the
//! host's external bindings, the program and optional configuration.

use crate::config::EditorConfig;
use octofhir_fpe_ast::{ExternalBinding, Program};
use octofhir_fpe_diagnostics::{FPE0401, FPE0404, FPE0406, FpeError, Result};
use octofhir_fpe_types::FpType;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn any_context() -> FpType {
    FpType::Any
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorDocument {
    /// Type of `$this` at the start of the output expression
    #[serde(default = "any_context")]
    pub context: FpType,
    #[serde(default)]
    pub externals: Vec<ExternalBinding>,
    #[serde(default)]
    pub program: Program,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EditorConfig>,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self {
            context: any_context(),
            externals: Vec::new(),
            program: Program::default(),
            config: None,
        }
    }
}

impl EditorDocument {
    /// Parse a document from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FpeError::system(FPE0406, format!("invalid editor document: {e}")))
    }

    /// Read a document from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                FPE0404
            } else {
                FPE0401
            };
            FpeError::system(code, e.to_string()).with_context(path.display().to_string())
        })?;
        log::debug!("read editor document {}", path.display());
        Self::from_json(&json).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FpeError::system(FPE0406, format!("cannot serialize document: {e}")))
    }
}
