//! Editor configuration

use octofhir_fpe_compiler::CompileOptions;
use octofhir_fpe_model::QUESTIONNAIRE_RESPONSE;
use octofhir_fpe_semantic::SuggestOptions;
use serde::{Deserialize, Serialize};

/// Options shared by every editor operation
///
/// Every field has a default, so a partial `config` object in a document is
/// enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub compile: CompileOptions,
    pub suggest: SuggestOptions,
    /// Record type that `answer` tokens navigate from
    pub document_type: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            suggest: SuggestOptions::default(),
            document_type: QUESTIONNAIRE_RESPONSE.to_string(),
        }
    }
}
