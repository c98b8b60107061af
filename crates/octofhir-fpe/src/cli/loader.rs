//! Loading documents and registries

use crate::{Editor, EditorDocument, Program};
use anyhow::{Context, Result};
use octofhir_fpe_model::{QuestionnaireItems, SchemaProvider, SchemaRegistry};
use std::path::PathBuf;
use std::sync::Arc;

/// Files shared by every command
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// Editor document (JSON)
    pub document: PathBuf,
    /// Schema bundle (JSON); without it every field lookup is invalid
    pub schema: Option<PathBuf>,
    /// Questionnaire (JSON) whose items answer tokens refer to
    pub questionnaire: Option<PathBuf>,
    /// Overrides the document's configured document type
    pub document_type: Option<String>,
}

/// An editor ready to work on the document's program
#[derive(Debug)]
pub struct Session {
    pub editor: Editor,
    pub program: Program,
}

pub fn load(inputs: &Inputs) -> Result<Session> {
    let document = EditorDocument::from_file(&inputs.document)
        .with_context(|| format!("Failed to read document: {}", inputs.document.display()))?;

    let schema: Arc<dyn SchemaProvider> = match &inputs.schema {
        Some(path) => Arc::new(
            SchemaRegistry::from_file(path)
                .with_context(|| format!("Failed to load schema: {}", path.display()))?,
        ),
        None => {
            log::warn!("no schema given, field lookups will report the schema as not loaded");
            Arc::new(SchemaRegistry::unloaded())
        }
    };

    let items = match &inputs.questionnaire {
        Some(path) => QuestionnaireItems::from_json_file(path)
            .with_context(|| format!("Failed to load questionnaire: {}", path.display()))?,
        None => QuestionnaireItems::new(),
    };

    let mut editor = Editor::for_document(&document, schema, Arc::new(items));
    if let Some(document_type) = &inputs.document_type {
        let mut config = editor.config().clone();
        config.document_type = document_type.clone();
        editor = editor.with_config(config);
    }

    Ok(Session {
        editor,
        program: document.program,
    })
}
