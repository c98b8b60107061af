//! Compile command implementation

use super::loader::{self, Inputs};
use super::output::{self, OutputFormat};
use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for compile command
pub struct CompileConfig {
    pub inputs: Inputs,
    /// Annotate binding definitions with their types
    pub debug: bool,
    /// Emit operators exactly as typed, without grouping parentheses
    pub no_grouping: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct CompiledRow {
    #[tabled(rename = "Expression")]
    expression: String,
    #[tabled(rename = "Type")]
    ty: String,
}

/// Compile the document's program to FHIRPath text
pub fn compile(config: CompileConfig) -> Result<()> {
    let session = loader::load(&config.inputs)?;

    let mut editor_config = session.editor.config().clone();
    editor_config.compile.debug |= config.debug;
    editor_config.compile.explicit_grouping &= !config.no_grouping;
    let editor = session.editor.with_config(editor_config);

    let expression = editor.stringify(&session.program);
    let content = match config.format {
        OutputFormat::Text => expression,
        OutputFormat::Json => output::format_json(&json!({
            "expression": expression,
            "type": editor.type_of_program(&session.program),
        }))?,
        OutputFormat::Table => output::format_table(vec![CompiledRow {
            expression,
            ty: editor.type_of_program(&session.program).to_string(),
        }]),
    };

    output::write_output(&content, config.output_file.as_deref())
}
