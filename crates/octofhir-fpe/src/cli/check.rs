//! Check command implementation

use super::loader::{self, Inputs};
use super::output::{self, OutputFormat};
use crate::Diagnostic;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for check command
pub struct CheckConfig {
    pub inputs: Inputs,
    /// Treat warnings as errors
    pub strict: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct DiagnosticRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Diagnostic> for DiagnosticRow {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            severity: diagnostic.severity.to_string(),
            code: diagnostic.code.to_string(),
            location: diagnostic
                .location
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            message: diagnostic.message.clone(),
        }
    }
}

fn format_text(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return output::format_success("no problems found");
    }
    let mut lines: Vec<String> = diagnostics.iter().map(Diagnostic::to_colored_string).collect();

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    let mut summary = Vec::new();
    if errors > 0 {
        summary.push(format!("{errors} error(s)").red().to_string());
    }
    if warnings > 0 {
        summary.push(format!("{warnings} warning(s)").yellow().to_string());
    }
    lines.push(format!("\nFound {}", summary.join(", ")));
    lines.join("\n")
}

/// Check the document's program and report its diagnostics
///
/// Fails after writing the report when an error is found, or a warning in
/// strict mode.
pub fn check(config: CheckConfig) -> Result<()> {
    let session = loader::load(&config.inputs)?;
    let diagnostics = session.editor.check(&session.program);

    let content = match config.format {
        OutputFormat::Text => format_text(&diagnostics),
        OutputFormat::Json => output::format_json(&diagnostics)?,
        OutputFormat::Table => {
            output::format_table(diagnostics.iter().map(DiagnosticRow::from).collect())
        }
    };
    output::write_output(&content, config.output_file.as_deref())?;

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        anyhow::bail!("check failed with {errors} error(s)");
    }
    if config.strict && !diagnostics.is_empty() {
        anyhow::bail!("strict mode: {} warning(s) treated as errors", diagnostics.len());
    }
    Ok(())
}
