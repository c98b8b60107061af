//! Suggest command implementation

use super::loader::{self, Inputs};
use super::output::{self, OutputFormat};
use crate::TokenLocation;
use anyhow::Result;
use colored::Colorize;
use octofhir_fpe_diagnostics::ArgumentStep;
use octofhir_fpe_semantic::Candidate;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for suggest command
pub struct SuggestConfig {
    pub inputs: Inputs,
    /// Binding to suggest in; the output expression when unset
    pub binding: Option<String>,
    /// Function arguments to descend into, outermost first
    pub arguments: Vec<ArgumentStep>,
    /// Insertion point; the end of the expression when unset
    pub cursor: Option<usize>,
    pub search: Option<String>,
    pub include_incompatible: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl SuggestConfig {
    fn location(&self) -> TokenLocation {
        let mut location = match &self.binding {
            Some(name) => TokenLocation::binding(name.clone()),
            None => TokenLocation::output(),
        };
        for step in &self.arguments {
            location = location.in_argument(step.token, step.argument);
        }
        match self.cursor {
            Some(cursor) => location.at_token(cursor),
            None => location,
        }
    }
}

/// Parse a `<token>:<argument>` step
pub fn parse_argument_step(text: &str) -> Result<ArgumentStep, String> {
    let (token, argument) = text
        .split_once(':')
        .ok_or_else(|| format!("expected <token>:<argument>, got '{text}'"))?;
    let token = token
        .trim()
        .parse()
        .map_err(|e| format!("invalid token index '{token}': {e}"))?;
    let argument = argument
        .trim()
        .parse()
        .map_err(|e| format!("invalid argument index '{argument}': {e}"))?;
    Ok(ArgumentStep { token, argument })
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Type")]
    ty: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&Candidate> for CandidateRow {
    fn from(candidate: &Candidate) -> Self {
        Self {
            label: candidate.label.clone(),
            category: candidate.category.label().to_string(),
            ty: candidate.ty.to_string(),
            detail: candidate.detail.clone().unwrap_or_default(),
        }
    }
}

fn format_text(candidates: &[Candidate]) -> String {
    let mut lines = Vec::new();
    let mut category = None;
    for candidate in candidates {
        if category != Some(candidate.category) {
            category = Some(candidate.category);
            lines.push(candidate.category.label().bold().to_string());
        }
        let mut line = format!("  {}  {}", candidate.label.cyan(), candidate.ty.to_string().dimmed());
        if let Some(detail) = &candidate.detail {
            line.push_str(&format!("  {detail}"));
        }
        if candidate.incompatible {
            line.push_str(&format!("  {}", "(incompatible)".yellow()));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// List the candidates at a location of the document's program
pub fn suggest(config: SuggestConfig) -> Result<()> {
    let session = loader::load(&config.inputs)?;
    let location = config.location();

    let mut options = session.editor.config().suggest.clone();
    options.include_incompatible |= config.include_incompatible;
    if config.search.is_some() {
        options.search = config.search.clone();
    }

    let Some(candidates) = session
        .editor
        .suggest_with(&session.program, &location, &options)
    else {
        anyhow::bail!("no expression at {location}");
    };
    log::debug!("{} candidates at {location}", candidates.len());

    let content = match config.format {
        OutputFormat::Text => format_text(&candidates),
        OutputFormat::Json => output::format_json(&candidates)?,
        OutputFormat::Table => {
            output::format_table(candidates.iter().map(CandidateRow::from).collect())
        }
    };
    output::write_output(&content, config.output_file.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argument_step() {
        assert_eq!(
            parse_argument_step("2:0"),
            Ok(ArgumentStep {
                token: 2,
                argument: 0
            })
        );
        assert!(parse_argument_step("2").is_err());
        assert!(parse_argument_step("a:0").is_err());
    }

    #[test]
    fn test_location() {
        let config = SuggestConfig {
            inputs: Inputs::default(),
            binding: Some("total".into()),
            arguments: vec![ArgumentStep {
                token: 1,
                argument: 0,
            }],
            cursor: Some(3),
            search: None,
            include_incompatible: false,
            format: OutputFormat::Text,
            output_file: None,
        };
        assert_eq!(
            config.location(),
            TokenLocation::binding("total").in_argument(1, 0).at_token(3)
        );
    }
}
