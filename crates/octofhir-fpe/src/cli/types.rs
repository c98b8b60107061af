//! Types command implementation

use super::loader::{self, Inputs};
use super::output::{self, OutputFormat};
use crate::TokenLocation;
use anyhow::Result;
use colored::Colorize;
use octofhir_fpe_semantic::ProgramTypes;
use serde_json::json;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for types command
pub struct TypesConfig {
    pub inputs: Inputs,
    /// Also list the flowing type after each token of the output expression
    pub tokens: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    ty: String,
}

fn rows(types: &ProgramTypes) -> Vec<TypeRow> {
    types
        .bindings
        .iter()
        .map(|binding| TypeRow {
            name: format!("%{}", binding.name),
            ty: binding.ty.to_string(),
        })
        .chain(std::iter::once(TypeRow {
            name: "output".to_string(),
            ty: types.output.to_string(),
        }))
        .collect()
}

/// Report the inferred types of the document's program
pub fn types(config: TypesConfig) -> Result<()> {
    let session = loader::load(&config.inputs)?;
    let types = session.editor.program_types(&session.program);
    let token_types = if config.tokens {
        session
            .editor
            .token_types(&session.program, &TokenLocation::output())
    } else {
        None
    };

    let content = match config.format {
        OutputFormat::Text => {
            let mut lines: Vec<String> = rows(&types)
                .into_iter()
                .map(|row| {
                    let ty = if row.ty.starts_with("Invalid") {
                        row.ty.red().to_string()
                    } else {
                        row.ty.green().to_string()
                    };
                    format!("{}: {ty}", row.name.cyan())
                })
                .collect();
            if let Some(token_types) = &token_types {
                for (index, ty) in token_types.types.iter().enumerate() {
                    lines.push(format!("  token {index}: {ty}"));
                }
            }
            lines.join("\n")
        }
        OutputFormat::Json => match &token_types {
            Some(token_types) => output::format_json(&json!({
                "bindings": types.bindings,
                "output": types.output,
                "tokens": token_types,
            }))?,
            None => output::format_json(&types)?,
        },
        OutputFormat::Table => output::format_table(rows(&types)),
    };
    output::write_output(&content, config.output_file.as_deref())
}
