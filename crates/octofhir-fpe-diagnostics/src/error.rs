//! Editor error types

use crate::{ErrorCode, TokenLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - the program cannot be compiled into a meaningful expression
    Error,
    /// Warning - the program compiles but something looks off
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Token location
    pub location: Option<TokenLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: TokenLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Whether this diagnostic is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message.bold());
        if let Some(loc) = &self.location {
            out.push_str(&format!("\n  {} {}", "-->".blue(), loc));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".cyan(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main editor error type
#[derive(Debug, Clone, Error)]
pub enum FpeError {
    /// Binding graph error (illegal move, delete or rename)
    #[error("{code}: {message}")]
    Binding { code: ErrorCode, message: String },

    /// Registry error (schema or questionnaire)
    #[error("{code}: {message}")]
    Registry {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Diagnostics collected from a program check
    #[error("{} problem(s) found", .0.len())]
    Diagnostics(Vec<Diagnostic>),
}

impl FpeError {
    /// Create a binding graph error
    pub fn binding(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Binding {
            code,
            message: message.into(),
        }
    }

    /// Create a registry error
    pub fn registry(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Registry {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to registry and system errors
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            Self::Registry { code, message, .. } => Self::Registry {
                code,
                message,
                context: Some(ctx.into()),
            },
            Self::System { code, message, .. } => Self::System {
                code,
                message,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Binding { code, .. } => *code,
            Self::Registry { code, .. } => *code,
            Self::System { code, .. } => *code,
            Self::Diagnostics(diags) => diags
                .first()
                .map(|d| d.code)
                .unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Convert to diagnostics
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Binding { code, message } => vec![Diagnostic::error(*code, message.clone())],
            Self::Registry { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                vec![diag]
            }
            Self::Diagnostics(diags) => diags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FPE0102, FPE0201, FPE0302};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(FPE0102, "no field 'nme' on Patient")
            .with_location(TokenLocation::output().at_token(1));

        assert_eq!(
            diag.to_string(),
            "error: FPE0102 - no field 'nme' on Patient at output > token 1"
        );
        assert_eq!(
            diag.help.as_deref(),
            Some("Check the field name against the schema of the value on the left")
        );
    }

    #[test]
    fn test_error_code_and_context() {
        let err = FpeError::registry(FPE0302, "missing 'types'").with_context("schema.json");
        assert_eq!(err.code(), FPE0302);
        let diags = err.to_diagnostics();
        assert_eq!(diags[0].help.as_deref(), Some("schema.json"));

        let err = FpeError::binding(FPE0201, "cannot move");
        assert_eq!(err.to_string(), "FPE0201: cannot move");
    }
}
