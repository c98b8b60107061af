//! Editor error codes following a structured numbering system
//!
//! Error code ranges:
//! - FPE0100-FPE0199: Type errors (inference, resolution)
//! - FPE0200-FPE0299: Binding graph errors (ordering, naming, deletion)
//! - FPE0300-FPE0399: Registry errors (schema, questionnaire)
//! - FPE0400-FPE0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a type error (0100-0199)
    pub const fn is_type_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a binding graph error (0200-0299)
    pub const fn is_binding_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a registry error (0300-0399)
    pub const fn is_registry_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FPE{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Type errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unknown variable")
        .with_help("Only earlier local bindings and external bindings are visible"));
    map.insert(101, ErrorInfo::new("Unknown function"));
    map.insert(102, ErrorInfo::new("Unknown field")
        .with_help("Check the field name against the schema of the value on the left"));
    map.insert(103, ErrorInfo::new("Field access on a non-record value"));
    map.insert(104, ErrorInfo::new("Answer used outside a questionnaire response"));
    map.insert(110, ErrorInfo::new("Type mismatch"));
    map.insert(111, ErrorInfo::new("Missing required argument"));
    map.insert(112, ErrorInfo::new("Invalid argument type"));
    map.insert(113, ErrorInfo::new("Conflicting generic binding"));
    map.insert(114, ErrorInfo::new("Circular reference"));
    map.insert(115, ErrorInfo::new("Function input mismatch"));
    map.insert(116, ErrorInfo::new("No matching operator overload"));
    map.insert(117, ErrorInfo::new("Missing operand")
        .with_help("An operator needs a value on both sides"));
    map.insert(118, ErrorInfo::new("Malformed literal"));

    // Binding graph errors (0200-0299)
    map.insert(200, ErrorInfo::new("Forward reference")
        .with_help("A binding may only reference bindings defined before it"));
    map.insert(201, ErrorInfo::new("Illegal binding move"));
    map.insert(202, ErrorInfo::new("Binding is still referenced"));
    map.insert(203, ErrorInfo::new("Duplicate binding name"));
    map.insert(204, ErrorInfo::new("Invalid binding name")
        .with_help("Names must start with a letter or underscore"));
    map.insert(205, ErrorInfo::new("Binding not found"));
    map.insert(206, ErrorInfo::new("Name collides with an external binding"));

    // Registry errors (0300-0399)
    map.insert(300, ErrorInfo::new("Schema not loaded"));
    map.insert(301, ErrorInfo::new("Type not found in schema"));
    map.insert(302, ErrorInfo::new("Invalid schema document"));
    map.insert(303, ErrorInfo::new("Invalid questionnaire document"));
    map.insert(304, ErrorInfo::new("Unknown question link id")
        .with_help("The answer expands to an untyped value lookup"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));
    map.insert(404, ErrorInfo::new("File not found"));
    map.insert(406, ErrorInfo::new("Invalid format"));

    map
});

// Type errors
pub const FPE0100: ErrorCode = ErrorCode::new(100);
pub const FPE0101: ErrorCode = ErrorCode::new(101);
pub const FPE0102: ErrorCode = ErrorCode::new(102);
pub const FPE0103: ErrorCode = ErrorCode::new(103);
pub const FPE0104: ErrorCode = ErrorCode::new(104);
pub const FPE0110: ErrorCode = ErrorCode::new(110);
pub const FPE0111: ErrorCode = ErrorCode::new(111);
pub const FPE0112: ErrorCode = ErrorCode::new(112);
pub const FPE0113: ErrorCode = ErrorCode::new(113);
pub const FPE0114: ErrorCode = ErrorCode::new(114);
pub const FPE0115: ErrorCode = ErrorCode::new(115);
pub const FPE0116: ErrorCode = ErrorCode::new(116);
pub const FPE0117: ErrorCode = ErrorCode::new(117);
pub const FPE0118: ErrorCode = ErrorCode::new(118);
// Binding graph errors
pub const FPE0200: ErrorCode = ErrorCode::new(200);
pub const FPE0201: ErrorCode = ErrorCode::new(201);
pub const FPE0202: ErrorCode = ErrorCode::new(202);
pub const FPE0203: ErrorCode = ErrorCode::new(203);
pub const FPE0204: ErrorCode = ErrorCode::new(204);
pub const FPE0205: ErrorCode = ErrorCode::new(205);
pub const FPE0206: ErrorCode = ErrorCode::new(206);
// Registry errors
pub const FPE0300: ErrorCode = ErrorCode::new(300);
pub const FPE0301: ErrorCode = ErrorCode::new(301);
pub const FPE0302: ErrorCode = ErrorCode::new(302);
pub const FPE0303: ErrorCode = ErrorCode::new(303);
pub const FPE0304: ErrorCode = ErrorCode::new(304);
// System errors
pub const FPE0400: ErrorCode = ErrorCode::new(400);
pub const FPE0401: ErrorCode = ErrorCode::new(401);
pub const FPE0402: ErrorCode = ErrorCode::new(402);
pub const FPE0404: ErrorCode = ErrorCode::new(404);
pub const FPE0406: ErrorCode = ErrorCode::new(406);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(FPE0100.to_string(), "FPE0100");
        assert_eq!(FPE0304.to_string(), "FPE0304");
    }

    #[test]
    fn test_error_categories() {
        assert!(FPE0110.is_type_error());
        assert!(!FPE0110.is_binding_error());
        assert!(FPE0201.is_binding_error());
        assert!(FPE0300.is_registry_error());
        assert!(FPE0401.is_system_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(FPE0102.info().description, "Unknown field");
        assert!(FPE0200.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
