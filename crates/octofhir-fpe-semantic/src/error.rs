//! Binding graph errors

use octofhir_fpe_diagnostics::{
    Diagnostic, ErrorCode, FPE0114, FPE0200, FPE0201, FPE0202, FPE0203, FPE0204, FPE0205,
    FPE0206, FpeError, TokenLocation,
};
use thiserror::Error;

/// Errors raised by checked binding mutations and order validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A binding references a binding defined after it
    #[error("%{binding} references %{reference}, which is defined after it")]
    ForwardReference { binding: String, reference: String },

    /// A binding depends on itself
    #[error("%{binding} depends on itself")]
    CircularReference { binding: String },

    /// The move would put a binding before something it depends on (or after
    /// something that depends on it)
    #[error("cannot move binding from position {from} to {to}")]
    IllegalMove { from: usize, to: usize },

    /// The binding is still referenced
    #[error("%{name} is still referenced by {}", .by.join(", "))]
    StillReferenced { name: String, by: Vec<String> },

    /// Two bindings share a name
    #[error("binding name %{name} is already used")]
    DuplicateName { name: String },

    /// The name is not an identifier
    #[error("'{name}' is not a valid binding name")]
    InvalidName { name: String },

    /// No binding with the given id
    #[error("no binding with id {id}")]
    NotFound { id: String },

    /// The name is taken by an external binding
    #[error("%{name} is already defined by the host")]
    ExternalCollision { name: String },
}

impl BindingError {
    /// Diagnostic code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ForwardReference { .. } => FPE0200,
            Self::CircularReference { .. } => FPE0114,
            Self::IllegalMove { .. } => FPE0201,
            Self::StillReferenced { .. } => FPE0202,
            Self::DuplicateName { .. } => FPE0203,
            Self::InvalidName { .. } => FPE0204,
            Self::NotFound { .. } => FPE0205,
            Self::ExternalCollision { .. } => FPE0206,
        }
    }

    /// Name of the binding the error is about, if any
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Self::ForwardReference { binding, .. } | Self::CircularReference { binding } => {
                Some(binding)
            }
            Self::StillReferenced { name, .. }
            | Self::DuplicateName { name }
            | Self::InvalidName { name }
            | Self::ExternalCollision { name } => Some(name),
            Self::IllegalMove { .. } | Self::NotFound { .. } => None,
        }
    }

    /// Convert to an error diagnostic located at the binding
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self.binding_name() {
            Some(name) => diag.with_location(TokenLocation::binding(name)),
            None => diag,
        }
    }
}

impl From<BindingError> for FpeError {
    fn from(err: BindingError) -> Self {
        FpeError::binding(err.code(), err.to_string())
    }
}

/// Binding graph result
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_codes() {
        let err = BindingError::StillReferenced {
            name: "a".into(),
            by: vec!["b".into(), "output".into()],
        };
        assert_eq!(err.to_string(), "%a is still referenced by b, output");
        assert_eq!(err.code(), FPE0202);

        let fpe: FpeError = err.into();
        assert_eq!(fpe.code(), FPE0202);
    }

    #[test]
    fn test_diagnostic_location() {
        let diag = BindingError::DuplicateName { name: "x".into() }.to_diagnostic();
        assert_eq!(diag.location, Some(TokenLocation::binding("x")));
    }
}
