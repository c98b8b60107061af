//! Token locations inside a program
//!
//! Programs are token sequences, not text, so a location is a path: the binding
//! (or the output expression), the function arguments descended through, and the
//! token index inside the innermost expression.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step into a function argument: the function token and the argument index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentStep {
    /// Index of the function token in the enclosing expression
    pub token: usize,
    /// Index of the argument program
    pub argument: usize,
}

/// Location of a token inside a program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenLocation {
    /// Name of the binding, `None` for the output expression
    pub binding: Option<String>,
    /// Function arguments descended through, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentStep>,
    /// Token index in the innermost expression, `None` for the whole expression
    pub token: Option<usize>,
}

impl TokenLocation {
    /// Location of the output expression
    pub fn output() -> Self {
        Self::default()
    }

    /// Location of a named binding
    pub fn binding(name: impl Into<String>) -> Self {
        Self {
            binding: Some(name.into()),
            ..Self::default()
        }
    }

    /// Point at a token of the innermost expression
    pub fn at_token(mut self, index: usize) -> Self {
        self.token = Some(index);
        self
    }

    /// Descend into an argument of the function token at `token`
    pub fn in_argument(mut self, token: usize, argument: usize) -> Self {
        self.arguments.push(ArgumentStep { token, argument });
        self.token = None;
        self
    }
}

impl fmt::Display for TokenLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(name) => write!(f, "%{name}")?,
            None => write!(f, "output")?,
        }
        for step in &self.arguments {
            write!(f, " > token {} argument {}", step.token, step.argument)?;
        }
        if let Some(token) = self.token {
            write!(f, " > token {token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(TokenLocation::output().at_token(2).to_string(), "output > token 2");
        let nested = TokenLocation::binding("names")
            .in_argument(1, 0)
            .at_token(3);
        assert_eq!(nested.to_string(), "%names > token 1 argument 0 > token 3");
    }
}
