//! Programs and bindings

use crate::{Expression, Token};
use octofhir_fpe_types::FpType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a local binding, independent of its name and position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BindingId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A named intermediate expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBinding {
    pub id: BindingId,
    pub name: String,
    #[serde(default)]
    pub expression: Expression,
}

impl LocalBinding {
    pub fn new(id: impl Into<BindingId>, name: impl Into<String>, expression: Expression) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expression,
        }
    }
}

/// A named value supplied by the host with a fixed type
///
/// External bindings are visible everywhere and are never moved or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalBinding {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FpType,
}

impl ExternalBinding {
    pub fn new(name: impl Into<String>, ty: FpType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Local bindings followed by an output expression
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub bindings: Vec<LocalBinding>,
    #[serde(default)]
    pub expression: Expression,
}

impl Program {
    /// Create a program with no bindings
    pub fn new(expression: Expression) -> Self {
        Self {
            bindings: Vec::new(),
            expression,
        }
    }

    /// Append a binding, deriving its id from the current binding count
    pub fn with_binding(mut self, name: impl Into<String>, expression: Expression) -> Self {
        let id = self.next_binding_id();
        self.bindings.push(LocalBinding::new(id, name, expression));
        self
    }

    /// Check if the program has neither bindings nor tokens
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.expression.is_empty()
    }

    /// Find a binding by id
    pub fn binding(&self, id: &BindingId) -> Option<&LocalBinding> {
        self.bindings.iter().find(|b| &b.id == id)
    }

    /// Position of a binding by id
    pub fn binding_index(&self, id: &BindingId) -> Option<usize> {
        self.bindings.iter().position(|b| &b.id == id)
    }

    /// Find a binding by name
    pub fn binding_named(&self, name: &str) -> Option<&LocalBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// An id not used by any binding of this program
    pub fn next_binding_id(&self) -> BindingId {
        let mut n = self.bindings.len() + 1;
        loop {
            let candidate = BindingId::new(format!("b{n}"));
            if self.binding(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Visit every token, descending into function argument programs
    pub fn walk_tokens<'a>(&'a self, visit: &mut impl FnMut(&'a Token)) {
        for binding in &self.bindings {
            walk_expression(&binding.expression, visit);
        }
        walk_expression(&self.expression, visit);
    }
}

/// Visit every token of an expression, descending into function arguments
pub fn walk_expression<'a>(expression: &'a [Token], visit: &mut impl FnMut(&'a Token)) {
    for token in expression {
        visit(token);
        if let Token::Function { args, .. } = token {
            for arg in args {
                arg.walk_tokens(visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operator;

    #[test]
    fn test_with_binding_assigns_ids() {
        let program = Program::new(vec![Token::variable("x")])
            .with_binding("x", vec![Token::number("1")])
            .with_binding("y", vec![Token::variable("x")]);
        assert_eq!(program.bindings[0].id.as_str(), "b1");
        assert_eq!(program.bindings[1].id.as_str(), "b2");
        assert_eq!(program.binding_index(&"b2".into()), Some(1));
        assert_eq!(program.binding_named("y").map(|b| b.id.as_str()), Some("b2"));
        assert_eq!(program.next_binding_id().as_str(), "b3");
    }

    #[test]
    fn test_walk_descends_into_arguments() {
        let arg = Program::new(vec![
            Token::field("use"),
            Token::operator(Operator::Equal),
            Token::string("official"),
        ]);
        let program = Program::new(vec![Token::field("name"), Token::function("where", vec![arg])]);
        let mut kinds = Vec::new();
        program.walk_tokens(&mut |t| kinds.push(t.kind()));
        assert_eq!(kinds.len(), 5);
    }
}
