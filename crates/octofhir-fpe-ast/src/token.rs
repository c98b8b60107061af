//! Tokens of a structured expression

use crate::{Operator, Program};
use octofhir_fpe_types::FpType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An ordered token sequence
pub type Expression = Vec<Token>;

/// Value and unit of a quantity literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QuantityValue {
    /// Numeric text as typed, may be empty
    #[serde(default)]
    pub value: String,
    /// Unit code, rendered quoted
    pub unit: String,
}

/// A single token
///
/// The serialized form is `{"type": "<kind>", "value": ...}`; function tokens
/// also carry their argument programs under `"args"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Token {
    /// Number literal, kept as typed text
    Number { value: String },
    /// String literal
    String { value: String },
    /// Boolean literal
    Boolean { value: bool },
    /// Date literal without the `@` prefix
    Date { value: String },
    /// DateTime literal without the `@` prefix
    #[serde(rename = "datetime")]
    DateTime { value: String },
    /// Time literal without the `@T` prefix
    Time { value: String },
    /// Quantity literal
    Quantity { value: QuantityValue },
    /// Type literal, operand of `is`/`as` and `ofType()`
    #[serde(rename = "type")]
    TypeLiteral { value: FpType },
    /// Index into the collection on the left
    Index { value: usize },
    /// Binary operator
    Operator { value: Operator },
    /// Reference to a local or external binding
    Variable {
        #[serde(rename = "value")]
        name: String,
    },
    /// Field access
    Field {
        #[serde(rename = "value")]
        name: String,
    },
    /// Function call
    Function {
        #[serde(rename = "value")]
        name: String,
        #[serde(default)]
        args: Vec<Program>,
    },
    /// Questionnaire answer shortcut
    Answer {
        #[serde(rename = "linkId")]
        link_id: String,
    },
}

/// Token kinds, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Number,
    String,
    Boolean,
    Date,
    DateTime,
    Time,
    Quantity,
    TypeLiteral,
    Index,
    Operator,
    Variable,
    Field,
    Function,
    Answer,
}

impl TokenKind {
    /// Literal kinds offered at the start of an expression, in display order
    pub const LITERALS: [TokenKind; 7] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Date,
        Self::DateTime,
        Self::Time,
        Self::Quantity,
    ];

    /// Check if this is a literal kind
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::String
                | Self::Boolean
                | Self::Date
                | Self::DateTime
                | Self::Time
                | Self::Quantity
                | Self::TypeLiteral
        )
    }

    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Quantity => "Quantity",
            Self::TypeLiteral => "Type",
            Self::Index => "Index",
            Self::Operator => "Operator",
            Self::Variable => "Variable",
            Self::Field => "Field",
            Self::Function => "Function",
            Self::Answer => "Answer",
        }
    }
}

impl Token {
    // === Constructors ===

    pub fn number(value: impl Into<String>) -> Self {
        Self::Number {
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean { value }
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self::Date {
            value: value.into(),
        }
    }

    pub fn datetime(value: impl Into<String>) -> Self {
        Self::DateTime {
            value: value.into(),
        }
    }

    pub fn time(value: impl Into<String>) -> Self {
        Self::Time {
            value: value.into(),
        }
    }

    pub fn quantity(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::Quantity {
            value: QuantityValue {
                value: value.into(),
                unit: unit.into(),
            },
        }
    }

    pub fn type_literal(ty: FpType) -> Self {
        Self::TypeLiteral { value: ty }
    }

    pub fn index(value: usize) -> Self {
        Self::Index { value }
    }

    pub fn operator(op: Operator) -> Self {
        Self::Operator { value: op }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { name: name.into() }
    }

    pub fn function(name: impl Into<String>, args: Vec<Program>) -> Self {
        Self::Function {
            name: name.into(),
            args,
        }
    }

    pub fn answer(link_id: impl Into<String>) -> Self {
        Self::Answer {
            link_id: link_id.into(),
        }
    }

    // === Properties ===

    /// Kind of this token
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Number { .. } => TokenKind::Number,
            Self::String { .. } => TokenKind::String,
            Self::Boolean { .. } => TokenKind::Boolean,
            Self::Date { .. } => TokenKind::Date,
            Self::DateTime { .. } => TokenKind::DateTime,
            Self::Time { .. } => TokenKind::Time,
            Self::Quantity { .. } => TokenKind::Quantity,
            Self::TypeLiteral { .. } => TokenKind::TypeLiteral,
            Self::Index { .. } => TokenKind::Index,
            Self::Operator { .. } => TokenKind::Operator,
            Self::Variable { .. } => TokenKind::Variable,
            Self::Field { .. } => TokenKind::Field,
            Self::Function { .. } => TokenKind::Function,
            Self::Answer { .. } => TokenKind::Answer,
        }
    }

    /// The operator, if this is an operator token
    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Self::Operator { value } => Some(*value),
            _ => None,
        }
    }

    /// Check if this is an operator token
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator { .. })
    }
}

/// Parsed form of a number literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLiteral {
    pub value: Decimal,
    /// Whether the text carried a decimal point
    pub is_decimal: bool,
}

impl FromStr for NumberLiteral {
    type Err = rust_decimal::Error;

    /// Parse number text; empty text reads as `0`
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self {
                value: Decimal::ZERO,
                is_decimal: false,
            });
        }
        let value = Decimal::from_str(trimmed)?;
        Ok(Self {
            value,
            is_decimal: trimmed.contains('.'),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_literal() {
        let int: NumberLiteral = "42".parse().unwrap();
        assert!(!int.is_decimal);
        let dec: NumberLiteral = "4.20".parse().unwrap();
        assert!(dec.is_decimal);
        assert_eq!(dec.value.to_string(), "4.20");
        assert_eq!("".parse::<NumberLiteral>().unwrap().value, Decimal::ZERO);
        assert!("4x".parse::<NumberLiteral>().is_err());
    }

    #[test]
    fn test_kind() {
        assert_eq!(Token::field("name").kind(), TokenKind::Field);
        assert!(TokenKind::Quantity.is_literal());
        assert!(!TokenKind::Variable.is_literal());
        assert_eq!(Token::operator(Operator::And).as_operator(), Some(Operator::And));
    }
}
