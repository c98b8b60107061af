//! Binary operators with precedence and display information

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator groups, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorGroup {
    Math,
    Comparison,
    Logical,
    Collection,
    Type,
}

impl OperatorGroup {
    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Math => "Math Operators",
            Self::Comparison => "Comparison Operators",
            Self::Logical => "Logical Operators",
            Self::Collection => "Collection Operators",
            Self::Type => "Type Operators",
        }
    }
}

/// Binary operators of the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "mod")]
    Modulo,
    #[serde(rename = "div")]
    TruncatedDivide,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "~")]
    Equivalent,
    #[serde(rename = "!~")]
    NotEquivalent,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "xor")]
    Xor,
    #[serde(rename = "implies")]
    Implies,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "&")]
    Concatenate,
    #[serde(rename = "|")]
    Union,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "as")]
    As,
}

impl Operator {
    /// All operators in display order
    pub const ALL: [Operator; 24] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::TruncatedDivide,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::Greater,
        Self::LessOrEqual,
        Self::GreaterOrEqual,
        Self::Equivalent,
        Self::NotEquivalent,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Implies,
        Self::In,
        Self::Contains,
        Self::Concatenate,
        Self::Union,
        Self::Is,
        Self::As,
    ];

    /// Get the precedence level (1-10, higher binds tighter)
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Implies => 1,
            Self::Or | Self::Xor => 2,
            Self::And => 3,
            Self::In | Self::Contains => 4,
            Self::Equal | Self::NotEqual | Self::Equivalent | Self::NotEquivalent => 5,
            Self::Less | Self::LessOrEqual | Self::Greater | Self::GreaterOrEqual => 6,
            Self::Union => 7,
            Self::Is | Self::As => 8,
            Self::Add | Self::Subtract | Self::Concatenate => 9,
            Self::Multiply | Self::Divide | Self::TruncatedDivide | Self::Modulo => 10,
        }
    }

    /// Check if operator is right-associative
    pub const fn is_right_associative(&self) -> bool {
        matches!(self, Self::Implies)
    }

    /// Get the operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "mod",
            Self::TruncatedDivide => "div",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Equivalent => "~",
            Self::NotEquivalent => "!~",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Implies => "implies",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Concatenate => "&",
            Self::Union => "|",
            Self::Is => "is",
            Self::As => "as",
        }
    }

    /// Look up an operator by its symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Human-readable name
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Add => "Plus",
            Self::Subtract => "Minus",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Modulo => "Modulo",
            Self::TruncatedDivide => "Integer divide",
            Self::Equal => "Equals",
            Self::NotEqual => "Not equals",
            Self::Less => "Less than",
            Self::Greater => "Greater than",
            Self::LessOrEqual => "Less than or equal to",
            Self::GreaterOrEqual => "Greater than or equal to",
            Self::Equivalent => "Equivalent",
            Self::NotEquivalent => "Not equivalent",
            Self::And => "And",
            Self::Or => "Or",
            Self::Xor => "Xor",
            Self::Implies => "Implies",
            Self::In => "In",
            Self::Contains => "Contains",
            Self::Concatenate => "Concatenate",
            Self::Union => "Union",
            Self::Is => "Is type",
            Self::As => "As type",
        }
    }

    /// Group this operator is listed under
    pub const fn group(&self) -> OperatorGroup {
        match self {
            Self::Add
            | Self::Subtract
            | Self::Multiply
            | Self::Divide
            | Self::Modulo
            | Self::TruncatedDivide => OperatorGroup::Math,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::Greater
            | Self::LessOrEqual
            | Self::GreaterOrEqual
            | Self::Equivalent
            | Self::NotEquivalent => OperatorGroup::Comparison,
            Self::And | Self::Or | Self::Xor | Self::Implies => OperatorGroup::Logical,
            Self::In | Self::Contains | Self::Concatenate | Self::Union => {
                OperatorGroup::Collection
            }
            Self::Is | Self::As => OperatorGroup::Type,
        }
    }

    /// Check if the right operand must be a type literal
    pub const fn takes_type_operand(&self) -> bool {
        matches!(self, Self::Is | Self::As)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("**"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(Operator::Multiply.precedence() > Operator::Add.precedence());
        assert!(Operator::Add.precedence() > Operator::Equal.precedence());
        assert!(Operator::And.precedence() > Operator::Or.precedence());
        assert!(Operator::Implies.is_right_associative());
    }

    #[test]
    fn test_serde_uses_symbols() {
        assert_eq!(serde_json::to_string(&Operator::NotEquivalent).unwrap(), "\"!~\"");
        let op: Operator = serde_json::from_str("\"div\"").unwrap();
        assert_eq!(op, Operator::TruncatedDivide);
    }
}
