//! Program to FHIRPath text
//!
//! Operators are typed left to right, so `1 + 2 * 3` built token by token
//! means `(1 + 2) * 3`. With explicit grouping on, the accumulated left
//! operand is parenthesized whenever FHIRPath precedence would regroup it.

use crate::macros::expand_answer;
use crate::options::CompileOptions;
use octofhir_fpe_ast::{Operator, Program, Token};
use octofhir_fpe_model::QuestionnaireItems;
use octofhir_fpe_semantic::{Scope, TypeInferrer};
use octofhir_fpe_types::FpType;
use std::fmt::Write;

/// Single-quote a string, escaping `\` and `'`
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        if matches!(c, '\\' | '\'') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Whether an operator appended to a left operand whose loosest top-level
/// operator has precedence `lowest` would bind into that operand
fn regroups(op: Operator, lowest: u8) -> bool {
    let precedence = op.precedence();
    precedence > lowest || (precedence == lowest && op.is_right_associative())
}

/// Renders tokens and programs as FHIRPath text
#[derive(Debug, Clone, Copy)]
pub struct Stringifier<'a> {
    items: &'a QuestionnaireItems,
    options: CompileOptions,
}

impl<'a> Stringifier<'a> {
    /// Create a stringifier expanding answers against `items`
    pub fn new(items: &'a QuestionnaireItems) -> Self {
        Self {
            items,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Render a program
    pub fn stringify(&self, program: &Program) -> String {
        self.program(program, None)
    }

    /// Render a program with a `/* type */` comment after each binding
    /// definition; `binding_types` is indexed like `program.bindings`
    pub fn stringify_annotated(&self, program: &Program, binding_types: &[FpType]) -> String {
        self.program(program, Some(binding_types))
    }

    fn program(&self, program: &Program, annotations: Option<&[FpType]>) -> String {
        let output = self.expression(&program.expression);
        if program.bindings.is_empty() {
            return output;
        }

        let mut parts: Vec<String> = program
            .bindings
            .iter()
            .enumerate()
            .map(|(index, binding)| {
                let mut definition = if binding.expression.is_empty() {
                    format!("defineVariable({})", quote(&binding.name))
                } else {
                    format!(
                        "defineVariable({}, {})",
                        quote(&binding.name),
                        self.expression(&binding.expression)
                    )
                };
                if let Some(ty) = annotations.and_then(|types| types.get(index)) {
                    let _ = write!(definition, " /* {ty} */");
                }
                definition
            })
            .collect();
        parts.push(format!("select({output})"));
        parts.join(".\n")
    }

    /// Render a token sequence
    pub fn expression(&self, expression: &[Token]) -> String {
        let mut out = String::new();
        let mut lowest: Option<u8> = None;
        let mut chain_start = true;

        for token in expression {
            if let Token::Operator { value: op } = token {
                let precedence = op.precedence();
                lowest = match lowest {
                    Some(p) if self.options.explicit_grouping && regroups(*op, p) => {
                        out = format!("({out})");
                        Some(precedence)
                    }
                    Some(p) => Some(p.min(precedence)),
                    None => Some(precedence),
                };
                self.write_token(&mut out, token, false);
                chain_start = true;
                continue;
            }
            self.write_token(&mut out, token, chain_start);
            chain_start = false;
        }
        out.trim().to_string()
    }

    fn write_token(&self, out: &mut String, token: &Token, first: bool) {
        let dot = if first { "" } else { "." };
        match token {
            Token::Number { value } if value.trim().is_empty() => out.push('0'),
            Token::Number { value } => out.push_str(value),
            Token::String { value } => out.push_str(&quote(value)),
            Token::Boolean { value } => {
                let _ = write!(out, "{value}");
            }
            Token::Date { value } | Token::DateTime { value } => {
                let _ = write!(out, "@{value}");
            }
            Token::Time { value } => {
                let _ = write!(out, "@T{value}");
            }
            Token::Quantity { value } => {
                let number = if value.value.trim().is_empty() { "0" } else { &value.value };
                let _ = write!(out, "{number} {}", quote(&value.unit));
            }
            Token::TypeLiteral { value } => out.push_str(&value.unwrapped().describe()),
            Token::Index { value } => {
                let _ = write!(out, "[{value}]");
            }
            Token::Operator { value } => {
                let _ = write!(out, " {} ", value.symbol());
            }
            Token::Variable { name } => {
                let _ = write!(out, "%{name}");
            }
            Token::Field { name } => {
                let _ = write!(out, "{dot}{name}");
            }
            Token::Function { name, args } => {
                let _ = write!(out, "{dot}{name}({})", self.arguments(args));
            }
            Token::Answer { link_id } => {
                let _ = write!(out, "{dot}{}", expand_answer(link_id, self.items));
            }
        }
    }

    /// Comma-joined arguments; trailing empty ones are dropped and an empty
    /// one before a filled one renders as `{}`
    fn arguments(&self, args: &[Program]) -> String {
        let used = args.iter().rposition(|arg| !arg.is_empty()).map_or(0, |i| i + 1);
        args[..used]
            .iter()
            .map(|arg| {
                if arg.is_empty() {
                    "{}".to_string()
                } else {
                    self.stringify(arg)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render a program with default options
pub fn stringify(program: &Program, items: &QuestionnaireItems) -> String {
    Stringifier::new(items).stringify(program)
}

/// Render a program, annotating binding types when `options.debug` is set
pub fn compile(
    inferrer: &TypeInferrer<'_>,
    program: &Program,
    context: &FpType,
    scope: &Scope<'_>,
    options: CompileOptions,
) -> String {
    let stringifier = Stringifier::new(inferrer.items()).with_options(options);
    if options.debug {
        let types = inferrer.binding_types(&program.bindings, context, scope);
        stringifier.stringify_annotated(program, &types)
    } else {
        stringifier.stringify(program)
    }
}
