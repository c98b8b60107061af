//! Program checks
//!
//! Collects every problem of a program as [`Diagnostic`]s: binding order
//! problems, the first invalid token of each binding and of the output
//! expression, and answers whose link id no questionnaire item carries.

use crate::graph::{DependencyGraph, validate_order};
use crate::inference::TypeInferrer;
use crate::scope::Scope;
use octofhir_fpe_ast::{Program, Token};
use octofhir_fpe_diagnostics::{Diagnostic, FPE0110, FPE0304, TokenLocation};
use octofhir_fpe_types::{FpType, TypeError};

/// Check a program and report its diagnostics, errors first
pub fn check_program(
    inferrer: &TypeInferrer<'_>,
    program: &Program,
    context: &FpType,
    scope: &Scope<'_>,
) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = validate_order(program)
        .iter()
        .map(|err| err.to_diagnostic())
        .collect();

    let graph = DependencyGraph::new(&program.bindings);
    let types = inferrer.binding_types(&program.bindings, context, scope);

    for (index, binding) in program.bindings.iter().enumerate() {
        // Cycles are already reported by the order check
        if graph.is_cyclic(index) || !types[index].is_invalid() {
            continue;
        }
        let mut local = scope.child();
        for &dependency in graph.dependencies(index) {
            local.define(program.bindings[dependency].name.clone(), types[dependency].clone());
        }
        if let Some(diagnostic) = locate_invalid(
            inferrer,
            &binding.expression,
            TokenLocation::binding(binding.name.clone()),
            context,
            &local,
        ) {
            diagnostics.push(diagnostic);
        }
    }

    let local = inferrer.program_scope(&program.bindings, &types, scope);
    if let Some(diagnostic) = locate_invalid(
        inferrer,
        &program.expression,
        TokenLocation::output(),
        context,
        &local,
    ) {
        diagnostics.push(diagnostic);
    }

    let mut warnings = Vec::new();
    for binding in &program.bindings {
        unknown_answers(
            inferrer,
            &binding.expression,
            TokenLocation::binding(binding.name.clone()),
            &mut warnings,
        );
    }
    unknown_answers(inferrer, &program.expression, TokenLocation::output(), &mut warnings);
    diagnostics.extend(warnings);

    log::debug!("program check produced {} diagnostics", diagnostics.len());
    diagnostics
}

/// Diagnostic for the first invalid token, descending into the argument that
/// made a function call invalid
fn locate_invalid(
    inferrer: &TypeInferrer<'_>,
    expression: &[Token],
    location: TokenLocation,
    context: &FpType,
    scope: &Scope<'_>,
) -> Option<Diagnostic> {
    let token_types = inferrer.token_types(expression, context, scope);
    let index = token_types.first_invalid?;
    let ty = &token_types.types[index];

    if let Some(Token::Function { args, .. }) = expression.get(index) {
        for (arg_index, arg) in args.iter().enumerate() {
            let Some(argument) =
                inferrer.argument_context(expression, index, arg_index, context, scope)
            else {
                continue;
            };
            let types = inferrer.binding_types(&arg.bindings, &argument.context, scope);
            let local = inferrer.program_scope(&arg.bindings, &types, scope);
            let nested = locate_invalid(
                inferrer,
                &arg.expression,
                location.clone().in_argument(index, arg_index),
                &argument.context,
                &local,
            );
            if nested.is_some() {
                return nested;
            }
        }
    }

    let message = ty
        .error()
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("invalid type {ty}"));
    let code = ty.error().map_or(FPE0110, TypeError::code);
    Some(Diagnostic::error(code, message).with_location(location.at_token(index)))
}

fn unknown_answers(
    inferrer: &TypeInferrer<'_>,
    expression: &[Token],
    location: TokenLocation,
    out: &mut Vec<Diagnostic>,
) {
    for (index, token) in expression.iter().enumerate() {
        match token {
            Token::Answer { link_id } if inferrer.items().get(link_id).is_none() => {
                out.push(
                    Diagnostic::warning(
                        FPE0304,
                        format!("no questionnaire item has linkId '{link_id}'"),
                    )
                    .with_location(location.clone().at_token(index)),
                );
            }
            Token::Function { args, .. } => {
                for (arg_index, arg) in args.iter().enumerate() {
                    let nested = location.clone().in_argument(index, arg_index);
                    for binding in &arg.bindings {
                        unknown_answers(inferrer, &binding.expression, nested.clone(), out);
                    }
                    unknown_answers(inferrer, &arg.expression, nested, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fpe_ast::Operator;
    use octofhir_fpe_diagnostics::{FPE0100, FPE0200, Severity};
    use octofhir_fpe_model::{QuestionnaireItems, SchemaRegistry};

    #[test]
    fn test_reports_order_and_type_errors() {
        let registry = SchemaRegistry::unloaded();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);

        let program = Program::new(vec![
            Token::variable("a"),
            Token::operator(Operator::Add),
            Token::variable("missing"),
        ])
        .with_binding("a", vec![Token::variable("b")])
        .with_binding("b", vec![Token::number("1")]);

        let diagnostics = check_program(&inferrer, &program, &FpType::Any, &Scope::new());
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![FPE0200, FPE0100]);
        assert_eq!(
            diagnostics[1].location,
            Some(TokenLocation::output().at_token(2))
        );
    }

    #[test]
    fn test_unknown_answer_is_a_warning() {
        let registry = SchemaRegistry::unloaded();
        let items = QuestionnaireItems::new();
        let inferrer = TypeInferrer::new(&registry, &items);
        let program = Program::new(vec![Token::variable("qr"), Token::answer("weight")]);
        let mut scope = Scope::new();
        scope.define("qr", FpType::single(FpType::record(["QuestionnaireResponse"])));

        let diagnostics = check_program(&inferrer, &program, &FpType::Any, &scope);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].code, FPE0304);
    }
}
