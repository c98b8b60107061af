//! Binding dependency graph
//!
//! Local bindings reference each other through `variable` tokens. This module
//! provides:
//! - reference extraction, descending into function argument programs
//! - direct and transitive dependencies between bindings
//! - move and delete legality checks
//! - checked mutations that return a new [`Program`] or a [`BindingError`]
//!
//! A name resolves to the first binding that carries it. Names defined by an
//! argument program's own bindings shadow outer names inside that program.

use crate::error::{BindingError, BindingResult};
use indexmap::IndexSet;
use octofhir_fpe_ast::{BindingId, Expression, ExternalBinding, LocalBinding, Program, Token};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$"));

/// Base name for bindings created without one
pub const DEFAULT_BINDING_NAME: &str = "var1";

/// Label used for the output expression in reference lists
pub const OUTPUT_LABEL: &str = "output";

/// Check if a name is a valid binding identifier
pub fn is_valid_name(name: &str) -> bool {
    matches!(&*IDENTIFIER, Ok(re) if re.is_match(name))
}

/// Names of the bindings an expression references, in first-use order
pub fn references(expression: &[Token]) -> IndexSet<String> {
    let mut out = IndexSet::new();
    collect_references(expression, &mut Vec::new(), &mut out);
    out
}

fn collect_references<'a>(
    expression: &'a [Token],
    shadowed: &mut Vec<&'a str>,
    out: &mut IndexSet<String>,
) {
    for token in expression {
        match token {
            Token::Variable { name } if !shadowed.contains(&name.as_str()) => {
                out.insert(name.clone());
            }
            Token::Function { args, .. } => {
                for arg in args {
                    let depth = shadowed.len();
                    shadowed.extend(arg.bindings.iter().map(|b| b.name.as_str()));
                    for binding in &arg.bindings {
                        collect_references(&binding.expression, shadowed, out);
                    }
                    collect_references(&arg.expression, shadowed, out);
                    shadowed.truncate(depth);
                }
            }
            _ => {}
        }
    }
}

/// Direct dependencies between the local bindings of one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    names: Vec<String>,
    deps: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph of a binding list
    pub fn new(bindings: &[LocalBinding]) -> Self {
        let names: Vec<String> = bindings.iter().map(|b| b.name.clone()).collect();
        let resolve = |name: &str| names.iter().position(|n| n == name);

        let deps: Vec<Vec<usize>> = bindings
            .iter()
            .map(|binding| {
                references(&binding.expression)
                    .iter()
                    .filter_map(|name| resolve(name))
                    .collect()
            })
            .collect();

        let mut dependents = vec![Vec::new(); bindings.len()];
        for (index, targets) in deps.iter().enumerate() {
            for &target in targets {
                dependents[target].push(index);
            }
        }

        Self {
            names,
            deps,
            dependents,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of the binding a name resolves to
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Name of the binding at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Bindings referenced directly by the binding at `index`
    pub fn dependencies(&self, index: usize) -> &[usize] {
        self.deps.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bindings referencing the binding at `index` directly
    pub fn direct_dependents(&self, index: usize) -> &[usize] {
        self.dependents.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every binding reachable through dependencies
    ///
    /// Contains `index` itself only when the binding is part of a cycle.
    pub fn transitive_dependencies(&self, index: usize) -> IndexSet<usize> {
        reachable(index, &self.deps)
    }

    /// Every binding that reaches `index` through dependencies
    pub fn transitive_dependents(&self, index: usize) -> IndexSet<usize> {
        reachable(index, &self.dependents)
    }

    /// Check if the binding at `index` depends on itself
    pub fn is_cyclic(&self, index: usize) -> bool {
        self.transitive_dependencies(index).contains(&index)
    }
}

fn reachable(start: usize, edges: &[Vec<usize>]) -> IndexSet<usize> {
    let mut seen = IndexSet::new();
    let mut queue: VecDeque<usize> = edges.get(start).into_iter().flatten().copied().collect();
    while let Some(next) = queue.pop_front() {
        if seen.insert(next) {
            queue.extend(edges.get(next).into_iter().flatten().copied());
        }
    }
    seen
}

/// Check if moving the binding at `source` to `target` keeps every reference
/// pointing backwards
///
/// Moving up is legal when no displaced binding is a transitive dependency of
/// the moved one; moving down is legal when no displaced binding transitively
/// depends on it.
pub fn can_move(bindings: &[LocalBinding], source: usize, target: usize) -> bool {
    if source >= bindings.len() || target >= bindings.len() {
        return false;
    }
    if source == target {
        return true;
    }

    let graph = DependencyGraph::new(bindings);
    if source > target {
        let deps = graph.transitive_dependencies(source);
        !(target..source).any(|displaced| deps.contains(&displaced))
    } else {
        let dependents = graph.transitive_dependents(source);
        !(source + 1..=target).any(|displaced| dependents.contains(&displaced))
    }
}

/// Names of the other bindings referencing the binding at `index`, plus
/// [`OUTPUT_LABEL`] when the output expression does
pub fn referenced_by(program: &Program, index: usize) -> Vec<String> {
    let graph = DependencyGraph::new(&program.bindings);
    let Some(name) = graph.name(index) else {
        return Vec::new();
    };

    let mut by: Vec<String> = graph
        .direct_dependents(index)
        .iter()
        .filter(|&&dependent| dependent != index)
        .filter_map(|&dependent| graph.name(dependent).map(str::to_string))
        .collect();
    if references(&program.expression).contains(name) {
        by.push(OUTPUT_LABEL.to_string());
    }
    by
}

/// Check if the binding at `index` can be deleted
pub fn is_deletable(program: &Program, index: usize) -> bool {
    index < program.bindings.len() && referenced_by(program, index).is_empty()
}

/// Report forward references, cycles, duplicate names and invalid names
pub fn validate_order(program: &Program) -> Vec<BindingError> {
    let graph = DependencyGraph::new(&program.bindings);
    let mut errors = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for (index, binding) in program.bindings.iter().enumerate() {
        if !is_valid_name(&binding.name) {
            errors.push(BindingError::InvalidName {
                name: binding.name.clone(),
            });
        }
        if seen.contains(&binding.name.as_str()) {
            errors.push(BindingError::DuplicateName {
                name: binding.name.clone(),
            });
        }
        seen.push(&binding.name);

        if graph.is_cyclic(index) {
            errors.push(BindingError::CircularReference {
                binding: binding.name.clone(),
            });
            continue;
        }
        for &dependency in graph.dependencies(index) {
            if dependency > index {
                errors.push(BindingError::ForwardReference {
                    binding: binding.name.clone(),
                    reference: program.bindings[dependency].name.clone(),
                });
            }
        }
    }

    errors
}

fn index_of(program: &Program, id: &BindingId) -> BindingResult<usize> {
    program
        .binding_index(id)
        .ok_or_else(|| BindingError::NotFound { id: id.to_string() })
}

fn is_taken(program: &Program, externals: &[ExternalBinding], name: &str) -> bool {
    program.binding_named(name).is_some() || externals.iter().any(|e| e.name == name)
}

/// A name starting from `base` that no local or external binding uses
///
/// Trailing digits are incremented (`var1`, `var2`, ...); a base without
/// digits, or whose digits cannot be incremented, gets `1` appended.
pub fn unique_name(program: &Program, externals: &[ExternalBinding], base: &str) -> String {
    if !is_taken(program, externals, base) {
        return base.to_string();
    }

    let split = base.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (stem, start) = match base[split..].parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(next) => (&base[..split], next),
        None => (base, 1),
    };
    (start..=u64::MAX)
        .map(|n| format!("{stem}{n}"))
        .find(|candidate| !is_taken(program, externals, candidate))
        .unwrap_or_else(|| format!("{base}_{}", program.bindings.len() + externals.len()))
}

/// Move a binding to position `target`
pub fn move_binding(program: &Program, id: &BindingId, target: usize) -> BindingResult<Program> {
    let source = index_of(program, id)?;
    if !can_move(&program.bindings, source, target) {
        return Err(BindingError::IllegalMove {
            from: source,
            to: target,
        });
    }

    let mut moved = program.clone();
    let binding = moved.bindings.remove(source);
    moved.bindings.insert(target, binding);
    log::debug!("moved binding {id} from {source} to {target}");
    Ok(moved)
}

/// Delete a binding nothing references
pub fn delete_binding(program: &Program, id: &BindingId) -> BindingResult<Program> {
    let index = index_of(program, id)?;
    let by = referenced_by(program, index);
    if !by.is_empty() {
        return Err(BindingError::StillReferenced {
            name: program.bindings[index].name.clone(),
            by,
        });
    }

    let mut pruned = program.clone();
    pruned.bindings.remove(index);
    Ok(pruned)
}

/// Rename a binding and every variable token bound to it
pub fn rename_binding(
    program: &Program,
    id: &BindingId,
    new_name: &str,
    externals: &[ExternalBinding],
) -> BindingResult<Program> {
    let index = index_of(program, id)?;
    let old_name = program.bindings[index].name.clone();
    if old_name == new_name {
        return Ok(program.clone());
    }
    if !is_valid_name(new_name) {
        return Err(BindingError::InvalidName {
            name: new_name.to_string(),
        });
    }
    if program.binding_named(new_name).is_some() {
        return Err(BindingError::DuplicateName {
            name: new_name.to_string(),
        });
    }
    if externals.iter().any(|e| e.name == new_name) {
        return Err(BindingError::ExternalCollision {
            name: new_name.to_string(),
        });
    }
    let captured = program
        .bindings
        .iter()
        .map(|b| &b.expression)
        .chain(std::iter::once(&program.expression))
        .any(|expression| is_captured(expression, &old_name, new_name));
    if captured {
        return Err(BindingError::DuplicateName {
            name: new_name.to_string(),
        });
    }

    let mut renamed = program.clone();
    renamed.bindings[index].name = new_name.to_string();
    for binding in &mut renamed.bindings {
        rename_references(&mut binding.expression, &old_name, new_name);
    }
    rename_references(&mut renamed.expression, &old_name, new_name);
    Ok(renamed)
}

/// Check if an argument program defining `new_name` holds a reference to `old_name`
/// that a rename would hand over to that argument's own binding
fn is_captured(expression: &[Token], old_name: &str, new_name: &str) -> bool {
    expression.iter().any(|token| {
        let Token::Function { args, .. } = token else {
            return false;
        };
        args.iter()
            .filter(|arg| arg.binding_named(old_name).is_none())
            .any(|arg| {
                let mut scopes = arg
                    .bindings
                    .iter()
                    .map(|b| b.expression.as_slice())
                    .chain(std::iter::once(arg.expression.as_slice()));
                if arg.binding_named(new_name).is_some() {
                    scopes.any(|scope| references(scope).contains(old_name))
                } else {
                    scopes.any(|scope| is_captured(scope, old_name, new_name))
                }
            })
    })
}

fn rename_references(expression: &mut Expression, old_name: &str, new_name: &str) {
    for token in expression.iter_mut() {
        match token {
            Token::Variable { name } if name == old_name => *name = new_name.to_string(),
            Token::Function { args, .. } => {
                for arg in args.iter_mut() {
                    if arg.binding_named(old_name).is_some() {
                        continue;
                    }
                    for binding in &mut arg.bindings {
                        rename_references(&mut binding.expression, old_name, new_name);
                    }
                    rename_references(&mut arg.expression, old_name, new_name);
                }
            }
            _ => {}
        }
    }
}

/// Append an empty binding with a fresh name
pub fn add_binding(program: &Program, externals: &[ExternalBinding]) -> Program {
    let name = unique_name(program, externals, DEFAULT_BINDING_NAME);
    let mut extended = program.clone();
    let id = extended.next_binding_id();
    extended
        .bindings
        .push(LocalBinding::new(id, name, Expression::new()));
    extended
}

/// Insert a copy of a binding right after it, named `<name>_copy`
pub fn duplicate_binding(
    program: &Program,
    id: &BindingId,
    externals: &[ExternalBinding],
) -> BindingResult<Program> {
    let index = index_of(program, id)?;
    let source = &program.bindings[index];
    let name = unique_name(program, externals, &format!("{}_copy", source.name));

    let mut extended = program.clone();
    let copy = LocalBinding::new(extended.next_binding_id(), name, source.expression.clone());
    extended.bindings.insert(index + 1, copy);
    Ok(extended)
}

/// Move the output expression into a new binding and output a reference to it
pub fn name_expression(program: &Program, externals: &[ExternalBinding]) -> Program {
    let name = unique_name(program, externals, DEFAULT_BINDING_NAME);
    let mut extracted = program.clone();
    let id = extracted.next_binding_id();
    let expression = std::mem::replace(
        &mut extracted.expression,
        vec![Token::variable(name.clone())],
    );
    extracted
        .bindings
        .push(LocalBinding::new(id, name, expression));
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fpe_ast::Operator;

    fn chain() -> Program {
        // a = 1, b = %a + 1, c = %b, output %c
        Program::new(vec![Token::variable("c")])
            .with_binding("a", vec![Token::number("1")])
            .with_binding(
                "b",
                vec![
                    Token::variable("a"),
                    Token::operator(Operator::Add),
                    Token::number("1"),
                ],
            )
            .with_binding("c", vec![Token::variable("b")])
    }

    #[test]
    fn test_references_respect_argument_shadowing() {
        let arg = Program::new(vec![Token::variable("x"), Token::variable("y")])
            .with_binding("x", vec![Token::number("1")]);
        let expression = vec![
            Token::variable("z"),
            Token::function("select", vec![arg]),
        ];
        let refs: Vec<_> = references(&expression).into_iter().collect();
        assert_eq!(refs, vec!["z".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_transitive_closures() {
        let program = chain();
        let graph = DependencyGraph::new(&program.bindings);
        assert_eq!(graph.dependencies(1), &[0]);
        assert_eq!(
            graph.transitive_dependencies(2).into_iter().collect::<Vec<_>>(),
            vec![1, 0]
        );
        assert_eq!(
            graph.transitive_dependents(0).into_iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(!graph.is_cyclic(0));
    }

    #[test]
    fn test_can_move() {
        let program = chain();
        let bindings = &program.bindings;
        assert!(!can_move(bindings, 0, 1));
        assert!(!can_move(bindings, 2, 1));
        assert!(can_move(bindings, 1, 1));
        assert!(!can_move(bindings, 0, 7));

        let independent = Program::default()
            .with_binding("a", vec![Token::number("1")])
            .with_binding("b", vec![Token::number("2")]);
        assert!(can_move(&independent.bindings, 0, 1));
        assert!(can_move(&independent.bindings, 1, 0));
    }

    #[test]
    fn test_delete_checks_references() {
        let program = chain();
        assert!(!is_deletable(&program, 0));
        assert!(!is_deletable(&program, 2));

        let err = delete_binding(&program, &"b3".into()).unwrap_err();
        assert_eq!(
            err,
            BindingError::StillReferenced {
                name: "c".into(),
                by: vec![OUTPUT_LABEL.into()],
            }
        );

        let mut unused = chain();
        unused.expression = vec![Token::number("0")];
        let pruned = delete_binding(&unused, &"b3".into()).unwrap();
        assert_eq!(pruned.bindings.len(), 2);
    }

    #[test]
    fn test_rename_updates_references() {
        let renamed = rename_binding(&chain(), &"b1".into(), "first", &[]).unwrap();
        assert_eq!(renamed.bindings[0].name, "first");
        assert_eq!(renamed.bindings[1].expression[0], Token::variable("first"));

        assert_eq!(
            rename_binding(&chain(), &"b1".into(), "b", &[]).unwrap_err(),
            BindingError::DuplicateName { name: "b".into() }
        );
        assert_eq!(
            rename_binding(&chain(), &"b1".into(), "1x", &[]).unwrap_err(),
            BindingError::InvalidName { name: "1x".into() }
        );
    }

    #[test]
    fn test_unique_names() {
        let program = Program::default()
            .with_binding("var1", vec![])
            .with_binding("var2", vec![]);
        assert_eq!(unique_name(&program, &[], DEFAULT_BINDING_NAME), "var3");
        assert_eq!(unique_name(&program, &[], "total"), "total");

        let added = add_binding(&program, &[]);
        assert_eq!(added.bindings[2].name, "var3");
        assert_eq!(added.bindings[2].id.as_str(), "b3");
    }

    #[test]
    fn test_unique_name_with_huge_suffix() {
        let max = format!("n{}", u64::MAX);
        let too_long = format!("n{}0", u64::MAX);
        let program = Program::default()
            .with_binding(max.clone(), vec![])
            .with_binding(too_long.clone(), vec![]);
        assert_eq!(unique_name(&program, &[], &max), format!("{max}1"));
        assert_eq!(unique_name(&program, &[], &too_long), format!("{too_long}1"));
    }

    #[test]
    fn test_validate_order_reports_forward_reference() {
        let program = Program::default()
            .with_binding("a", vec![Token::variable("b")])
            .with_binding("b", vec![Token::number("1")]);
        assert_eq!(
            validate_order(&program),
            vec![BindingError::ForwardReference {
                binding: "a".into(),
                reference: "b".into(),
            }]
        );
    }
}
