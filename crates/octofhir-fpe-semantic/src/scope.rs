//! Binding scopes
//!
//! A scope maps binding names to their inferred types. Scopes chain: the
//! scope of a function argument program has the enclosing expression's scope
//! as parent, so argument-local bindings shadow outer names.

use indexmap::IndexMap;
use octofhir_fpe_ast::ExternalBinding;
use octofhir_fpe_types::FpType;

/// Where a visible name was defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    /// Supplied by the host
    External,
    /// A local binding of some enclosing program
    Local,
}

#[derive(Debug, Clone)]
struct Entry {
    ty: FpType,
    origin: BindingOrigin,
}

/// Names visible while typing an expression
#[derive(Debug, Clone, Default)]
pub struct Scope<'p> {
    vars: IndexMap<String, Entry>,
    parent: Option<&'p Scope<'p>>,
    depth: usize,
}

impl<'p> Scope<'p> {
    /// Create an empty top-level scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a top-level scope holding the host's external bindings
    pub fn with_externals(externals: &[ExternalBinding]) -> Self {
        let mut scope = Self::new();
        for external in externals {
            scope.vars.insert(
                external.name.clone(),
                Entry {
                    ty: external.ty.clone(),
                    origin: BindingOrigin::External,
                },
            );
        }
        scope
    }

    /// Create a child scope
    pub fn child<'c>(&'c self) -> Scope<'c> {
        Scope {
            vars: IndexMap::new(),
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    /// Get the scope depth (0 = top level)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Define a local binding in this scope
    pub fn define(&mut self, name: impl Into<String>, ty: FpType) {
        self.vars.insert(
            name.into(),
            Entry {
                ty,
                origin: BindingOrigin::Local,
            },
        );
    }

    /// Look up a name in this scope or parent scopes
    pub fn lookup(&self, name: &str) -> Option<&FpType> {
        self.vars
            .get(name)
            .map(|entry| &entry.ty)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    /// Where a visible name was defined
    pub fn origin(&self, name: &str) -> Option<BindingOrigin> {
        self.vars
            .get(name)
            .map(|entry| entry.origin)
            .or_else(|| self.parent.and_then(|p| p.origin(name)))
    }

    /// Check if a name is visible
    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every visible name with its type, outermost scope first
    ///
    /// A shadowed name appears once, at the position of its outermost
    /// definition, with the innermost type.
    pub fn visible(&self) -> Vec<(&str, &FpType)> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(scope) = current {
            chain.push(scope);
            current = scope.parent;
        }

        let mut result: IndexMap<&str, &FpType> = IndexMap::new();
        for scope in chain.into_iter().rev() {
            for (name, entry) in &scope.vars {
                result.insert(name.as_str(), &entry.ty);
            }
        }
        result.into_iter().collect()
    }
}
