//! Function scopes and variable bindings (§3 Variable Binding, Function
//! Scope).

use cg_graph::SourceLocation;

/// Where a `TypeInfo` came from. Confidence is assigned per source: 1.0 for
/// literals and locally-registered declarations taken directly, ~0.95 for a
/// locally-registered declaration consulted indirectly, 0.9 for the deeper
/// stdlib fallback used during variable inference, 1.0 for the stdlib
/// lookup used directly by `getReturnType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    Literal,
    Declaration,
    Variable,
    Stdlib,
    StdlibRegistry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub type_fqn: String,
    pub confidence: f64,
    pub source: TypeSource,
}

impl TypeInfo {
    pub fn new(type_fqn: impl Into<String>, confidence: f64, source: TypeSource) -> Self {
        Self {
            type_fqn: type_fqn.into(),
            confidence,
            source,
        }
    }
}

/// A single binding of a name to a type at one point in the source. Bindings
/// for a name in a scope are kept in an append-only list ordered by
/// assignment position; the latest is the semantic answer, the full history
/// survives for diagnostics and reassignment queries.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    pub var_name: String,
    pub type_info: TypeInfo,
    pub assigned_from: String,
    pub location: SourceLocation,
}

/// All bindings local to one function or method body, keyed by the FQN that
/// owns the scope.
#[derive(Debug, Clone, Default)]
pub struct FunctionScope {
    bindings: std::collections::HashMap<String, Vec<VariableBinding>>,
}

impl FunctionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. The blank identifier (`_`) is never bound — callers
    /// are expected to filter it out before calling this, but as a second
    /// line of defense it's a no-op here too.
    pub fn bind(&mut self, binding: VariableBinding) {
        if binding.var_name == "_" {
            return;
        }
        self.bindings.entry(binding.var_name.clone()).or_default().push(binding);
    }

    /// The latest binding of `name` — the one nearest the end of the
    /// function text, i.e. the binding with the maximum source line among
    /// all bindings of that name (§8 invariant 4).
    pub fn latest(&self, name: &str) -> Option<&VariableBinding> {
        self.bindings.get(name).and_then(|list| list.last())
    }

    pub fn all_bindings(&self, name: &str) -> &[VariableBinding] {
        self.bindings.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, line: usize) -> VariableBinding {
        VariableBinding {
            var_name: name.to_string(),
            type_info: TypeInfo::new("pkg.User", 1.0, TypeSource::Declaration),
            assigned_from: "GetUser(1)".to_string(),
            location: SourceLocation::new("main.go", line, 1),
        }
    }

    #[test]
    fn latest_binding_wins_reassignment() {
        let mut scope = FunctionScope::new();
        scope.bind(binding("u", 10));
        scope.bind(binding("u", 20));

        assert_eq!(scope.latest("u").unwrap().location.line, 20);
        assert_eq!(scope.all_bindings("u").len(), 2);
    }

    #[test]
    fn blank_identifier_is_never_bound() {
        let mut scope = FunctionScope::new();
        scope.bind(binding("_", 5));
        assert!(scope.latest("_").is_none());
    }
}
