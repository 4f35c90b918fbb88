//! Shared value types used throughout the call graph.

use serde::{Deserialize, Serialize};

/// A 1-based line/column position in a source file.
///
/// `file` is `Arc<str>` rather than a plain `String` or `Rc<str>`: the call
/// graph is built concurrently across files (§5) and shared behind a
/// `Mutex` afterward, so every value reachable from it must be `Send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: std::sync::Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<std::sync::Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// A function or method known to the graph, keyed by its FQN.
///
/// FQN form: `<packagePath>.<FunctionName>` for plain functions,
/// `<packagePath>.<ReceiverTypeName>.<MethodName>` for methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub fqn: String,
    pub name: String,
    pub package_path: String,
    pub receiver: Option<String>,
    pub location: Option<SourceLocation>,
}

impl FunctionNode {
    pub fn new(fqn: impl Into<String>, name: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            name: name.into(),
            package_path: package_path.into(),
            receiver: None,
            location: None,
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A single call expression discovered in a caller's body.
///
/// `target_fqn` is the resolver's best guess at the callee; `resolved` is
/// true only when that guess is backed by a matching function declaration
/// or a validated stdlib entry. `is_stdlib` is set by, and only by, a
/// positive verdict from the Stdlib Loader — never by heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub target_name: String,
    pub target_fqn: String,
    pub location: SourceLocation,
    pub resolved: bool,
    pub is_stdlib: bool,
}

/// A call site as seen from the callee's side: who called it, and from
/// where. Kept separate from `CallSite` because the caller's FQN isn't
/// part of a call site as recorded under the caller (it's implied by the
/// map key there); from the reverse direction it has to travel with the
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerSite {
    pub caller_fqn: String,
    pub location: SourceLocation,
}

impl CallSite {
    pub fn unresolved(target_name: impl Into<String>, location: SourceLocation) -> Self {
        let target_name = target_name.into();
        Self {
            target_fqn: target_name.clone(),
            target_name,
            location,
            resolved: false,
            is_stdlib: false,
        }
    }

    pub fn resolved(
        target_name: impl Into<String>,
        target_fqn: impl Into<String>,
        location: SourceLocation,
        is_stdlib: bool,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            target_fqn: target_fqn.into(),
            location,
            resolved: true,
            is_stdlib,
        }
    }
}
