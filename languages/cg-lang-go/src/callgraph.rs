//! Call Graph Builder (C5): walks every function/method body, resolving
//! each call expression to a callee FQN via the four patterns in §4.5, and
//! populates the shared `cg_graph::CallGraph`.

use cg_graph::{CallGraph, CallSite, FunctionNode, SourceLocation};
use cg_stdlib::StdlibLoader;
use tree_sitter::{Node, Tree};

use crate::ast::node_text;
use crate::builtins::is_builtin_function;
use crate::fqn::function_signature;
use crate::imports::ImportMap;
use crate::infer::TypeInferenceEngine;

/// Register every function/method declared in `tree` and resolve every
/// call site inside each of their bodies. Call sites are recorded in
/// source order so `call_sites(callerFqn)` reads top-to-bottom.
pub fn build_call_graph_for_file(
    tree: &Tree,
    source: &str,
    file: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    stdlib: Option<&StdlibLoader>,
    graph: &mut CallGraph,
) {
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "function_declaration" && child.kind() != "method_declaration" {
            continue;
        }
        process_declaration(&child, source, file, package_path, imports, engine, stdlib, graph);
    }
}

fn process_declaration(
    decl: &Node,
    source: &str,
    file: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    stdlib: Option<&StdlibLoader>,
    graph: &mut CallGraph,
) {
    let Some(sig) = function_signature(decl, source, package_path) else {
        return;
    };

    let mut node = FunctionNode::new(sig.fqn.clone(), sig.name.clone(), package_path.to_string())
        .with_location(location_of(decl, file));
    if let Some(receiver) = &sig.receiver {
        node = node.with_receiver(receiver.clone());
    }
    graph.add_function(node);

    let Some(body) = decl.child_by_field_name("body") else {
        return;
    };

    let mut calls = Vec::new();
    collect_call_expressions(&body, &mut calls);

    for call in calls {
        let site = resolve_call(&call, source, file, package_path, imports, engine, stdlib, &sig.fqn);
        graph.add_call_site(&sig.fqn, site);
    }
}

fn collect_call_expressions<'a>(node: &Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "call_expression" {
        out.push(*node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_call_expressions(&child, out);
    }
}

fn resolve_call(
    call: &Node,
    source: &str,
    file: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    stdlib: Option<&StdlibLoader>,
    caller_fqn: &str,
) -> CallSite {
    let location = location_of(call, file);
    let Some(function) = call.child_by_field_name("function") else {
        return CallSite::unresolved("<unknown>", location);
    };

    match function.kind() {
        "selector_expression" => resolve_selector_call(&function, source, imports, engine, stdlib, caller_fqn, location),
        "identifier" => {
            let name = node_text(&function, source);
            if is_builtin_function(name) {
                CallSite::resolved(name, format!("builtin.{name}"), location, false)
            } else {
                CallSite::resolved(name, format!("{package_path}.{name}"), location, false)
            }
        }
        _ => CallSite::unresolved(node_text(&function, source), location),
    }
}

fn resolve_selector_call(
    selector: &Node,
    source: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    stdlib: Option<&StdlibLoader>,
    caller_fqn: &str,
    location: SourceLocation,
) -> CallSite {
    let (Some(operand), Some(field)) = (
        selector.child_by_field_name("operand"),
        selector.child_by_field_name("field"),
    ) else {
        return CallSite::unresolved(node_text(selector, source), location);
    };
    let field_name = node_text(&field, source);

    if operand.kind() != "identifier" {
        // Chained or computed selector (`a.b.c()`, `f().Method()`) — the
        // engine resolves only single-hop selectors.
        return CallSite::unresolved(field_name, location);
    }
    let operand_name = node_text(&operand, source);

    // Pattern 1: package-qualified call (`pkg.Func()`).
    if let Some(import_path) = imports.import_path_for_alias(operand_name) {
        let is_stdlib = stdlib.map(|loader| loader.validate(import_path)).unwrap_or(false);
        return CallSite::resolved(field_name, format!("{import_path}.{field_name}"), location, is_stdlib);
    }

    // Pattern 2: method call on a variable of known type (`u.Save()`).
    if let Some(type_info) = engine.get_variable(caller_fqn, operand_name) {
        return CallSite::resolved(
            field_name,
            format!("{}.{}", type_info.type_fqn, field_name),
            location,
            false,
        );
    }

    // Pattern 4: no package alias, no known variable type.
    CallSite::unresolved(field_name, location)
}

fn location_of(node: &Node, file: &str) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(file.to_string(), start.row + 1, start.column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_source;
    use crate::imports::extract_imports;
    use crate::infer::{extract_return_types, infer_variable_bindings};

    fn build(source: &str, package_path: &str, file: &str, engine: &TypeInferenceEngine) -> CallGraph {
        let tree = parse_source(source).unwrap();
        let imports = extract_imports(&tree, source);
        extract_return_types(&tree, source, package_path, engine);
        infer_variable_bindings(&tree, source, file, package_path, &imports, engine);

        let mut graph = CallGraph::new();
        build_call_graph_for_file(&tree, source, file, package_path, &imports, engine, None, &mut graph);
        graph
    }

    #[test]
    fn bare_call_resolves_within_current_package() {
        let source = r#"
package main

func main() {
    helper()
}

func helper() {}
"#;
        let engine = TypeInferenceEngine::new(None);
        let graph = build(source, "example.com/app", "main.go", &engine);

        assert_eq!(graph.callees("example.com/app.main"), &["example.com/app.helper".to_string()]);
    }

    #[test]
    fn builtin_call_resolves_to_builtin_namespace() {
        let source = r#"
package main

func main() {
    xs := make([]int, 0)
    _ = len(xs)
}
"#;
        let engine = TypeInferenceEngine::new(None);
        let graph = build(source, "example.com/app", "main.go", &engine);

        let sites = graph.call_sites("example.com/app.main");
        assert!(sites.iter().any(|s| s.target_fqn == "builtin.make"));
        assert!(sites.iter().any(|s| s.target_fqn == "builtin.len"));
    }

    /// §8 S2: with no stdlib loader attached, a package-qualified call still
    /// resolves and produces an edge, but it's never flagged `is_stdlib`.
    #[test]
    fn s2_classifier_falls_back_without_loader() {
        let source = r#"
package main

import "fmt"

func main() {
    fmt.Println("hi")
}
"#;
        let engine = TypeInferenceEngine::new(None);
        let graph = build(source, "example.com/app", "main.go", &engine);

        assert_eq!(graph.callees("example.com/app.main"), &["fmt.Println".to_string()]);
        assert!(!graph.call_sites("example.com/app.main")[0].is_stdlib);
    }

    #[test]
    fn method_call_on_known_variable_resolves_to_receiver_type() {
        let source = r#"
package main

func main() {
    u := NewUser()
    u.Save()
}

func NewUser() *User { return nil }
"#;
        let engine = TypeInferenceEngine::new(None);
        let graph = build(source, "example.com/app", "main.go", &engine);

        assert_eq!(
            graph.callees("example.com/app.main"),
            &["example.com/app.User.Save".to_string()]
        );
    }

    /// §8 S5: a selector call on a variable with no known binding is
    /// recorded unresolved, with no edge and `is_stdlib` false.
    #[test]
    fn s5_unresolved_selector_is_recorded_with_no_edge() {
        let source = r#"
package main

func main(x Unknown) {
    x.Do()
}
"#;
        let engine = TypeInferenceEngine::new(None);
        let graph = build(source, "example.com/app", "main.go", &engine);

        assert!(graph.callees("example.com/app.main").is_empty());
        let sites = graph.call_sites("example.com/app.main");
        assert_eq!(sites.len(), 1);
        assert!(!sites[0].resolved);
    }
}
