//! Fully-qualified name computation shared by the inference engine and the
//! call graph builder.
//!
//! FQN form: `<packagePath>.<FunctionName>` for plain functions,
//! `<packagePath>.<ReceiverTypeName>.<MethodName>` for methods, where the
//! pointer qualifier on the receiver type is stripped.

use tree_sitter::Node;

use crate::ast::node_text;

pub struct FunctionSignature {
    pub fqn: String,
    pub name: String,
    pub receiver: Option<String>,
}

/// Compute the FQN for a `function_declaration` or `method_declaration`
/// node. Returns `None` if the node has no name (should not happen for a
/// well-formed declaration, but extraction tolerates it rather than panic).
pub fn function_signature(node: &Node, source: &str, package_path: &str) -> Option<FunctionSignature> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source).to_string();

    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|receiver_list| receiver_type_name(&receiver_list, source));

    let fqn = match &receiver {
        Some(recv) => format!("{package_path}.{recv}.{name}"),
        None => format!("{package_path}.{name}"),
    };

    Some(FunctionSignature { fqn, name, receiver })
}

/// Extract the bare receiver type name from a method's receiver
/// `parameter_list`, stripping the pointer qualifier (`*T` and `T` map to
/// the same method FQN).
fn receiver_type_name(receiver_list: &Node, source: &str) -> Option<String> {
    let mut cursor = receiver_list.walk();
    let param = receiver_list
        .children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;

    let type_node = param.child_by_field_name("type")?;
    let type_node = if type_node.kind() == "pointer_type" {
        type_node.child(1).unwrap_or(type_node)
    } else {
        type_node
    };

    Some(node_text(&type_node, source).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_source;

    fn find_first<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == kind {
                return Some(child);
            }
            if let Some(found) = find_first(&child, kind) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn plain_function_fqn() {
        let source = "package main\n\nfunc DoThing() {}\n";
        let tree = parse_source(source).unwrap();
        let decl = find_first(&tree.root_node(), "function_declaration").unwrap();
        let sig = function_signature(&decl, source, "example.com/app").unwrap();
        assert_eq!(sig.fqn, "example.com/app.DoThing");
        assert_eq!(sig.receiver, None);
    }

    #[test]
    fn pointer_and_value_receiver_share_method_fqn() {
        let value_recv = "package main\n\nfunc (u User) Save() {}\n";
        let pointer_recv = "package main\n\nfunc (u *User) Save() {}\n";

        for source in [value_recv, pointer_recv] {
            let tree = parse_source(source).unwrap();
            let decl = find_first(&tree.root_node(), "method_declaration").unwrap();
            let sig = function_signature(&decl, source, "example.com/app").unwrap();
            assert_eq!(sig.fqn, "example.com/app.User.Save");
        }
    }
}
