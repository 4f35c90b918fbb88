//! Type Inference Engine (C4): Pass 2a (return types) and Pass 2b
//! (variable bindings), plus the shared read/write-locked tables that back
//! them so C5 can schedule per-file processing in parallel.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cg_graph::SourceLocation;
use cg_stdlib::StdlibLoader;
use tree_sitter::{Node, Tree};

use crate::ast::node_text;
use crate::fqn::function_signature;
use crate::imports::ImportMap;
use crate::normalize::normalize_type;
use crate::scope::{FunctionScope, TypeInfo, TypeSource, VariableBinding};

/// Guards the two maps the engine owns: `returnTypes` and per-function
/// scopes. Readers (lookups during Pass 2b and C5) and a single writer
/// (the pass currently populating a given file) can run concurrently
/// across files.
pub struct TypeInferenceEngine {
    return_types: RwLock<HashMap<String, TypeInfo>>,
    scopes: RwLock<HashMap<String, FunctionScope>>,
    stdlib: Option<Arc<StdlibLoader>>,
}

impl TypeInferenceEngine {
    pub fn new(stdlib: Option<Arc<StdlibLoader>>) -> Self {
        Self {
            return_types: RwLock::new(HashMap::new()),
            scopes: RwLock::new(HashMap::new()),
            stdlib,
        }
    }

    /// Register (or overwrite) the return type for `fqn`. User code always
    /// wins because `get_return_type` consults this table before ever
    /// consulting the stdlib loader — seeding an entry here for a stdlib
    /// name like `fmt.Sprintf` lets a wrapper override the stdlib
    /// signature (§8 S3).
    pub fn add_return_type(&self, fqn: impl Into<String>, info: TypeInfo) {
        self.return_types
            .write()
            .expect("return_types lock poisoned")
            .insert(fqn.into(), info);
    }

    /// `getReturnType(fqn)`: local table first, then the stdlib fallback
    /// with confidence 1.0 and source `Stdlib`.
    pub fn get_return_type(&self, fqn: &str) -> Option<TypeInfo> {
        if let Some(info) = self
            .return_types
            .read()
            .expect("return_types lock poisoned")
            .get(fqn)
        {
            return Some(info.clone());
        }

        let (package_path, name) = fqn.rsplit_once('.')?;
        let loader = self.stdlib.as_ref()?;
        if !loader.validate(package_path) {
            return None;
        }
        let function = loader.get_function(package_path, name)?;
        let raw = primary_return_raw(&function.returns.iter().map(|r| r.type_name.as_str()).collect::<Vec<_>>())?;
        Some(TypeInfo::new(
            normalize_type(raw, package_path),
            1.0,
            TypeSource::Stdlib,
        ))
    }

    /// The Pass 2b variant consulted while inferring a call expression's
    /// return type: local table wins at confidence 0.95 (one hop removed
    /// from the raw declaration), stdlib fallback at confidence 0.9 (one
    /// hop deeper still — a registry lookup rather than a direct query).
    fn resolve_call_return_type(&self, fqn: &str) -> Option<TypeInfo> {
        if let Some(info) = self
            .return_types
            .read()
            .expect("return_types lock poisoned")
            .get(fqn)
        {
            return Some(TypeInfo::new(info.type_fqn.clone(), 0.95, TypeSource::Declaration));
        }

        let (package_path, name) = fqn.rsplit_once('.')?;
        let loader = self.stdlib.as_ref()?;
        if !loader.validate(package_path) {
            return None;
        }
        let function = loader.get_function(package_path, name)?;
        let raw = primary_return_raw(&function.returns.iter().map(|r| r.type_name.as_str()).collect::<Vec<_>>())?;
        Some(TypeInfo::new(
            normalize_type(raw, package_path),
            0.9,
            TypeSource::StdlibRegistry,
        ))
    }

    pub fn get_variable(&self, fqn: &str, name: &str) -> Option<TypeInfo> {
        self.scopes
            .read()
            .expect("scopes lock poisoned")
            .get(fqn)
            .and_then(|scope| scope.latest(name))
            .map(|binding| binding.type_info.clone())
    }

    pub fn get_all_bindings(&self, fqn: &str, name: &str) -> Vec<VariableBinding> {
        self.scopes
            .read()
            .expect("scopes lock poisoned")
            .get(fqn)
            .map(|scope| scope.all_bindings(name).to_vec())
            .unwrap_or_default()
    }

    fn with_scope_mut(&self, fqn: &str, f: impl FnOnce(&mut FunctionScope)) {
        let mut scopes = self.scopes.write().expect("scopes lock poisoned");
        let scope = scopes.entry(fqn.to_string()).or_default();
        f(scope);
    }
}

/// Primary return type: the first raw type string that is non-empty and
/// not `error`.
fn primary_return_raw<'a>(raws: &[&'a str]) -> Option<&'a str> {
    raws.iter().copied().find(|raw| !raw.trim().is_empty() && raw.trim() != "error")
}

/// Pass 2a: walk every top-level function/method declaration and register
/// its primary return type.
pub fn extract_return_types(tree: &Tree, source: &str, package_path: &str, engine: &TypeInferenceEngine) {
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "function_declaration" || child.kind() == "method_declaration" {
            register_return_type(&child, source, package_path, engine);
        }
    }
}

fn register_return_type(decl: &Node, source: &str, package_path: &str, engine: &TypeInferenceEngine) {
    let Some(sig) = function_signature(decl, source, package_path) else {
        return;
    };
    let Some(result) = decl.child_by_field_name("result") else {
        return;
    };

    let raw_returns = return_type_strings(&result, source);
    let raw_refs: Vec<&str> = raw_returns.iter().map(String::as_str).collect();
    let Some(primary_raw) = primary_return_raw(&raw_refs) else {
        return;
    };

    let normalized = normalize_type(primary_raw, package_path);
    engine.add_return_type(sig.fqn, TypeInfo::new(normalized, 1.0, TypeSource::Declaration));
}

/// Collect the raw type strings of every return value, whether the
/// `result` field is a single type node or a `parameter_list` of several
/// (possibly named) return values.
fn return_type_strings(result: &Node, source: &str) -> Vec<String> {
    if result.kind() == "parameter_list" {
        let mut cursor = result.walk();
        result
            .children(&mut cursor)
            .filter(|c| c.kind() == "parameter_declaration")
            .filter_map(|param| param.child_by_field_name("type"))
            .map(|type_node| node_text(&type_node, source).to_string())
            .collect()
    } else {
        vec![node_text(result, source).to_string()]
    }
}

/// Pass 2b: walk every function/method body and record variable bindings
/// for each assignment, in source order.
pub fn infer_variable_bindings(
    tree: &Tree,
    source: &str,
    file: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
) {
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "function_declaration" && child.kind() != "method_declaration" {
            continue;
        }
        let Some(sig) = function_signature(&child, source, package_path) else {
            continue;
        };
        let Some(body) = child.child_by_field_name("body") else {
            continue;
        };

        let mut assignments = Vec::new();
        collect_assignments(&body, &mut assignments);

        engine.with_scope_mut(&sig.fqn, |scope| {
            for assignment in assignments {
                bind_assignment(&assignment, source, file, package_path, imports, engine, scope);
            }
        });
    }
}

fn collect_assignments<'a>(node: &Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "short_var_declaration" || node.kind() == "assignment_statement" {
        out.push(*node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_assignments(&child, out);
    }
}

fn bind_assignment(
    assignment: &Node,
    source: &str,
    file: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    scope: &mut FunctionScope,
) {
    if assignment.kind() == "assignment_statement" {
        if let Some(op) = assignment.child_by_field_name("operator") {
            if node_text(&op, source) != "=" {
                return;
            }
        }
    }

    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    let Some(right) = assignment.child_by_field_name("right") else {
        return;
    };

    let names = expression_list_children(&left)
        .into_iter()
        .filter(|n| n.kind() == "identifier")
        .map(|n| node_text(&n, source).to_string())
        .collect::<Vec<_>>();
    let rhs_exprs = expression_list_children(&right);

    if names.is_empty() || rhs_exprs.is_empty() {
        return;
    }

    if rhs_exprs.len() == 1 && names.len() > 1 {
        // Multi-assignment approximation: distribute the single inferred
        // type across all LHS targets.
        let Some((type_info, assigned_from)) =
            infer_rhs_type(&rhs_exprs[0], source, package_path, imports, engine, scope)
        else {
            return;
        };
        let location = location_of(&rhs_exprs[0], file);
        for name in names {
            if name == "_" {
                continue;
            }
            scope.bind(VariableBinding {
                var_name: name,
                type_info: type_info.clone(),
                assigned_from: assigned_from.clone(),
                location: location.clone(),
            });
        }
        return;
    }

    for (name, rhs) in names.iter().zip(rhs_exprs.iter()) {
        if name == "_" {
            continue;
        }
        let Some((type_info, assigned_from)) =
            infer_rhs_type(rhs, source, package_path, imports, engine, scope)
        else {
            continue;
        };
        scope.bind(VariableBinding {
            var_name: name.clone(),
            type_info,
            assigned_from,
            location: location_of(rhs, file),
        });
    }
}

fn expression_list_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    if node.kind() == "expression_list" {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.is_named())
            .collect()
    } else {
        vec![*node]
    }
}

fn location_of(node: &Node, file: &str) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(file.to_string(), start.row + 1, start.column)
}

/// Infer the type of a single RHS expression, per the node-kind table in
/// §4.4 Pass 2b. Returns the inferred type plus the source text the
/// binding was assigned from (for diagnostics).
fn infer_rhs_type(
    expr: &Node,
    source: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
    scope: &FunctionScope,
) -> Option<(TypeInfo, String)> {
    let text = node_text(expr, source).to_string();

    let info = match expr.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            TypeInfo::new("builtin.string", 1.0, TypeSource::Literal)
        }
        "int_literal" => TypeInfo::new("builtin.int", 1.0, TypeSource::Literal),
        "float_literal" => TypeInfo::new("builtin.float64", 1.0, TypeSource::Literal),
        "imaginary_literal" => TypeInfo::new("builtin.complex128", 1.0, TypeSource::Literal),
        "true" | "false" => TypeInfo::new("builtin.bool", 1.0, TypeSource::Literal),
        "rune_literal" => TypeInfo::new("builtin.rune", 1.0, TypeSource::Literal),
        "nil" => TypeInfo::new("builtin.nil", 1.0, TypeSource::Literal),
        "call_expression" => return infer_call_expression(expr, source, package_path, imports, engine).map(|i| (i, text)),
        "identifier" => scope.latest(&text)?.type_info.clone(),
        "composite_literal" => {
            let type_node = expr.child_by_field_name("type")?;
            let raw = node_text(&type_node, source);
            TypeInfo::new(normalize_type(raw, package_path), 1.0, TypeSource::Literal)
        }
        "unary_expression" => {
            let operator = expr.child_by_field_name("operator").map(|n| node_text(&n, source));
            if operator != Some("&") {
                return None;
            }
            let operand = expr.child_by_field_name("operand")?;
            return infer_rhs_type(&operand, source, package_path, imports, engine, scope)
                .map(|(info, _)| (info, text));
        }
        "expression_list" => {
            let first = expression_list_children(expr).into_iter().next()?;
            return infer_rhs_type(&first, source, package_path, imports, engine, scope);
        }
        _ => return None,
    };

    Some((info, text))
}

fn infer_call_expression(
    call: &Node,
    source: &str,
    package_path: &str,
    imports: &ImportMap,
    engine: &TypeInferenceEngine,
) -> Option<TypeInfo> {
    let function = call.child_by_field_name("function")?;

    let qualified = match function.kind() {
        "identifier" => format!("{package_path}.{}", node_text(&function, source)),
        "selector_expression" => {
            let operand = function.child_by_field_name("operand")?;
            let field = function.child_by_field_name("field")?;
            let operand_name = node_text(&operand, source);
            let field_name = node_text(&field, source);
            match imports.import_path_for_alias(operand_name) {
                Some(import_path) => format!("{import_path}.{field_name}"),
                None => return None,
            }
        }
        _ => return None,
    };

    engine.resolve_call_return_type(&qualified)
}
