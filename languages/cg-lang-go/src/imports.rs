//! Import Resolver & Classifier (C3).

use std::collections::HashMap;

use cg_module::ModuleRegistry;
use cg_stdlib::StdlibLoader;
use tree_sitter::Tree;

use crate::ast::node_text;

/// The declared package name plus a mapping from each bound local alias to
/// its full import path. Four alias shapes are recognized: default (last
/// path segment), explicit rename, dot (namespace merge), and blank
/// (side-effect-only) — the blank alias legitimately appears in the map
/// even though it never satisfies selector-call resolution.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
    pub package_name: String,
    pub aliases: HashMap<String, String>,
}

impl ImportMap {
    pub fn import_path_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}

/// Extract the package clause and every import spec from a parsed file.
pub fn extract_imports(tree: &Tree, source: &str) -> ImportMap {
    let mut map = ImportMap::default();
    let root = tree.root_node();
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(ident) = find_child_of_kind(&child, "package_identifier") {
                    map.package_name = node_text(&ident, source).to_string();
                }
            }
            "import_declaration" => {
                collect_import_specs(&child, source, &mut map);
            }
            _ => {}
        }
    }

    map
}

fn collect_import_specs(import_decl: &tree_sitter::Node, source: &str, map: &mut ImportMap) {
    let mut cursor = import_decl.walk();
    for child in import_decl.children(&mut cursor) {
        match child.kind() {
            "import_spec" => record_import_spec(&child, source, map),
            "import_spec_list" => {
                let mut inner_cursor = child.walk();
                for spec in child.children(&mut inner_cursor) {
                    if spec.kind() == "import_spec" {
                        record_import_spec(&spec, source, map);
                    }
                }
            }
            _ => {}
        }
    }
}

fn record_import_spec(spec: &tree_sitter::Node, source: &str, map: &mut ImportMap) {
    let Some(path_node) = spec.child_by_field_name("path") else {
        return;
    };
    let raw_path = node_text(&path_node, source);
    let import_path = raw_path.trim_matches('"').to_string();

    let alias = match spec.child_by_field_name("name") {
        Some(name_node) => node_text(&name_node, source).to_string(),
        None => default_alias(&import_path),
    };

    map.aliases.insert(alias, import_path);
}

/// The default bound name for an import with no explicit alias: its last
/// path segment.
fn default_alias(import_path: &str) -> String {
    import_path
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
        .to_string()
}

fn find_child_of_kind<'a>(node: &tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// Classification of an import path relative to the current module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Stdlib,
    ThirdParty,
    Local,
}

/// Classify an import path into {stdlib, third-party, local}. This is used
/// for reporting; it must never be used to set `isStdlib` on a call site —
/// that requires a direct, positive verdict from the `StdlibLoader`.
pub fn classify_import(
    import_path: &str,
    registry: &ModuleRegistry,
    stdlib: Option<&StdlibLoader>,
) -> Classification {
    if let Some(loader) = stdlib {
        if loader.validate(import_path) {
            return Classification::Stdlib;
        }
    }

    if registry.is_local_import(import_path) {
        return Classification::Local;
    }

    if stdlib.is_none() && looks_like_stdlib_without_loader(import_path) {
        return Classification::Stdlib;
    }

    Classification::ThirdParty
}

/// Fallback heuristic used only when no `StdlibLoader` is attached: a path
/// is presumed stdlib iff it contains no `.` (no registered domain) and
/// does not begin with `internal/`.
fn looks_like_stdlib_without_loader(import_path: &str) -> bool {
    !import_path.contains('.') && !import_path.starts_with("internal/")
}

/// Per-file tally of `classify_import` verdicts, summed across a build to
/// report C3's classification work in the build summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportClassificationCounts {
    pub stdlib: usize,
    pub third_party: usize,
    pub local: usize,
}

impl ImportClassificationCounts {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Stdlib => self.stdlib += 1,
            Classification::ThirdParty => self.third_party += 1,
            Classification::Local => self.local += 1,
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.stdlib += other.stdlib;
        self.third_party += other.third_party;
        self.local += other.local;
    }
}

/// Classify every import bound in `map`, tallying the verdicts.
pub fn classify_imports(
    map: &ImportMap,
    registry: &ModuleRegistry,
    stdlib: Option<&StdlibLoader>,
) -> ImportClassificationCounts {
    let mut counts = ImportClassificationCounts::default();
    for import_path in map.aliases.values() {
        counts.record(classify_import(import_path, registry, stdlib));
    }
    counts
}
