//! Go language support: parsing, import classification, type inference and
//! call graph construction (C3, C4, C5).

pub mod ast;
pub mod builtins;
pub mod callgraph;
pub mod fqn;
pub mod imports;
pub mod infer;
pub mod normalize;
pub mod scope;

pub use callgraph::build_call_graph_for_file;
pub use fqn::{function_signature, FunctionSignature};
pub use imports::{classify_import, classify_imports, extract_imports, Classification, ImportClassificationCounts, ImportMap};
pub use infer::{extract_return_types, infer_variable_bindings, TypeInferenceEngine};
pub use normalize::normalize_type;
pub use scope::{FunctionScope, TypeInfo, TypeSource, VariableBinding};

use std::path::Path;
use std::sync::Arc;

use cg_foundation::error::{CgError, CgResult};
use cg_module::ModuleRegistry;
use cg_graph::CallGraph;
use cg_stdlib::StdlibLoader;
use tracing::warn;

/// Process a single Go source file end to end: parse, extract and classify
/// imports, run both inference passes, then fold its declarations and call
/// sites into `graph`. Per-file extraction failures are logged and skipped
/// rather than propagated, per the pipeline's graceful-degradation policy.
/// Returns this file's import classification tally for the caller to fold
/// into a build-wide summary.
pub fn process_file(
    path: &Path,
    registry: &ModuleRegistry,
    stdlib: Option<&StdlibLoader>,
    engine: &TypeInferenceEngine,
    graph: &std::sync::Mutex<CallGraph>,
) -> CgResult<ImportClassificationCounts> {
    let source = std::fs::read_to_string(path)?;
    let file = path.to_string_lossy().to_string();

    let Some(tree) = ast::parse_source(&source) else {
        warn!(file = %file, "failed to parse Go source, skipping");
        return Ok(ImportClassificationCounts::default());
    };
    if tree.root_node().has_error() {
        warn!(file = %file, "parse tree contains errors, proceeding best-effort");
    }

    let package_path = registry
        .import_path_for_dir(path.parent().unwrap_or(Path::new(".")))
        .ok_or_else(|| CgError::not_found(format!("no import path registered for {}", file)))?
        .to_string();

    let imports = imports::extract_imports(&tree, &source);
    let classification_counts = imports::classify_imports(&imports, registry, stdlib);

    infer::extract_return_types(&tree, &source, &package_path, engine);
    infer::infer_variable_bindings(&tree, &source, &file, &package_path, &imports, engine);

    let mut graph = graph.lock().expect("call graph lock poisoned");
    callgraph::build_call_graph_for_file(
        &tree,
        &source,
        &file,
        &package_path,
        &imports,
        engine,
        stdlib,
        &mut graph,
    );

    Ok(classification_counts)
}

/// Convenience wrapper bundling the per-run shared state a caller (C1 +
/// the CLI pipeline) needs one of.
pub struct GoEngine {
    pub stdlib: Option<Arc<StdlibLoader>>,
    pub inference: TypeInferenceEngine,
}

impl GoEngine {
    pub fn new(stdlib: Option<Arc<StdlibLoader>>) -> Self {
        Self {
            inference: TypeInferenceEngine::new(stdlib.clone()),
            stdlib,
        }
    }
}
