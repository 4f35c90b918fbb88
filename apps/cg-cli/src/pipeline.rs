//! Wires C1 through C6 together: discover the module, load the stdlib
//! manifest, process every Go file (C3/C4/C5) with bounded concurrency,
//! and hand back the finished graph.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cg_foundation::error::{CgError, CgResult};
use cg_foundation::EngineConfig;
use cg_graph::CallGraph;
use cg_lang_go::{process_file, GoEngine, ImportClassificationCounts};
use cg_module::ModuleRegistry;
use cg_stdlib::{default_http_client, try_load};
use tracing::{info, warn};
use walkdir::WalkDir;

const EXCLUDED_DIRS: &[&str] = &[
    "vendor",
    "testdata",
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    ".idea",
    ".vscode",
    "__pycache__",
];

/// Every `.go` file under `root`, skipping excluded directories and
/// `_test.go` files — a build is run against production sources only.
fn discover_go_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.file_type().is_file()
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "go")
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("_test.go"))
        })
        .collect()
}

pub struct BuildOutcome {
    pub graph: Arc<Mutex<CallGraph>>,
    pub registry: ModuleRegistry,
    pub stdlib: Option<Arc<cg_stdlib::StdlibLoader>>,
    pub files_processed: usize,
    pub import_classifications: ImportClassificationCounts,
}

/// Run C1 → C2 → (C3/C4/C5 per file) over `root`. Per-file extraction
/// failures are logged and skipped; the build itself only fails for a
/// missing/malformed `go.mod` (C1's own fatal condition).
pub async fn build(root: &Path, config: &EngineConfig, no_stdlib: bool) -> CgResult<BuildOutcome> {
    let registry = ModuleRegistry::build(root)?;
    info!(
        module = registry.module_path(),
        go_version = registry.toolchain_version(),
        "module registry built"
    );

    let stdlib = if no_stdlib {
        None
    } else {
        let client = default_http_client();
        try_load(
            &client,
            &config.stdlib_base_url,
            registry.toolchain_version(),
            Some(&config.resolved_cache_dir()),
        )
        .await
        .map(Arc::new)
    };

    let go_engine = Arc::new(GoEngine::new(stdlib.clone()));
    let graph = Arc::new(Mutex::new(CallGraph::new()));
    let registry = Arc::new(registry);

    let files = discover_go_files(root);
    let concurrency = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = semaphore.clone();
        let registry = registry.clone();
        let stdlib = stdlib.clone();
        let go_engine = go_engine.clone();
        let graph = graph.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            match process_file(&path, &registry, stdlib.as_deref(), &go_engine.inference, &graph) {
                Ok(counts) => counts,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping file after extraction error");
                    ImportClassificationCounts::default()
                }
            }
        }));
    }

    let total = handles.len();
    let mut import_classifications = ImportClassificationCounts::default();
    for handle in handles {
        let counts = handle
            .await
            .map_err(|e| CgError::internal(format!("file-processing task panicked: {e}")))?;
        import_classifications.merge(counts);
    }

    let registry = Arc::try_unwrap(registry).unwrap_or_else(|arc| (*arc).clone());

    Ok(BuildOutcome {
        graph,
        registry,
        stdlib,
        files_processed: total,
        import_classifications,
    })
}
