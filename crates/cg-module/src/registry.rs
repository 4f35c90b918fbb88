//! Project-wide directory ↔ import-path registry (C1).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cg_foundation::error::{CgError, CgResult};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::gomod::parse_go_mod;
use crate::version::resolve_toolchain_version;

/// Directory names skipped while walking the project tree.
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

/// Process-wide state produced once per build: the module path, resolved
/// toolchain version, and the directory ↔ import-path mapping. Read-only
/// after construction and safe to share across threads.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    module_path: String,
    toolchain_version: String,
    dir_to_import: HashMap<PathBuf, String>,
    import_to_dir: HashMap<String, PathBuf>,
}

impl ModuleRegistry {
    /// Build the registry by reading `go.mod` at `project_root` and walking
    /// the project tree. Missing `go.mod` or a missing module directive is
    /// fatal; a missing version directive is not — version resolution
    /// falls back through `.go-version` / `go.work` / the compiled default.
    pub fn build(project_root: &Path) -> CgResult<Self> {
        let go_mod_path = project_root.join("go.mod");
        let go_mod_content = std::fs::read_to_string(&go_mod_path).map_err(|_| {
            CgError::manifest(format!(
                "no go.mod found at {}",
                go_mod_path.display()
            ))
        })?;
        let go_mod = parse_go_mod(&go_mod_content)?;

        let toolchain_version =
            resolve_toolchain_version(project_root, go_mod.go_version.as_deref());

        let mut registry = Self {
            module_path: go_mod.module_path,
            toolchain_version,
            dir_to_import: HashMap::new(),
            import_to_dir: HashMap::new(),
        };
        registry.walk(project_root)?;
        Ok(registry)
    }

    fn walk(&mut self, project_root: &Path) -> CgResult<()> {
        let walker = WalkDir::new(project_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.file_type().is_file()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(project_root)
                .unwrap_or(entry.path());
            let import_path = self.synthesize_import_path(relative);

            self.dir_to_import
                .insert(entry.path().to_path_buf(), import_path.clone());
            self.import_to_dir
                .insert(import_path, entry.path().to_path_buf());
        }

        debug!(
            module = %self.module_path,
            directories = self.dir_to_import.len(),
            "built module registry"
        );
        Ok(())
    }

    fn synthesize_import_path(&self, relative: &Path) -> String {
        if relative.as_os_str().is_empty() {
            return self.module_path.clone();
        }
        let normalized = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.module_path, normalized)
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn toolchain_version(&self) -> &str {
        &self.toolchain_version
    }

    pub fn import_path_for_dir(&self, dir: &Path) -> Option<&str> {
        self.dir_to_import.get(dir).map(String::as_str)
    }

    pub fn dir_for_import_path(&self, import_path: &str) -> Option<&Path> {
        self.import_to_dir.get(import_path).map(PathBuf::as_path)
    }

    /// Whether `import_path` is within this module (a relative import, or a
    /// prefix-subpath of the module's own path).
    pub fn is_local_import(&self, import_path: &str) -> bool {
        import_path.starts_with('.')
            || import_path == self.module_path
            || import_path.starts_with(&format!("{}/", self.module_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_go_mod(root: &Path, body: &str) {
        std::fs::write(root.join("go.mod"), body).unwrap();
    }

    #[test]
    fn round_trip_directory_and_import_path() {
        let dir = tempdir().unwrap();
        write_go_mod(dir.path(), "module example.com/app\n\ngo 1.21\n");
        std::fs::create_dir_all(dir.path().join("internal/service")).unwrap();

        let registry = ModuleRegistry::build(dir.path()).unwrap();
        let sub_dir = dir.path().join("internal/service");
        let import_path = registry.import_path_for_dir(&sub_dir).unwrap();
        assert_eq!(import_path, "example.com/app/internal/service");
        assert_eq!(
            registry.dir_for_import_path(import_path).unwrap(),
            sub_dir
        );
    }

    #[test]
    fn root_directory_maps_to_module_path_itself() {
        let dir = tempdir().unwrap();
        write_go_mod(dir.path(), "module example.com/app\n\ngo 1.21\n");

        let registry = ModuleRegistry::build(dir.path()).unwrap();
        assert_eq!(
            registry.import_path_for_dir(dir.path()).unwrap(),
            "example.com/app"
        );
    }

    #[test]
    fn excluded_directories_are_skipped() {
        let dir = tempdir().unwrap();
        write_go_mod(dir.path(), "module example.com/app\n\ngo 1.21\n");
        std::fs::create_dir_all(dir.path().join("vendor/pkg")).unwrap();

        let registry = ModuleRegistry::build(dir.path()).unwrap();
        assert!(registry
            .import_path_for_dir(&dir.path().join("vendor/pkg"))
            .is_none());
        assert!(registry
            .import_path_for_dir(&dir.path().join("vendor"))
            .is_none());
    }

    #[test]
    fn missing_go_mod_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(ModuleRegistry::build(dir.path()).is_err());
    }

    #[test]
    fn is_local_import_recognizes_module_prefix_and_relative_paths() {
        let dir = tempdir().unwrap();
        write_go_mod(dir.path(), "module example.com/app\n\ngo 1.21\n");
        let registry = ModuleRegistry::build(dir.path()).unwrap();

        assert!(registry.is_local_import("example.com/app/internal/service"));
        assert!(registry.is_local_import("./sibling"));
        assert!(!registry.is_local_import("github.com/other/pkg"));
    }
}
