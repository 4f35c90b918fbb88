//! Four-step toolchain version resolution, shared by the module registry
//! builder and the stdlib manifest loader so both agree on which version
//! they're targeting.

use std::path::Path;

use crate::gomod::normalize_go_version;
use crate::gowork;

/// Compiled-in fallback when nothing else yields a version.
pub const DEFAULT_GO_VERSION: &str = "1.21";

/// Resolve the toolchain version for a project, in priority order:
/// 1. the `go` directive from `go.mod` (already normalized by the caller),
/// 2. a `.go-version` file at the project root (single line, raw version),
/// 3. a `go.work` file's own `go` directive,
/// 4. the compiled-in default.
pub fn resolve_toolchain_version(project_root: &Path, go_mod_version: Option<&str>) -> String {
    if let Some(version) = go_mod_version {
        return version.to_string();
    }

    if let Some(version) = read_go_version_file(project_root) {
        return version;
    }

    if let Some(version) = read_go_work_version(project_root) {
        return version;
    }

    DEFAULT_GO_VERSION.to_string()
}

fn read_go_version_file(project_root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(project_root.join(".go-version")).ok()?;
    let raw = content.lines().next()?.trim();
    if raw.is_empty() {
        None
    } else {
        Some(normalize_go_version(raw))
    }
}

fn read_go_work_version(project_root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(project_root.join("go.work")).ok()?;
    gowork::parse_go_work_version(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn go_mod_version_wins_over_everything() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".go-version"), "1.19\n").unwrap();
        let resolved = resolve_toolchain_version(dir.path(), Some("1.23"));
        assert_eq!(resolved, "1.23");
    }

    #[test]
    fn falls_back_to_go_version_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".go-version"), "1.19.2\n").unwrap();
        let resolved = resolve_toolchain_version(dir.path(), None);
        assert_eq!(resolved, "1.19");
    }

    #[test]
    fn falls_back_to_go_work() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("go.work"), "go 1.20\n\nuse ./svc\n").unwrap();
        let resolved = resolve_toolchain_version(dir.path(), None);
        assert_eq!(resolved, "1.20");
    }

    #[test]
    fn falls_back_to_compiled_in_default() {
        let dir = tempdir().unwrap();
        let resolved = resolve_toolchain_version(dir.path(), None);
        assert_eq!(resolved, DEFAULT_GO_VERSION);
    }
}
