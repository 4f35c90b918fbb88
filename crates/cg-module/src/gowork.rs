//! `go.work` parsing: only the workspace-level `go` directive is needed —
//! it is the third link in the toolchain version fallback chain.

/// Returns `true` for content that looks like a `go.work` file, the same
/// heuristic used elsewhere in this codebase to distinguish workspace
/// manifests from module manifests: a top-level `go ` directive with no
/// preceding `module` directive.
pub fn is_workspace_manifest(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .any(|line| line.starts_with("go "))
        && !content
            .lines()
            .map(str::trim)
            .any(|line| line.starts_with("module "))
}

/// Extract the `go` directive's version, normalized to "major.minor".
pub fn parse_go_work_version(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("go "))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(crate::gomod::normalize_go_version)
}
