//! `go.mod` parsing: module path and toolchain version only. The registry
//! builder doesn't care about dependency requirements, so `require`/
//! `replace`/`exclude` blocks are skipped rather than parsed in full.

use cg_foundation::error::{CgError, CgResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    pub module_path: String,
    /// "major.minor" form; patch is discarded per the normalization rule.
    pub go_version: Option<String>,
}

pub fn parse_go_mod(content: &str) -> CgResult<GoMod> {
    let mut module_path = None;
    let mut go_version = None;

    let mut lines = content.lines().peekable();
    while let Some(raw_line) = lines.next() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("module ") {
            module_path = Some(parse_module_directive(line)?);
        } else if line.starts_with("go ") {
            go_version = Some(normalize_go_version(&parse_go_directive(line)?));
        } else if (line.starts_with("require ")
            || line.starts_with("replace ")
            || line.starts_with("exclude ")
            || line.starts_with("use "))
            && line.contains('(')
        {
            skip_block(&mut lines);
        }
    }

    let module_path = module_path
        .ok_or_else(|| CgError::manifest("go.mod is missing a module directive"))?;

    Ok(GoMod {
        module_path,
        go_version,
    })
}

fn parse_module_directive(line: &str) -> CgResult<String> {
    line.split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| CgError::manifest("malformed module directive"))
}

fn parse_go_directive(line: &str) -> CgResult<String> {
    line.split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| CgError::manifest("malformed go directive"))
}

/// Strip the patch component: "1.21.3" → "1.21". Already-short versions
/// ("1.21") pass through unchanged.
pub fn normalize_go_version(raw: &str) -> String {
    let mut parts = raw.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{major}.{minor}"),
        _ => raw.to_string(),
    }
}

fn skip_block<'a, I>(lines: &mut std::iter::Peekable<I>)
where
    I: Iterator<Item = &'a str>,
{
    for line in lines.by_ref() {
        if line.trim() == ")" {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_and_version() {
        let content = "module example.com/app\n\ngo 1.21.3\n";
        let parsed = parse_go_mod(content).unwrap();
        assert_eq!(parsed.module_path, "example.com/app");
        assert_eq!(parsed.go_version.as_deref(), Some("1.21"));
    }

    #[test]
    fn missing_version_is_none_not_an_error() {
        let content = "module example.com/app\n";
        let parsed = parse_go_mod(content).unwrap();
        assert_eq!(parsed.go_version, None);
    }

    #[test]
    fn missing_module_directive_is_fatal() {
        let content = "go 1.21\n";
        assert!(parse_go_mod(content).is_err());
    }

    #[test]
    fn require_block_does_not_confuse_module_parsing() {
        let content = r#"
module example.com/app

go 1.22

require (
    example.com/dep v1.2.3
)
"#;
        let parsed = parse_go_mod(content).unwrap();
        assert_eq!(parsed.module_path, "example.com/app");
        assert_eq!(parsed.go_version.as_deref(), Some("1.22"));
    }

    #[test]
    fn normalize_go_version_strips_patch() {
        assert_eq!(normalize_go_version("1.21.4"), "1.21");
        assert_eq!(normalize_go_version("1.21"), "1.21");
    }
}
