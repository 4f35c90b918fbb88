//! Tree-sitter plumbing for Go source. Mirrors the sibling C/Java language
//! plugins' `ast_parser.rs` shape: load the grammar, parse, hand back the
//! tree for callers to walk.

use tree_sitter::{Parser, Tree};

fn get_language() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parse Go source into a tree-sitter `Tree`. Returns `None` on a grammar
/// load failure or a parser timeout/cancellation — callers treat this the
/// same as any other per-file extraction error: log and skip the file.
pub fn parse_source(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&get_language()).ok()?;
    parser.parse(source, None)
}

/// Slice of `source` covered by `node`, or an empty string if the range is
/// somehow out of bounds (should not happen for a well-formed tree).
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_source() {
        let tree = parse_source("package main\n\nfunc main() {}\n").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
        assert!(!tree.root_node().has_error());
    }
}
