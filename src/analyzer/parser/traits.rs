use crate::types::{CanonicalAnalysis, Result, WeaveError};

use super::Language;

/// A language front-end producing the canonical record
pub trait Parser: Send + Sync {
    /// Extract structural facts from `content`; `path` is used for error context only
    fn parse(&self, path: &str, content: &str) -> Result<CanonicalAnalysis>;
    fn language(&self) -> Language;
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// 1-based start line of a tree-sitter node
#[inline]
pub fn node_line(node: tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Create a tree-sitter parser for the given grammar.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| WeaveError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// First node in the tree that is an ERROR or MISSING node, in document order
pub fn first_syntax_error(root: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if !root.has_error() {
        return None;
    }
    if root.is_error() || root.is_missing() {
        return Some(root);
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if let Some(found) = first_syntax_error(child) {
            return Some(found);
        }
    }
    None
}
