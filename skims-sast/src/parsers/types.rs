//! Raw parse tree produced by every parser adapter.
//!
//! The tree is language-neutral: grammar production names are kept as-is
//! in `label_type`, and the graph builder turns it into a shard graph.
//! Nodes live in a pre-order arena so ids derived from it are stable.

use std::sync::Arc;

use serde::Serialize;

use crate::scanner::language_detect::Language;

/// Zero-based line/column position, as reported by tree-sitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Source span of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position {
                line: start_line,
                column: start_column,
            },
            end: Position {
                line: end_line,
                column: end_column,
            },
        }
    }

    pub fn from_ts_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self::new(
            start.row as u32,
            start.column as u32,
            end.row as u32,
            end.column as u32,
        )
    }
}

/// One node of a raw parse tree.
#[derive(Debug, Clone, Serialize)]
pub struct RawNode {
    /// Grammar production name (`method_declaration`, `if_statement`, `(`).
    pub label_type: &'static str,
    /// Field name under the parent (`condition`, `body`), when the grammar has one.
    pub field: Option<&'static str>,
    /// Source text, kept for leaves only.
    pub text: Option<String>,
    /// False for anonymous tokens such as punctuation and keywords.
    pub named: bool,
    pub range: Range,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
}

/// A whole file's raw tree, in pre-order. Index 0 is the root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawTree {
    pub nodes: Vec<RawNode>,
}

impl RawTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&RawNode> {
        self.nodes.first()
    }

    /// Append a node under `parent`, returning its index.
    ///
    /// Callers must push in pre-order for ids to stay deterministic.
    pub fn push(&mut self, mut node: RawNode, parent: Option<u32>) -> u32 {
        let index = self.nodes.len() as u32;
        node.parent = parent;
        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(p as usize) {
                parent_node.children.push(index);
            }
        }
        self.nodes.push(node);
        index
    }
}

/// Output of a parser adapter for one file.
///
/// The tree is shared so cached results can be handed out without copying.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub file: String,
    pub language: Language,
    pub content_hash: u64,
    pub tree: Arc<RawTree>,
    pub parse_time_us: u64,
    /// ERROR/MISSING nodes found by the grammar; their subtrees are not in `tree`.
    pub error_count: u32,
    pub error_ranges: Vec<Range>,
    pub has_errors: bool,
}
