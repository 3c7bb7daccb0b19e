//! Error-tolerant conversion: tree-sitter trees with ERROR nodes become raw
//! trees without them.

use tree_sitter::{Node, Tree};

use super::types::{Range, RawNode, RawTree};

/// Text longer than this is not copied onto inner nodes.
const MAX_INNER_TEXT_BYTES: usize = 200;

/// True for nodes the raw tree never contains.
fn is_dropped(node: &Node) -> bool {
    node.is_error() || node.is_missing() || node.is_extra()
}

/// Count ERROR and MISSING nodes in a tree-sitter tree.
pub fn count_errors(root: Node) -> (u32, Vec<Range>) {
    let mut count = 0u32;
    let mut ranges = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            count += 1;
            ranges.push(Range::from_ts_node(&node));
            continue;
        }
        let mut cursor = node.walk();
        stack.extend(node.children(&mut cursor));
    }
    (count, ranges)
}

fn node_text(node: &Node, source: &[u8]) -> Option<String> {
    let leaf = node.child_count() == 0;
    let short = node.is_named()
        && node.end_byte() - node.start_byte() <= MAX_INNER_TEXT_BYTES
        && node.start_position().row == node.end_position().row;
    if leaf || short {
        node.utf8_text(source).ok().map(str::to_string)
    } else {
        None
    }
}

/// Convert a tree-sitter tree into a pre-order `RawTree`, dropping ERROR,
/// MISSING and extra (comment) subtrees.
pub fn to_raw_tree(tree: &Tree, source: &[u8]) -> RawTree {
    let mut raw = RawTree::default();
    let mut cursor = tree.walk();
    // Raw index of the node the cursor is on, per depth.
    let mut parents: Vec<Option<u32>> = Vec::new();

    loop {
        let node = cursor.node();
        let parent = parents.last().copied().flatten();
        let keep = !is_dropped(&node) || parents.is_empty();
        let index = keep.then(|| {
            raw.push(
                RawNode {
                    label_type: node.kind(),
                    field: cursor.field_name(),
                    text: node_text(&node, source),
                    named: node.is_named(),
                    range: Range::from_ts_node(&node),
                    parent: None,
                    children: Vec::new(),
                },
                parent,
            )
        });

        if keep && cursor.goto_first_child() {
            parents.push(index);
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return raw;
            }
            parents.pop();
        }
    }
}
