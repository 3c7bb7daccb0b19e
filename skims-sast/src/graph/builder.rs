//! Raw tree -> shard graph.
//!
//! Ids are raw-tree indices, so building the same tree twice yields the
//! same ids, edges and edge order.

use lasso::Rodeo;
use petgraph::graph::{DiGraph, NodeIndex};
use skims_core::types::collections::Children;
use tracing::debug;

use super::kinds::NodeKind;
use super::model::{EdgeKind, Graph, NodeId, SyntaxNode};
use crate::parsers::types::{Range, RawTree};
use crate::scanner::language_detect::Language;

/// Build the AST-only graph of one file. CFG edges are added afterwards by
/// the control-flow augmenter.
pub fn build(tree: &RawTree, language: Language) -> Graph {
    let node_total = tree.len().max(1);
    let mut inner: DiGraph<SyntaxNode, EdgeKind, u32> =
        DiGraph::with_capacity(node_total, node_total.saturating_sub(1));
    let mut children: Vec<Children<NodeId>> = Vec::with_capacity(node_total);
    let mut parents: Vec<Option<NodeId>> = Vec::with_capacity(node_total);
    let mut texts = Rodeo::default();

    for (index, raw) in tree.nodes.iter().enumerate() {
        let kind = if index == 0 {
            NodeKind::Root
        } else {
            NodeKind::classify(language, raw.label_type, raw.named)
        };
        inner.add_node(SyntaxNode {
            label_type: raw.label_type,
            kind,
            field: raw.field,
            label_text: raw.text.as_deref().map(|t| texts.get_or_intern(t)),
            named: raw.named,
            range: raw.range,
        });
        children.push(raw.children.iter().map(|c| NodeId(*c)).collect());
        parents.push(raw.parent.map(NodeId));
    }

    if tree.is_empty() {
        inner.add_node(SyntaxNode {
            label_type: "module",
            kind: NodeKind::Root,
            field: None,
            label_text: None,
            named: true,
            range: Range::default(),
        });
        children.push(Children::new());
        parents.push(None);
    }

    for (parent, kids) in children.iter().enumerate() {
        for (index, child) in kids.iter().enumerate() {
            inner.add_edge(
                NodeIndex::new(parent),
                NodeIndex::new(child.index()),
                EdgeKind::Ast {
                    index: index as u32,
                },
            );
        }
    }

    debug!(
        language = %language,
        node_count = inner.node_count(),
        "built shard graph"
    );

    Graph {
        language,
        inner,
        children,
        parents,
        texts: texts.into_resolver(),
        cfg_edge_count: 0,
    }
}
