//! Shard graph: syntax nodes in a dense petgraph arena with AST and CFG edges.

use std::fmt;

use lasso::{RodeoResolver, Spur};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use skims_core::types::collections::{Children, Fanout};

use super::kinds::NodeKind;
use crate::parsers::types::Range;
use crate::scanner::language_detect::Language;

/// Dense handle of a node inside one shard. The root is always 0 and ids
/// follow the pre-order of the raw tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn as_petgraph(self) -> NodeIndex<u32> {
        NodeIndex::new(self.index())
    }
}

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Grammar production name, as produced by the adapter.
    pub label_type: &'static str,
    pub kind: NodeKind,
    /// Field name under the AST parent.
    pub field: Option<&'static str>,
    pub label_text: Option<Spur>,
    pub named: bool,
    pub range: Range,
}

/// Control-flow edge labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CfgEdgeKind {
    Always,
    True,
    False,
    Maybe,
    Break,
    Continue,
}

impl CfgEdgeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Always => "ALWAYS",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Maybe => "MAYBE",
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
        }
    }
}

impl fmt::Display for CfgEdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge weight. AST and CFG edges never mix: an edge is exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    /// Parent to child, `index` being the child's position among its siblings.
    Ast { index: u32 },
    Cfg(CfgEdgeKind),
}

impl EdgeKind {
    pub fn is_ast(&self) -> bool {
        matches!(self, Self::Ast { .. })
    }

    pub fn is_cfg(&self) -> bool {
        matches!(self, Self::Cfg(_))
    }
}

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFilter {
    Any,
    Ast,
    Cfg,
}

impl EdgeFilter {
    pub fn accepts(&self, edge: &EdgeKind) -> bool {
        match self {
            Self::Any => true,
            Self::Ast => edge.is_ast(),
            Self::Cfg => edge.is_cfg(),
        }
    }
}

/// The graph of one source file.
///
/// Nodes are only ever appended by the builder, so petgraph's dense
/// `NodeIndex` doubles as the stable `NodeId`. AST children and parents are
/// also kept in side tables for ordered, allocation-free access.
pub struct Graph {
    pub(crate) language: Language,
    pub(crate) inner: DiGraph<SyntaxNode, EdgeKind, u32>,
    pub(crate) children: Vec<Children<NodeId>>,
    pub(crate) parents: Vec<Option<NodeId>>,
    pub(crate) texts: RodeoResolver,
    pub(crate) cfg_edge_count: usize,
}

impl Graph {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn cfg_edge_count(&self) -> usize {
        self.cfg_edge_count
    }

    pub fn contains(&self, n_id: NodeId) -> bool {
        n_id.index() < self.inner.node_count()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.inner.node_count() as u32).map(NodeId)
    }

    pub fn get(&self, n_id: NodeId) -> Option<&SyntaxNode> {
        self.inner.node_weight(n_id.as_petgraph())
    }

    /// The node for an id handed out by this graph.
    ///
    /// Panics on a foreign id; use `get` when the id's origin is unknown.
    pub fn node(&self, n_id: NodeId) -> &SyntaxNode {
        &self.inner[n_id.as_petgraph()]
    }

    pub fn kind(&self, n_id: NodeId) -> NodeKind {
        self.get(n_id).map_or(NodeKind::Other, |n| n.kind)
    }

    pub fn label_type(&self, n_id: NodeId) -> &'static str {
        self.get(n_id).map_or("", |n| n.label_type)
    }

    pub fn field(&self, n_id: NodeId) -> Option<&'static str> {
        self.get(n_id).and_then(|n| n.field)
    }

    /// Source text carried by the node, when the adapter kept it.
    pub fn text(&self, n_id: NodeId) -> Option<&str> {
        self.get(n_id)
            .and_then(|n| n.label_text.as_ref())
            .map(|spur| self.texts.resolve(spur))
    }

    pub fn range(&self, n_id: NodeId) -> Range {
        self.get(n_id).map(|n| n.range).unwrap_or_default()
    }

    /// One-based line of the node start.
    pub fn line(&self, n_id: NodeId) -> u32 {
        self.range(n_id).start.line + 1
    }

    pub fn parent(&self, n_id: NodeId) -> Option<NodeId> {
        self.parents.get(n_id.index()).copied().flatten()
    }

    /// AST children in sibling order.
    pub fn children(&self, n_id: NodeId) -> &[NodeId] {
        self.children
            .get(n_id.index())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn named_children(&self, n_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(n_id)
            .iter()
            .copied()
            .filter(|c| self.get(*c).is_some_and(|n| n.named))
    }

    pub fn child_by_field(&self, n_id: NodeId, field: &str) -> Option<NodeId> {
        self.children(n_id)
            .iter()
            .copied()
            .find(|c| self.field(*c) == Some(field))
    }

    pub fn children_by_field<'a>(
        &'a self,
        n_id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(n_id)
            .iter()
            .copied()
            .filter(move |c| self.field(*c) == Some(field))
    }

    pub fn child_by_kind(&self, n_id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(n_id)
            .iter()
            .copied()
            .find(|c| self.kind(*c) == kind)
    }

    pub fn ancestors(&self, n_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(n_id), move |p| self.parent(*p))
    }

    /// CFG successors sorted by target id, then edge kind.
    pub fn cfg_successors(&self, n_id: NodeId) -> Fanout<(NodeId, CfgEdgeKind)> {
        self.cfg_neighbors(n_id, Direction::Outgoing)
    }

    /// CFG predecessors sorted by source id, then edge kind.
    pub fn cfg_predecessors(&self, n_id: NodeId) -> Fanout<(NodeId, CfgEdgeKind)> {
        self.cfg_neighbors(n_id, Direction::Incoming)
    }

    fn cfg_neighbors(&self, n_id: NodeId, dir: Direction) -> Fanout<(NodeId, CfgEdgeKind)> {
        if !self.contains(n_id) {
            return Fanout::new();
        }
        let mut out: Fanout<(NodeId, CfgEdgeKind)> = self
            .inner
            .edges_directed(n_id.as_petgraph(), dir)
            .filter_map(|e| match e.weight() {
                EdgeKind::Cfg(kind) => {
                    let other = match dir {
                        Direction::Outgoing => e.target(),
                        Direction::Incoming => e.source(),
                    };
                    Some((NodeId::from(other), *kind))
                }
                EdgeKind::Ast { .. } => None,
            })
            .collect();
        out.sort();
        out
    }

    /// The CFG edge kind from `from` to `to`, if one exists.
    pub fn cfg_edge(&self, from: NodeId, to: NodeId) -> Option<CfgEdgeKind> {
        self.cfg_successors(from)
            .into_iter()
            .find(|(t, _)| *t == to)
            .map(|(_, k)| k)
    }

    /// Every edge as `(source, target, kind)`, sorted.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, EdgeKind)> {
        let mut edges: Vec<(NodeId, NodeId, EdgeKind)> = self
            .inner
            .edge_references()
            .map(|e| (e.source().into(), e.target().into(), *e.weight()))
            .collect();
        edges.sort_by_key(|(s, t, k)| (*s, *t, edge_order(k)));
        edges
    }

    /// Add a CFG edge unless the same one already exists.
    pub(crate) fn add_cfg_edge(&mut self, from: NodeId, to: NodeId, kind: CfgEdgeKind) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let exists = self
            .inner
            .edges_connecting(from.as_petgraph(), to.as_petgraph())
            .any(|e| *e.weight() == EdgeKind::Cfg(kind));
        if exists {
            return false;
        }
        self.inner
            .add_edge(from.as_petgraph(), to.as_petgraph(), EdgeKind::Cfg(kind));
        self.cfg_edge_count += 1;
        true
    }
}

fn edge_order(kind: &EdgeKind) -> (u8, u32) {
    match kind {
        EdgeKind::Ast { index } => (0, *index),
        EdgeKind::Cfg(k) => (1, *k as u32),
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("language", &self.language)
            .field("nodes", &self.inner.node_count())
            .field("edges", &self.inner.edge_count())
            .field("cfg_edges", &self.cfg_edge_count)
            .finish()
    }
}
