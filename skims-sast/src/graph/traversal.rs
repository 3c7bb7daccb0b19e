//! Neighborhood and pattern helpers that queries and readers are written
//! against.

use std::collections::{BTreeMap, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use skims_core::types::collections::FxHashSet;

use super::kinds::NodeKind;
use super::model::{EdgeFilter, Graph, NodeId};

/// Unbounded traversal depth.
pub const UNBOUNDED: i32 = -1;

impl Graph {
    /// Nodes reachable from `n_id` following outgoing edges accepted by
    /// `filter`, up to `depth` hops (`-1` for unbounded). Breadth-first,
    /// each layer in ascending id order, without duplicates.
    pub fn adj(&self, n_id: NodeId, depth: i32, filter: EdgeFilter) -> Vec<NodeId> {
        self.walk(n_id, depth, filter, Direction::Outgoing)
    }

    /// Like `adj`, following incoming edges.
    pub fn pred(&self, n_id: NodeId, depth: i32, filter: EdgeFilter) -> Vec<NodeId> {
        self.walk(n_id, depth, filter, Direction::Incoming)
    }

    pub fn adj_ast(&self, n_id: NodeId, depth: i32) -> Vec<NodeId> {
        self.adj(n_id, depth, EdgeFilter::Ast)
    }

    pub fn adj_cfg(&self, n_id: NodeId, depth: i32) -> Vec<NodeId> {
        self.adj(n_id, depth, EdgeFilter::Cfg)
    }

    pub fn pred_ast(&self, n_id: NodeId, depth: i32) -> Vec<NodeId> {
        self.pred(n_id, depth, EdgeFilter::Ast)
    }

    pub fn pred_cfg(&self, n_id: NodeId, depth: i32) -> Vec<NodeId> {
        self.pred(n_id, depth, EdgeFilter::Cfg)
    }

    fn walk(&self, start: NodeId, depth: i32, filter: EdgeFilter, dir: Direction) -> Vec<NodeId> {
        if !self.contains(start) || depth == 0 {
            return Vec::new();
        }
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        seen.insert(start);
        let mut out = Vec::new();
        let mut queue: VecDeque<(NodeId, i32)> = VecDeque::from([(start, 0)]);

        while let Some((current, level)) = queue.pop_front() {
            if depth >= 0 && level >= depth {
                continue;
            }
            let mut layer: Vec<NodeId> = self
                .inner
                .edges_directed(NodeIndex::new(current.index()), dir)
                .filter(|e| filter.accepts(e.weight()))
                .map(|e| match dir {
                    Direction::Outgoing => NodeId::from(e.target()),
                    Direction::Incoming => NodeId::from(e.source()),
                })
                .collect();
            layer.sort();
            layer.dedup();
            for next in layer {
                if seen.insert(next) {
                    out.push(next);
                    queue.push_back((next, level + 1));
                }
            }
        }
        out
    }

    /// Map each wanted label type to the first direct child carrying it.
    /// Children matching none are keyed `__0__`, `__1__`, ... in order.
    pub fn match_ast(&self, n_id: NodeId, label_types: &[&str]) -> BTreeMap<String, Option<NodeId>> {
        let mut matched: BTreeMap<String, Option<NodeId>> = label_types
            .iter()
            .map(|l| (l.to_string(), None))
            .collect();
        let mut unmatched = 0usize;
        for child in self.children(n_id) {
            let label = self.label_type(*child);
            if matches!(matched.get(label), Some(None)) {
                matched.insert(label.to_string(), Some(*child));
            } else {
                matched.insert(format!("__{unmatched}__"), Some(*child));
                unmatched += 1;
            }
        }
        matched
    }

    /// Like `match_ast`, collecting every child per label type.
    pub fn match_ast_group(&self, n_id: NodeId, label_types: &[&str]) -> BTreeMap<String, Vec<NodeId>> {
        let mut grouped: BTreeMap<String, Vec<NodeId>> = label_types
            .iter()
            .map(|l| (l.to_string(), Vec::new()))
            .collect();
        let mut unmatched = 0usize;
        for child in self.children(n_id) {
            match grouped.get_mut(self.label_type(*child)) {
                Some(group) => group.push(*child),
                None => {
                    grouped.insert(format!("__{unmatched}__"), vec![*child]);
                    unmatched += 1;
                }
            }
        }
        grouped
    }

    /// AST descendants of `n_id` with `label_type`, up to `depth` levels.
    pub fn get_ast_childs(&self, n_id: NodeId, label_type: &str, depth: i32) -> Vec<NodeId> {
        self.adj_ast(n_id, depth)
            .into_iter()
            .filter(|c| self.label_type(*c) == label_type)
            .collect()
    }

    /// Whether any CFG edge touches `n_id`.
    pub fn is_connected_to_cfg(&self, n_id: NodeId) -> bool {
        self.contains(n_id)
            && self
                .inner
                .edges_directed(NodeIndex::new(n_id.index()), Direction::Outgoing)
                .chain(
                    self.inner
                        .edges_directed(NodeIndex::new(n_id.index()), Direction::Incoming),
                )
                .any(|e| e.weight().is_cfg())
    }

    /// `n_id` itself or its nearest AST ancestor that is part of the CFG.
    pub fn lookup_first_cfg_parent(&self, n_id: NodeId) -> Option<NodeId> {
        std::iter::once(n_id)
            .chain(self.ancestors(n_id))
            .find(|n| self.is_connected_to_cfg(*n))
    }

    /// Nearest enclosing method-like node, not counting `n_id` itself.
    pub fn enclosing_method(&self, n_id: NodeId) -> Option<NodeId> {
        self.ancestors(n_id)
            .find(|a| self.kind(*a) == NodeKind::Method)
    }

    /// Nearest ancestor-or-self of the given kind.
    pub fn lookup_first_of_kind(&self, n_id: NodeId, kind: NodeKind) -> Option<NodeId> {
        std::iter::once(n_id)
            .chain(self.ancestors(n_id))
            .find(|a| self.kind(*a) == kind)
    }

    /// Descendants of `n_id` of `kind`, pre-order.
    pub fn descendants_of_kind(&self, n_id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(n_id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.kind(current) == kind {
                out.push(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// The node's own text, or its leaves' texts joined without spacing
    /// when the adapter did not keep text for it.
    pub fn source_text(&self, n_id: NodeId) -> String {
        if let Some(text) = self.text(n_id) {
            return text.to_string();
        }
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.children(n_id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            match self.text(current) {
                Some(text) => out.push_str(text),
                None => stack.extend(self.children(current).iter().rev().copied()),
            }
        }
        out
    }

    /// Every node of `kind` in the shard, ascending.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(move |n| self.kind(*n) == kind)
    }

    /// Every node with `label_type` in the shard, ascending.
    pub fn nodes_by_label<'a>(&'a self, label_type: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.node_ids().filter(move |n| self.label_type(*n) == label_type)
    }
}
