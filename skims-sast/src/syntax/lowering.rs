//! Lowering of path nodes into syntax steps.
//!
//! Each CFG node of a path is read on its own; sub-expressions are pushed
//! before the step that uses them, so a step's dependencies always point
//! backwards and a path folds in one forward pass.

use std::collections::VecDeque;

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;
use tracing::debug;

use super::readers;
use super::steps::{StepKind, SyntaxStep};
use crate::graph::{Graph, NodeId};

/// Step buffer for one path node.
pub struct Lowerer<'g> {
    pub(crate) graph: &'g Graph,
    steps: Vec<SyntaxStep>,
    offset: usize,
    next: Option<NodeId>,
}

impl<'g> Lowerer<'g> {
    /// `offset` is the absolute index the first pushed step will get.
    pub fn new(graph: &'g Graph, offset: usize, next: Option<NodeId>) -> Self {
        Self {
            graph,
            steps: Vec::new(),
            offset,
            next,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The node that follows the one being read on the current path.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Append a step, returning its absolute index.
    pub fn push(
        &mut self,
        n_id: NodeId,
        kind: StepKind,
        dependencies: impl IntoIterator<Item = usize>,
    ) -> usize {
        let index = self.offset + self.steps.len();
        self.steps
            .push(SyntaxStep::new(kind, n_id, dependencies.into_iter().collect()));
        index
    }

    /// Read an expression, returning the index of the step holding its result.
    pub fn expr(&mut self, n_id: NodeId) -> Result<usize, EvaluationError> {
        readers::read(self, n_id)
    }

    /// Read several expressions in order.
    pub fn exprs(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<Deps<usize>, EvaluationError> {
        nodes.into_iter().map(|n| self.expr(n)).collect()
    }

    /// A step pushed earlier for the current node.
    pub fn step(&self, index: usize) -> Option<&SyntaxStep> {
        index
            .checked_sub(self.offset)
            .and_then(|local| self.steps.get(local))
    }

    pub(crate) fn mark(&self) -> usize {
        self.steps.len()
    }

    /// Drop steps pushed after `mark` by a reader that gave up.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.steps.truncate(mark);
    }

    pub fn into_steps(self) -> Vec<SyntaxStep> {
        self.steps
    }
}

/// Steps of a single node, numbered from `offset`.
pub fn lower_node(
    graph: &Graph,
    n_id: NodeId,
    offset: usize,
    next: Option<NodeId>,
) -> Result<Vec<SyntaxStep>, EvaluationError> {
    let mut lowerer = Lowerer::new(graph, offset, next);
    readers::read(&mut lowerer, n_id)?;
    Ok(lowerer.into_steps())
}

/// Lazily lower a path. Nodes without a reader contribute no steps.
pub fn lower<'g>(graph: &'g Graph, path: &'g [NodeId]) -> Lowering<'g> {
    Lowering {
        graph,
        path,
        position: 0,
        emitted: 0,
        buffer: VecDeque::new(),
    }
}

/// Iterator returned by [`lower`]. Deterministic: lowering the same path
/// again yields equal steps.
pub struct Lowering<'g> {
    graph: &'g Graph,
    path: &'g [NodeId],
    position: usize,
    emitted: usize,
    buffer: VecDeque<SyntaxStep>,
}

impl Iterator for Lowering<'_> {
    type Item = SyntaxStep;

    fn next(&mut self) -> Option<SyntaxStep> {
        loop {
            if let Some(step) = self.buffer.pop_front() {
                self.emitted += 1;
                return Some(step);
            }
            let n_id = *self.path.get(self.position)?;
            let next = self.path.get(self.position + 1).copied();
            self.position += 1;
            match lower_node(self.graph, n_id, self.emitted, next) {
                Ok(steps) => self.buffer.extend(steps),
                Err(e) => debug!(n_id = %n_id, reason = %e, "node contributes no syntax steps"),
            }
        }
    }
}
