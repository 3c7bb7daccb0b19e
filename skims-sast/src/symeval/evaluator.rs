//! Path folding and method inlining.
//!
//! A sink is evaluated over every CFG path that reaches its statement.
//! Each path is lowered into syntax steps and folded forward; the handler
//! for each step sets its `danger` and best-effort `value` from its
//! dependencies. A path that contradicts a known branch condition is
//! dropped; a sink is dangerous when any surviving path says so.

use skims_core::errors::EvaluationError;
use skims_core::traits::{Cancellable, CancellationToken};
use tracing::{debug, trace};

use super::config::EvaluatorConfig;
use super::handlers;
use crate::db::{GraphDb, GraphShard};
use crate::graph::{backward_paths, NodeId, NodeKind};
use crate::queries::finding::Finding;
use crate::syntax::{lower, StepKind, Slot, SyntaxStep, Value};

/// How the sink step is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// The sink's own danger, as set by its handler.
    Step,
    /// Danger of any argument the sink receives.
    Arguments,
}

/// Symbolic evaluator for one finding over a frozen db.
pub struct Evaluator<'a> {
    db: &'a GraphDb,
    finding: Finding,
    config: EvaluatorConfig,
    token: Option<&'a CancellationToken>,
}

/// Fold state of one path.
pub(crate) struct PathState<'s> {
    pub steps: Vec<SyntaxStep>,
    pub shard: &'s GraphShard,
    /// Argument slots when the path belongs to an inlined method.
    pub bindings: &'s [Slot],
    pub params_bound: usize,
    pub switch_value: Option<Value>,
    pub depth: u32,
}

impl<'s> PathState<'s> {
    fn new(shard: &'s GraphShard, bindings: &'s [Slot], depth: u32) -> Self {
        Self {
            steps: Vec::new(),
            shard,
            bindings,
            params_bound: 0,
            switch_value: None,
            depth,
        }
    }

    pub fn is_inlined(&self) -> bool {
        self.depth > 0
    }

    /// Index of the latest step before `before` that defines `var`.
    pub fn definition(&self, var: &str, before: usize) -> Option<usize> {
        self.steps[..before.min(self.steps.len())]
            .iter()
            .rposition(|s| s.kind.defined_var() == Some(var))
    }

    /// Declared type of `var`, from its latest declaration or catch clause.
    pub fn declared_type(&self, var: &str, before: usize) -> Option<String> {
        self.steps[..before.min(self.steps.len())]
            .iter()
            .rev()
            .filter(|s| s.kind.defined_var() == Some(var))
            .find_map(|s| s.kind.declared_type_base())
            .map(str::to_string)
    }

    pub fn danger(&self, index: usize) -> bool {
        self.steps.get(index).is_some_and(|s| s.meta.danger)
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.steps.get(index).and_then(|s| s.meta.value.as_ref())
    }

    pub fn slot(&self, index: usize) -> Slot {
        Slot::new(self.danger(index), self.value(index).cloned())
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(db: &'a GraphDb, finding: Finding, config: EvaluatorConfig) -> Self {
        Self {
            db,
            finding,
            config,
            token: None,
        }
    }

    /// Poll `token` between paths.
    pub fn with_token(mut self, token: &'a CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn finding(&self) -> Finding {
        self.finding
    }

    pub fn db(&self) -> &'a GraphDb {
        self.db
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    fn cancelled(&self) -> bool {
        self.token.is_some_and(|t| t.is_cancelled())
    }

    /// True when some feasible path makes `sink` dangerous.
    pub fn evaluate_sink(&self, shard: &GraphShard, sink: NodeId, mode: SinkMode) -> bool {
        let search = backward_paths(&shard.graph, sink, self.config.bounds);
        if search.truncated {
            debug!(
                path = %shard.path,
                n_id = %sink,
                paths = search.paths.len(),
                "path enumeration truncated"
            );
        }
        for path in &search.paths {
            if self.cancelled() {
                debug!(path = %shard.path, n_id = %sink, "evaluation cancelled");
                return false;
            }
            let steps = match self.evaluate_path(shard, path) {
                Ok(steps) => steps,
                Err(e) if e.is_impossible_path() => {
                    trace!(path = %shard.path, n_id = %sink, "impossible path skipped");
                    continue;
                }
                Err(e) => {
                    debug!(path = %shard.path, n_id = %sink, reason = %e, "path abandoned");
                    continue;
                }
            };
            if sink_is_dangerous(&steps, sink, mode) {
                return true;
            }
        }
        false
    }

    /// The first value some feasible path gives `n_id`.
    pub fn evaluate_value(&self, shard: &GraphShard, n_id: NodeId) -> Option<Value> {
        let search = backward_paths(&shard.graph, n_id, self.config.bounds);
        search.paths.iter().find_map(|path| {
            if self.cancelled() {
                return None;
            }
            let steps = self.evaluate_path(shard, path).ok()?;
            sink_step(&steps, n_id).and_then(|s| s.meta.value.clone())
        })
    }

    /// Lower and fold one path of `shard`, at the top level.
    pub fn evaluate_path(
        &self,
        shard: &GraphShard,
        path: &[NodeId],
    ) -> Result<Vec<SyntaxStep>, EvaluationError> {
        self.fold(PathState::new(shard, &[], 0), path)
    }

    fn fold(&self, mut state: PathState<'_>, path: &[NodeId]) -> Result<Vec<SyntaxStep>, EvaluationError> {
        let shard = state.shard;
        for step in lower(&shard.graph, path) {
            state.steps.push(step);
            let index = state.steps.len() - 1;
            handlers::evaluate(self, &mut state, index)?;
        }
        Ok(state.steps)
    }

    /// Evaluate `method` of `shard` with `arguments` bound to its
    /// parameters, returning what its returns yield.
    ///
    /// A dangerous return wins over a known value; `None` when nothing
    /// could be evaluated or the depth bound is reached.
    pub(crate) fn inline(
        &self,
        shard: &GraphShard,
        method: NodeId,
        arguments: &[Slot],
        depth: u32,
    ) -> Option<Slot> {
        if depth >= self.config.max_inline_depth {
            trace!(path = %shard.path, n_id = %method, depth, "inline depth reached");
            return None;
        }
        let graph = &shard.graph;
        let returns: Vec<NodeId> = graph
            .descendants_of_kind(method, NodeKind::Return)
            .into_iter()
            .filter(|r| graph.enclosing_method(*r) == Some(method))
            .collect();

        let mut known: Option<Slot> = None;
        for ret in returns {
            let search = backward_paths(graph, ret, self.config.bounds);
            for path in &search.paths {
                if self.cancelled() {
                    return known;
                }
                let state = PathState::new(shard, arguments, depth + 1);
                let Ok(steps) = self.fold(state, path) else {
                    continue;
                };
                let Some(step) = sink_step(&steps, ret) else {
                    continue;
                };
                let slot = Slot::new(step.meta.danger, step.meta.value.clone());
                if slot.danger {
                    return Some(slot);
                }
                if known.as_ref().map_or(true, |k| k.value.is_none()) {
                    known = Some(slot);
                }
            }
        }
        known
    }
}

/// The last step lowered for `n_id`.
fn sink_step(steps: &[SyntaxStep], n_id: NodeId) -> Option<&SyntaxStep> {
    steps.iter().rev().find(|s| s.meta.n_id == n_id)
}

fn sink_is_dangerous(steps: &[SyntaxStep], sink: NodeId, mode: SinkMode) -> bool {
    let Some(step) = sink_step(steps, sink) else {
        return false;
    };
    match mode {
        SinkMode::Step => step.meta.danger,
        SinkMode::Arguments => {
            let deps = step.dependencies();
            let arguments = match step.kind {
                StepKind::MethodInvocationChain { .. } => &deps[..deps.len().saturating_sub(1)],
                _ => deps,
            };
            arguments
                .iter()
                .any(|d| steps.get(*d).is_some_and(|s| s.meta.danger))
        }
    }
}
