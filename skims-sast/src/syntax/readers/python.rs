//! Python constructs the common readers do not cover.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;

use super::common::first_named;
use super::{missing, Dispatcher};
use crate::graph::NodeId;
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["keyword_argument"],
        readers: &[keyword_argument],
    },
    Dispatcher {
        label_types: &["dictionary", "set", "tuple"],
        readers: &[collection],
    },
    Dispatcher {
        label_types: &["string"],
        readers: &[interpolated_string],
    },
    Dispatcher {
        label_types: &["await", "list_splat", "dictionary_splat"],
        readers: &[unwrap_first],
    },
];

/// `f(name=value)` passes `value` positionally.
fn keyword_argument(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let value = graph
        .child_by_field(n_id, "value")
        .ok_or_else(|| missing("keyword_argument", n_id))?;
    lw.expr(value)
}

fn collection(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let items: Vec<NodeId> = graph
        .named_children(n_id)
        .filter_map(|c| {
            if graph.label_type(c) == "pair" {
                graph.child_by_field(c, "value")
            } else {
                Some(c)
            }
        })
        .collect();
    let deps = lw.exprs(items)?;
    Ok(lw.push(n_id, StepKind::ArrayInitialization, deps))
}

/// f-strings concatenate their interpolations; other strings are literals.
fn interpolated_string(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let holes: Vec<NodeId> = graph
        .named_children(n_id)
        .filter(|c| graph.label_type(*c) == "interpolation")
        .filter_map(|c| graph.child_by_field(c, "expression").or_else(|| first_named(graph, c)))
        .collect();
    if holes.is_empty() {
        return Err(missing("interpolated_string", n_id));
    }
    let deps: Deps<usize> = lw.exprs(holes)?;
    Ok(lw.push(
        n_id,
        StepKind::BinaryExpression {
            operator: "+".to_string(),
        },
        deps,
    ))
}

fn unwrap_first(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let inner = first_named(lw.graph(), n_id).ok_or_else(|| missing("unwrap_first", n_id))?;
    lw.expr(inner)
}
