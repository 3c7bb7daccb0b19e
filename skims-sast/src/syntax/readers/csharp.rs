//! C# constructs the common readers do not cover.

use skims_core::errors::EvaluationError;

use super::common::{first_named, name_of};
use super::{missing, Dispatcher};
use crate::graph::{LiteralKind, NodeId};
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["interpolated_string_expression"],
        readers: &[interpolated_string],
    },
    Dispatcher {
        label_types: &["conditional_access_expression"],
        readers: &[conditional_access],
    },
    Dispatcher {
        label_types: &["await_expression", "checked_expression", "ref_expression"],
        readers: &[unwrap_inner],
    },
    Dispatcher {
        label_types: &["declaration_expression"],
        readers: &[declaration_expression],
    },
];

/// `$"...{x}..."` concatenates its text and holes.
fn interpolated_string(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let holes: Vec<NodeId> = graph
        .named_children(n_id)
        .filter(|c| graph.label_type(*c) == "interpolation")
        .filter_map(|c| first_named(graph, c))
        .collect();
    if holes.is_empty() {
        let value = graph.source_text(n_id);
        return Ok(lw.push(
            n_id,
            StepKind::Literal {
                value: value.trim_start_matches('$').to_string(),
                value_type: LiteralKind::String,
            },
            [],
        ));
    }
    let deps = lw.exprs(holes)?;
    Ok(lw.push(
        n_id,
        StepKind::BinaryExpression {
            operator: "+".to_string(),
        },
        deps,
    ))
}

/// `a?.B`: the receiver guards a member binding.
fn conditional_access(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let receiver = graph
        .child_by_field(n_id, "condition")
        .or_else(|| first_named(graph, n_id))
        .ok_or_else(|| missing("conditional_access", n_id))?;
    let member = graph
        .named_children(n_id)
        .find(|c| graph.label_type(*c) == "member_binding_expression")
        .and_then(|b| name_of(graph, b))
        .ok_or_else(|| missing("conditional_access", n_id))?;
    let expression = graph.source_text(receiver);
    let dep = lw.expr(receiver)?;
    Ok(lw.push(
        n_id,
        StepKind::MemberAccessExpression { member, expression },
        [dep],
    ))
}

fn unwrap_inner(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let inner = graph
        .named_children(n_id)
        .last()
        .ok_or_else(|| missing("unwrap_inner", n_id))?;
    lw.expr(inner)
}

/// `out var x` declares `x` with no value.
fn declaration_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let var = graph
        .child_by_field(n_id, "name")
        .map(|n| graph.source_text(n))
        .ok_or_else(|| missing("declaration_expression", n_id))?;
    let var_type = graph.child_by_field(n_id, "type").map(|t| graph.source_text(t));
    Ok(lw.push(
        n_id,
        StepKind::Declaration {
            var,
            var_type,
            is_parameter: false,
            annotations: Vec::new(),
        },
        [],
    ))
}
