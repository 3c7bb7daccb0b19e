//! JavaScript and TypeScript constructs the common readers do not cover.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;

use super::common::first_named;
use super::{missing, Dispatcher};
use crate::graph::{LiteralKind, NodeId};
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["template_string"],
        readers: &[template_string],
    },
    Dispatcher {
        label_types: &["object"],
        readers: &[object],
    },
    Dispatcher {
        label_types: &["spread_element", "non_null_expression", "satisfies_expression"],
        readers: &[unwrap_first],
    },
    Dispatcher {
        label_types: &["sequence_expression"],
        readers: &[sequence_expression],
    },
];

/// Template literals with substitutions concatenate them; plain ones
/// stay literals.
fn template_string(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let substitutions: Vec<NodeId> = graph
        .named_children(n_id)
        .filter(|c| graph.label_type(*c) == "template_substitution")
        .filter_map(|c| first_named(graph, c))
        .collect();
    if substitutions.is_empty() {
        return Err(missing("template_string", n_id));
    }
    let deps = lw.exprs(substitutions)?;
    Ok(lw.push(
        n_id,
        StepKind::BinaryExpression {
            operator: "+".to_string(),
        },
        deps,
    ))
}

/// Object literals carry the danger of their values.
fn object(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let values: Vec<NodeId> = graph
        .named_children(n_id)
        .filter_map(|c| match graph.label_type(c) {
            "pair" => graph.child_by_field(c, "value"),
            "shorthand_property_identifier" | "spread_element" => Some(c),
            _ => None,
        })
        .collect();
    let mut deps = Deps::new();
    for value in values {
        if graph.label_type(value) == "shorthand_property_identifier" {
            let symbol = graph.source_text(value);
            deps.push(lw.push(value, StepKind::SymbolLookup { symbol }, []));
        } else {
            deps.push(lw.expr(value)?);
        }
    }
    if deps.is_empty() {
        let value = graph.source_text(n_id);
        return Ok(lw.push(
            n_id,
            StepKind::Literal {
                value,
                value_type: LiteralKind::String,
            },
            [],
        ));
    }
    Ok(lw.push(n_id, StepKind::ArrayInitialization, deps))
}

fn unwrap_first(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let inner = first_named(lw.graph(), n_id).ok_or_else(|| missing("unwrap_first", n_id))?;
    lw.expr(inner)
}

/// `a, b`: every part runs, the last one is the value.
fn sequence_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let parts: Vec<NodeId> = graph.named_children(n_id).collect();
    let indices = lw.exprs(parts)?;
    indices
        .last()
        .copied()
        .ok_or_else(|| missing("sequence_expression", n_id))
}
