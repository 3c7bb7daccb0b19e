//! Kotlin constructs the common readers do not cover.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;

use super::common::{declared_type, first_named, pair_declarations, NAME_LABELS};
use super::{missing, Dispatcher};
use crate::graph::{LiteralKind, NodeId};
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["property_declaration"],
        readers: &[property_declaration],
    },
    Dispatcher {
        label_types: &["jump_expression"],
        readers: &[jump_expression],
    },
    Dispatcher {
        label_types: &["line_string_literal", "multi_line_string_literal"],
        readers: &[string_template],
    },
    Dispatcher {
        label_types: &["when_subject", "parenthesized_expression"],
        readers: &[unwrap_first],
    },
];

/// `val name: Type = value`.
fn property_declaration(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let declaration = graph
        .named_children(n_id)
        .find(|c| {
            matches!(
                graph.label_type(*c),
                "variable_declaration" | "multi_variable_declaration"
            )
        })
        .ok_or_else(|| missing("property_declaration", n_id))?;
    let names: Vec<(NodeId, String)> = if graph.label_type(declaration) == "variable_declaration" {
        graph
            .named_children(declaration)
            .find(|c| NAME_LABELS.contains(&graph.label_type(*c)))
            .map(|n| (n_id, graph.source_text(n)))
            .into_iter()
            .collect()
    } else {
        graph
            .named_children(declaration)
            .filter_map(|d| first_named(graph, d).map(|n| (d, graph.source_text(n))))
            .collect()
    };
    let var_type = if graph.label_type(declaration) == "variable_declaration" {
        declared_type(graph, declaration)
    } else {
        None
    };
    let value = graph
        .named_children(n_id)
        .filter(|c| {
            *c != declaration
                && !matches!(
                    graph.label_type(*c),
                    "modifiers" | "binding_pattern_kind" | "type_constraints"
                )
        })
        .last();
    let values: Deps<usize> = match value {
        Some(value) => Deps::from_elem(lw.expr(value)?, 1),
        None => Deps::new(),
    };
    pair_declarations(lw, &names, &values, var_type)
        .ok_or_else(|| missing("property_declaration", n_id))
}

/// Only `return` carries a value; `break` and `continue` do nothing here.
fn jump_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let is_return = graph
        .text(n_id)
        .or_else(|| graph.children(n_id).first().and_then(|c| graph.text(*c)))
        .is_some_and(|t| t.starts_with("return"));
    if !is_return {
        return Ok(lw.push(n_id, StepKind::NoOp, []));
    }
    let deps: Deps<usize> = match first_named(graph, n_id) {
        Some(value) => Deps::from_elem(lw.expr(value)?, 1),
        None => Deps::new(),
    };
    Ok(lw.push(n_id, StepKind::Return, deps))
}

/// `"a $b ${c}"` concatenates its interpolations.
fn string_template(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let holes: Vec<NodeId> = graph
        .named_children(n_id)
        .filter_map(|c| match graph.label_type(c) {
            "interpolated_identifier" => Some(c),
            "interpolated_expression" => first_named(graph, c),
            _ => None,
        })
        .collect();
    if holes.is_empty() {
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
    let mut deps = Deps::new();
    for hole in holes {
        if graph.label_type(hole) == "interpolated_identifier" {
            let symbol = graph.source_text(hole);
            deps.push(lw.push(hole, StepKind::SymbolLookup { symbol }, []));
        } else {
            deps.push(lw.expr(hole)?);
        }
    }
    Ok(lw.push(
        n_id,
        StepKind::BinaryExpression {
            operator: "+".to_string(),
        },
        deps,
    ))
}

fn unwrap_first(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let inner = graph
        .named_children(n_id)
        .find(|c| graph.label_type(*c) != "variable_declaration")
        .ok_or_else(|| missing("unwrap_first", n_id))?;
    lw.expr(inner)
}
