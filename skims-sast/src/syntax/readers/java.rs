//! Java constructs the common readers do not cover.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;

use super::common::{arguments, arguments_of, first_named};
use super::{missing, Dispatcher};
use crate::graph::{LiteralKind, NodeId};
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["resource"],
        readers: &[resource],
    },
    Dispatcher {
        label_types: &["explicit_constructor_invocation"],
        readers: &[explicit_constructor_invocation],
    },
    Dispatcher {
        label_types: &["class_literal"],
        readers: &[class_literal],
    },
    Dispatcher {
        label_types: &["yield_statement"],
        readers: &[yield_statement],
    },
    Dispatcher {
        label_types: &["assert_statement"],
        readers: &[assert_statement],
    },
    Dispatcher {
        label_types: &["method_reference"],
        readers: &[method_reference],
    },
];

/// `try (Type name = value)`.
fn resource(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let (Some(name), Some(value)) = (
        graph.child_by_field(n_id, "name"),
        graph.child_by_field(n_id, "value"),
    ) else {
        // a bare variable reused as a resource
        let inner = first_named(graph, n_id).ok_or_else(|| missing("resource", n_id))?;
        return lw.expr(inner);
    };
    let var_type = graph.child_by_field(n_id, "type").map(|t| graph.source_text(t));
    let dep = lw.expr(value)?;
    Ok(lw.push(
        n_id,
        StepKind::Declaration {
            var: graph.source_text(name),
            var_type,
            is_parameter: false,
            annotations: Vec::new(),
        },
        [dep],
    ))
}

/// `this(...)` or `super(...)` inside a constructor.
fn explicit_constructor_invocation(
    lw: &mut Lowerer<'_>,
    n_id: NodeId,
) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let method = graph
        .child_by_field(n_id, "constructor")
        .map(|c| graph.source_text(c))
        .unwrap_or_else(|| "super".to_string());
    let deps = arguments(lw, arguments_of(graph, n_id))?;
    Ok(lw.push(n_id, StepKind::MethodInvocation { method }, deps))
}

fn class_literal(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let value = lw.graph().source_text(n_id);
    Ok(lw.push(
        n_id,
        StepKind::Literal {
            value,
            value_type: LiteralKind::String,
        },
        [],
    ))
}

fn yield_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let deps: Deps<usize> = match first_named(graph, n_id) {
        Some(value) => Deps::from_elem(lw.expr(value)?, 1),
        None => Deps::new(),
    };
    Ok(lw.push(n_id, StepKind::Return, deps))
}

fn assert_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let condition = first_named(graph, n_id).ok_or_else(|| missing("assert_statement", n_id))?;
    let dep = lw.expr(condition)?;
    Ok(lw.push(n_id, StepKind::NoOp, [dep]))
}

/// `Type::method` evaluates to the referenced method, not a call.
fn method_reference(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let symbol = lw.graph().source_text(n_id);
    Ok(lw.push(n_id, StepKind::SymbolLookup { symbol }, []))
}
