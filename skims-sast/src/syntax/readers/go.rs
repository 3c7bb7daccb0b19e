//! Go constructs the common readers do not cover.

use skims_core::errors::EvaluationError;

use super::common::{first_named, strip_receiver};
use super::{missing, Dispatcher};
use crate::graph::{LiteralKind, NodeId};
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

pub static DISPATCHERS: &[Dispatcher] = &[
    Dispatcher {
        label_types: &["inc_statement", "dec_statement"],
        readers: &[step_statement],
    },
    Dispatcher {
        label_types: &["go_statement", "defer_statement"],
        readers: &[deferred_call],
    },
    Dispatcher {
        label_types: &["expression_list"],
        readers: &[expression_list],
    },
];

/// `x++` is `x = x + 1`.
fn step_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let target = first_named(graph, n_id).ok_or_else(|| missing("step_statement", n_id))?;
    let var = strip_receiver(&graph.source_text(target)).to_string();
    let operator = if graph.label_type(n_id) == "inc_statement" {
        "+"
    } else {
        "-"
    };
    let current = lw.push(target, StepKind::SymbolLookup { symbol: var.clone() }, []);
    let one = lw.push(
        n_id,
        StepKind::Literal {
            value: "1".to_string(),
            value_type: LiteralKind::Number,
        },
        [],
    );
    let sum = lw.push(
        n_id,
        StepKind::BinaryExpression {
            operator: operator.to_string(),
        },
        [current, one],
    );
    Ok(lw.push(n_id, StepKind::Assignment { var }, [sum]))
}

fn deferred_call(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let call = first_named(lw.graph(), n_id).ok_or_else(|| missing("deferred_call", n_id))?;
    lw.expr(call)
}

fn expression_list(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let items: Vec<NodeId> = graph.named_children(n_id).collect();
    let indices = lw.exprs(items)?;
    indices
        .last()
        .copied()
        .ok_or_else(|| missing("expression_list", n_id))
}
