//! Per-step evaluation: sets `danger` and `value` of one step from the
//! steps it depends on.

use skims_core::errors::EvaluationError;

use super::evaluator::{Evaluator, PathState};
use super::method;
use super::tables::{self, Instantiation};
use crate::graph::{NodeId, NodeKind};
use crate::metadata::types::is_dotted_suffix;
use crate::syntax::{type_base, Slot, StepKind, Value};

/// Evaluate the step at `index`; every dependency is already evaluated.
pub(crate) fn evaluate(
    ev: &Evaluator<'_>,
    state: &mut PathState<'_>,
    index: usize,
) -> Result<(), EvaluationError> {
    let step = &state.steps[index];
    let n_id = step.meta.n_id;
    let deps: Vec<usize> = step.dependencies().to_vec();
    let any_danger = deps.iter().any(|d| state.danger(*d));
    let kind = step.kind.clone();

    let (danger, value) = match kind {
        StepKind::Assignment { .. } => {
            let value = match deps[..] {
                [single] => state.value(single).cloned(),
                _ => None,
            };
            (any_danger, value)
        }
        StepKind::ArrayAccess => array_access(state, &deps),
        StepKind::ArrayInitialization => {
            let items = deps.iter().map(|d| state.slot(*d)).collect();
            (any_danger, Some(Value::List(items)))
        }
        StepKind::ArrayInstantiation | StepKind::For | StepKind::NoOp => (any_danger, None),
        StepKind::BinaryExpression { operator } => {
            let value = match deps[..] {
                [left, right] => binary(&operator, state.value(left), state.value(right)),
                _ => None,
            };
            (any_danger, value)
        }
        StepKind::UnaryExpression { operator } => {
            let value = deps
                .first()
                .and_then(|d| state.value(*d))
                .and_then(|v| unary(&operator, v));
            (any_danger, value)
        }
        StepKind::CastExpression { .. } | StepKind::ParenthesizedExpression => {
            (any_danger, deps.first().and_then(|d| state.value(*d).cloned()))
        }
        StepKind::CatchClause { .. } => (false, None),
        StepKind::Declaration {
            var,
            var_type,
            is_parameter,
            annotations,
        } => declaration(ev, state, &deps, &var, var_type.as_deref(), is_parameter, &annotations),
        StepKind::If {
            n_id_true,
            n_id_false,
            next,
        } => {
            let condition = deps.first().and_then(|d| state.value(*d)).and_then(Value::as_bool);
            if let (Some(condition), Some(next)) = (condition, next) {
                let (taken, other) = if condition {
                    (n_id_true, n_id_false)
                } else {
                    (n_id_false, n_id_true)
                };
                if other == Some(next) && taken != Some(next) {
                    return Err(EvaluationError::ImpossiblePath { n_id: n_id.0 });
                }
            }
            (any_danger, None)
        }
        StepKind::InstanceofExpression { instance_type } => {
            let value = match deps.first().and_then(|d| state.value(*d)) {
                Some(Value::Instance(class)) => {
                    Some(Value::Bool(is_dotted_suffix(class, type_base(&instance_type))))
                }
                _ => None,
            };
            (false, value)
        }
        StepKind::Literal { value, value_type } => (false, Value::from_literal(&value, value_type)),
        StepKind::MemberAccessExpression { member, expression } => {
            member_access(state, index, &deps, &member, &expression)
        }
        StepKind::MethodInvocation { .. } | StepKind::MethodInvocationChain { .. } => {
            return method::evaluate(ev, state, index);
        }
        StepKind::ObjectInstantiation { object_type } => {
            object_instantiation(ev, state, &deps, &object_type, any_danger)
        }
        StepKind::Return => (any_danger, deps.first().and_then(|d| state.value(*d).cloned())),
        StepKind::SymbolLookup { symbol } => match state.definition(&symbol, index) {
            Some(def) => (state.danger(def), state.value(def).cloned()),
            None => (false, None),
        },
        StepKind::Switch { .. } => {
            state.switch_value = deps.first().and_then(|d| state.value(*d).cloned());
            (any_danger, None)
        }
        StepKind::SwitchLabelCase => {
            if let Some(subject) = state.switch_value.take() {
                let matched = deps
                    .iter()
                    .map(|d| state.value(*d))
                    .collect::<Option<Vec<&Value>>>()
                    .filter(|labels| !labels.is_empty())
                    .map(|labels| labels.iter().any(|l| same_value(l, &subject)));
                match matched {
                    Some(false) => return Err(EvaluationError::ImpossiblePath { n_id: n_id.0 }),
                    Some(true) => {}
                    // unknown label values: keep the subject for the next case
                    None => state.switch_value = Some(subject),
                }
            }
            (false, None)
        }
        StepKind::SwitchLabelDefault => {
            state.switch_value = None;
            (false, None)
        }
        StepKind::Ternary => ternary(state, &deps),
        StepKind::This => (false, enclosing_class(state, n_id).map(Value::Instance)),
    };

    let meta = &mut state.steps[index].meta;
    meta.danger = danger;
    meta.value = value;
    Ok(())
}

fn declaration(
    ev: &Evaluator<'_>,
    state: &mut PathState<'_>,
    deps: &[usize],
    var: &str,
    var_type: Option<&str>,
    is_parameter: bool,
    annotations: &[String],
) -> (bool, Option<Value>) {
    if is_parameter {
        if matches!(var, "self" | "cls") {
            return (false, None);
        }
        if state.is_inlined() {
            let bound = state.bindings.get(state.params_bound).cloned();
            state.params_bound += 1;
            if let Some(slot) = bound {
                return (slot.danger, slot.value);
            }
            return (false, None);
        }
        let annotated = annotations.iter().any(|a| tables::is_tainted_annotation(a));
        let tainted =
            ev.finding().distrusts_request_bindings() && (annotated || bound_from_request(var_type));
        return (tainted, None);
    }
    let bind_danger = ev.finding().distrusts_request_bindings() && bound_from_request(var_type);
    let danger = bind_danger || deps.iter().any(|d| state.danger(*d));
    let value = match deps {
        [single] => state.value(*single).cloned(),
        _ => None,
    };
    (danger, value)
}

fn bound_from_request(var_type: Option<&str>) -> bool {
    var_type.is_some_and(|t| tables::is_tainted_type(type_base(t)))
}

fn array_access(state: &PathState<'_>, deps: &[usize]) -> (bool, Option<Value>) {
    let Some((array, indices)) = deps.split_first() else {
        return (false, None);
    };
    let element = match (state.value(*array), indices.first().and_then(|i| state.value(*i))) {
        (Some(Value::List(items)), Some(Value::Number(n))) if *n >= 0.0 => {
            items.get(*n as usize).cloned()
        }
        (Some(Value::Dict(entries)), Some(key)) => Some(entries.get(&key.key()).cloned().unwrap_or_default()),
        (Some(Value::Str(s)), Some(Value::Number(n))) if *n >= 0.0 => s
            .chars()
            .nth(*n as usize)
            .map(|c| Slot::new(state.danger(*array), Some(Value::Str(c.to_string())))),
        _ => None,
    };
    match element {
        Some(slot) => (slot.danger, slot.value),
        None => (state.danger(*array), None),
    }
}

fn member_access(
    state: &PathState<'_>,
    index: usize,
    deps: &[usize],
    member: &str,
    expression: &str,
) -> (bool, Option<Value>) {
    if let Some(def) = state.definition(&format!("{expression}.{member}"), index) {
        return (state.danger(def), state.value(def).cloned());
    }
    let Some(object) = deps.first() else {
        return (false, None);
    };
    match state.value(*object) {
        Some(Value::Dict(entries)) => {
            let slot = entries.get(member).cloned().unwrap_or_default();
            (slot.danger, slot.value)
        }
        Some(Value::List(items)) if member == "length" || member == "size" => {
            (state.danger(*object), Some(Value::Number(items.len() as f64)))
        }
        Some(Value::Str(s)) if member == "length" => {
            (state.danger(*object), Some(Value::Number(s.chars().count() as f64)))
        }
        _ => (state.danger(*object), None),
    }
}

const MAP_TYPES: [&str; 8] = [
    "Map",
    "HashMap",
    "LinkedHashMap",
    "TreeMap",
    "Hashtable",
    "Dictionary",
    "Properties",
    "dict",
];

const LIST_TYPES: [&str; 7] = [
    "List",
    "ArrayList",
    "LinkedList",
    "Vector",
    "Stack",
    "Array",
    "list",
];

fn object_instantiation(
    ev: &Evaluator<'_>,
    state: &PathState<'_>,
    deps: &[usize],
    object_type: &str,
    any_danger: bool,
) -> (bool, Option<Value>) {
    let written = type_base(object_type).trim_start_matches("new ").trim();
    let danger = match tables::instantiation(ev.finding(), written) {
        Some(Instantiation::Always) => true,
        Some(Instantiation::Sanitizer) => false,
        Some(Instantiation::WithDangerousArgs) | None => any_danger,
    };
    let simple = written.rsplit('.').next().unwrap_or(written);
    let value = if let Some((qualified, _)) = ev.db().context().class(written) {
        Some(Value::Instance(qualified.to_string()))
    } else if MAP_TYPES.contains(&simple) {
        Some(Value::Dict(Default::default()))
    } else if LIST_TYPES.contains(&simple) {
        Some(Value::List(Vec::new()))
    } else if matches!(simple, "String" | "StringBuilder" | "StringBuffer") {
        deps.first().and_then(|d| state.value(*d).cloned())
    } else {
        None
    };
    (danger, value)
}

fn ternary(state: &PathState<'_>, deps: &[usize]) -> (bool, Option<Value>) {
    let [condition, consequence, alternative] = deps[..] else {
        return (deps.iter().any(|d| state.danger(*d)), None);
    };
    match state.value(condition).and_then(Value::as_bool) {
        Some(true) => (state.danger(consequence), state.value(consequence).cloned()),
        Some(false) => (state.danger(alternative), state.value(alternative).cloned()),
        None => {
            let danger = state.danger(consequence) || state.danger(alternative);
            let value = match (state.value(consequence), state.value(alternative)) {
                (Some(a), Some(b)) if a == b => Some(a.clone()),
                _ => None,
            };
            (danger, value)
        }
    }
}

/// Qualified name of the class around `n_id`.
fn enclosing_class(state: &PathState<'_>, n_id: NodeId) -> Option<String> {
    let graph = &state.shard.graph;
    let class = graph.lookup_first_of_kind(n_id, NodeKind::Class)?;
    state
        .shard
        .metadata
        .classes
        .iter()
        .find(|(_, info)| info.n_id == class)
        .map(|(qualified, _)| qualified.clone())
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => a.key() == b.key(),
    }
}

/// Constant folding for the operators whose result is worth tracking.
pub(crate) fn binary(operator: &str, left: Option<&Value>, right: Option<&Value>) -> Option<Value> {
    let (left, right) = (left?, right?);
    let numbers = left.as_number().zip(right.as_number());
    let bools = left.as_bool().zip(right.as_bool());
    match operator {
        "+" => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Some(Value::Number(a + b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => Some(Value::Str(format!("{left}{right}"))),
            _ => None,
        },
        "-" => numbers.map(|(a, b)| Value::Number(a - b)),
        "*" => numbers.map(|(a, b)| Value::Number(a * b)),
        "/" => numbers.filter(|(_, b)| *b != 0.0).map(|(a, b)| Value::Number(a / b)),
        "%" => numbers.filter(|(_, b)| *b != 0.0).map(|(a, b)| Value::Number(a % b)),
        "==" | "===" | "is" => Some(Value::Bool(same_value(left, right))),
        "!=" | "!==" | "is not" => Some(Value::Bool(!same_value(left, right))),
        "<" => numbers.map(|(a, b)| Value::Bool(a < b)),
        ">" => numbers.map(|(a, b)| Value::Bool(a > b)),
        "<=" => numbers.map(|(a, b)| Value::Bool(a <= b)),
        ">=" => numbers.map(|(a, b)| Value::Bool(a >= b)),
        "&&" | "and" => bools.map(|(a, b)| Value::Bool(a && b)),
        "||" | "or" => bools.map(|(a, b)| Value::Bool(a || b)),
        _ => None,
    }
}

fn unary(operator: &str, operand: &Value) -> Option<Value> {
    match (operator.trim(), operand) {
        ("!" | "not", Value::Bool(b)) => Some(Value::Bool(!b)),
        ("-", Value::Number(n)) => Some(Value::Number(-n)),
        ("+", Value::Number(n)) => Some(Value::Number(*n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_arithmetic_and_concatenation() {
        let two = Value::Number(2.0);
        let three = Value::Number(3.0);
        assert_eq!(binary("+", Some(&two), Some(&three)), Some(Value::Number(5.0)));
        assert_eq!(
            binary("+", Some(&Value::Str("ls ".into())), Some(&three)),
            Some(Value::Str("ls 3".into()))
        );
        assert_eq!(binary("/", Some(&two), Some(&Value::Number(0.0))), None);
        assert_eq!(binary("+", Some(&two), None), None);
    }

    #[test]
    fn folds_comparisons_and_logic() {
        let a = Value::Str("a".into());
        assert_eq!(binary("==", Some(&a), Some(&a)), Some(Value::Bool(true)));
        assert_eq!(
            binary("<", Some(&Value::Number(1.0)), Some(&Value::Number(2.0))),
            Some(Value::Bool(true))
        );
        assert_eq!(
            binary("&&", Some(&Value::Bool(true)), Some(&Value::Bool(false))),
            Some(Value::Bool(false))
        );
        assert_eq!(unary("!", &Value::Bool(false)), Some(Value::Bool(true)));
        assert_eq!(unary("-", &Value::Number(4.0)), Some(Value::Number(-4.0)));
    }
}
