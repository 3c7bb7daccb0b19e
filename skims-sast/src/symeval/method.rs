//! Method calls.
//!
//! A call is matched against the lookup tables first, in a fixed order
//! where the first rule that applies decides the danger. Calls no table
//! knows are inlined when the callee is declared in the analyzed sources.
//! Container operations on tracked values run last and may refine the
//! result with the danger of the element they return.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;
use tracing::trace;

use super::evaluator::{Evaluator, PathState};
use super::tables::{self, MethodSet, TypeTable};
use crate::graph::{NodeId, NodeKind};
use crate::metadata::method_name;
use crate::syntax::{type_base, Slot, StepKind, Value};

/// Methods through which a receiver's danger reaches the result.
const STRING_TRANSFORMS: [&str; 20] = [
    "trim",
    "strip",
    "toLowerCase",
    "toUpperCase",
    "lower",
    "upper",
    "ToLower",
    "ToUpper",
    "Trim",
    "substring",
    "concat",
    "replace",
    "replaceAll",
    "toString",
    "ToString",
    "getBytes",
    "split",
    "format",
    "append",
    "intern",
];

/// A call, resolved against the fold state.
struct Call {
    n_id: NodeId,
    method: String,
    /// Receiver variable (`request` in `request.getParameter`).
    var: Option<String>,
    /// Method path after the receiver variable.
    path: String,
    /// Computed receiver of a chained call.
    receiver: Option<usize>,
    arguments: Deps<usize>,
    /// Latest step defining `var`.
    definition: Option<usize>,
    var_type: Option<String>,
}

impl Call {
    fn resolve(state: &PathState<'_>, index: usize) -> Option<Self> {
        let step = state.steps.get(index)?;
        let (method, chained) = match &step.kind {
            StepKind::MethodInvocation { method } => (method.clone(), false),
            StepKind::MethodInvocationChain { method } => (method.clone(), true),
            _ => return None,
        };
        let deps = step.dependencies();
        let (arguments, receiver) = match (chained, deps.split_last()) {
            (true, Some((receiver, arguments))) => (arguments.iter().copied().collect(), Some(*receiver)),
            _ => (deps.iter().copied().collect(), None),
        };
        let (var, path) = match method.split_once('.') {
            Some((var, path)) => (Some(var.to_string()), path.to_string()),
            None => (None, method.clone()),
        };
        let definition = var.as_deref().and_then(|v| state.definition(v, index));

        let mut call = Self {
            n_id: step.meta.n_id,
            method,
            var,
            path,
            receiver,
            arguments,
            definition,
            var_type: None,
        };
        call.var_type = call.resolve_type(state, index);
        Some(call)
    }

    fn resolve_type(&self, state: &PathState<'_>, index: usize) -> Option<String> {
        if let Some(var) = self.var.as_deref() {
            if let Some(declared) = state.declared_type(var, index) {
                return Some(declared);
            }
            if let Some(Value::Instance(class)) = self.definition.and_then(|d| state.value(d)) {
                return Some(class.clone());
            }
            if let Some(field) = field_type(state, self.n_id, var) {
                return Some(field);
            }
            // a static type or module name used as the receiver
            return Some(var.to_string());
        }
        let receiver = self.receiver?;
        match (&state.steps.get(receiver)?.kind, state.value(receiver)) {
            (StepKind::ObjectInstantiation { object_type }, _) => Some(type_base(object_type).to_string()),
            (_, Some(Value::Instance(class))) => Some(class.clone()),
            _ => None,
        }
    }

    /// Names the method-set tables are looked up by.
    fn keys(&self) -> Deps<String> {
        let mut keys = Deps::new();
        keys.push(self.method.clone());
        if let Some(var_type) = &self.var_type {
            let qualified = format!("{var_type}.{}", self.path);
            if qualified != self.method {
                keys.push(qualified);
            }
        }
        keys
    }

    fn is_local(&self) -> bool {
        self.receiver.is_none() && self.var.is_none()
    }

    fn last_segment(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

pub(crate) fn evaluate(
    ev: &Evaluator<'_>,
    state: &mut PathState<'_>,
    index: usize,
) -> Result<(), EvaluationError> {
    let Some(call) = Call::resolve(state, index) else {
        return Ok(());
    };

    let (mut danger, mut value) = match apply_tables(ev, state, &call) {
        Some(danger) => (danger, None),
        None => resolve_callee(ev, state, &call),
    };

    if let Some(slot) = container_operation(state, &call) {
        danger = slot.danger;
        value = slot.value;
    }

    let meta = &mut state.steps[index].meta;
    meta.danger = danger;
    meta.value = value;
    Ok(())
}

/// Table rules, in precedence order. `None` when no table knows the call.
fn apply_tables(ev: &Evaluator<'_>, state: &mut PathState<'_>, call: &Call) -> Option<bool> {
    let finding = ev.finding();
    let keys = call.keys();
    let in_set = |set: &MethodSet| keys.iter().any(|k| set.contains(k));
    let typed = |table: &TypeTable| {
        call.var_type
            .as_deref()
            .is_some_and(|t| table.contains(t, &call.path))
    };
    let args_danger = call.arguments.iter().any(|a| state.danger(*a));
    let receiver_danger = call.receiver.is_some_and(|r| state.danger(r));
    let var_danger = call.definition.is_some_and(|d| state.danger(d));
    let any_danger = args_danger || receiver_danger;

    if in_set(tables::static_finding(finding)) {
        return Some(true);
    }
    if in_set(tables::static_side_effects(finding)) {
        for argument in call.arguments.clone() {
            mark_source(state, argument);
        }
        return Some(false);
    }
    let no_type = tables::by_obj_no_type_args_propagation(finding);
    if any_danger && (no_type.contains(&call.path) || no_type.contains(&call.method)) {
        return Some(true);
    }
    if args_danger {
        if typed(tables::by_type_args_propagation()) {
            if let Some(definition) = call.definition {
                state.steps[definition].meta.danger = true;
            }
            return Some(true);
        }
        if typed(tables::by_type_args_propagation_finding(finding)) {
            return Some(true);
        }
    }
    if (var_danger || receiver_danger) && typed(tables::by_obj()) {
        return Some(true);
    }
    if any_danger && typed(tables::by_obj_args()) {
        return Some(true);
    }
    if let Some(expected) = call
        .var_type
        .as_deref()
        .and_then(|t| tables::by_type_and_value(finding).values(t, &call.path))
    {
        let actual: Option<Vec<String>> = call
            .arguments
            .iter()
            .map(|a| state.value(*a).map(Value::key))
            .collect();
        let matches = actual.is_some_and(|values| {
            !values.is_empty()
                && values
                    .iter()
                    .all(|v| expected.iter().any(|e| e.eq_ignore_ascii_case(v)))
        });
        if matches {
            if let Some(definition) = call.definition {
                state.steps[definition].meta.danger = true;
            }
            return Some(true);
        }
    }
    if args_danger && in_set(tables::by_args_propagation()) {
        return Some(true);
    }
    if finding.is_injection() && typed(tables::by_type()) {
        return Some(true);
    }
    None
}

/// Mark an argument, and the variable it reads, as dangerous.
fn mark_source(state: &mut PathState<'_>, argument: usize) {
    let definition = match state.steps.get(argument).map(|s| &s.kind) {
        Some(StepKind::SymbolLookup { symbol }) => state.definition(symbol, argument),
        _ => None,
    };
    for index in std::iter::once(argument).chain(definition) {
        if let Some(step) = state.steps.get_mut(index) {
            step.meta.danger = true;
        }
    }
}

/// Declared type of a field of the class around `n_id`.
fn field_type(state: &PathState<'_>, n_id: NodeId, field: &str) -> Option<String> {
    let class = state.shard.graph.lookup_first_of_kind(n_id, NodeKind::Class)?;
    state
        .shard
        .metadata
        .classes
        .values()
        .find(|info| info.n_id == class)?
        .fields
        .get(field)
        .map(|f| type_base(&f.declared_type).to_string())
}

/// Calls no table knows: inline a declared callee, else let receiver
/// danger flow through string transforms.
fn resolve_callee(ev: &Evaluator<'_>, state: &PathState<'_>, call: &Call) -> (bool, Option<Value>) {
    let arguments: Vec<Slot> = call.arguments.iter().map(|a| state.slot(*a)).collect();

    if call.is_local() {
        if let Some(method) = local_method(state, call.n_id, &call.path, arguments.len()) {
            trace!(path = %state.shard.path, method = %call.method, "inlining local method");
            if let Some(slot) = ev.inline(state.shard, method, &arguments, state.depth) {
                return (slot.danger, slot.value);
            }
        }
    } else if let Some(var_type) = call.var_type.as_deref().filter(|_| !call.path.contains('.')) {
        let context = ev.db().context();
        if let Some(decl) = context.methods(var_type, &call.path).first() {
            if let Some(shard) = ev.db().shard_at(decl.shard) {
                trace!(path = %shard.path, method = %call.method, "inlining external method");
                if let Some(slot) = ev.inline(shard, decl.n_id, &arguments, state.depth) {
                    return (slot.danger, slot.value);
                }
            }
        }
    }

    let source = call.receiver.or(call.definition);
    if STRING_TRANSFORMS.contains(&call.last_segment()) {
        if let Some(source) = source {
            let value = state
                .value(source)
                .and_then(|v| transform(call.last_segment(), v));
            return (state.danger(source), value);
        }
    }
    (false, None)
}

/// Fold case transforms on known strings.
fn transform(method: &str, value: &Value) -> Option<Value> {
    let text = value.as_str()?;
    let out = match method {
        "trim" | "strip" | "Trim" => text.trim().to_string(),
        "toLowerCase" | "lower" | "ToLower" => text.to_lowercase(),
        "toUpperCase" | "upper" | "ToUpper" => text.to_uppercase(),
        "toString" | "ToString" | "intern" => text.to_string(),
        _ => return None,
    };
    Some(Value::Str(out))
}

/// A method declared next to the call: an overload in the enclosing
/// class, or a top-level function of the same name.
fn local_method(state: &PathState<'_>, n_id: NodeId, name: &str, arity: usize) -> Option<NodeId> {
    let graph = &state.shard.graph;
    let class = graph
        .lookup_first_of_kind(n_id, NodeKind::Class)
        .and_then(|c| state.shard.metadata.classes.values().find(|info| info.n_id == c));
    if let Some(class) = class {
        let overloads: Vec<(&str, NodeId)> = class.methods_named(name).collect();
        if !overloads.is_empty() {
            return overloads
                .iter()
                .find(|(signature, _)| signature_arity(signature) == arity)
                .or(overloads.first())
                .map(|(_, n_id)| *n_id);
        }
    }
    graph.nodes_of_kind(NodeKind::Method).find(|m| {
        graph
            .child_by_field(*m, "name")
            .is_some_and(|n| graph.source_text(n) == name)
    })
}

/// Parameter count of `name(A,Map<B,C>)`.
fn signature_arity(signature: &str) -> usize {
    let inner = signature
        .strip_prefix(method_name(signature))
        .unwrap_or(signature)
        .trim_start_matches('(')
        .trim_end_matches(')');
    if inner.trim().is_empty() {
        return 0;
    }
    let mut depth = 0i32;
    let mut count = 1;
    for c in inner.chars() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

/// Reads and writes on a tracked list, dictionary or string held by the
/// receiver variable. Returns the element a read yields.
fn container_operation(state: &mut PathState<'_>, call: &Call) -> Option<Slot> {
    let definition = call.definition?;
    let operation = call.path.as_str();
    let arguments: Vec<Slot> = call.arguments.iter().map(|a| state.slot(*a)).collect();
    let container = state.value(definition)?.clone();

    let (updated, result) = match container {
        Value::Dict(mut entries) => match (operation, arguments.as_slice()) {
            ("put" | "set" | "Add" | "setProperty" | "setdefault", [key, item]) => match &key.value {
                Some(key) => {
                    entries.insert(key.key(), item.clone());
                    (Some(Value::Dict(entries)), None)
                }
                // an unknown key makes every later read unknown
                None => (None, None),
            },
            ("get" | "getProperty" | "getOrDefault" | "Get" | "GetValueOrDefault", [key, ..]) => {
                let slot = key
                    .value
                    .as_ref()
                    .map(|k| entries.get(&k.key()).cloned().unwrap_or_default());
                (Some(Value::Dict(entries)), slot)
            }
            ("remove" | "Remove" | "pop", [key, ..]) => {
                let slot = key.value.as_ref().and_then(|k| entries.remove(&k.key()));
                (Some(Value::Dict(entries)), slot)
            }
            _ => (Some(Value::Dict(entries)), None),
        },
        Value::List(mut items) => match (operation, arguments.as_slice()) {
            ("add" | "push" | "append" | "Add", [item]) => {
                items.push(item.clone());
                (Some(Value::List(items)), None)
            }
            ("get" | "ElementAt", [Slot { value: Some(Value::Number(n)), .. }]) if *n >= 0.0 => {
                let slot = items.get(*n as usize).cloned();
                (Some(Value::List(items)), slot)
            }
            ("remove" | "RemoveAt", [Slot { value: Some(Value::Number(n)), .. }]) if *n >= 0.0 => {
                let position = *n as usize;
                let slot = (position < items.len()).then(|| items.remove(position));
                (Some(Value::List(items)), slot)
            }
            ("pop", []) => {
                let slot = items.pop();
                (Some(Value::List(items)), slot)
            }
            ("shift", []) => {
                let slot = (!items.is_empty()).then(|| items.remove(0));
                (Some(Value::List(items)), slot)
            }
            ("concat", others) => {
                let mut joined = items.clone();
                for other in others {
                    match &other.value {
                        Some(Value::List(more)) => joined.extend(more.iter().cloned()),
                        _ => joined.push(other.clone()),
                    }
                }
                let danger = joined.iter().any(|s| s.danger);
                (Some(Value::List(items)), Some(Slot::new(danger, Some(Value::List(joined)))))
            }
            _ => (Some(Value::List(items)), None),
        },
        Value::Str(text) => match (operation, arguments.as_slice()) {
            ("charAt", [Slot { value: Some(Value::Number(n)), .. }]) if *n >= 0.0 => {
                let slot = text
                    .chars()
                    .nth(*n as usize)
                    .map(|c| Slot::new(state.danger(definition), Some(Value::Str(c.to_string()))));
                (Some(Value::Str(text)), slot)
            }
            _ => return None,
        },
        _ => return None,
    };

    let inserted_danger = matches!(operation, "put" | "set" | "Add" | "setProperty" | "setdefault" | "add" | "push" | "append")
        && arguments.iter().any(|a| a.danger);
    let meta = &mut state.steps[definition].meta;
    meta.value = updated;
    if inserted_danger {
        meta.danger = true;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_counts_top_level_parameters() {
        assert_eq!(signature_arity("run()"), 0);
        assert_eq!(signature_arity("run(String)"), 1);
        assert_eq!(signature_arity("run(String,Map<String,Integer>)"), 2);
    }

    #[test]
    fn transforms_fold_known_strings() {
        assert_eq!(
            transform("toLowerCase", &Value::Str("MD5".into())),
            Some(Value::Str("md5".into()))
        );
        assert_eq!(transform("substring", &Value::Str("abc".into())), None);
        assert_eq!(transform("trim", &Value::Number(1.0)), None);
    }
}
