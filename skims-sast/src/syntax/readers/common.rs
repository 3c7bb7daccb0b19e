//! Readers shared by every language, keyed on `NodeKind`.

use skims_core::errors::EvaluationError;
use skims_core::types::collections::Deps;

use super::missing;
use crate::cfg::augmenter::is_default_case;
use crate::graph::{CfgEdgeKind, Graph, NodeId, NodeKind};
use crate::scanner::language_detect::Language;
use crate::syntax::lowering::Lowerer;
use crate::syntax::steps::StepKind;

/// Labels of leaves that name something.
pub(crate) const NAME_LABELS: [&str; 5] = [
    "identifier",
    "simple_identifier",
    "type_identifier",
    "field_identifier",
    "property_identifier",
];

/// Wrappers that hold several expressions side by side.
const LIST_LABELS: [&str; 5] = [
    "expression_list",
    "pattern_list",
    "tuple_pattern",
    "tuple",
    "parenthesized_variable_declaration",
];

pub fn read(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    match graph.kind(n_id) {
        NodeKind::Root
        | NodeKind::Package
        | NodeKind::Import
        | NodeKind::Class
        | NodeKind::ClassBody
        | NodeKind::Block
        | NodeKind::ElseClause
        | NodeKind::SwitchBody
        | NodeKind::Break
        | NodeKind::Continue
        | NodeKind::Try
        | NodeKind::Finally
        | NodeKind::Labeled
        | NodeKind::Compound => Ok(lw.push(n_id, StepKind::NoOp, [])),
        NodeKind::Method if graph.is_connected_to_cfg(n_id) => method_declaration(lw, n_id),
        NodeKind::Method => Ok(lw.push(n_id, StepKind::NoOp, [])),
        NodeKind::VariableDeclaration => variable_declaration(lw, n_id),
        NodeKind::VariableDeclarator => {
            let var_type = declared_type(graph, n_id);
            declarator(lw, n_id, var_type)
        }
        NodeKind::ExpressionStatement => expression_statement(lw, n_id),
        NodeKind::If => if_statement(lw, n_id),
        NodeKind::While | NodeKind::DoWhile | NodeKind::For => loop_statement(lw, n_id),
        NodeKind::ForEach => for_each_statement(lw, n_id),
        NodeKind::Switch => switch_statement(lw, n_id),
        NodeKind::SwitchCase => switch_case(lw, n_id),
        NodeKind::Return => return_statement(lw, n_id),
        NodeKind::Throw => throw_statement(lw, n_id),
        NodeKind::Catch => catch_clause(lw, n_id),
        NodeKind::Literal(value_type) => {
            let value = graph.source_text(n_id);
            Ok(lw.push(n_id, StepKind::Literal { value, value_type }, []))
        }
        NodeKind::Identifier | NodeKind::Type => {
            let symbol = graph.source_text(n_id);
            Ok(lw.push(n_id, StepKind::SymbolLookup { symbol }, []))
        }
        NodeKind::This => Ok(lw.push(n_id, StepKind::This, [])),
        NodeKind::Parenthesized => {
            let inner = first_named(graph, n_id).ok_or_else(|| missing("parenthesized", n_id))?;
            let dep = lw.expr(inner)?;
            Ok(lw.push(n_id, StepKind::ParenthesizedExpression, [dep]))
        }
        NodeKind::Assignment => assignment(lw, n_id),
        NodeKind::Binary => binary_expression(lw, n_id),
        NodeKind::Unary => unary_expression(lw, n_id),
        NodeKind::Ternary => ternary_expression(lw, n_id),
        NodeKind::Cast => cast_expression(lw, n_id),
        NodeKind::Instanceof => instanceof_expression(lw, n_id),
        NodeKind::ArrayAccess => array_access(lw, n_id),
        NodeKind::ArrayCreation => array_creation(lw, n_id),
        NodeKind::ArrayInitializer => array_initializer(lw, n_id),
        NodeKind::ObjectCreation => object_creation(lw, n_id),
        NodeKind::Call => method_invocation(lw, n_id),
        NodeKind::MemberAccess => member_access(lw, n_id),
        NodeKind::Argument => {
            let value = graph
                .child_by_field(n_id, "value")
                .or_else(|| graph.named_children(n_id).last())
                .ok_or_else(|| missing("argument", n_id))?;
            lw.expr(value)
        }
        _ => Err(missing("common", n_id)),
    }
}

// ---- helpers ---------------------------------------------------------------

pub(crate) fn first_named(graph: &Graph, n_id: NodeId) -> Option<NodeId> {
    graph.named_children(n_id).next()
}

/// First of several field names present on `n_id`.
pub(crate) fn field_of(graph: &Graph, n_id: NodeId, fields: &[&str]) -> Option<NodeId> {
    fields.iter().find_map(|f| graph.child_by_field(n_id, f))
}

pub(crate) fn name_of(graph: &Graph, n_id: NodeId) -> Option<String> {
    graph
        .child_by_field(n_id, "name")
        .or_else(|| {
            graph
                .named_children(n_id)
                .find(|c| NAME_LABELS.contains(&graph.label_type(*c)))
        })
        .map(|n| graph.source_text(n))
}

pub(crate) fn declared_type(graph: &Graph, n_id: NodeId) -> Option<String> {
    graph
        .child_by_field(n_id, "type")
        .or_else(|| graph.named_children(n_id).find(|c| graph.kind(*c) == NodeKind::Type))
        .map(|n| graph.source_text(n))
        .map(|t| t.trim_start_matches(':').trim().to_string())
}

/// Items of a list wrapper, or the node itself.
pub(crate) fn expand(graph: &Graph, n_id: NodeId) -> Vec<NodeId> {
    if LIST_LABELS.contains(&graph.label_type(n_id)) {
        graph.named_children(n_id).collect()
    } else {
        vec![n_id]
    }
}

/// Drop a leading `this.` or `self.`.
pub(crate) fn strip_receiver(text: &str) -> &str {
    text.strip_prefix("this.")
        .or_else(|| text.strip_prefix("self."))
        .unwrap_or(text)
}

/// Identifier, type name, or member chain made only of those.
pub(crate) fn is_static_path(graph: &Graph, n_id: NodeId) -> bool {
    match graph.kind(n_id) {
        NodeKind::Identifier | NodeKind::Type | NodeKind::This => true,
        NodeKind::MemberAccess => {
            let (object, _) = member_parts(graph, n_id);
            object.is_some_and(|o| is_static_path(graph, o))
        }
        _ => false,
    }
}

/// Receiver and member name of a member access.
pub(crate) fn member_parts(graph: &Graph, n_id: NodeId) -> (Option<NodeId>, String) {
    let object = field_of(graph, n_id, &["object", "expression", "operand", "value"])
        .or_else(|| first_named(graph, n_id));
    let member = field_of(graph, n_id, &["property", "field", "name", "attribute"])
        .or_else(|| {
            graph.named_children(n_id).last().map(|last| {
                if graph.label_type(last) == "navigation_suffix" {
                    graph.named_children(last).last().unwrap_or(last)
                } else {
                    last
                }
            })
        })
        .filter(|m| Some(*m) != object);
    let member = member.map(|m| graph.source_text(m)).unwrap_or_default();
    (object, member.trim_start_matches(['.', '?']).to_string())
}

/// Lower call arguments positionally. An argument no reader handles
/// becomes a `NoOp` so positions stay aligned.
pub(crate) fn arguments(
    lw: &mut Lowerer<'_>,
    args: Option<NodeId>,
) -> Result<Deps<usize>, EvaluationError> {
    let graph = lw.graph();
    let mut out = Deps::new();
    let Some(args) = args else {
        return Ok(out);
    };
    let items: Vec<NodeId> = graph
        .named_children(args)
        .flat_map(|c| {
            if graph.kind(c) == NodeKind::Arguments {
                graph.named_children(c).collect()
            } else {
                vec![c]
            }
        })
        .collect();
    for item in items {
        let mark = lw.mark();
        match lw.expr(item) {
            Ok(index) => out.push(index),
            Err(EvaluationError::MissingSyntaxReader { .. } | EvaluationError::MissingCaseHandling { .. }) => {
                lw.rollback(mark);
                out.push(lw.push(item, StepKind::NoOp, []));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Arguments node of a call or instantiation.
pub(crate) fn arguments_of(graph: &Graph, n_id: NodeId) -> Option<NodeId> {
    graph.child_by_field(n_id, "arguments").or_else(|| {
        graph.children(n_id).iter().copied().find_map(|c| {
            if graph.kind(c) == NodeKind::Arguments {
                Some(c)
            } else if graph.label_type(c) == "call_suffix" {
                graph.child_by_kind(c, NodeKind::Arguments)
            } else {
                None
            }
        })
    })
}

fn try_expr(lw: &mut Lowerer<'_>, n_id: NodeId) -> Option<usize> {
    let mark = lw.mark();
    match lw.expr(n_id) {
        Ok(index) => Some(index),
        Err(_) => {
            lw.rollback(mark);
            None
        }
    }
}

fn cfg_target(graph: &Graph, n_id: NodeId, kind: CfgEdgeKind) -> Option<NodeId> {
    graph
        .cfg_successors(n_id)
        .into_iter()
        .find(|(_, k)| *k == kind)
        .map(|(target, _)| target)
}

fn is_body(graph: &Graph, n_id: NodeId) -> bool {
    graph.field(n_id) == Some("body")
        || matches!(graph.kind(n_id), NodeKind::Block | NodeKind::ElseClause)
        || graph.kind(n_id).is_statement()
}

/// `name = values...`, pairing positionally when counts agree and giving
/// every name all values otherwise.
pub(crate) fn pair_declarations(
    lw: &mut Lowerer<'_>,
    names: &[(NodeId, String)],
    values: &[usize],
    var_type: Option<String>,
) -> Option<usize> {
    let mut last = None;
    for (position, (n_id, var)) in names.iter().enumerate() {
        let deps: Deps<usize> = if names.len() == values.len() {
            values.get(position).copied().into_iter().collect()
        } else {
            values.iter().copied().collect()
        };
        last = Some(lw.push(
            *n_id,
            StepKind::Declaration {
                var: var.clone(),
                var_type: var_type.clone(),
                is_parameter: false,
                annotations: Vec::new(),
            },
            deps,
        ));
    }
    last
}

// ---- statements ------------------------------------------------------------

fn method_declaration(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let parameters = field_of(graph, n_id, &["parameters", "parameter"])
        .or_else(|| graph.child_by_kind(n_id, NodeKind::Parameters));
    let mut last = None;
    if let Some(parameters) = parameters {
        let items: Vec<NodeId> = if graph.kind(parameters) == NodeKind::Parameters {
            graph.named_children(parameters).collect()
        } else {
            vec![parameters]
        };
        for parameter in items {
            for (name, var_type, annotations) in parameter_bindings(graph, parameter) {
                last = Some(lw.push(
                    parameter,
                    StepKind::Declaration {
                        var: name,
                        var_type,
                        is_parameter: true,
                        annotations,
                    },
                    [],
                ));
            }
        }
    }
    Ok(last.unwrap_or_else(|| lw.push(n_id, StepKind::NoOp, [])))
}

/// Names bound by one parameter node, with type and annotations.
fn parameter_bindings(graph: &Graph, parameter: NodeId) -> Vec<(String, Option<String>, Vec<String>)> {
    if NAME_LABELS.contains(&graph.label_type(parameter)) {
        return vec![(graph.source_text(parameter), None, Vec::new())];
    }
    let is_parameter = graph.kind(parameter) == NodeKind::Parameter
        || graph.label_type(parameter) == "parameter";
    if !is_parameter {
        return Vec::new();
    }
    let var_type = declared_type(graph, parameter);
    let annotations = annotations_of(graph, parameter);
    let mut names: Vec<String> = graph
        .children_by_field(parameter, "name")
        .map(|n| graph.source_text(n))
        .collect();
    if names.is_empty() {
        if let Some(pattern) = graph.child_by_field(parameter, "pattern") {
            names.push(graph.source_text(pattern));
        } else if let Some(name) = graph
            .named_children(parameter)
            .find(|c| matches!(graph.label_type(*c), "identifier" | "simple_identifier"))
            .or_else(|| graph.child_by_kind(parameter, NodeKind::VariableDeclarator))
        {
            names.push(name_of(graph, name).unwrap_or_else(|| graph.source_text(name)));
        }
    }
    names
        .into_iter()
        .map(|n| (n, var_type.clone(), annotations.clone()))
        .collect()
}

/// Annotation (Java, Kotlin) or attribute (C#) names on a declaration.
fn annotations_of(graph: &Graph, n_id: NodeId) -> Vec<String> {
    let containers = graph
        .named_children(n_id)
        .filter(|c| {
            matches!(
                graph.label_type(*c),
                "modifiers" | "attribute_list" | "parameter_modifiers"
            )
        });
    let mut out = Vec::new();
    for container in containers {
        for candidate in graph.adj_ast(container, 2) {
            if matches!(
                graph.label_type(candidate),
                "annotation" | "marker_annotation" | "attribute"
            ) {
                if let Some(name) = name_of(graph, candidate)
                    .or_else(|| first_named(graph, candidate).map(|n| graph.source_text(n)))
                {
                    out.push(name);
                }
            }
        }
    }
    out
}

fn variable_declaration(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let wrappers: Vec<NodeId> = std::iter::once(n_id)
        .chain(
            graph
                .named_children(n_id)
                .filter(|c| graph.label_type(*c) == "variable_declaration"),
        )
        .collect();
    let var_type = wrappers.iter().find_map(|w| declared_type(graph, *w));
    let declarators: Vec<NodeId> = wrappers
        .iter()
        .flat_map(|w| graph.named_children(*w))
        .filter(|c| graph.kind(*c) == NodeKind::VariableDeclarator)
        .collect();

    if declarators.is_empty() {
        let (Some(left), Some(right)) = (
            graph.child_by_field(n_id, "left"),
            graph.child_by_field(n_id, "right"),
        ) else {
            return Err(missing("variable_declaration", n_id));
        };
        let names: Vec<(NodeId, String)> = expand(graph, left)
            .into_iter()
            .map(|n| (n, graph.source_text(n)))
            .collect();
        let values = lw.exprs(expand(graph, right))?;
        return pair_declarations(lw, &names, &values, var_type)
            .ok_or_else(|| missing("variable_declaration", n_id));
    }

    let mut last = None;
    for declarator in declarators {
        last = Some(self::declarator(lw, declarator, var_type.clone())?);
    }
    last.ok_or_else(|| missing("variable_declaration", n_id))
}

fn declarator(
    lw: &mut Lowerer<'_>,
    n_id: NodeId,
    outer_type: Option<String>,
) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let mut name_nodes: Vec<NodeId> = graph.children_by_field(n_id, "name").collect();
    if name_nodes.is_empty() {
        name_nodes.extend(
            graph
                .named_children(n_id)
                .find(|c| NAME_LABELS.contains(&graph.label_type(*c))),
        );
    }
    let first_name = name_nodes.first().copied();
    let value = graph
        .child_by_field(n_id, "value")
        .or_else(|| {
            graph
                .named_children(n_id)
                .find(|c| graph.label_type(*c) == "equals_value_clause")
                .and_then(|c| first_named(graph, c))
        })
        .or_else(|| {
            graph
                .named_children(n_id)
                .filter(|c| {
                    Some(*c) != first_name
                        && graph.kind(*c) != NodeKind::Type
                        && graph.label_type(*c) != "bracketed_argument_list"
                        && graph.field(*c) != Some("type")
                })
                .last()
        });
    let var_type = graph
        .child_by_field(n_id, "type")
        .map(|t| graph.source_text(t))
        .or(outer_type);

    let values = match value {
        Some(value) => lw.exprs(expand(graph, value))?,
        None => Deps::new(),
    };
    let names: Vec<(NodeId, String)> = if name_nodes.len() > 1 {
        name_nodes.iter().map(|n| (*n, graph.source_text(*n))).collect()
    } else {
        name_nodes.iter().map(|n| (n_id, graph.source_text(*n))).collect()
    };
    pair_declarations(lw, &names, &values, var_type).ok_or_else(|| missing("declarator", n_id))
}

fn expression_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    match first_named(graph, n_id) {
        Some(inner) => lw.expr(inner),
        None => Ok(lw.push(n_id, StepKind::NoOp, [])),
    }
}

fn if_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let condition = graph
        .child_by_field(n_id, "condition")
        .or_else(|| graph.named_children(n_id).find(|c| !is_body(graph, *c)))
        .ok_or_else(|| missing("if_statement", n_id))?;
    let dep = lw.expr(condition)?;
    let kind = StepKind::If {
        n_id_true: cfg_target(graph, n_id, CfgEdgeKind::True),
        n_id_false: cfg_target(graph, n_id, CfgEdgeKind::False),
        next: lw.next(),
    };
    Ok(lw.push(n_id, kind, [dep]))
}

fn loop_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let mut parts: Vec<NodeId> = Vec::new();
    for child in graph.named_children(n_id) {
        if graph.field(child) == Some("body") || graph.kind(child) == NodeKind::Block {
            continue;
        }
        if graph.label_type(child) == "for_clause" {
            parts.extend(graph.named_children(child));
        } else {
            parts.push(child);
        }
    }
    let mut deps = Deps::new();
    for part in parts {
        if let Some(index) = try_expr(lw, part) {
            deps.push(index);
        }
    }
    Ok(lw.push(n_id, StepKind::For, deps))
}

fn for_each_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let clause = graph
        .named_children(n_id)
        .find(|c| graph.label_type(*c) == "range_clause")
        .unwrap_or(n_id);
    let iterable = field_of(graph, clause, &["value", "right"])
        .or_else(|| {
            graph
                .named_children(clause)
                .filter(|c| !is_body(graph, *c))
                .last()
        })
        .ok_or_else(|| missing("for_each", n_id))?;
    let target = field_of(graph, clause, &["name", "left"]).or_else(|| {
        graph
            .named_children(clause)
            .find(|c| *c != iterable && !is_body(graph, *c) && graph.kind(*c) != NodeKind::Type)
    });
    let source = lw.expr(iterable)?;
    let mut deps: Deps<usize> = Deps::new();
    if let Some(target) = target {
        let var_type = declared_type(graph, n_id);
        let names: Vec<(NodeId, String)> = expand(graph, target)
            .into_iter()
            .map(|t| (t, name_of(graph, t).unwrap_or_else(|| graph.source_text(t))))
            .collect();
        let values = [source];
        for (t, var) in names {
            deps.push(lw.push(
                t,
                StepKind::Declaration {
                    var,
                    var_type: var_type.clone(),
                    is_parameter: false,
                    annotations: Vec::new(),
                },
                values,
            ));
        }
    } else {
        deps.push(source);
    }
    Ok(lw.push(n_id, StepKind::For, deps))
}

fn switch_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let subject = field_of(graph, n_id, &["condition", "value", "subject"]).or_else(|| {
        graph.named_children(n_id).find(|c| {
            graph.kind(*c) != NodeKind::SwitchBody
                && graph.kind(*c) != NodeKind::SwitchCase
                && graph.field(*c) != Some("body")
        })
    });
    let subject = match subject {
        Some(s) if graph.label_type(s) == "when_subject" => first_named(graph, s),
        other => other,
    };
    let deps: Deps<usize> = subject.and_then(|s| try_expr(lw, s)).into_iter().collect();
    Ok(lw.push(n_id, StepKind::Switch { next: lw.next() }, deps))
}

fn switch_case(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    if is_default_case(graph, n_id) {
        return Ok(lw.push(n_id, StepKind::SwitchLabelDefault, []));
    }
    let mut values: Vec<NodeId> = Vec::new();
    for child in graph.named_children(n_id) {
        if graph.kind(child) == NodeKind::SwitchLabel || graph.label_type(child) == "when_condition" {
            values.extend(graph.named_children(child));
        } else if graph.field(child) == Some("value") {
            values.extend(expand(graph, child));
        }
    }
    let mut deps = Deps::new();
    for value in values {
        if let Some(index) = try_expr(lw, value) {
            deps.push(index);
        }
    }
    Ok(lw.push(n_id, StepKind::SwitchLabelCase, deps))
}

fn return_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let deps = match first_named(graph, n_id) {
        Some(value) => lw.exprs(expand(graph, value))?,
        None => Deps::new(),
    };
    Ok(lw.push(n_id, StepKind::Return, deps))
}

fn throw_statement(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let deps: Deps<usize> = first_named(graph, n_id)
        .and_then(|value| try_expr(lw, value))
        .into_iter()
        .collect();
    Ok(lw.push(n_id, StepKind::NoOp, deps))
}

fn catch_clause(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let holder = graph
        .child_by_kind(n_id, NodeKind::CatchParameter)
        .unwrap_or(n_id);
    let type_node = graph
        .child_by_field(holder, "type")
        .or_else(|| graph.named_children(holder).find(|c| graph.kind(*c) == NodeKind::Type));
    let var_node = field_of(graph, holder, &["name", "parameter", "alias"]).or_else(|| {
        graph
            .named_children(holder)
            .filter(|c| Some(*c) != type_node && NAME_LABELS.contains(&graph.label_type(*c)))
            .last()
    });
    let var_type = type_node.map(|t| graph.source_text(t)).unwrap_or_default();
    let var = var_node.map(|v| graph.source_text(v)).unwrap_or_default();
    Ok(lw.push(n_id, StepKind::CatchClause { var, var_type }, []))
}

// ---- expressions -----------------------------------------------------------

fn assignment(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let left = graph
        .child_by_field(n_id, "left")
        .or_else(|| first_named(graph, n_id))
        .ok_or_else(|| missing("assignment", n_id))?;
    let right = graph
        .child_by_field(n_id, "right")
        .or_else(|| graph.named_children(n_id).last())
        .filter(|r| *r != left)
        .ok_or_else(|| missing("assignment", n_id))?;
    let operator = graph
        .child_by_field(n_id, "operator")
        .or_else(|| {
            graph
                .children(n_id)
                .iter()
                .copied()
                .find(|c| graph.kind(*c) == NodeKind::Token)
        })
        .map(|o| graph.source_text(o))
        .unwrap_or_else(|| "=".to_string());

    let targets = expand(graph, left);
    let values = lw.exprs(expand(graph, right))?;
    let compound = !matches!(operator.as_str(), "=" | ":=");

    let mut last = None;
    for (position, target) in targets.iter().enumerate() {
        let (var, element_write) = assigned_var(graph, *target);
        let mut deps: Deps<usize> = if targets.len() == values.len() {
            values.get(position).copied().into_iter().collect()
        } else {
            values.iter().copied().collect()
        };
        if compound {
            let current = lw.push(*target, StepKind::SymbolLookup { symbol: var.clone() }, []);
            let operator = operator.trim_end_matches('=').to_string();
            let combined = lw.push(
                n_id,
                StepKind::BinaryExpression { operator },
                std::iter::once(current).chain(deps),
            );
            deps = Deps::from_elem(combined, 1);
        } else if element_write {
            deps.push(lw.push(*target, StepKind::SymbolLookup { symbol: var.clone() }, []));
        }
        last = Some(lw.push(n_id, StepKind::Assignment { var }, deps));
    }
    last.ok_or_else(|| missing("assignment", n_id))
}

/// Variable written by an assignment target, and whether only an element
/// of it is written.
fn assigned_var(graph: &Graph, target: NodeId) -> (String, bool) {
    match graph.kind(target) {
        NodeKind::ArrayAccess => {
            let base = field_of(graph, target, &["array", "object", "value", "operand", "expression"])
                .or_else(|| first_named(graph, target))
                .map(|b| assigned_var(graph, b).0)
                .unwrap_or_default();
            (base, true)
        }
        NodeKind::MemberAccess => {
            let (object, member) = member_parts(graph, target);
            match object {
                Some(o) if graph.kind(o) == NodeKind::This || graph.text(o) == Some("self") => {
                    (member, false)
                }
                _ => (strip_receiver(&graph.source_text(target)).to_string(), false),
            }
        }
        _ => {
            let text = graph.source_text(target);
            (strip_receiver(&text).to_string(), false)
        }
    }
}

fn operator_of(graph: &Graph, n_id: NodeId) -> String {
    graph
        .child_by_field(n_id, "operator")
        .or_else(|| {
            graph
                .children(n_id)
                .iter()
                .copied()
                .find(|c| graph.kind(*c) == NodeKind::Token)
        })
        .map(|o| graph.source_text(o))
        .unwrap_or_default()
}

fn binary_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let operator = operator_of(graph, n_id);
    let operands: Vec<NodeId> = graph
        .named_children(n_id)
        .filter(|c| graph.field(*c) != Some("operator"))
        .collect();
    if operands.is_empty() {
        return Err(missing("binary_expression", n_id));
    }
    let deps = lw.exprs(operands)?;
    Ok(lw.push(n_id, StepKind::BinaryExpression { operator }, deps))
}

fn unary_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let operator = operator_of(graph, n_id);
    let operand = graph
        .child_by_field(n_id, "operand")
        .or_else(|| graph.child_by_field(n_id, "argument"))
        .or_else(|| {
            graph
                .named_children(n_id)
                .find(|c| graph.field(*c) != Some("operator"))
        })
        .ok_or_else(|| missing("unary_expression", n_id))?;
    let dep = lw.expr(operand)?;
    Ok(lw.push(n_id, StepKind::UnaryExpression { operator }, [dep]))
}

fn ternary_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let fields = (
        graph.child_by_field(n_id, "condition"),
        graph.child_by_field(n_id, "consequence"),
        graph.child_by_field(n_id, "alternative"),
    );
    let (condition, consequence, alternative) = match fields {
        (Some(c), Some(t), Some(f)) => (c, t, f),
        _ => {
            let parts: Vec<NodeId> = graph.named_children(n_id).collect();
            let [a, b, c] = parts[..] else {
                return Err(missing("ternary_expression", n_id));
            };
            if graph.language() == Language::Python {
                (b, a, c)
            } else {
                (a, b, c)
            }
        }
    };
    let deps = lw.exprs([condition, consequence, alternative])?;
    Ok(lw.push(n_id, StepKind::Ternary, deps))
}

fn cast_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let type_node = graph
        .child_by_field(n_id, "type")
        .or_else(|| graph.named_children(n_id).find(|c| graph.kind(*c) == NodeKind::Type));
    let value = field_of(graph, n_id, &["value", "operand", "expression"])
        .or_else(|| graph.named_children(n_id).find(|c| Some(*c) != type_node))
        .ok_or_else(|| missing("cast_expression", n_id))?;
    let cast_type = type_node.map(|t| graph.source_text(t)).unwrap_or_default();
    let dep = lw.expr(value)?;
    Ok(lw.push(n_id, StepKind::CastExpression { cast_type }, [dep]))
}

fn instanceof_expression(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let left = graph
        .child_by_field(n_id, "left")
        .or_else(|| first_named(graph, n_id))
        .ok_or_else(|| missing("instanceof_expression", n_id))?;
    let type_node = field_of(graph, n_id, &["right", "type", "pattern"])
        .or_else(|| graph.named_children(n_id).find(|c| *c != left));
    let instance_type = type_node.map(|t| graph.source_text(t)).unwrap_or_default();
    let dep = lw.expr(left)?;
    Ok(lw.push(n_id, StepKind::InstanceofExpression { instance_type }, [dep]))
}

fn array_access(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let array = field_of(graph, n_id, &["array", "object", "value", "operand", "expression"])
        .or_else(|| first_named(graph, n_id))
        .ok_or_else(|| missing("array_access", n_id))?;
    let mut indices: Vec<NodeId> = Vec::new();
    for child in graph.named_children(n_id).filter(|c| *c != array) {
        if matches!(
            graph.label_type(child),
            "bracketed_argument_list" | "indexing_suffix"
        ) {
            indices.extend(graph.named_children(child));
        } else {
            indices.push(child);
        }
    }
    let mut deps = Deps::new();
    deps.push(lw.expr(array)?);
    deps.extend(lw.exprs(indices)?);
    Ok(lw.push(n_id, StepKind::ArrayAccess, deps))
}

fn array_creation(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let mut parts: Vec<NodeId> = Vec::new();
    for child in graph.named_children(n_id) {
        match graph.label_type(child) {
            "dimensions" => {}
            "dimensions_expr" => parts.extend(first_named(graph, child)),
            _ if graph.kind(child) == NodeKind::Type || graph.field(child) == Some("type") => {}
            _ => parts.push(child),
        }
    }
    let deps = lw.exprs(parts)?;
    Ok(lw.push(n_id, StepKind::ArrayInstantiation, deps))
}

fn array_initializer(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let mut elements: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = graph.named_children(n_id).collect();
    stack.reverse();
    while let Some(child) = stack.pop() {
        if graph.kind(child) == NodeKind::Type || graph.field(child) == Some("type") {
            continue;
        }
        match graph.label_type(child) {
            "literal_value" | "literal_element" | "keyed_element" | "initializer_expression" => {
                let mut inner: Vec<NodeId> = graph.named_children(child).collect();
                if graph.label_type(child) == "keyed_element" {
                    inner.drain(..inner.len().saturating_sub(1));
                }
                stack.extend(inner.into_iter().rev());
            }
            _ => elements.push(child),
        }
    }
    let deps = lw.exprs(elements)?;
    Ok(lw.push(n_id, StepKind::ArrayInitialization, deps))
}

fn object_creation(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let object_type = field_of(graph, n_id, &["type", "constructor"])
        .or_else(|| graph.named_children(n_id).find(|c| graph.kind(*c) == NodeKind::Type))
        .map(|t| graph.source_text(t))
        .ok_or_else(|| missing("object_creation", n_id))?;
    let deps = arguments(lw, arguments_of(graph, n_id))?;
    Ok(lw.push(n_id, StepKind::ObjectInstantiation { object_type }, deps))
}

/// Callee receiver and method name.
pub(crate) fn split_callee(graph: &Graph, n_id: NodeId) -> Option<(Option<NodeId>, String)> {
    if let Some(name) = graph.child_by_field(n_id, "name") {
        return Some((graph.child_by_field(n_id, "object"), graph.source_text(name)));
    }
    let function = graph
        .child_by_field(n_id, "function")
        .or_else(|| first_named(graph, n_id))?;
    if graph.kind(function) == NodeKind::MemberAccess {
        let (object, member) = member_parts(graph, function);
        return Some((object, member));
    }
    let name = graph.source_text(function);
    let name = name.split('<').next().unwrap_or(&name).to_string();
    Some((None, name))
}

fn method_invocation(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let (object, name) = split_callee(graph, n_id).ok_or_else(|| missing("method_invocation", n_id))?;
    let args_node = arguments_of(graph, n_id);

    match object {
        None => {
            let deps = arguments(lw, args_node)?;
            Ok(lw.push(n_id, StepKind::MethodInvocation { method: name }, deps))
        }
        Some(object) if graph.kind(object) == NodeKind::This => {
            let deps = arguments(lw, args_node)?;
            Ok(lw.push(n_id, StepKind::MethodInvocation { method: name }, deps))
        }
        Some(object) if is_static_path(graph, object) => {
            let receiver = graph.source_text(object);
            let method = format!("{}.{name}", strip_receiver(&receiver));
            let deps = arguments(lw, args_node)?;
            Ok(lw.push(n_id, StepKind::MethodInvocation { method }, deps))
        }
        Some(object) => {
            let parent = lw.expr(object)?;
            let method = match lw.step(parent).map(|s| &s.kind) {
                Some(
                    StepKind::MethodInvocation { method: base }
                    | StepKind::MethodInvocationChain { method: base },
                ) => format!("{base}.{name}"),
                _ => name,
            };
            let mut deps = arguments(lw, args_node)?;
            deps.push(parent);
            Ok(lw.push(n_id, StepKind::MethodInvocationChain { method }, deps))
        }
    }
}

fn member_access(lw: &mut Lowerer<'_>, n_id: NodeId) -> Result<usize, EvaluationError> {
    let graph = lw.graph();
    let (object, member) = member_parts(graph, n_id);
    let object = object.ok_or_else(|| missing("member_access", n_id))?;
    if graph.kind(object) == NodeKind::This || graph.text(object) == Some("self") {
        return Ok(lw.push(n_id, StepKind::SymbolLookup { symbol: member }, []));
    }
    let expression = graph.source_text(object);
    let dep = lw.expr(object)?;
    Ok(lw.push(
        n_id,
        StepKind::MemberAccessExpression { member, expression },
        [dep],
    ))
}
