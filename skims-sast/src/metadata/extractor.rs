//! Declaration walk for class-based languages.

use skims_core::types::collections::FxHashMap;
use tracing::debug;

use super::types::{ClassInfo, FieldInfo, ShardMetadata};
use crate::graph::{Graph, NodeId, NodeKind};

const NAME_LABELS: [&str; 3] = ["identifier", "type_identifier", "simple_identifier"];

/// Build the declaration summary of one shard.
///
/// Languages without classes, and class-based files without declarations,
/// yield an empty value.
pub fn extract(graph: &Graph) -> ShardMetadata {
    if !graph.language().is_class_based() {
        return ShardMetadata::default();
    }

    let mut metadata = ShardMetadata {
        package: file_package(graph),
        ..ShardMetadata::default()
    };
    let mut qualified_by_node: FxHashMap<NodeId, String> = FxHashMap::default();

    // Ascending ids are pre-order, so outer classes come first.
    for class in graph.nodes_of_kind(NodeKind::Class) {
        let Some(name) = declared_name(graph, class) else {
            continue;
        };
        let qualified = qualified_name(graph, class, &name, &metadata.package, &qualified_by_node);
        qualified_by_node.insert(class, qualified.clone());
        metadata.classes.insert(qualified, ClassInfo::new(class, name));
    }

    for n_id in graph.node_ids() {
        let is_method = graph.kind(n_id) == NodeKind::Method;
        let is_field = is_field_declaration(graph, n_id);
        if !is_method && !is_field {
            continue;
        }
        let Some(owner) = owning_class(graph, n_id) else {
            continue;
        };
        let Some(class) = qualified_by_node
            .get(&owner)
            .and_then(|q| metadata.classes.get_mut(q))
        else {
            continue;
        };
        if is_method {
            if let Some(signature) = method_signature(graph, n_id) {
                class.methods.entry(signature).or_insert(n_id);
            }
        } else {
            let declared_type = field_type(graph, n_id).unwrap_or_default();
            for name in field_names(graph, n_id) {
                class.fields.entry(name).or_insert_with(|| FieldInfo {
                    n_id,
                    declared_type: declared_type.clone(),
                });
            }
        }
    }

    debug!(
        language = %graph.language(),
        package = %metadata.package,
        classes = metadata.classes.len(),
        "metadata extracted"
    );
    metadata
}

/// Java/Kotlin package, or the outermost C# namespace.
fn file_package(graph: &Graph) -> String {
    graph
        .nodes_of_kind(NodeKind::Package)
        .next()
        .and_then(|package| package_name(graph, package))
        .unwrap_or_default()
}

fn package_name(graph: &Graph, package: NodeId) -> Option<String> {
    graph
        .child_by_field(package, "name")
        .or_else(|| graph.named_children(package).next())
        .map(|n| graph.source_text(n))
        .filter(|name| !name.is_empty())
}

/// A C# block namespace wraps its classes; Java/Kotlin packages and
/// file-scoped namespaces only precede them.
fn is_enclosing_namespace(graph: &Graph, n_id: NodeId) -> bool {
    graph.kind(n_id) == NodeKind::Package && graph.child_by_field(n_id, "body").is_some()
}

fn qualified_name(
    graph: &Graph,
    class: NodeId,
    name: &str,
    file_package: &str,
    known: &FxHashMap<NodeId, String>,
) -> String {
    let mut parts = vec![name.to_string()];
    let mut wrapped = false;
    for ancestor in graph.ancestors(class) {
        if let Some(outer) = known.get(&ancestor) {
            parts.push(outer.clone());
            parts.reverse();
            return parts.join(".");
        }
        if is_enclosing_namespace(graph, ancestor) {
            if let Some(namespace) = package_name(graph, ancestor) {
                parts.push(namespace);
                wrapped = true;
            }
        }
    }
    if !wrapped && !file_package.is_empty() {
        parts.push(file_package.to_string());
    }
    parts.reverse();
    parts.join(".")
}

fn declared_name(graph: &Graph, n_id: NodeId) -> Option<String> {
    graph
        .child_by_field(n_id, "name")
        .or_else(|| {
            graph
                .named_children(n_id)
                .find(|c| NAME_LABELS.contains(&graph.label_type(*c)))
        })
        .map(|n| graph.source_text(n))
        .filter(|name| !name.is_empty())
}

fn declared_type(graph: &Graph, n_id: NodeId) -> Option<String> {
    graph
        .child_by_field(n_id, "type")
        .or_else(|| graph.named_children(n_id).find(|c| graph.kind(*c) == NodeKind::Type))
        .map(|n| graph.source_text(n))
}

/// The class a member belongs to: its nearest enclosing class, unless a
/// method or an anonymous class body comes first.
fn owning_class(graph: &Graph, n_id: NodeId) -> Option<NodeId> {
    graph
        .ancestors(n_id)
        .find(|a| {
            matches!(
                graph.kind(*a),
                NodeKind::Class | NodeKind::Method | NodeKind::ObjectCreation
            )
        })
        .filter(|a| graph.kind(*a) == NodeKind::Class)
}

fn is_field_declaration(graph: &Graph, n_id: NodeId) -> bool {
    match graph.kind(n_id) {
        NodeKind::Field => true,
        NodeKind::VariableDeclaration => graph
            .parent(n_id)
            .is_some_and(|p| graph.kind(p) == NodeKind::ClassBody),
        _ => graph.label_type(n_id) == "property_declaration",
    }
}

/// `name(Type,Type)`.
fn method_signature(graph: &Graph, method: NodeId) -> Option<String> {
    let name = declared_name(graph, method)?;
    let parameter_types: Vec<String> = graph
        .child_by_field(method, "parameters")
        .or_else(|| graph.child_by_kind(method, NodeKind::Parameters))
        .map(|parameters| {
            graph
                .named_children(parameters)
                .filter(|p| {
                    graph.kind(*p) == NodeKind::Parameter || graph.label_type(*p) == "parameter"
                })
                .map(|p| declared_type(graph, p).unwrap_or_else(|| "?".to_string()))
                .collect()
        })
        .unwrap_or_default();
    Some(format!("{name}({})", parameter_types.join(",")))
}

/// Inner `variable_declaration` wrappers (C#, Kotlin) hold the type and names.
fn variable_declarations(graph: &Graph, field: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    graph
        .named_children(field)
        .filter(move |c| graph.label_type(*c) == "variable_declaration")
}

fn field_type(graph: &Graph, field: NodeId) -> Option<String> {
    declared_type(graph, field)
        .or_else(|| variable_declarations(graph, field).find_map(|v| declared_type(graph, v)))
}

fn field_names(graph: &Graph, field: NodeId) -> Vec<String> {
    let declarators = graph
        .named_children(field)
        .chain(variable_declarations(graph, field).flat_map(|v| graph.named_children(v)))
        .filter(|c| graph.kind(*c) == NodeKind::VariableDeclarator);
    let mut names: Vec<String> = declarators.filter_map(|d| declared_name(graph, d)).collect();
    if names.is_empty() {
        names.extend(
            variable_declarations(graph, field)
                .filter_map(|v| declared_name(graph, v))
                .chain(declared_name(graph, field)),
        );
        names.truncate(1);
    }
    names
}
