//! Catch clauses that swallow every exception (F117).

use super::method::Method;
use super::{Query, QueryContext};
use crate::db::GraphShard;
use crate::graph::{Graph, NodeId, NodeKind, UNBOUNDED};
use crate::scanner::language_detect::Language;

/// Reports catch clauses whose caught type is a catch-all, at the type's
/// identifier. A clause with no type at all is reported at the clause.
pub struct InsecureExceptions(pub Method);

fn generic_types(language: Language) -> &'static [&'static str] {
    match language {
        Language::Java | Language::Kotlin => &["Exception", "Throwable", "RuntimeException", "Error"],
        Language::CSharp => &["Exception", "SystemException", "ApplicationException"],
        Language::Python => &["Exception", "BaseException"],
        _ => &[],
    }
}

impl Query for InsecureExceptions {
    fn method(&self) -> Method {
        self.0
    }

    fn matches(&self, _ctx: &QueryContext<'_>, shard: &GraphShard) -> Vec<NodeId> {
        let graph = &shard.graph;
        let generic = generic_types(shard.language);
        let mut out = Vec::new();
        for catch in graph.nodes_of_kind(NodeKind::Catch) {
            let types = caught_types(graph, catch);
            if types.is_empty() {
                if matches!(shard.language, Language::CSharp | Language::Python) {
                    out.push(catch);
                }
                continue;
            }
            out.extend(
                types
                    .into_iter()
                    .filter(|t| graph.text(*t).is_some_and(|text| generic.contains(&text))),
            );
        }
        out
    }
}

/// Identifier leaves naming the caught types.
fn caught_types(graph: &Graph, catch: NodeId) -> Vec<NodeId> {
    let holders: Vec<NodeId> = match graph.child_by_kind(catch, NodeKind::CatchParameter) {
        Some(parameter) => vec![parameter],
        // Python names the types directly under the clause
        None => graph
            .named_children(catch)
            .filter(|c| graph.kind(*c) != NodeKind::Block && graph.field(*c) != Some("alias"))
            .collect(),
    };
    let mut out = Vec::new();
    for holder in holders {
        let binding = graph.child_by_field(holder, "name");
        let alias = graph.child_by_field(holder, "alias");
        for leaf in std::iter::once(holder).chain(graph.adj_ast(holder, UNBOUNDED)) {
            if !matches!(graph.label_type(leaf), "type_identifier" | "identifier") {
                continue;
            }
            if Some(leaf) == binding || is_within(graph, leaf, alias) || is_binding(graph, leaf) {
                continue;
            }
            out.push(leaf);
        }
    }
    out
}

fn is_within(graph: &Graph, n_id: NodeId, container: Option<NodeId>) -> bool {
    container.is_some_and(|c| c == n_id || graph.ancestors(n_id).any(|a| a == c))
}

/// `e` in Python's `except Exception as e`.
fn is_binding(graph: &Graph, n_id: NodeId) -> bool {
    graph
        .parent(n_id)
        .is_some_and(|p| graph.label_type(p) == "as_pattern_target")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GraphDb;

    fn lines(method: Method, path: &str, source: &str) -> Vec<u32> {
        let shard = GraphShard::from_text(path, method.language(), source).unwrap();
        let db = GraphDb::from_shards(vec![shard]);
        let ctx = QueryContext::new(&db);
        let shard = &db.shards()[0];
        InsecureExceptions(method)
            .matches(&ctx, shard)
            .into_iter()
            .map(|n| shard.line_of(n))
            .collect()
    }

    #[test]
    fn java_generic_catch_is_reported() {
        let source = "\
class A {
    void f() {
        try {
            g();
        } catch (Exception e) {
        }
        try {
            g();
        } catch (java.io.IOException e) {
        }
    }
}
";
        assert_eq!(lines(Method::JavaInsecureExceptions, "A.java", source), vec![5]);
    }

    #[test]
    fn java_multi_catch_reports_the_generic_member() {
        let source = "\
class A {
    void f() {
        try {
            g();
        } catch (IllegalStateException | RuntimeException e) {
        }
    }
}
";
        assert_eq!(lines(Method::JavaInsecureExceptions, "A.java", source), vec![5]);
    }

    #[test]
    fn python_bare_and_broad_excepts() {
        let source = "\
try:
    run()
except ValueError as error:
    pass
except Exception as e:
    pass

try:
    run()
except:
    pass
";
        assert_eq!(lines(Method::PythonInsecureExceptions, "a.py", source), vec![5, 10]);
    }

    #[test]
    fn c_sharp_catch_without_declaration_is_reported() {
        let source = "\
class A
{
    void F()
    {
        try { G(); }
        catch { }
    }
}
";
        assert_eq!(lines(Method::CSharpInsecureExceptions, "A.cs", source), vec![6]);
    }
}
