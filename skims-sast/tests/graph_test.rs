//! Graph builder and traversal tests, plus the determinism and tree-shape
//! properties over generated sources.

use proptest::prelude::*;

use skims_sast::db::GraphShard;
use skims_sast::graph::{EdgeFilter, EdgeKind, Graph, NodeId, NodeKind, UNBOUNDED};
use skims_sast::scanner::language_detect::Language;

fn java(source: &str) -> GraphShard {
    GraphShard::from_text("A.java", Language::Java, source).unwrap()
}

/// Node attributes and edges in a comparable form.
fn fingerprint(graph: &Graph) -> (Vec<(u32, &'static str, Option<String>, u32)>, Vec<(NodeId, NodeId, EdgeKind)>) {
    let nodes = graph
        .node_ids()
        .map(|n| (n.0, graph.label_type(n), graph.text(n).map(str::to_string), graph.line(n)))
        .collect();
    let mut edges = graph.edges();
    edges.sort_by_key(|(from, to, _)| (*from, *to));
    (nodes, edges)
}

fn ast_in_degree(graph: &Graph, n_id: NodeId) -> usize {
    graph
        .edges()
        .into_iter()
        .filter(|(_, to, kind)| *to == n_id && kind.is_ast())
        .count()
}

const STATEMENTS: [&str; 8] = [
    "int a = 1;",
    "a = a + 2;",
    "if (a > 1) { a = 0; } else { a = 3; }",
    "while (a < 10) { a++; }",
    "for (int i = 0; i < 3; i++) { a += i; }",
    "switch (a) { case 1: a = 2; break; default: a = 4; }",
    "try { a = 5; } catch (Exception e) { a = 6; }",
    "System.out.println(a);",
];

fn generated_java(picks: &[usize]) -> String {
    let body: Vec<&str> = picks.iter().map(|i| STATEMENTS[i % STATEMENTS.len()]).collect();
    format!("class G {{\n  void run() {{\n    int a = 0;\n    {}\n  }}\n}}\n", body.join("\n    "))
}

proptest! {
    #[test]
    fn rebuild_is_deterministic(picks in prop::collection::vec(0usize..8, 0..12)) {
        let source = generated_java(&picks);
        let first = java(&source);
        let second = java(&source);
        prop_assert_eq!(fingerprint(&first.graph), fingerprint(&second.graph));
        prop_assert_eq!(first.metadata, second.metadata);
    }

    #[test]
    fn every_non_root_node_has_one_ast_parent(picks in prop::collection::vec(0usize..8, 0..12)) {
        let shard = java(&generated_java(&picks));
        let graph = &shard.graph;
        for n_id in graph.node_ids() {
            let expected = usize::from(n_id != graph.root());
            prop_assert_eq!(ast_in_degree(graph, n_id), expected, "node {}", n_id);
        }
    }
}

#[test]
fn ids_are_preorder_from_zero() {
    let shard = java("class A { void f() { int x = 1; } }");
    let graph = &shard.graph;
    assert_eq!(graph.root(), NodeId(0));
    assert_eq!(graph.kind(graph.root()), NodeKind::Root);
    for n_id in graph.node_ids().skip(1) {
        let parent = graph.parent(n_id).unwrap();
        assert!(parent < n_id, "{parent} should precede {n_id}");
    }
}

#[test]
fn tokens_are_kept_and_comments_dropped() {
    let shard = java("class A {\n  // note\n  int f() { return 1 + 2; }\n}\n");
    let graph = &shard.graph;
    assert!(graph.nodes_by_label("+").next().is_some());
    assert!(graph.nodes_by_label("line_comment").next().is_none());
}

#[test]
fn adj_and_pred_follow_ast_edges() {
    let shard = java("class A { void f() { int x = 1; } }");
    let graph = &shard.graph;
    let method = graph.nodes_of_kind(NodeKind::Method).next().unwrap();
    let children = graph.adj_ast(method, 1);
    assert_eq!(children, graph.children(method).to_vec());
    let all = graph.adj(method, UNBOUNDED, EdgeFilter::Ast);
    assert!(all.len() > children.len());
    // Breadth-first: the direct children come first, and every node is
    // listed after its parent.
    assert_eq!(all[..children.len()], children[..]);
    let position = |n: NodeId| all.iter().position(|m| *m == n);
    for (i, n) in all.iter().enumerate() {
        let parent = graph.parent(*n).unwrap();
        assert!(parent == method || position(parent).is_some_and(|p| p < i));
    }
    let mut unique = all.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), all.len());
    let class = graph.nodes_of_kind(NodeKind::Class).next().unwrap();
    assert!(graph.pred_ast(method, UNBOUNDED).contains(&class));
}

#[test]
fn match_ast_keys_unmatched_children() {
    let shard = java("class A { void f(int a) { } }");
    let graph = &shard.graph;
    let method = graph.nodes_of_kind(NodeKind::Method).next().unwrap();
    let matched = graph.match_ast(method, &["formal_parameters", "block"]);
    assert!(matched["formal_parameters"].is_some());
    assert!(matched["block"].is_some());
    assert!(matched.contains_key("__0__"));
}

#[test]
fn source_text_rebuilds_composite_nodes() {
    let shard = java("class A { void f() { String s = a.b(c); } }");
    let graph = &shard.graph;
    let call = graph.nodes_of_kind(NodeKind::Call).next().unwrap();
    assert_eq!(graph.source_text(call), "a.b(c)");
}
