//! Control-flow augmentation tests.

use skims_sast::db::GraphShard;
use skims_sast::graph::{CfgEdgeKind, Graph, NodeId, NodeKind, UNBOUNDED};
use skims_sast::scanner::language_detect::Language;

fn shard(path: &str, language: Language, source: &str) -> GraphShard {
    GraphShard::from_text(path, language, source).unwrap()
}

fn first(graph: &Graph, kind: NodeKind) -> NodeId {
    graph.nodes_of_kind(kind).next().unwrap()
}

/// The statement starting on `line`.
fn statement_at(graph: &Graph, line: u32) -> NodeId {
    graph
        .node_ids()
        .find(|n| graph.line(*n) == line && graph.kind(*n).is_statement())
        .unwrap()
}

fn is_within(graph: &Graph, n_id: NodeId, container: NodeId) -> bool {
    graph.ancestors(n_id).any(|a| a == container)
}

/// Asserts the loop shape: one back-edge from inside the body, at most
/// one FALSE edge out of the header.
fn assert_loop_shape(graph: &Graph, header: NodeId, after: Option<NodeId>) {
    let back_edges = graph
        .cfg_predecessors(header)
        .into_iter()
        .filter(|(from, _)| is_within(graph, *from, header))
        .count();
    assert_eq!(back_edges, 1, "loop {header} back-edges");
    let exits: Vec<NodeId> = graph
        .cfg_successors(header)
        .into_iter()
        .filter(|(_, kind)| *kind == CfgEdgeKind::False)
        .map(|(to, _)| to)
        .collect();
    assert!(exits.len() <= 1);
    assert_eq!(exits.first().copied(), after);
}

#[test]
fn java_while_loop_has_one_back_edge() {
    let source = "\
class A {
    void f(int a) {
        while (a < 10) {
            a = a + 1;
            a = a * 2;
        }
        g(a);
    }
}
";
    let shard = shard("A.java", Language::Java, source);
    let graph = &shard.graph;
    let header = first(graph, NodeKind::While);
    let last = statement_at(graph, 5);
    assert_eq!(graph.cfg_edge(last, header), Some(CfgEdgeKind::Always));
    assert_loop_shape(graph, header, Some(statement_at(graph, 7)));
}

#[test]
fn go_for_loop_has_one_back_edge() {
    let source = "\
package main

func f() int {
\ttotal := 0
\tfor i := 0; i < 3; i++ {
\t\ttotal += i
\t}
\treturn total
}
";
    let shard = shard("main.go", Language::Go, source);
    let graph = &shard.graph;
    let header = first(graph, NodeKind::For);
    assert_loop_shape(graph, header, Some(statement_at(graph, 8)));
}

#[test]
fn python_while_loop_has_one_back_edge() {
    let source = "\
def f(a):
    while a < 10:
        a = a + 1
    return a
";
    let first_shard = shard("a.py", Language::Python, source);
    let graph = &first_shard.graph;
    let header = first(graph, NodeKind::While);
    assert_loop_shape(graph, header, Some(statement_at(graph, 4)));

    // A body ending in an else-less `if` loops back through its FALSE edge.
    let source = "\
def f(a):
    while a < 10:
        a = a + 1
        if a > 5:
            break
    return a
";
    let shard = shard("b.py", Language::Python, source);
    let graph = &shard.graph;
    let header = first(graph, NodeKind::While);
    let branch = first(graph, NodeKind::If);
    assert_loop_shape(graph, header, Some(statement_at(graph, 6)));
    let back: Vec<(NodeId, CfgEdgeKind)> = graph
        .cfg_predecessors(header)
        .into_iter()
        .filter(|(from, _)| is_within(graph, *from, header))
        .collect();
    assert_eq!(back, vec![(branch, CfgEdgeKind::False)]);
}

#[test]
fn if_branches_are_true_and_false() {
    let source = "\
class A {
    void f(int a) {
        if (a > 1) {
            a = 0;
        } else {
            a = 3;
        }
    }
}
";
    let shard = shard("A.java", Language::Java, source);
    let graph = &shard.graph;
    let branch = first(graph, NodeKind::If);
    let kinds: Vec<CfgEdgeKind> = graph.cfg_successors(branch).into_iter().map(|(_, k)| k).collect();
    assert!(kinds.contains(&CfgEdgeKind::True));
    assert!(kinds.contains(&CfgEdgeKind::False));
}

#[test]
fn break_jumps_to_the_loop_exit() {
    let source = "\
class A {
    void f(int a) {
        while (true) {
            break;
        }
        g();
    }
}
";
    let shard = shard("A.java", Language::Java, source);
    let graph = &shard.graph;
    let jump = first(graph, NodeKind::Break);
    assert_eq!(graph.cfg_edge(jump, statement_at(graph, 6)), Some(CfgEdgeKind::Break));
}

#[test]
fn switch_without_default_may_skip_every_case() {
    let source = "\
class A {
    void f(int x) {
        switch (x) {
            case 1: g(); break;
            case 2: h(); break;
        }
        done();
    }
}
";
    let shard = shard("A.java", Language::Java, source);
    let graph = &shard.graph;
    let switch = first(graph, NodeKind::Switch);
    let maybe: Vec<NodeId> = graph
        .cfg_successors(switch)
        .into_iter()
        .filter(|(_, k)| *k == CfgEdgeKind::Maybe)
        .map(|(to, _)| to)
        .collect();
    assert_eq!(maybe.len(), 3);
    assert!(maybe.contains(&statement_at(graph, 7)));
}

#[test]
fn cfg_edges_leave_the_tree_intact() {
    let source = "class A { void f() { for (int i = 0; i < 2; i++) { if (i > 0) { continue; } } } }";
    let shard = shard("A.java", Language::Java, source);
    let graph = &shard.graph;
    assert!(graph.cfg_edge_count() > 0);
    for n_id in graph.node_ids().skip(1) {
        let ast_parents = graph
            .edges()
            .into_iter()
            .filter(|(_, to, kind)| *to == n_id && kind.is_ast())
            .count();
        assert_eq!(ast_parents, 1);
    }
    let method = first(graph, NodeKind::Method);
    assert!(!graph.adj_cfg(method, UNBOUNDED).is_empty());
}

#[test]
fn documents_get_no_control_flow() {
    let shard = shard("template.yaml", Language::Yaml, "Resources:\n  A:\n    Type: X\n");
    assert_eq!(shard.graph.cfg_edge_count(), 0);
    assert!(shard.metadata.is_empty());
}
