//! Syntax step lowering tests: steps point back into the graph, dependencies
//! always point backwards, and multi-assignments over-approximate.

use skims_sast::db::GraphShard;
use skims_sast::graph::{backward_paths, Graph, NodeId, NodeKind, PathBounds};
use skims_sast::scanner::language_detect::Language;
use skims_sast::syntax::{lower, lower_node, StepKind, SyntaxStep};

const HANDLER: &str = "\
class Handler {
    void handle(HttpServletRequest request) throws Exception {
        String cmd = request.getParameter(\"cmd\");
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";

fn shard(path: &str, language: Language, source: &str) -> GraphShard {
    GraphShard::from_text(path, language, source).unwrap()
}

fn call_named(graph: &Graph, name: &str) -> NodeId {
    graph
        .nodes_of_kind(NodeKind::Call)
        .find(|n| graph.source_text(*n).contains(name))
        .unwrap()
}

fn lowered_path(graph: &Graph, sink: NodeId) -> Vec<SyntaxStep> {
    let search = backward_paths(graph, sink, PathBounds::default());
    assert_eq!(search.paths.len(), 1);
    lower(graph, &search.paths[0]).collect()
}

#[test]
fn steps_reference_graph_nodes_and_earlier_steps() {
    let shard = shard("Handler.java", Language::Java, HANDLER);
    let graph = &shard.graph;
    let steps = lowered_path(graph, call_named(graph, "start"));
    assert!(!steps.is_empty());
    for (index, step) in steps.iter().enumerate() {
        assert!(graph.contains(step.meta.n_id), "step {index} points outside the graph");
        for dependency in step.dependencies() {
            assert!(*dependency < index, "step {index} depends on {dependency}");
        }
    }
}

#[test]
fn handler_path_lowers_to_expected_steps() {
    let shard = shard("Handler.java", Language::Java, HANDLER);
    let graph = &shard.graph;
    let steps = lowered_path(graph, call_named(graph, "start"));
    let kinds: Vec<&StepKind> = steps.iter().map(|s| &s.kind).collect();

    assert!(kinds.iter().any(|k| matches!(
        k,
        StepKind::Declaration { var, is_parameter: true, .. } if var == "request"
    )));
    assert!(kinds.iter().any(|k| matches!(
        k,
        StepKind::MethodInvocation { method } if method == "request.getParameter"
    )));
    assert!(kinds.iter().any(|k| matches!(
        k,
        StepKind::ObjectInstantiation { object_type } if object_type == "ProcessBuilder"
    )));

    let builder = steps
        .iter()
        .position(|s| matches!(&s.kind, StepKind::Declaration { var, .. } if var == "builder"))
        .unwrap();
    let creation = steps[builder].dependencies()[0];
    assert_eq!(steps[creation].kind.name(), "object_instantiation");
}

#[test]
fn lowering_is_deterministic() {
    let shard = shard("Handler.java", Language::Java, HANDLER);
    let graph = &shard.graph;
    let sink = call_named(graph, "start");
    assert_eq!(lowered_path(graph, sink), lowered_path(graph, sink));
}

#[test]
fn node_offset_numbers_steps_absolutely() {
    let shard = shard("Handler.java", Language::Java, HANDLER);
    let graph = &shard.graph;
    let declaration = graph
        .nodes_of_kind(NodeKind::VariableDeclaration)
        .next()
        .unwrap();
    let steps = lower_node(graph, declaration, 10, None).unwrap();
    assert!(steps.len() >= 3);
    for step in &steps {
        assert!(step.dependencies().iter().all(|d| *d >= 10));
    }
    assert!(matches!(
        &steps.last().unwrap().kind,
        StepKind::Declaration { var, var_type: Some(t), .. } if var == "cmd" && t == "String"
    ));
}

#[test]
fn uneven_multi_assignment_gives_every_name_every_value() {
    let source = "\
package main

func f() {
\ta, b := pair()
\t_ = a
\t_ = b
}
";
    let shard = shard("main.go", Language::Go, source);
    let graph = &shard.graph;
    let declaration = graph.nodes_by_label("short_var_declaration").next().unwrap();
    let steps = lower_node(graph, declaration, 0, None).unwrap();

    let call = steps
        .iter()
        .position(|s| matches!(&s.kind, StepKind::MethodInvocation { method } if method == "pair"))
        .unwrap();
    let names: Vec<&SyntaxStep> = steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Declaration { .. }))
        .collect();
    assert_eq!(names.len(), 2);
    for name in names {
        assert_eq!(name.dependencies(), &[call]);
    }
}

#[test]
fn even_multi_assignment_pairs_positionally() {
    let source = "\
package main

func f() {
\ta, b := 1, \"two\"
\t_ = a
\t_ = b
}
";
    let shard = shard("main.go", Language::Go, source);
    let graph = &shard.graph;
    let declaration = graph.nodes_by_label("short_var_declaration").next().unwrap();
    let steps = lower_node(graph, declaration, 0, None).unwrap();
    let declarations: Vec<&SyntaxStep> = steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Declaration { .. }))
        .collect();
    assert_eq!(declarations.len(), 2);
    assert_eq!(declarations[0].dependencies().len(), 1);
    assert_eq!(declarations[1].dependencies().len(), 1);
    assert_ne!(declarations[0].dependencies(), declarations[1].dependencies());
}
