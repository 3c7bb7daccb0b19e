//! Symbolic evaluator tests: taint reaching sinks, inlining of local
//! methods, infeasible branches, and danger propagation.

use skims_core::traits::{Cancellable, CancellationToken};
use skims_sast::db::{GraphDb, GraphShard};
use skims_sast::graph::{backward_paths, Graph, NodeId, NodeKind, PathBounds};
use skims_sast::queries::finding::Finding;
use skims_sast::scanner::language_detect::Language;
use skims_sast::symeval::{Evaluator, EvaluatorConfig, SinkMode};
use skims_sast::syntax::{StepKind, Value};

fn java_db(source: &str) -> GraphDb {
    let shard = GraphShard::from_text("Handler.java", Language::Java, source).unwrap();
    GraphDb::from_shards(vec![shard])
}

fn creation_of(graph: &Graph, type_name: &str) -> NodeId {
    graph
        .nodes_of_kind(NodeKind::ObjectCreation)
        .find(|n| graph.source_text(*n).contains(type_name))
        .unwrap()
}

fn process_builder_is_dangerous(source: &str) -> bool {
    let db = java_db(source);
    let shard = &db.shards()[0];
    let sink = creation_of(&shard.graph, "ProcessBuilder");
    Evaluator::new(&db, Finding::F004, EvaluatorConfig::default()).evaluate_sink(shard, sink, SinkMode::Step)
}

#[test]
fn request_parameter_reaches_process_builder() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    void handle(HttpServletRequest request) throws Exception {
        String cmd = request.getParameter(\"cmd\");
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(process_builder_is_dangerous(source));
}

#[test]
fn constant_command_is_safe() {
    let source = "\
class Handler {
    void handle() throws Exception {
        String cmd = \"ls\";
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(!process_builder_is_dangerous(source));
}

#[test]
fn untainted_parameter_type_is_safe() {
    let source = "\
class Handler {
    void handle(String cmd) throws Exception {
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(!process_builder_is_dangerous(source));
}

#[test]
fn local_request_declaration_is_a_source() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    void handle(Object o) throws Exception {
        HttpServletRequest req = (HttpServletRequest) o;
        ProcessBuilder builder = new ProcessBuilder(String.valueOf(req));
        builder.start();
    }
}
";
    assert!(process_builder_is_dangerous(source));
    let plain = source.replace("HttpServletRequest req = (HttpServletRequest) o", "Object req = o");
    assert!(!process_builder_is_dangerous(&plain));
}

#[test]
fn taint_flows_through_local_methods() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    String wrap(String value) {
        String wrapped = value.trim();
        return wrapped;
    }

    void handle(HttpServletRequest request) throws Exception {
        String cmd = wrap(request.getParameter(\"cmd\"));
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(process_builder_is_dangerous(source));
}

#[test]
fn inlined_constant_stays_safe() {
    let source = "\
class Handler {
    String command() {
        return \"ls\";
    }

    void handle() throws Exception {
        String cmd = command();
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(!process_builder_is_dangerous(source));
}

#[test]
fn infeasible_branch_is_skipped() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    void handle(HttpServletRequest request) throws Exception {
        String cmd = \"ls\";
        boolean debug = false;
        if (debug) {
            cmd = request.getParameter(\"cmd\");
        }
        ProcessBuilder builder = new ProcessBuilder(cmd);
        builder.start();
    }
}
";
    assert!(!process_builder_is_dangerous(source));
    assert!(process_builder_is_dangerous(&source.replace("debug = false", "debug = true")));
}

#[test]
fn danger_never_drops_through_copies() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    void handle(HttpServletRequest request) throws Exception {
        String id = request.getParameter(\"id\");
        String copy = id;
        String query = \"SELECT \" + copy;
        query = query + \" LIMIT 1\";
        run(query);
    }
}
";
    let db = java_db(source);
    let shard = &db.shards()[0];
    let graph = &shard.graph;
    let sink = graph
        .nodes_of_kind(NodeKind::Call)
        .find(|n| graph.source_text(*n).starts_with("run"))
        .unwrap();
    let path = &backward_paths(graph, sink, PathBounds::default()).paths[0];
    let evaluator = Evaluator::new(&db, Finding::F001, EvaluatorConfig::default());
    let steps = evaluator.evaluate_path(shard, path).unwrap();

    let propagating = steps.iter().filter(|s| {
        matches!(
            s.kind,
            StepKind::Declaration { is_parameter: false, .. }
                | StepKind::Assignment { .. }
                | StepKind::BinaryExpression { .. }
        )
    });
    let mut checked = 0;
    for step in propagating {
        if step.dependencies().iter().any(|d| steps[*d].meta.danger) {
            assert!(step.meta.danger, "{} lost danger", step.kind.name());
            checked += 1;
        }
    }
    assert!(checked >= 4);
    assert!(evaluator.evaluate_sink(shard, sink, SinkMode::Arguments));
}

#[test]
fn constant_expressions_fold_to_values() {
    let source = "\
class Handler {
    void handle() {
        String table = \"users\";
        String query = \"SELECT * FROM \" + table;
        run(query);
    }
}
";
    let db = java_db(source);
    let shard = &db.shards()[0];
    let binary = shard.graph.nodes_by_label("binary_expression").next().unwrap();
    let evaluator = Evaluator::new(&db, Finding::F001, EvaluatorConfig::default());
    assert_eq!(
        evaluator.evaluate_value(shard, binary),
        Some(Value::Str("SELECT * FROM users".to_string()))
    );
}

#[test]
fn cancelled_evaluation_reports_nothing() {
    let source = "\
import javax.servlet.http.HttpServletRequest;

class Handler {
    void handle(HttpServletRequest request) throws Exception {
        ProcessBuilder builder = new ProcessBuilder(request.getParameter(\"cmd\"));
    }
}
";
    let db = java_db(source);
    let shard = &db.shards()[0];
    let sink = creation_of(&shard.graph, "ProcessBuilder");
    let token = CancellationToken::new();
    let evaluator = Evaluator::new(&db, Finding::F004, EvaluatorConfig::default()).with_token(&token);
    assert!(evaluator.evaluate_sink(shard, sink, SinkMode::Step));
    token.cancel();
    assert!(!evaluator.evaluate_sink(shard, sink, SinkMode::Step));
}
