//! End-to-end query tests over small GraphDBs.

use skims_core::config::AnalysisConfig;
use skims_core::errors::QueryError;
use skims_core::traits::CancellationToken;
use skims_sast::db::{GraphDb, GraphShard};
use skims_sast::graph::NodeKind;
use skims_sast::queries::vulnerability::make_snippet;
use skims_sast::queries::{run_configured, run_queries, Finding, Method, Vulnerability};
use skims_sast::scanner::language_detect::Language;

fn db(files: &[(&str, Language, &str)]) -> GraphDb {
    GraphDb::from_shards(
        files
            .iter()
            .map(|(path, language, source)| GraphShard::from_text(path, *language, source).unwrap()),
    )
}

fn lines(vulnerabilities: &[Vulnerability]) -> Vec<usize> {
    let mut out: Vec<usize> = vulnerabilities.iter().map(Vulnerability::line).collect();
    out.sort_unstable();
    out
}

#[test]
fn generic_catch_points_at_the_exception_type() {
    let source = "\
class Job {
    void run() {
        try {
            work();
        } catch (Exception e) {
        }
    }
}
";
    let db = db(&[("src/Job.java", Language::Java, source)]);
    let found = run_queries(&db, &[Finding::F117]);
    assert_eq!(found.len(), 1);
    let vulnerability = &found[0];
    assert_eq!(vulnerability.finding, Finding::F117);
    assert_eq!(vulnerability.method, Method::JavaInsecureExceptions);
    assert_eq!(vulnerability.what, "src/Job.java");
    assert_eq!(vulnerability.line(), 5);

    let shard = db.get("src/Job.java").unwrap();
    let graph = &shard.graph;
    let reported = graph
        .nodes_of_kind(NodeKind::Identifier)
        .chain(graph.nodes_by_label("type_identifier"))
        .find(|n| graph.text(*n) == Some("Exception"))
        .unwrap();
    assert_eq!(shard.line_of(reported) as usize, vulnerability.line());
}

#[test]
fn request_parameter_into_process_builder_is_command_injection() {
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
    let db = db(&[("Handler.java", Language::Java, source)]);
    let found = run_queries(&db, &[Finding::F004]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].method, Method::JavaCommandInjection);
    assert_eq!(found[0].line(), 6);
    assert_eq!(found[0].skims_metadata.cwe, 78);
}

#[test]
fn switch_default_decides_the_report() {
    let without = "\
class S {
    void f(int x) {
        switch (x) { case 1: break; }
    }
}
";
    let with = "\
class T {
    void f(int x) {
        switch (x) { case 1: break; default: break; }
    }
}
";
    let db = db(&[
        ("S.java", Language::Java, without),
        ("T.java", Language::Java, with),
    ]);
    let found = run_queries(&db, &[Finding::F073]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].what, "S.java");
    assert_eq!(found[0].line(), 3);
}

#[test]
fn queries_only_see_their_language() {
    let python = "\
try:
    work()
except:
    pass
";
    let java = "class A { void f() { try { g(); } catch (Throwable t) { } } }";
    let db = db(&[
        ("job.py", Language::Python, python),
        ("A.java", Language::Java, java),
    ]);
    let found = run_queries(&db, &[Finding::F117]);
    let mut methods: Vec<Method> = found.iter().map(|v| v.method).collect();
    methods.sort();
    assert_eq!(
        methods,
        vec![Method::JavaInsecureExceptions, Method::PythonInsecureExceptions]
    );
    let python_found: Vec<Vulnerability> = found
        .into_iter()
        .filter(|v| v.method == Method::PythonInsecureExceptions)
        .collect();
    assert_eq!(lines(&python_found), vec![3]);
}

#[test]
fn unselected_findings_do_not_run() {
    let java = "class A { void f(int x) { switch (x) { case 1: break; } try { g(); } catch (Exception e) { } } }";
    let db = db(&[("A.java", Language::Java, java)]);
    let found = run_queries(&db, &[Finding::F073]);
    assert!(found.iter().all(|v| v.finding == Finding::F073));
    assert_eq!(found.len(), 1);
}

#[test]
fn configured_runs_reject_unknown_findings() {
    let db = db(&[("A.java", Language::Java, "class A {}")]);
    let analysis = AnalysisConfig {
        findings: vec!["F999".into()],
        ..Default::default()
    };
    let err = run_configured(&db, &analysis, "acme", &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, QueryError::UnknownFinding(code) if code == "F999"));
}

#[test]
fn configured_runs_carry_the_namespace() {
    let source = "class A { void f() { try { g(); } catch (Exception e) { } } }";
    let db = db(&[("A.java", Language::Java, source)]);
    let analysis = AnalysisConfig {
        findings: vec!["F117".into()],
        ..Default::default()
    };
    let found = run_configured(&db, &analysis, "acme", &CancellationToken::new()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].namespace, "acme");
}

#[test]
fn vulnerability_serializes_with_report_field_names() {
    let source = "class A { void f() { try { g(); } catch (Exception e) { } } }";
    let db = db(&[("A.java", Language::Java, source)]);
    let found = run_queries(&db, &[Finding::F117]);
    let json = serde_json::to_value(&found[0]).unwrap();
    assert_eq!(json["where"], "1");
    assert_eq!(json["what"], "A.java");
    assert_eq!(json["finding"], "F117");
    assert_eq!(json["method"], "JAVA_INSECURE_EXCEPTIONS");
    assert_eq!(json["technique"], "BSAST");
    assert_eq!(json["kind"], "lines");
    assert_eq!(json["state"], "open");
    assert_eq!(json["skims_metadata"]["cwe"], 396);
    assert_eq!(
        json["skims_metadata"]["source_method"],
        "java.java_insecure_exceptions"
    );
    assert!(json.get("where_").is_none());

    let back: Vulnerability = serde_json::from_value(json).unwrap();
    assert_eq!(back, found[0]);
}

#[test]
fn snippet_marks_the_reported_line() {
    let source = "a = 1\nb = 2\nc = 3\nd = 4\ne = 5\n";
    let shard = GraphShard::from_text("notes.py", Language::Python, source).unwrap();
    let snippet = make_snippet(&shard, 3, 1);
    let rows: Vec<&str> = snippet.lines().collect();
    assert_eq!(rows, vec!["  2 | b = 2", "> 3 | c = 3", "  4 | d = 4"]);
}
