//! GraphDB assembly tests: directory discovery, partial failures, and
//! cancellation.

use std::fs;

use skims_core::config::{ScanConfig, SkimsConfig};
use skims_core::errors::{ParseError, PipelineError};
use skims_core::traits::{Cancellable, CancellationToken, Deadline};
use skims_sast::db::{build_graph_db, build_graph_db_from_dir};
use skims_sast::scanner::language_detect::Language;
use skims_sast::scanner::types::SourceFile;

fn java(path: &str, source: &str) -> SourceFile {
    SourceFile::new(path, Language::Java, source.as_bytes().to_vec())
}

#[test]
fn directory_builds_one_shard_per_supported_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/app")).unwrap();
    fs::write(root.join("src/app/A.java"), "class A { void f() {} }").unwrap();
    fs::write(root.join("src/app/job.py"), "def run():\n    pass\n").unwrap();
    fs::write(root.join("README.md"), "# readme").unwrap();

    let result = build_graph_db_from_dir(root, &SkimsConfig::default(), &CancellationToken::new()).unwrap();
    assert!(result.is_clean());
    let db = result.data;
    assert_eq!(db.len(), 2);
    let paths: Vec<&str> = db.shards().iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["src/app/A.java", "src/app/job.py"]);
    assert_eq!(db.get("src/app/A.java").unwrap().language, Language::Java);
}

#[test]
fn unsupported_grammar_is_a_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("A.java"), "class A {}").unwrap();
    fs::write(root.join("View.swift"), "let x = 1").unwrap();

    let result = build_graph_db_from_dir(root, &SkimsConfig::default(), &CancellationToken::new()).unwrap();
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.error_count(), 1);
    assert!(matches!(
        &result.errors[0],
        PipelineError::Parse(ParseError::UnsupportedLanguage { .. })
    ));
}

#[test]
fn bad_include_glob_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = SkimsConfig {
        scan: ScanConfig {
            include: vec!["src/[".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let err = build_graph_db_from_dir(dir.path(), &config, &CancellationToken::new()).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn failing_files_are_reported_and_left_out() {
    let config = SkimsConfig {
        scan: ScanConfig {
            max_file_size: Some(64),
            reject_partial_parses: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let large = format!("class Big {{ {} }}", "int x; ".repeat(20));
    let files = vec![
        java("A.java", "class A {}"),
        java("Big.java", &large),
        java("Broken.java", "class B { void f() { int = ; } }"),
    ];

    let result = build_graph_db(&files, &config, &CancellationToken::new());
    assert_eq!(result.data.len(), 1);
    assert!(result.data.get("A.java").is_some());
    assert_eq!(result.error_count(), 2);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, PipelineError::Parse(ParseError::FileTooLarge { limit: 64, .. }))));
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, PipelineError::Parse(ParseError::PartialParse { .. }))));
    assert!(result.errors.iter().all(|e| !e.is_fatal()));
}

#[test]
fn disabled_languages_are_skipped() {
    let mut config = SkimsConfig::default();
    config.analysis.languages = vec!["python".into()];
    let files = vec![
        java("A.java", "class A {}"),
        SourceFile::from_text("job.py", "x = 1\n").unwrap(),
    ];
    let result = build_graph_db(&files, &config, &CancellationToken::new());
    assert!(result.is_clean());
    assert_eq!(result.data.len(), 1);
    assert!(result.data.get("job.py").is_some());
}

#[test]
fn cancelled_build_reports_cancellation() {
    let token = CancellationToken::new();
    token.cancel();
    let files = vec![java("A.java", "class A {}")];
    let result = build_graph_db(&files, &SkimsConfig::default(), &token);
    assert!(result.data.is_empty());
    assert!(matches!(result.errors.as_slice(), [PipelineError::Cancelled]));
}

#[test]
fn expired_deadline_reports_its_budget() {
    let token = CancellationToken::with_deadline(Deadline::from_millis(0));
    let files = vec![java("A.java", "class A {}")];
    let result = build_graph_db(&files, &SkimsConfig::default(), &token);
    assert!(result.data.is_empty());
    assert!(matches!(
        result.errors.as_slice(),
        [PipelineError::DeadlineExceeded { deadline_ms: 0 }]
    ));
}

#[test]
fn shards_are_ordered_by_path_regardless_of_completion() {
    let files: Vec<SourceFile> = (0..16)
        .rev()
        .map(|i| java(&format!("C{i:02}.java"), &format!("class C{i:02} {{}}")))
        .collect();
    let result = build_graph_db(&files, &SkimsConfig::default(), &CancellationToken::new());
    let paths: Vec<String> = result.data.shards().iter().map(|s| s.path.clone()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths.len(), 16);
    assert_eq!(paths, sorted);
}
