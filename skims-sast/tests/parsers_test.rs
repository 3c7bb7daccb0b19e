//! Parser adapter tests: every grammar yields a raw tree, broken input is
//! tolerated or rejected per config, unsupported languages are reported.

use std::path::Path;

use skims_core::config::ScanConfig;
use skims_core::errors::ParseError;
use skims_sast::parsers::ParserManager;
use skims_sast::scanner::language_detect::Language;
use skims_sast::scanner::types::SourceFile;

fn parse(path: &str, source: &str) -> Result<skims_sast::parsers::ParseResult, ParseError> {
    ParserManager::new().parse(source.as_bytes(), Path::new(path))
}

fn labels(result: &skims_sast::parsers::ParseResult) -> Vec<&'static str> {
    result.tree.nodes.iter().map(|n| n.label_type).collect()
}

#[test]
fn each_supported_language_parses() {
    let cases = [
        ("A.java", "class A { void f() { int x = 1; } }", "method_declaration"),
        ("A.cs", "class A { void F() { var x = 1; } }", "method_declaration"),
        ("main.go", "package main\nfunc f() { x := 1; _ = x }\n", "function_declaration"),
        ("a.js", "function f() { let x = 1; }", "function_declaration"),
        ("a.ts", "function f(x: number): number { return x; }", "function_declaration"),
        ("a.py", "def f():\n    x = 1\n", "function_definition"),
        ("A.kt", "class A { fun f() { val x = 1 } }", "function_declaration"),
    ];
    for (path, source, expected) in cases {
        let result = parse(path, source).unwrap();
        assert!(!result.has_errors, "{path} should parse cleanly");
        assert!(labels(&result).contains(&expected), "{path} lacks {expected}");
    }
}

#[test]
fn root_has_no_parent_and_children_point_back() {
    let result = parse("A.java", "class A { int x; void f() { x = 2; } }").unwrap();
    let tree = &result.tree;
    assert!(tree.root().unwrap().parent.is_none());
    for (index, node) in tree.nodes.iter().enumerate() {
        for child in &node.children {
            assert_eq!(tree.nodes[*child as usize].parent, Some(index as u32));
        }
    }
}

#[test]
fn syntax_errors_are_tolerated_by_default() {
    let result = parse("A.java", "class A { void f() { int x = ; } }").unwrap();
    assert!(result.has_errors);
    assert!(result.error_count > 0);
    assert!(!labels(&result).contains(&"ERROR"));
}

#[test]
fn syntax_errors_rejected_when_configured() {
    let config = ScanConfig {
        reject_partial_parses: Some(true),
        ..Default::default()
    };
    let manager = ParserManager::from_config(&config);
    let err = manager
        .parse(b"class A { void f() { int x = ; } }", Path::new("A.java"))
        .unwrap_err();
    assert!(matches!(err, ParseError::PartialParse { .. }));
}

#[test]
fn unsupported_languages_are_reported() {
    let err = parse("main.swift", "let x = 1").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
    let err = parse("notes.txt", "hello").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
}

#[test]
fn cloudformation_yaml_becomes_a_document_tree() {
    let source = "\
Resources:
  Bucket:
    Type: AWS::S3::Bucket
    Properties:
      VersioningConfiguration:
        Status: Enabled
";
    let result = parse("template.yaml", source).unwrap();
    let labels = labels(&result);
    for expected in ["object", "pair", "key", "string"] {
        assert!(labels.contains(&expected), "missing {expected}");
    }
    let texts: Vec<&str> = result
        .tree
        .nodes
        .iter()
        .filter_map(|n| n.text.as_deref())
        .collect();
    assert!(texts.contains(&"AWS::S3::Bucket"));
}

#[test]
fn cloudformation_json_keeps_scalars() {
    let source = r#"{"Resources": {"Queue": {"Type": "AWS::SQS::Queue", "Properties": {"DelaySeconds": 5, "FifoQueue": true}}}}"#;
    let result = parse("template.json", source).unwrap();
    let labels = labels(&result);
    assert!(labels.contains(&"number"));
    assert!(labels.contains(&"boolean"));
}

#[test]
fn identical_content_hits_the_cache() {
    let manager = ParserManager::new();
    let file = SourceFile::new("A.java", Language::Java, b"class A {}".to_vec());
    let other = SourceFile::new("B.java", Language::Java, b"class A {}".to_vec());
    manager.parse_file(&file).unwrap();
    let second = manager.parse_file(&other).unwrap();
    assert_eq!(second.file, "B.java");
    assert!(manager.cache_hit_rate() > 0.0);
}
