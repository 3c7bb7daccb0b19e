//! Switch statements with no default branch (F073).

use super::method::Method;
use super::{Query, QueryContext};
use crate::cfg::augmenter::is_default_case;
use crate::db::GraphShard;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::scanner::language_detect::Language;

/// Parents that put a Java `switch_expression` in statement position. The
/// Java grammar uses that label for plain switch statements too.
const STATEMENT_PARENTS: [&str; 11] = [
    "block",
    "constructor_body",
    "switch_block_statement_group",
    "switch_rule",
    "labeled_statement",
    "if_statement",
    "while_statement",
    "do_statement",
    "for_statement",
    "enhanced_for_statement",
    "program",
];

pub struct SwitchWithoutDefault(pub Method);

impl Query for SwitchWithoutDefault {
    fn method(&self) -> Method {
        self.0
    }

    fn matches(&self, _ctx: &QueryContext<'_>, shard: &GraphShard) -> Vec<NodeId> {
        let graph = &shard.graph;
        graph
            .nodes_of_kind(NodeKind::Switch)
            .filter(|switch| !is_exempt(graph, shard.language, *switch))
            .filter(|switch| !has_default(graph, *switch))
            .collect()
    }
}

/// Go `select` has no default semantics, and switch expressions (C#, or Java
/// in expression position) must already be exhaustive.
fn is_exempt(graph: &Graph, language: Language, switch: NodeId) -> bool {
    match graph.label_type(switch) {
        "select_statement" => true,
        "switch_expression" if language == Language::Java => graph
            .parent(switch)
            .is_some_and(|parent| !STATEMENT_PARENTS.contains(&graph.label_type(parent))),
        "switch_expression" => true,
        _ => false,
    }
}

/// Cases hang off the switch directly (Go) or through a body node.
fn has_default(graph: &Graph, switch: NodeId) -> bool {
    graph
        .adj_ast(switch, 2)
        .into_iter()
        .filter(|n| graph.kind(*n) == NodeKind::SwitchCase)
        .any(|case| is_default_case(graph, case))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{GraphDb, GraphShard};
    use crate::scanner::language_detect::Language;

    fn matches(language: Language, path: &str, source: &str) -> Vec<u32> {
        let shard = GraphShard::from_text(path, language, source).unwrap();
        let db = GraphDb::from_shards(vec![shard]);
        let ctx = QueryContext::new(&db);
        let method = match language {
            Language::Go => Method::GoSwitchWithoutDefault,
            Language::JavaScript => Method::JavascriptSwitchWithoutDefault,
            _ => Method::JavaSwitchWithoutDefault,
        };
        let shard = &db.shards()[0];
        SwitchWithoutDefault(method)
            .matches(&ctx, shard)
            .into_iter()
            .map(|n| shard.line_of(n))
            .collect()
    }

    #[test]
    fn java_switch_without_default_is_reported() {
        let source = "class A {\n  void f(int x) {\n    switch (x) {\n      case 1: break;\n    }\n  }\n}\n";
        assert_eq!(matches(Language::Java, "A.java", source), vec![3]);
    }

    #[test]
    fn java_switch_with_default_is_clean() {
        let source = "class A {\n  void f(int x) {\n    switch (x) {\n      case 1: break;\n      default: break;\n    }\n  }\n}\n";
        assert!(matches(Language::Java, "A.java", source).is_empty());
    }

    #[test]
    fn java_switch_in_expression_position_is_exempt() {
        let source = "class A {\n  String f(int x) {\n    String s = switch (x) {\n      case 1 -> \"a\";\n      case 2 -> \"b\";\n    };\n    return s;\n  }\n}\n";
        assert!(matches(Language::Java, "A.java", source).is_empty());
    }

    #[test]
    fn java_switch_nested_in_case_is_reported() {
        let source = "class A {\n  void f(int x, int y) {\n    switch (x) {\n      case 1:\n        switch (y) { case 2: break; }\n        break;\n      default: break;\n    }\n  }\n}\n";
        assert_eq!(matches(Language::Java, "A.java", source), vec![5]);
    }

    #[test]
    fn go_default_case_is_recognized() {
        let source = "package main\n\nfunc f(x int) {\n\tswitch x {\n\tcase 1:\n\t\treturn\n\tdefault:\n\t\treturn\n\t}\n}\n";
        assert!(matches(Language::Go, "main.go", source).is_empty());
    }

    #[test]
    fn javascript_switch_without_default_is_reported() {
        let source = "function f(x) {\n  switch (x) {\n    case 1:\n      break;\n  }\n}\n";
        assert_eq!(matches(Language::JavaScript, "a.js", source), vec![2]);
    }
}
