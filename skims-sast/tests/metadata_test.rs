//! Metadata extraction and cross-file context tests.

use skims_sast::db::{GraphDb, GraphShard};
use skims_sast::graph::NodeKind;
use skims_sast::scanner::language_detect::Language;

fn shard(path: &str, language: Language, source: &str) -> GraphShard {
    GraphShard::from_text(path, language, source).unwrap()
}

#[test]
fn java_package_classes_methods_and_fields() {
    let source = "\
package com.acme.users;

import java.util.List;

public class UserService {
    private final UserRepository repository;
    private int retries, timeout;

    public User find(String id, int version) { return null; }
    public User find(String id) { return null; }

    static class Cache {
        void clear() {}
    }
}
";
    let shard = shard("UserService.java", Language::Java, source);
    let metadata = &shard.metadata;
    assert_eq!(metadata.package, "com.acme.users");

    let (qualified, service) = metadata.class("UserService").unwrap();
    assert_eq!(qualified, "com.acme.users.UserService");
    assert!(service.methods.contains_key("find(String,int)"));
    assert!(service.methods.contains_key("find(String)"));
    assert_eq!(service.methods_named("find").count(), 2);
    assert_eq!(service.fields["repository"].declared_type, "UserRepository");
    assert_eq!(service.fields["retries"].declared_type, "int");
    assert!(service.fields.contains_key("timeout"));

    let (qualified, cache) = metadata.class("UserService.Cache").unwrap();
    assert_eq!(qualified, "com.acme.users.UserService.Cache");
    assert!(cache.method("clear").is_some());
    assert!(!service.methods.contains_key("clear()"));
}

#[test]
fn anonymous_class_methods_are_not_members() {
    let source = "\
class Outer {
    Runnable task() {
        return new Runnable() {
            public void run() {}
        };
    }
}
";
    let shard = shard("Outer.java", Language::Java, source);
    let (_, outer) = shard.metadata.class("Outer").unwrap();
    assert!(outer.method("task").is_some());
    assert!(outer.method("run").is_none());
}

#[test]
fn c_sharp_namespace_qualifies_classes() {
    let source = "\
namespace Acme.Billing
{
    public class Invoice
    {
        private decimal total;
        public decimal Total() { return total; }
    }
}
";
    let shard = shard("Invoice.cs", Language::CSharp, source);
    let metadata = &shard.metadata;
    assert_eq!(metadata.package, "Acme.Billing");
    let (qualified, invoice) = metadata.class("Invoice").unwrap();
    assert_eq!(qualified, "Acme.Billing.Invoice");
    assert!(invoice.method("Total").is_some());
    assert!(invoice.fields.contains_key("total"));
}

#[test]
fn class_less_languages_have_empty_metadata() {
    let python = shard("a.py", Language::Python, "class A:\n    def f(self):\n        pass\n");
    assert!(python.metadata.is_empty());
    let go = shard("main.go", Language::Go, "package main\n\nfunc f() {}\n");
    assert!(go.metadata.is_empty());
}

#[test]
fn class_of_method_finds_the_declaring_class() {
    let shard = shard("A.java", Language::Java, "class A { void f() {} }");
    let method = shard.graph.nodes_of_kind(NodeKind::Method).next().unwrap();
    let (qualified, _) = shard.metadata.class_of_method(method).unwrap();
    assert_eq!(qualified, "A");
}

#[test]
fn context_indexes_every_shard() {
    let a = shard(
        "com/acme/A.java",
        Language::Java,
        "package com.acme;\nclass A { void run() {} void run(int x) {} }\n",
    );
    let b = shard(
        "com/acme/B.java",
        Language::Java,
        "package com.acme;\nclass B { String name() { return \"b\"; } }\n",
    );
    let db = GraphDb::from_shards(vec![b, a]);
    let context = db.context();
    assert_eq!(context.class_count(), 2);
    assert_eq!(context.method_count(), 3);

    let (qualified, decl) = context.class("A").unwrap();
    assert_eq!(qualified, "com.acme.A");
    assert_eq!(db.shard_at(decl.shard).unwrap().path, "com/acme/A.java");
    assert_eq!(context.methods("A", "run").len(), 2);
    assert_eq!(context.methods("acme.B", "name").len(), 1);
    assert!(context.methods("C", "name").is_empty());
}
