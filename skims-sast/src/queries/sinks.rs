//! Injection-style queries: sink nodes judged by the symbolic evaluator.
//!
//! A query names the calls and instantiations that act as its sinks. Every
//! matching node of a shard is evaluated over the paths reaching it, and
//! reported when one of them leaves it dangerous.

use skims_core::errors::QueryError;

use super::method::Method;
use super::{Query, QueryContext};
use crate::db::GraphShard;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::symeval::{tables, SinkMode};
use crate::syntax::readers::common::split_callee;
use crate::syntax::type_base;

/// Nodes a sink matches.
#[derive(Debug, Clone, Copy)]
pub enum SinkShape {
    /// Calls by method name. `Type.name` also requires the receiver to be
    /// that type or variable.
    Call(&'static [&'static str]),
    /// Instantiations by simple type name.
    Creation(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Sink {
    pub shape: SinkShape,
    pub mode: SinkMode,
}

const fn calls(names: &'static [&'static str], mode: SinkMode) -> Sink {
    Sink { shape: SinkShape::Call(names), mode }
}

const fn creations(names: &'static [&'static str], mode: SinkMode) -> Sink {
    Sink { shape: SinkShape::Creation(names), mode }
}

/// A query whose matches are the dangerous sinks of one language.
pub struct EvaluatedSinks {
    pub method: Method,
    pub sinks: &'static [Sink],
}

impl EvaluatedSinks {
    /// The first sink `n_id` matches.
    fn sink_of(&self, graph: &Graph, n_id: NodeId) -> Option<&'static Sink> {
        let kind = graph.kind(n_id);
        self.sinks.iter().find(|sink| match (sink.shape, kind) {
            (SinkShape::Call(names), NodeKind::Call) => {
                split_callee(graph, n_id).is_some_and(|(receiver, name)| {
                    let receiver = receiver.map(|r| graph.source_text(r));
                    names
                        .iter()
                        .any(|pattern| call_matches(pattern, receiver.as_deref(), &name))
                })
            }
            (SinkShape::Creation(names), NodeKind::ObjectCreation) => {
                created_type(graph, n_id).is_some_and(|t| names.contains(&t.as_str()))
            }
            _ => false,
        })
    }
}

impl Query for EvaluatedSinks {
    fn method(&self) -> Method {
        self.method
    }

    fn check(&self) -> Result<(), QueryError> {
        let finding = self.method.finding();
        let table = if self.sinks.is_empty() {
            "sinks"
        } else if !tables::has_rules(finding) {
            "evaluator"
        } else {
            return Ok(());
        };
        Err(QueryError::MissingLookupTable {
            table: table.to_string(),
            finding: finding.code().to_string(),
        })
    }

    fn matches(&self, ctx: &QueryContext<'_>, shard: &GraphShard) -> Vec<NodeId> {
        let graph = &shard.graph;
        let evaluator = ctx.evaluator(self.method.finding());
        graph
            .node_ids()
            .filter(|n| matches!(graph.kind(*n), NodeKind::Call | NodeKind::ObjectCreation))
            .filter_map(|n| self.sink_of(graph, n).map(|sink| (n, sink.mode)))
            .filter(|(n, mode)| evaluator.evaluate_sink(shard, *n, *mode))
            .map(|(n, _)| n)
            .collect()
    }
}

/// Whether a callee `receiver.name` matches `pattern`.
fn call_matches(pattern: &str, receiver: Option<&str>, name: &str) -> bool {
    match pattern.rsplit_once('.') {
        None => pattern == name,
        Some((qualifier, method)) => {
            method == name
                && receiver.is_some_and(|r| {
                    let r = type_base(r);
                    r == qualifier || r.ends_with(&format!(".{qualifier}"))
                })
        }
    }
}

/// Simple name of the type an instantiation creates.
fn created_type(graph: &Graph, n_id: NodeId) -> Option<String> {
    let type_node = graph
        .child_by_field(n_id, "type")
        .or_else(|| graph.child_by_kind(n_id, NodeKind::Type))?;
    let text = graph.source_text(type_node);
    let base = type_base(&text);
    Some(base.rsplit('.').next().unwrap_or(base).to_string())
}

pub const JAVA_SQL_INJECTION: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaSqlInjection,
    sinks: &[calls(
        &[
            "addBatch",
            "execute",
            "executeLargeUpdate",
            "executeQuery",
            "executeUpdate",
            "prepareCall",
            "prepareStatement",
            "queryForList",
            "queryForMap",
            "queryForObject",
            "queryForRowSet",
            "batchUpdate",
        ],
        SinkMode::Arguments,
    )],
};

pub const C_SHARP_SQL_INJECTION: EvaluatedSinks = EvaluatedSinks {
    method: Method::CSharpSqlInjection,
    sinks: &[
        creations(&["SqlCommand", "SqlDataAdapter", "OleDbCommand", "OdbcCommand"], SinkMode::Step),
        calls(&["ExecuteSqlRaw", "ExecuteSqlRawAsync", "FromSqlRaw"], SinkMode::Arguments),
    ],
};

pub const JAVA_COMMAND_INJECTION: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaCommandInjection,
    sinks: &[
        creations(&["ProcessBuilder"], SinkMode::Step),
        calls(&["exec"], SinkMode::Arguments),
        calls(&["command"], SinkMode::Step),
    ],
};

pub const C_SHARP_COMMAND_INJECTION: EvaluatedSinks = EvaluatedSinks {
    method: Method::CSharpCommandInjection,
    sinks: &[
        creations(&["ProcessStartInfo"], SinkMode::Step),
        calls(&["Process.Start"], SinkMode::Arguments),
    ],
};

pub const JAVA_REFLECTED_XSS: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaReflectedXss,
    sinks: &[calls(
        &["print", "println", "printf", "format", "write", "setHeader"],
        SinkMode::Step,
    )],
};

pub const JAVA_INSECURE_RANDOM: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaInsecureRandom,
    sinks: &[
        creations(&["Random"], SinkMode::Step),
        calls(&["Math.random"], SinkMode::Step),
    ],
};

pub const JAVA_INSECURE_COOKIE: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaInsecureCookie,
    sinks: &[calls(&["addCookie"], SinkMode::Step)],
};

pub const JAVA_PATH_TRAVERSAL: EvaluatedSinks = EvaluatedSinks {
    method: Method::JavaPathTraversal,
    sinks: &[
        creations(
            &[
                "File",
                "FileInputStream",
                "FileOutputStream",
                "FileReader",
                "FileWriter",
                "RandomAccessFile",
            ],
            SinkMode::Step,
        ),
        calls(&["Paths.get", "Files.newInputStream"], SinkMode::Arguments),
    ],
};

pub const C_SHARP_PATH_TRAVERSAL: EvaluatedSinks = EvaluatedSinks {
    method: Method::CSharpPathTraversal,
    sinks: &[
        creations(&["FileStream", "StreamReader", "StreamWriter"], SinkMode::Step),
        calls(
            &[
                "File.Open",
                "File.OpenRead",
                "File.OpenWrite",
                "File.ReadAllText",
                "File.ReadAllBytes",
                "File.WriteAllText",
                "File.Delete",
                "File.Copy",
                "File.Move",
            ],
            SinkMode::Arguments,
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GraphDb;
    use crate::scanner::language_detect::Language;

    fn lines(query: &EvaluatedSinks, language: Language, path: &str, source: &str) -> Vec<u32> {
        let shard = GraphShard::from_text(path, language, source).unwrap();
        let db = GraphDb::from_shards(vec![shard]);
        let ctx = QueryContext::new(&db);
        let shard = &db.shards()[0];
        query
            .matches(&ctx, shard)
            .into_iter()
            .map(|n| shard.line_of(n))
            .collect()
    }

    #[test]
    fn qualified_patterns_check_the_receiver() {
        assert!(call_matches("Paths.get", Some("java.nio.file.Paths"), "get"));
        assert!(call_matches("Paths.get", Some("Paths"), "get"));
        assert!(!call_matches("Paths.get", Some("map"), "get"));
        assert!(!call_matches("Paths.get", None, "get"));
        assert!(call_matches("exec", Some("anything"), "exec"));
    }

    #[test]
    fn request_parameter_reaching_statement_is_sql_injection() {
        let source = "\
import java.sql.Statement;
import javax.servlet.http.HttpServletRequest;

class Repo {
    void find(HttpServletRequest request, Statement statement) throws Exception {
        String id = request.getParameter(\"id\");
        String query = \"SELECT * FROM users WHERE id = \" + id;
        statement.executeQuery(query);
    }
}
";
        assert_eq!(lines(&JAVA_SQL_INJECTION, Language::Java, "Repo.java", source), vec![8]);
    }

    #[test]
    fn constant_query_is_not_sql_injection() {
        let source = "\
import java.sql.Statement;

class Repo {
    void all(Statement statement) throws Exception {
        String query = \"SELECT * FROM users\";
        statement.executeQuery(query);
    }
}
";
        assert!(lines(&JAVA_SQL_INJECTION, Language::Java, "Repo.java", source).is_empty());
    }

    #[test]
    fn java_util_random_is_insecure() {
        let source = "\
import java.util.Random;
import java.security.SecureRandom;

class Tokens {
    int weak() {
        Random random = new Random();
        return random.nextInt();
    }

    int strong() {
        SecureRandom random = new SecureRandom();
        return random.nextInt();
    }
}
";
        assert_eq!(lines(&JAVA_INSECURE_RANDOM, Language::Java, "Tokens.java", source), vec![6]);
    }
}
