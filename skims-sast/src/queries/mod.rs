//! Finding queries over a frozen GraphDB.
//!
//! Every query implements [`Query`] and is listed in [`QUERIES`]. Queries
//! only read the db, so they run in parallel and their results are
//! concatenated as they come, without deduplication.

pub mod finding;
pub mod insecure_cipher;
pub mod insecure_exceptions;
pub mod method;
pub mod sinks;
pub mod switch_without_default;
pub mod vulnerability;

pub use finding::Finding;
pub use method::{Method, Technique};
pub use vulnerability::{Vulnerability, VulnerabilityKind, VulnerabilityState};

use std::time::Instant;

use rayon::prelude::*;
use skims_core::config::AnalysisConfig;
use skims_core::errors::QueryError;
use skims_core::traits::{Cancellable, CancellationToken};
use tracing::{debug, info};

use crate::db::{GraphDb, GraphShard};
use crate::graph::NodeId;
use crate::symeval::{Evaluator, EvaluatorConfig};

/// Everything a query may read.
pub struct QueryContext<'a> {
    pub db: &'a GraphDb,
    pub config: EvaluatorConfig,
    /// Group the analyzed sources belong to, copied onto every record.
    pub namespace: &'a str,
    pub token: Option<&'a CancellationToken>,
}

impl<'a> QueryContext<'a> {
    pub fn new(db: &'a GraphDb) -> Self {
        Self {
            db,
            config: EvaluatorConfig::default(),
            namespace: "",
            token: None,
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_token(mut self, token: &'a CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// An evaluator for `finding` sharing this context's bounds and token.
    pub fn evaluator(&self, finding: Finding) -> Evaluator<'a> {
        let evaluator = Evaluator::new(self.db, finding, self.config);
        match self.token {
            Some(token) => evaluator.with_token(token),
            None => evaluator,
        }
    }

    fn cancelled(&self) -> bool {
        self.token.is_some_and(|t| t.is_cancelled())
    }
}

/// A per-language predicate over shards.
pub trait Query: Send + Sync {
    fn method(&self) -> Method;

    /// Nodes of `shard` to report.
    fn matches(&self, ctx: &QueryContext<'_>, shard: &GraphShard) -> Vec<NodeId>;

    /// Fails when the query cannot run as configured.
    fn check(&self) -> Result<(), QueryError> {
        Ok(())
    }

    /// Records for every shard of the query's language.
    fn run(&self, ctx: &QueryContext<'_>) -> Vec<Vulnerability> {
        let method = self.method();
        let mut out = Vec::new();
        for shard in ctx.db.shards_by_language(method.language()) {
            if ctx.cancelled() {
                break;
            }
            out.extend(
                self.matches(ctx, shard)
                    .into_iter()
                    .map(|n_id| Vulnerability::at_node(ctx.namespace, shard, n_id, method)),
            );
        }
        out
    }
}

/// Every query the engine ships.
pub static QUERIES: &[&dyn Query] = &[
    &insecure_exceptions::InsecureExceptions(Method::JavaInsecureExceptions),
    &insecure_exceptions::InsecureExceptions(Method::CSharpInsecureExceptions),
    &insecure_exceptions::InsecureExceptions(Method::PythonInsecureExceptions),
    &switch_without_default::SwitchWithoutDefault(Method::JavaSwitchWithoutDefault),
    &switch_without_default::SwitchWithoutDefault(Method::CSharpSwitchWithoutDefault),
    &switch_without_default::SwitchWithoutDefault(Method::JavascriptSwitchWithoutDefault),
    &switch_without_default::SwitchWithoutDefault(Method::TypescriptSwitchWithoutDefault),
    &switch_without_default::SwitchWithoutDefault(Method::GoSwitchWithoutDefault),
    &sinks::JAVA_SQL_INJECTION,
    &sinks::C_SHARP_SQL_INJECTION,
    &sinks::JAVA_COMMAND_INJECTION,
    &sinks::C_SHARP_COMMAND_INJECTION,
    &sinks::JAVA_REFLECTED_XSS,
    &sinks::JAVA_INSECURE_RANDOM,
    &sinks::JAVA_INSECURE_COOKIE,
    &sinks::JAVA_PATH_TRAVERSAL,
    &sinks::C_SHARP_PATH_TRAVERSAL,
    &insecure_cipher::InsecureCipher(Method::JavaInsecureCipher),
    &insecure_cipher::InsecureCipher(Method::KotlinInsecureCipher),
    &insecure_cipher::InsecureCipher(Method::CSharpInsecureCipher),
];

/// Queries reporting `finding`.
pub fn queries_for(finding: Finding) -> impl Iterator<Item = &'static dyn Query> {
    QUERIES
        .iter()
        .copied()
        .filter(move |q| q.method().finding() == finding)
}

/// Run every query of `findings` over `db` with default bounds.
pub fn run_queries(db: &GraphDb, findings: &[Finding]) -> Vec<Vulnerability> {
    run_queries_with(&QueryContext::new(db), findings)
}

/// Run every query of `findings`, in parallel, within `ctx`.
pub fn run_queries_with(ctx: &QueryContext<'_>, findings: &[Finding]) -> Vec<Vulnerability> {
    let started = Instant::now();
    let selected: Vec<&dyn Query> = QUERIES
        .iter()
        .copied()
        .filter(|q| findings.contains(&q.method().finding()))
        .collect();
    let vulnerabilities: Vec<Vulnerability> = selected
        .par_iter()
        .flat_map_iter(|query| {
            let found = query.run(ctx);
            debug!(
                method = %query.method(),
                finding = %query.method().finding(),
                vulnerability_count = found.len(),
                "query finished"
            );
            found
        })
        .collect();
    info!(
        query_count = selected.len(),
        vulnerability_count = vulnerabilities.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "queries finished"
    );
    vulnerabilities
}

/// Run the findings `analysis` enables. Unknown finding codes and queries
/// missing their lookup tables abort before any query runs.
pub fn run_configured(
    db: &GraphDb,
    analysis: &AnalysisConfig,
    namespace: &str,
    token: &CancellationToken,
) -> Result<Vec<Vulnerability>, QueryError> {
    let findings = enabled_findings(analysis)?;
    for finding in &findings {
        for query in queries_for(*finding) {
            query.check()?;
        }
    }
    let ctx = QueryContext::new(db)
        .with_config(EvaluatorConfig::from_analysis(analysis))
        .with_namespace(namespace)
        .with_token(token);
    Ok(run_queries_with(&ctx, &findings))
}

/// Findings named in `analysis`, or all of them when none are named.
pub fn enabled_findings(analysis: &AnalysisConfig) -> Result<Vec<Finding>, QueryError> {
    if analysis.findings.is_empty() {
        return Ok(Finding::ALL.to_vec());
    }
    analysis.findings.iter().map(|code| code.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_is_registered_once() {
        for method in Method::ALL {
            let count = QUERIES.iter().filter(|q| q.method() == method).count();
            assert_eq!(count, 1, "{method}");
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let analysis = AnalysisConfig {
            findings: vec!["F004".into(), "F999".into()],
            ..Default::default()
        };
        assert!(matches!(
            enabled_findings(&analysis),
            Err(QueryError::UnknownFinding(code)) if code == "F999"
        ));
    }

    #[test]
    fn every_query_has_its_tables() {
        for query in QUERIES {
            assert!(query.check().is_ok(), "{}", query.method());
        }
    }

    #[test]
    fn empty_selection_enables_everything() {
        let findings = enabled_findings(&AnalysisConfig::default()).unwrap();
        assert_eq!(findings.len(), Finding::ALL.len());
    }
}
