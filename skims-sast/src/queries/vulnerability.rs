//! Vulnerability records handed to the reporting layer.

use serde::{Deserialize, Serialize};
use skims_core::constants::SNIPPET_CONTEXT_LINES;

use super::finding::Finding;
use super::method::{Method, Technique};
use crate::db::GraphShard;
use crate::graph::NodeId;

/// What a vulnerability location refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilityKind {
    Lines,
    Inputs,
    Ports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilityState {
    Open,
    Closed,
}

/// Report metadata attached to every vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkimsMetadata {
    pub cwe: u32,
    pub description_key: String,
    /// Source lines around the location, with a line-number gutter.
    pub snippet: String,
    pub source_method: String,
}

/// One reported vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub finding: Finding,
    pub kind: VulnerabilityKind,
    pub namespace: String,
    /// File path, relative to the analysis root.
    pub what: String,
    /// 1-based line.
    #[serde(rename = "where")]
    pub where_: String,
    pub method: Method,
    pub technique: Technique,
    pub state: VulnerabilityState,
    pub skims_metadata: SkimsMetadata,
}

impl Vulnerability {
    /// A record for `n_id` of `shard`, found by `method`.
    pub fn at_node(namespace: &str, shard: &GraphShard, n_id: NodeId, method: Method) -> Self {
        let finding = method.finding();
        let line = shard.line_of(n_id) as usize;
        Self {
            finding,
            kind: VulnerabilityKind::Lines,
            namespace: namespace.to_string(),
            what: shard.path.clone(),
            where_: line.to_string(),
            method,
            technique: method.technique(),
            state: VulnerabilityState::Open,
            skims_metadata: SkimsMetadata {
                cwe: finding.cwe(),
                description_key: finding.description_key(),
                snippet: make_snippet(shard, line, SNIPPET_CONTEXT_LINES),
                source_method: method.source_method(),
            },
        }
    }

    pub fn line(&self) -> usize {
        self.where_.parse().unwrap_or(0)
    }
}

/// Lines `line - context ..= line + context`, the reported one marked `>`.
pub fn make_snippet(shard: &GraphShard, line: usize, context: usize) -> String {
    let first = line.saturating_sub(context).max(1);
    let last = line + context;
    let width = last.to_string().len();
    shard
        .lines(first, last)
        .map(|(number, text)| {
            let marker = if number == line { '>' } else { ' ' };
            format!("{marker} {number:>width$} | {}", text.trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
