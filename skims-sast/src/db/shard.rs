//! One analyzed file: graph, metadata and the source it came from.

use std::path::PathBuf;
use std::sync::Arc;

use skims_core::errors::ParseError;
use tracing::debug;

use crate::cfg::add_control_flow_edges;
use crate::graph::{build, Graph, NodeId};
use crate::metadata::{extract, ShardMetadata};
use crate::parsers::{ParseResult, ParserManager};
use crate::scanner::language_detect::Language;
use crate::scanner::types::SourceFile;

/// A frozen per-file graph.
#[derive(Debug)]
pub struct GraphShard {
    /// Path relative to the analysis root.
    pub path: String,
    pub language: Language,
    pub graph: Graph,
    pub metadata: ShardMetadata,
    pub source: Arc<str>,
    pub content_hash: u64,
}

impl GraphShard {
    /// Parse, build, augment and extract one file.
    pub fn from_source(file: &SourceFile, parsers: &ParserManager) -> Result<Self, ParseError> {
        let source = std::str::from_utf8(&file.content).map_err(|e| ParseError::Unreadable {
            path: PathBuf::from(&file.path),
            message: e.to_string(),
        })?;
        let parsed = parsers.parse_file(file)?;
        Ok(Self::from_parse(&parsed, Arc::from(source)))
    }

    /// Parse in-memory text with a fresh parser set.
    pub fn from_text(path: &str, language: Language, text: &str) -> Result<Self, ParseError> {
        let file = SourceFile::new(path, language, text.as_bytes().to_vec());
        Self::from_source(&file, &ParserManager::new())
    }

    /// Build a shard from an existing parse.
    pub fn from_parse(parsed: &ParseResult, source: Arc<str>) -> Self {
        let mut graph = build(&parsed.tree, parsed.language);
        let cfg_edge_count = add_control_flow_edges(&mut graph);
        let metadata = extract(&graph);
        debug!(
            path = %parsed.file,
            node_count = graph.node_count(),
            cfg_edge_count,
            "shard ready"
        );
        Self {
            path: parsed.file.clone(),
            language: parsed.language,
            graph,
            metadata,
            source,
            content_hash: parsed.content_hash,
        }
    }

    /// 1-based line of a node.
    pub fn line_of(&self, n_id: NodeId) -> u32 {
        self.graph.line(n_id)
    }

    /// Source lines `first..=last` (1-based), clamped to the file.
    pub fn lines(&self, first: usize, last: usize) -> impl Iterator<Item = (usize, &str)> {
        self.source
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .skip(first.saturating_sub(1))
            .take(last.saturating_sub(first.max(1)) + 1)
    }
}
