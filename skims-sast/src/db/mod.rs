//! GraphDB: the frozen set of shards a run analyzes, plus the pipeline
//! that builds it.

pub mod context;
pub mod pipeline;
pub mod shard;

pub use context::{DeclRef, GraphDbContext};
pub use pipeline::{build_graph_db, build_graph_db_from_dir};
pub use shard::GraphShard;

use std::collections::BTreeMap;

use skims_core::types::collections::FxHashMap;

use crate::scanner::language_detect::Language;

/// Immutable path -> shard mapping with per-language and cross-file indices.
#[derive(Debug, Default)]
pub struct GraphDb {
    shards: Vec<GraphShard>,
    by_path: FxHashMap<String, usize>,
    by_language: BTreeMap<Language, Vec<usize>>,
    context: GraphDbContext,
}

impl GraphDb {
    /// Freeze `shards`. Order is normalized by path; a later duplicate path
    /// replaces an earlier one.
    pub fn from_shards(shards: impl IntoIterator<Item = GraphShard>) -> Self {
        let mut unique: BTreeMap<String, GraphShard> = BTreeMap::new();
        for shard in shards {
            unique.insert(shard.path.clone(), shard);
        }
        let shards: Vec<GraphShard> = unique.into_values().collect();

        let mut by_path = FxHashMap::default();
        let mut by_language: BTreeMap<Language, Vec<usize>> = BTreeMap::new();
        for (position, shard) in shards.iter().enumerate() {
            by_path.insert(shard.path.clone(), position);
            by_language.entry(shard.language).or_default().push(position);
        }
        let context = GraphDbContext::index(&shards);
        Self {
            shards,
            by_path,
            by_language,
            context,
        }
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Every shard, ordered by path.
    pub fn shards(&self) -> &[GraphShard] {
        &self.shards
    }

    pub fn get(&self, path: &str) -> Option<&GraphShard> {
        self.by_path.get(path).and_then(|i| self.shards.get(*i))
    }

    /// Shard at a position handed out by the context.
    pub fn shard_at(&self, position: usize) -> Option<&GraphShard> {
        self.shards.get(position)
    }

    /// Position of a shard owned by this db.
    pub fn position_of(&self, shard: &GraphShard) -> Option<usize> {
        self.by_path.get(&shard.path).copied()
    }

    pub fn shards_by_language(&self, language: Language) -> impl Iterator<Item = &GraphShard> {
        self.by_language
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(|i| self.shards.get(*i))
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.by_language.keys().copied()
    }

    pub fn context(&self) -> &GraphDbContext {
        &self.context
    }
}
