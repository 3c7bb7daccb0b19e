//! Source discovery and parsing configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_PARSE_CACHE_CAPACITY};

/// Controls which files are ingested and how parse failures are treated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip files larger than this many bytes. Default: 1MB.
    pub max_file_size: Option<u64>,
    /// Worker threads for shard building. 0 or unset = one per CPU.
    pub threads: Option<usize>,
    /// Glob patterns a path must match to be analyzed. Empty = everything.
    #[serde(default)]
    pub include: Vec<String>,
    /// Glob patterns that exclude a path.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Follow symlinks while walking. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Reject files whose parse tree contains syntax errors instead of
    /// dropping the broken subtrees. Default: false.
    pub reject_partial_parses: Option<bool>,
    /// Parse cache capacity in entries. Default: 4096.
    pub parse_cache_capacity: Option<u64>,
}

impl ScanConfig {
    /// Returns the effective max file size, defaulting to 1MB.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Returns the effective worker count, 0 meaning "let rayon decide".
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    /// Returns whether symlinks are followed, defaulting to false.
    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    /// Returns whether partial parses are rejected, defaulting to false.
    pub fn effective_reject_partial_parses(&self) -> bool {
        self.reject_partial_parses.unwrap_or(false)
    }

    /// Returns the parse cache capacity.
    pub fn effective_parse_cache_capacity(&self) -> u64 {
        self.parse_cache_capacity
            .unwrap_or(DEFAULT_PARSE_CACHE_CAPACITY)
    }
}
