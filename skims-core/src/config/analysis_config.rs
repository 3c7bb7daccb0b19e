//! Analysis configuration: enabled findings and evaluator bounds.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_INLINE_DEPTH, DEFAULT_MAX_PATHS_PER_SINK, DEFAULT_MAX_PATH_LENGTH,
};

/// Configuration for the query and evaluation stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Finding codes to run (e.g. `["F001", "F004"]`). Empty = all.
    #[serde(default)]
    pub findings: Vec<String>,
    /// Languages to analyze, by name. Empty = all supported.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Maximum nesting of inlined method calls. Default: 4.
    pub max_inline_depth: Option<u32>,
    /// Maximum backward paths enumerated per sink. Default: 64.
    pub max_paths_per_sink: Option<usize>,
    /// Maximum CFG nodes in a single path. Default: 512.
    pub max_path_length: Option<usize>,
    /// Wall-clock deadline for the whole run, in milliseconds. Unset = none.
    pub deadline_ms: Option<u64>,
}

impl AnalysisConfig {
    /// Returns the effective inline depth, defaulting to 4.
    pub fn effective_max_inline_depth(&self) -> u32 {
        self.max_inline_depth.unwrap_or(DEFAULT_MAX_INLINE_DEPTH)
    }

    /// Returns the effective path budget per sink, defaulting to 64.
    pub fn effective_max_paths_per_sink(&self) -> usize {
        self.max_paths_per_sink.unwrap_or(DEFAULT_MAX_PATHS_PER_SINK)
    }

    /// Returns the effective path length cap, defaulting to 512.
    pub fn effective_max_path_length(&self) -> usize {
        self.max_path_length.unwrap_or(DEFAULT_MAX_PATH_LENGTH)
    }

    /// True when `code` is enabled by this config.
    pub fn is_finding_enabled(&self, code: &str) -> bool {
        self.findings.is_empty() || self.findings.iter().any(|f| f.eq_ignore_ascii_case(code))
    }

    /// True when `language` is enabled by this config.
    pub fn is_language_enabled(&self, language: &str) -> bool {
        self.languages.is_empty()
            || self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }
}
