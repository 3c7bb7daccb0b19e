//! Evaluator bounds.

use skims_core::config::AnalysisConfig;
use skims_core::constants::DEFAULT_MAX_INLINE_DEPTH;

use crate::graph::PathBounds;

/// Limits applied to one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Nested method inlining stops at this depth.
    pub max_inline_depth: u32,
    /// Path enumeration budget per sink (and per inlined return).
    pub bounds: PathBounds,
}

impl EvaluatorConfig {
    pub fn from_analysis(analysis: &AnalysisConfig) -> Self {
        Self {
            max_inline_depth: analysis.effective_max_inline_depth(),
            bounds: PathBounds {
                max_paths: analysis.effective_max_paths_per_sink(),
                max_length: analysis.effective_max_path_length(),
            },
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_inline_depth: DEFAULT_MAX_INLINE_DEPTH,
            bounds: PathBounds::default(),
        }
    }
}
