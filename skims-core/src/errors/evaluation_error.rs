//! Symbolic evaluation signals.

use super::error_code::{self, SkimsErrorCode};

/// Reasons a path evaluation stops early.
///
/// None of these reach the caller of a finding query: the evaluator turns
/// `ImpossiblePath` into an empty path and every other variant into a
/// truncated one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Missing syntax reader for `{label_type}` at node {n_id}")]
    MissingSyntaxReader { label_type: String, n_id: u32 },

    #[error("Missing case handling in `{reader}` at node {n_id}")]
    MissingCaseHandling { reader: &'static str, n_id: u32 },

    #[error("Path contradicts a known predicate at node {n_id}")]
    ImpossiblePath { n_id: u32 },

    #[error("Evaluation stopped: {0}")]
    StopEvaluation(String),
}

impl EvaluationError {
    /// True when the path can never execute and must be discarded.
    pub fn is_impossible_path(&self) -> bool {
        matches!(self, Self::ImpossiblePath { .. })
    }
}

impl SkimsErrorCode for EvaluationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSyntaxReader { .. } => error_code::MISSING_SYNTAX_READER,
            Self::MissingCaseHandling { .. } => error_code::MISSING_CASE_HANDLING,
            Self::ImpossiblePath { .. } => error_code::IMPOSSIBLE_PATH,
            Self::StopEvaluation(_) => error_code::STOP_EVALUATION,
        }
    }
}
