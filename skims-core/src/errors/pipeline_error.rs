//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, SkimsErrorCode};
use super::{ConfigError, EvaluationError, ParseError, QueryError};

/// Anything that stops a single file or the whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("query: {0}")]
    Query(#[from] QueryError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("run cancelled")]
    Cancelled,

    #[error("run exceeded its {deadline_ms}ms deadline")]
    DeadlineExceeded { deadline_ms: u64 },
}

impl PipelineError {
    /// Config and query errors abort the run. Everything else is
    /// recorded against the file and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Query(_))
    }
}

impl SkimsErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Evaluation(e) => e.error_code(),
            Self::Query(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
            Self::DeadlineExceeded { .. } => error_code::DEADLINE_EXCEEDED,
        }
    }
}

/// Output of a run that keeps going past per-file failures.
///
/// `data` holds whatever succeeded (shards, vulnerabilities); `errors` holds
/// one entry per file or stage that was skipped.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    pub data: T,
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// True when the run stopped early on cancellation or deadline.
    pub fn was_interrupted(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, PipelineError::Cancelled | PipelineError::DeadlineExceeded { .. }))
    }

    /// Keep the collected errors while replacing the payload.
    pub fn map<U: Default>(self, f: impl FnOnce(T) -> U) -> PipelineResult<U> {
        PipelineResult {
            data: f(self.data),
            errors: self.errors,
        }
    }
}
