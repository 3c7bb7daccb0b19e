//! Finding query errors.

use super::error_code::{self, SkimsErrorCode};

/// Errors raised while preparing finding queries.
///
/// These are configuration errors, not data errors: they abort the run.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown finding code: {0}")]
    UnknownFinding(String),

    #[error("Lookup table `{table}` is empty for finding {finding}")]
    MissingLookupTable { table: String, finding: String },
}

impl SkimsErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFinding(_) => error_code::QUERY_ERROR,
            Self::MissingLookupTable { .. } => error_code::MISSING_LOOKUP_TABLE,
        }
    }
}
