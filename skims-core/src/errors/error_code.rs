//! SkimsErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable code string
/// that report writers and log consumers can match on.
pub trait SkimsErrorCode {
    /// Returns the error code string (e.g., "PARSE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the tagged form: `[ERROR_CODE] message`.
    fn tagged_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const FILE_TOO_LARGE: &str = "FILE_TOO_LARGE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const MISSING_SYNTAX_READER: &str = "MISSING_SYNTAX_READER";
pub const MISSING_CASE_HANDLING: &str = "MISSING_CASE_HANDLING";
pub const IMPOSSIBLE_PATH: &str = "IMPOSSIBLE_PATH";
pub const STOP_EVALUATION: &str = "STOP_EVALUATION";
pub const QUERY_ERROR: &str = "QUERY_ERROR";
pub const MISSING_LOOKUP_TABLE: &str = "MISSING_LOOKUP_TABLE";
pub const CANCELLED: &str = "CANCELLED";
pub const DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
