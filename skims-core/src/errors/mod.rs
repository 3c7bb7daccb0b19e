//! Error handling for skims.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod evaluation_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod query_error;

pub use config_error::ConfigError;
pub use error_code::SkimsErrorCode;
pub use evaluation_error::EvaluationError;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use query_error::QueryError;
