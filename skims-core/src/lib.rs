//! # skims-core
//!
//! Foundation crate for the skims analysis engine.
//! Defines errors, config, tracing setup, cancellation, and shared collection types.
//! The SAST crate depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::SkimsConfig;
pub use errors::{PipelineError, PipelineResult, SkimsErrorCode};
pub use traits::{Cancellable, CancellationToken, Deadline};
