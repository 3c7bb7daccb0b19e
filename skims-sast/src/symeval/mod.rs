//! Symbolic evaluation of syntax-step paths.

pub mod config;
pub mod evaluator;
mod handlers;
mod method;
pub mod tables;

pub use config::EvaluatorConfig;
pub use evaluator::{Evaluator, SinkMode};
