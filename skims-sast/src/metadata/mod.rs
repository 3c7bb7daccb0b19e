//! Per-shard declaration summaries: package, classes, methods and fields.

pub mod extractor;
pub mod types;

pub use extractor::extract;
pub use types::{method_name, ClassInfo, FieldInfo, ShardMetadata};
