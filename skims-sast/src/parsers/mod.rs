//! Source bytes to raw trees.
//!
//! [`ParserManager`] picks the adapter for a file's [`Language`], caches the
//! result by content hash and applies the partial-parse policy. Grammar
//! languages go through tree-sitter; CloudFormation templates are read as
//! YAML or JSON documents and re-emitted in the same raw-tree shape.
//!
//! [`Language`]: crate::scanner::language_detect::Language

pub mod cache;
pub mod error_tolerant;
pub mod languages;
pub mod macros;
pub mod manager;
pub mod traits;
pub mod types;

pub use manager::ParserManager;
pub use traits::LanguageParser;
pub use types::{ParseResult, Position, Range, RawNode, RawTree};
