//! Source ingestion: file discovery, language detection, content loading.
//!
//! This is the only stage of the engine that touches the filesystem.
//! Everything downstream works on in-memory `SourceFile`s.

pub mod language_detect;
pub mod types;
pub mod walker;

pub use language_detect::Language;
pub use types::{DiscoveryStats, SourceFile};
pub use walker::{discover, load_sources};
