//! Ingestion data types.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use skims_core::types::collections::FxHashMap;

use super::language_detect::Language;

/// One source file ready for parsing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the analysis root, `/`-separated.
    pub path: String,
    pub language: Language,
    pub content: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: Language, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            language,
            content: content.into(),
        }
    }

    /// Build from an in-memory string, detecting the language from the path.
    pub fn from_text(path: &str, text: &str) -> Option<Self> {
        let language = Language::from_path(std::path::Path::new(path))?;
        Some(Self::new(path, language, text.as_bytes()))
    }
}

/// Counters collected while walking a directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryStats {
    pub files_found: usize,
    pub files_skipped_large: usize,
    pub files_skipped_filtered: usize,
    pub files_skipped_unknown_language: usize,
    pub languages_found: FxHashMap<Language, usize>,
}

/// A discovered file before its content is read.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub absolute: PathBuf,
    pub relative: String,
    pub language: Language,
    pub file_size: u64,
}
