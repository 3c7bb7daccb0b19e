//! Parser errors.

use std::path::PathBuf;

use super::error_code::{self, SkimsErrorCode};

/// Errors that can occur while turning one source file into a shard.
///
/// All variants are file-level: the pipeline logs them and excludes the file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Grammar could not be loaded for language: {language}")]
    GrammarNotFound { language: String },

    #[error("Tree-sitter error parsing {path}: {message}")]
    TreeSitterError { path: PathBuf, message: String },

    #[error("Unsupported language for {path}")]
    UnsupportedLanguage { path: PathBuf },

    #[error("Partial parse of {path}: {error_count} syntax errors")]
    PartialParse { path: PathBuf, error_count: u32 },

    #[error("Malformed document {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    #[error("Cannot read {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("File {path} is {size} bytes, limit is {limit}")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },
}

impl ParseError {
    /// The file this error refers to, when known.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::GrammarNotFound { .. } => None,
            Self::TreeSitterError { path, .. }
            | Self::UnsupportedLanguage { path }
            | Self::PartialParse { path, .. }
            | Self::MalformedDocument { path, .. }
            | Self::Unreadable { path, .. }
            | Self::FileTooLarge { path, .. } => Some(path),
        }
    }
}

impl SkimsErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            Self::FileTooLarge { .. } => error_code::FILE_TOO_LARGE,
            _ => error_code::PARSE_ERROR,
        }
    }
}
