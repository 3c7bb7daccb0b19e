//! The contract every parser adapter implements.

use std::path::Path;

use skims_core::errors::ParseError;

use super::types::ParseResult;
use crate::scanner::language_detect::Language;

/// Turns one file's bytes into a raw tree for a single [`Language`].
///
/// Adapters never reject a file for syntax errors; they report the error
/// count on the [`ParseResult`] and leave the policy to
/// [`ParserManager`](super::ParserManager).
pub trait LanguageParser: Send + Sync {
    fn language(&self) -> Language;

    /// Whether `path` selects an alternate grammar of this language
    /// (TSX for `.tsx`). Cached trees are keyed on it.
    fn uses_dialect(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str());
        self.language() == Language::TypeScript && ext == Some("tsx")
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError>;
}
