//! ParserManager: routes files to the right adapter and applies the
//! partial-parse policy.

use std::path::Path;

use skims_core::config::ScanConfig;
use skims_core::constants::DEFAULT_PARSE_CACHE_CAPACITY;
use skims_core::errors::ParseError;
use tracing::debug;

use super::cache::{hash_content, ParseCache};
use super::languages::cloudformation::CloudFormationParser;
use super::languages::csharp::CSharpParser;
use super::languages::go::GoParser;
use super::languages::java::JavaParser;
use super::languages::javascript::JavaScriptParser;
use super::languages::kotlin::KotlinParser;
use super::languages::python::PythonParser;
use super::languages::typescript::TypeScriptParser;
use super::traits::LanguageParser;
use super::types::ParseResult;
use crate::scanner::language_detect::Language;
use crate::scanner::types::SourceFile;

/// Owns one adapter per supported language plus the parse cache.
pub struct ParserManager {
    parsers: Vec<Box<dyn LanguageParser>>,
    cache: ParseCache,
    reject_partial: bool,
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserManager {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_PARSE_CACHE_CAPACITY, false)
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::with_options(
            config.effective_parse_cache_capacity(),
            config.effective_reject_partial_parses(),
        )
    }

    fn with_options(cache_capacity: u64, reject_partial: bool) -> Self {
        let parsers: Vec<Box<dyn LanguageParser>> = vec![
            Box::new(JavaParser::new()),
            Box::new(CSharpParser::new()),
            Box::new(GoParser::new()),
            Box::new(JavaScriptParser::new()),
            Box::new(TypeScriptParser::new()),
            Box::new(KotlinParser::new()),
            Box::new(PythonParser::new()),
            Box::new(CloudFormationParser::yaml()),
            Box::new(CloudFormationParser::json()),
        ];
        Self {
            parsers,
            cache: ParseCache::new(cache_capacity),
            reject_partial,
        }
    }

    /// The adapter for `language`, or `None` for recognized but
    /// unsupported languages.
    pub fn parser_for(&self, language: Language) -> Option<&dyn LanguageParser> {
        self.parsers
            .iter()
            .find(|p| p.language() == language)
            .map(|p| p.as_ref())
    }

    /// Languages with an adapter.
    pub fn supported_languages(&self) -> Vec<Language> {
        self.parsers.iter().map(|p| p.language()).collect()
    }

    /// Parse a file, detecting its language from the path.
    pub fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
        let language = Language::from_path(path).ok_or_else(|| ParseError::UnsupportedLanguage {
            path: path.to_path_buf(),
        })?;
        self.parse_as(source, path, language)
    }

    /// Parse a loaded source file.
    pub fn parse_file(&self, file: &SourceFile) -> Result<ParseResult, ParseError> {
        self.parse_as(&file.content, Path::new(&file.path), file.language)
    }

    /// Parse `source` as `language`, consulting the cache first.
    pub fn parse_as(
        &self,
        source: &[u8],
        path: &Path,
        language: Language,
    ) -> Result<ParseResult, ParseError> {
        let parser = self
            .parser_for(language)
            .ok_or_else(|| ParseError::UnsupportedLanguage {
                path: path.to_path_buf(),
            })?;

        let key = (hash_content(source), language, parser.uses_dialect(path));
        let file = path.display().to_string();

        let result = match self.cache.get(key, &file) {
            Some(cached) => {
                debug!(path = %file, "parse cache hit");
                cached
            }
            None => {
                let parsed = parser.parse(source, path)?;
                self.cache.insert(key, parsed.clone());
                parsed
            }
        };

        if self.reject_partial && result.has_errors {
            return Err(ParseError::PartialParse {
                path: path.to_path_buf(),
                error_count: result.error_count,
            });
        }
        Ok(result)
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
