//! Per-language parser adapters and the shared tree-sitter entry point.

pub mod cloudformation;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod kotlin;
pub mod python;
pub mod typescript;

use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use skims_core::errors::ParseError;
use tree_sitter::Parser;

use super::cache::hash_content;
use super::error_tolerant::{count_errors, to_raw_tree};
use super::types::ParseResult;
use crate::scanner::language_detect::Language;

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// Parse `source` with a tree-sitter grammar and convert it to a raw tree.
///
/// Syntax errors never fail the parse: broken subtrees are dropped and
/// counted in `error_count`. Whether a partial tree is acceptable is the
/// caller's decision.
pub fn parse_with_language(
    source: &[u8],
    path: &Path,
    language: Language,
    ts_language: tree_sitter::Language,
) -> Result<ParseResult, ParseError> {
    let start = Instant::now();

    let tree = PARSER.with(|cell| {
        let mut parser = cell.borrow_mut();
        parser
            .set_language(&ts_language)
            .map_err(|e| ParseError::GrammarNotFound {
                language: format!("{language} ({e})"),
            })?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParseError::TreeSitterError {
                path: path.to_path_buf(),
                message: "parser returned no tree".to_string(),
            })
    })?;

    let (error_count, error_ranges) = count_errors(tree.root_node());
    let raw = to_raw_tree(&tree, source);

    Ok(ParseResult {
        file: path.display().to_string(),
        language,
        content_hash: hash_content(source),
        tree: Arc::new(raw),
        parse_time_us: start.elapsed().as_micros() as u64,
        error_count,
        has_errors: error_count > 0,
        error_ranges,
    })
}
