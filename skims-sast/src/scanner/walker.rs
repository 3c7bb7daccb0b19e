//! Directory walking with `ignore` and glob filters, parallel content loading.

use std::path::Path;
use std::sync::Arc;

use glob::Pattern;
use rayon::prelude::*;
use skims_core::config::ScanConfig;
use skims_core::errors::{ConfigError, ParseError};
use skims_core::types::normalize_path;
use tracing::{debug, warn};

use super::language_detect::Language;
use super::types::{DiscoveredFile, DiscoveryStats, SourceFile};

fn compile_patterns(field: &str, patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ConfigError::ValidationFailed {
                field: field.to_string(),
                message: format!("bad glob `{p}`: {e}"),
            })
        })
        .collect()
}

/// Walk `root`, honoring `.gitignore` files and the include/exclude globs.
///
/// The result is sorted by relative path so runs are reproducible.
pub fn discover(
    root: &Path,
    config: &ScanConfig,
) -> Result<(Vec<DiscoveredFile>, DiscoveryStats), ConfigError> {
    let include = compile_patterns("scan.include", &config.include)?;
    let exclude = compile_patterns("scan.exclude", &config.exclude)?;
    let max_size = config.effective_max_file_size();
    let mut stats = DiscoveryStats::default();
    let mut files = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .follow_links(config.effective_follow_symlinks())
        .hidden(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(reason = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let absolute = entry.path().to_path_buf();
        let relative = normalize_path(
            &absolute
                .strip_prefix(root)
                .unwrap_or(&absolute)
                .to_string_lossy(),
        );

        if (!include.is_empty() && !include.iter().any(|p| p.matches(&relative)))
            || exclude.iter().any(|p| p.matches(&relative))
        {
            stats.files_skipped_filtered += 1;
            continue;
        }
        let Some(language) = Language::from_path(&absolute) else {
            stats.files_skipped_unknown_language += 1;
            continue;
        };
        let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if file_size > max_size {
            debug!(path = %relative, file_size, "skipping large file");
            stats.files_skipped_large += 1;
            continue;
        }

        *stats.languages_found.entry(language).or_insert(0) += 1;
        files.push(DiscoveredFile {
            absolute,
            relative,
            language,
            file_size,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    stats.files_found = files.len();
    Ok((files, stats))
}

/// Read discovered files in parallel. Unreadable files come back as errors
/// next to the loaded ones; they never abort the batch.
pub fn load_sources(files: &[DiscoveredFile]) -> (Vec<SourceFile>, Vec<ParseError>) {
    let results: Vec<Result<SourceFile, ParseError>> = files
        .par_iter()
        .map(|file| {
            std::fs::read(&file.absolute)
                .map(|bytes| SourceFile {
                    path: file.relative.clone(),
                    language: file.language,
                    content: Arc::from(bytes),
                })
                .map_err(|e| ParseError::Unreadable {
                    path: file.absolute.clone(),
                    message: e.to_string(),
                })
        })
        .collect();

    let mut sources = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(source) => sources.push(source),
            Err(e) => errors.push(e),
        }
    }
    (sources, errors)
}
