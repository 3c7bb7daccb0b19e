//! Parallel GraphDB assembly.
//!
//! Workers parse and build shards independently and send them over a
//! channel; a single collector freezes them into the db.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use skims_core::config::SkimsConfig;
use skims_core::errors::{ParseError, PipelineError, PipelineResult};
use skims_core::traits::{Cancellable, CancellationToken};
use tracing::{info, warn};

use super::shard::GraphShard;
use super::GraphDb;
use crate::parsers::ParserManager;
use crate::scanner::types::SourceFile;
use crate::scanner::{discover, load_sources};

/// Build a GraphDB from loaded files.
///
/// Files that fail to parse are logged, reported in `errors` and left out;
/// the rest of the run proceeds. Cancellation stops new files from being
/// started and is reported as an error on the (partial) result.
pub fn build_graph_db(
    files: &[SourceFile],
    config: &SkimsConfig,
    token: &CancellationToken,
) -> PipelineResult<GraphDb> {
    let started = Instant::now();
    let parsers = ParserManager::from_config(&config.scan);
    let max_size = config.scan.effective_max_file_size();
    let (sender, receiver) = crossbeam_channel::unbounded::<Result<GraphShard, ParseError>>();

    let work = || {
        files
            .par_iter()
            .filter(|file| config.analysis.is_language_enabled(file.language.name()))
            .for_each_with(sender, |sender, file| {
                if token.is_cancelled() {
                    return;
                }
                let outcome = build_shard(file, &parsers, max_size);
                if let Err(e) = &outcome {
                    warn!(path = %file.path, reason = %e, "file excluded from graph db");
                }
                // the collector outlives every worker
                let _ = sender.send(outcome);
            });
    };
    match thread_pool(config.scan.effective_threads()) {
        Some(pool) => pool.install(work),
        None => work(),
    }

    let mut shards = Vec::new();
    let mut result = PipelineResult::<GraphDb>::default();
    for outcome in receiver {
        match outcome {
            Ok(shard) => shards.push(shard),
            Err(e) => result.add_error(e.into()),
        }
    }

    if token.is_cancelled() {
        result.add_error(match token.deadline() {
            Some(deadline) if token.deadline_exceeded() => PipelineError::DeadlineExceeded {
                deadline_ms: deadline.budget_ms(),
            },
            _ => PipelineError::Cancelled,
        });
    }

    result.data = GraphDb::from_shards(shards);
    info!(
        shard_count = result.data.len(),
        failed = result.error_count(),
        cache_hit_rate = parsers.cache_hit_rate(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "graph db built"
    );
    result
}

/// Discover, load and build every supported file under `root`.
///
/// Only configuration problems (bad globs) are returned as `Err`.
pub fn build_graph_db_from_dir(
    root: &Path,
    config: &SkimsConfig,
    token: &CancellationToken,
) -> Result<PipelineResult<GraphDb>, PipelineError> {
    let (discovered, stats) = discover(root, &config.scan)?;
    info!(
        files_found = stats.files_found,
        skipped_large = stats.files_skipped_large,
        skipped_filtered = stats.files_skipped_filtered,
        "sources discovered"
    );
    let (sources, unreadable) = load_sources(&discovered);
    let mut result = build_graph_db(&sources, config, token);
    for e in unreadable {
        warn!(reason = %e, "file excluded from graph db");
        result.add_error(e.into());
    }
    Ok(result)
}

fn build_shard(
    file: &SourceFile,
    parsers: &ParserManager,
    max_size: u64,
) -> Result<GraphShard, ParseError> {
    let size = file.content.len() as u64;
    if size > max_size {
        return Err(ParseError::FileTooLarge {
            path: PathBuf::from(&file.path),
            size,
            limit: max_size,
        });
    }
    GraphShard::from_source(file, parsers)
}

fn thread_pool(threads: usize) -> Option<rayon::ThreadPool> {
    if threads == 0 {
        return None;
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| warn!(threads, reason = %e, "falling back to the global thread pool"))
        .ok()
}
