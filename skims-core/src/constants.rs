//! Shared constants for the skims analysis engine.

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum file size in bytes for parsing (default: 1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Default number of threads (0 = auto-detect).
pub const DEFAULT_THREADS: usize = 0;

/// Default depth for inlining user-defined method calls during evaluation.
pub const DEFAULT_MAX_INLINE_DEPTH: u32 = 4;

/// Default number of backward paths enumerated per sink.
pub const DEFAULT_MAX_PATHS_PER_SINK: usize = 64;

/// Default number of CFG nodes in a single path.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 512;

/// Default parse cache capacity (entries keyed by content hash).
pub const DEFAULT_PARSE_CACHE_CAPACITY: u64 = 4096;

/// Lines of context shown on each side of a vulnerability snippet.
pub const SNIPPET_CONTEXT_LINES: usize = 3;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "skims.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SKIMS_";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "SKIMS_LOG";

/// Key template for finding descriptions.
pub const DESCRIPTION_KEY_PREFIX: &str = "criteria.vulns";
