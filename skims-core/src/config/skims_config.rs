//! Top-level skims configuration with 4-layer resolution.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, ScanConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SKIMS_*`)
/// 3. Project config (`skims.toml` in project root)
/// 4. User config (`~/.skims/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkimsConfig {
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub threads: Option<usize>,
    pub findings: Option<Vec<String>>,
    pub max_inline_depth: Option<u32>,
    pub deadline_ms: Option<u64>,
}

impl SkimsConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config)?;

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SkimsConfig = toml::from_str(toml_str).map_err(|e| ConfigError::InvalidToml {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    ///
    /// Zero-valued bounds would make every path truncate immediately, so they
    /// are rejected rather than silently accepted.
    pub fn validate(config: &SkimsConfig) -> Result<(), ConfigError> {
        if config.scan.max_file_size == Some(0) {
            return Err(validation("scan.max_file_size", "must be greater than 0"));
        }
        if config.analysis.max_inline_depth == Some(0) {
            return Err(validation("analysis.max_inline_depth", "must be greater than 0"));
        }
        if config.analysis.max_paths_per_sink == Some(0) {
            return Err(validation("analysis.max_paths_per_sink", "must be greater than 0"));
        }
        if matches!(config.analysis.max_path_length, Some(n) if n < 2) {
            return Err(validation("analysis.max_path_length", "must be at least 2"));
        }
        if config.analysis.deadline_ms == Some(0) {
            return Err(validation("analysis.deadline_ms", "must be greater than 0"));
        }
        for code in &config.analysis.findings {
            if !is_finding_code(code) {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.findings".to_string(),
                    message: format!("`{code}` is not a finding code (expected F followed by 3 digits)"),
                });
            }
        }
        for pattern in config.scan.include.iter().chain(&config.scan.exclude) {
            if pattern.trim().is_empty() {
                return Err(validation("scan.include/exclude", "glob patterns must not be empty"));
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored so older binaries accept newer files.
    fn merge_toml_file(config: &mut SkimsConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_config: SkimsConfig =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidToml {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it holds a value.
    fn merge(base: &mut SkimsConfig, other: &SkimsConfig) {
        let (scan, o_scan) = (&mut base.scan, &other.scan);
        if o_scan.max_file_size.is_some() {
            scan.max_file_size = o_scan.max_file_size;
        }
        if o_scan.threads.is_some() {
            scan.threads = o_scan.threads;
        }
        if !o_scan.include.is_empty() {
            scan.include = o_scan.include.clone();
        }
        if !o_scan.exclude.is_empty() {
            scan.exclude = o_scan.exclude.clone();
        }
        if o_scan.follow_symlinks.is_some() {
            scan.follow_symlinks = o_scan.follow_symlinks;
        }
        if o_scan.reject_partial_parses.is_some() {
            scan.reject_partial_parses = o_scan.reject_partial_parses;
        }
        if o_scan.parse_cache_capacity.is_some() {
            scan.parse_cache_capacity = o_scan.parse_cache_capacity;
        }

        let (analysis, o_analysis) = (&mut base.analysis, &other.analysis);
        if !o_analysis.findings.is_empty() {
            analysis.findings = o_analysis.findings.clone();
        }
        if !o_analysis.languages.is_empty() {
            analysis.languages = o_analysis.languages.clone();
        }
        if o_analysis.max_inline_depth.is_some() {
            analysis.max_inline_depth = o_analysis.max_inline_depth;
        }
        if o_analysis.max_paths_per_sink.is_some() {
            analysis.max_paths_per_sink = o_analysis.max_paths_per_sink;
        }
        if o_analysis.max_path_length.is_some() {
            analysis.max_path_length = o_analysis.max_path_length;
        }
        if o_analysis.deadline_ms.is_some() {
            analysis.deadline_ms = o_analysis.deadline_ms;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `SKIMS_SCAN_MAX_FILE_SIZE`, `SKIMS_ANALYSIS_MAX_INLINE_DEPTH`, etc.
    fn apply_env_overrides(config: &mut SkimsConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("SKIMS_SCAN_MAX_FILE_SIZE", "a byte count")? {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_SCAN_THREADS", "a thread count")? {
            config.scan.threads = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_SCAN_REJECT_PARTIAL_PARSES", "true or false")? {
            config.scan.reject_partial_parses = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_ANALYSIS_MAX_INLINE_DEPTH", "a positive integer")? {
            config.analysis.max_inline_depth = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_ANALYSIS_MAX_PATHS_PER_SINK", "a positive integer")? {
            config.analysis.max_paths_per_sink = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_ANALYSIS_MAX_PATH_LENGTH", "a positive integer")? {
            config.analysis.max_path_length = Some(v);
        }
        if let Some(v) = env_parse("SKIMS_ANALYSIS_DEADLINE_MS", "milliseconds")? {
            config.analysis.deadline_ms = Some(v);
        }
        if let Ok(val) = std::env::var("SKIMS_ANALYSIS_FINDINGS") {
            config.analysis.findings = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SkimsConfig, cli: &CliOverrides) {
        if let Some(v) = cli.threads {
            config.scan.threads = Some(v);
        }
        if let Some(ref v) = cli.findings {
            config.analysis.findings = v.clone();
        }
        if let Some(v) = cli.max_inline_depth {
            config.analysis.max_inline_depth = Some(v);
        }
        if let Some(v) = cli.deadline_ms {
            config.analysis.deadline_ms = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Unserializable(e.to_string()))
    }
}

fn validation(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn is_finding_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 4
        && bytes[0].eq_ignore_ascii_case(&b'F')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Read and parse an environment variable, treating absence as `None`.
fn env_parse<T: FromStr>(var: &str, expected: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                var: var.to_string(),
                value,
                expected,
            }),
        Err(_) => Ok(None),
    }
}

/// Returns the user config path: `~/.skims/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".skims").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
