//! Tests for the skims configuration system.

use std::sync::Mutex;

use skims_core::config::{CliOverrides, SkimsConfig};
use skims_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all SKIMS_ env vars to prevent cross-test contamination.
fn clear_skims_env_vars() {
    for key in [
        "SKIMS_SCAN_MAX_FILE_SIZE",
        "SKIMS_SCAN_THREADS",
        "SKIMS_SCAN_REJECT_PARTIAL_PARSES",
        "SKIMS_ANALYSIS_MAX_INLINE_DEPTH",
        "SKIMS_ANALYSIS_MAX_PATHS_PER_SINK",
        "SKIMS_ANALYSIS_MAX_PATH_LENGTH",
        "SKIMS_ANALYSIS_DEADLINE_MS",
        "SKIMS_ANALYSIS_FINDINGS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_skims_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("skims.toml"),
        r#"
[scan]
max_file_size = 2_000_000

[analysis]
max_inline_depth = 2
max_paths_per_sink = 10
findings = ["F001"]
"#,
    )
    .unwrap();

    std::env::set_var("SKIMS_ANALYSIS_MAX_PATHS_PER_SINK", "20");

    let cli = CliOverrides {
        max_inline_depth: Some(6),
        ..Default::default()
    };
    let config = SkimsConfig::load(dir.path(), Some(&cli)).unwrap();

    // CLI beats project
    assert_eq!(config.analysis.max_inline_depth, Some(6));
    // env beats project
    assert_eq!(config.analysis.max_paths_per_sink, Some(20));
    // project beats defaults
    assert_eq!(config.scan.max_file_size, Some(2_000_000));
    assert_eq!(config.analysis.findings, vec!["F001".to_string()]);

    clear_skims_env_vars();
}

#[test]
fn test_missing_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_skims_env_vars();

    let dir = tempdir();
    let config = SkimsConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.analysis.effective_max_inline_depth(), 4);
    assert_eq!(config.analysis.effective_max_paths_per_sink(), 64);
    assert_eq!(config.analysis.effective_max_path_length(), 512);
    assert_eq!(config.scan.effective_max_file_size(), 1_048_576);
    assert!(!config.scan.effective_reject_partial_parses());
}

#[test]
fn test_invalid_toml_is_fatal() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_skims_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("skims.toml"), "[scan\nmax_file_size = ").unwrap();

    let err = SkimsConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidToml { .. }));
}

#[test]
fn test_invalid_env_value_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_skims_env_vars();

    std::env::set_var("SKIMS_ANALYSIS_MAX_INLINE_DEPTH", "deep");
    let dir = tempdir();
    let err = SkimsConfig::load(dir.path(), None).unwrap_err();
    match err {
        ConfigError::InvalidEnvValue { var, value, .. } => {
            assert_eq!(var, "SKIMS_ANALYSIS_MAX_INLINE_DEPTH");
            assert_eq!(value, "deep");
        }
        other => panic!("unexpected error: {other}"),
    }
    clear_skims_env_vars();
}

#[test]
fn test_env_findings_list() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_skims_env_vars();

    std::env::set_var("SKIMS_ANALYSIS_FINDINGS", "F004, F063,");
    let dir = tempdir();
    let config = SkimsConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.analysis.findings, vec!["F004", "F063"]);
    assert!(config.analysis.is_finding_enabled("f004"));
    assert!(!config.analysis.is_finding_enabled("F001"));
    clear_skims_env_vars();
}

#[test]
fn test_zero_bounds_rejected() {
    for toml in [
        "[analysis]\nmax_inline_depth = 0",
        "[analysis]\nmax_paths_per_sink = 0",
        "[analysis]\nmax_path_length = 1",
        "[analysis]\ndeadline_ms = 0",
        "[scan]\nmax_file_size = 0",
    ] {
        let err = SkimsConfig::from_toml(toml).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationFailed { .. }),
            "expected validation failure for {toml:?}, got {err}"
        );
    }
}

#[test]
fn test_bad_finding_code_rejected() {
    let err = SkimsConfig::from_toml("[analysis]\nfindings = [\"SQLI\"]").unwrap_err();
    assert!(err.to_string().contains("SQLI"));
}

#[test]
fn test_unknown_keys_ignored() {
    let config = SkimsConfig::from_toml("[analysis]\nfuture_knob = true\nmax_path_length = 40").unwrap();
    assert_eq!(config.analysis.effective_max_path_length(), 40);
}

#[test]
fn test_toml_round_trip() {
    let config = SkimsConfig::from_toml(
        "[scan]\nexclude = [\"**/test/**\"]\n[analysis]\nlanguages = [\"java\"]",
    )
    .unwrap();
    let text = config.to_toml().unwrap();
    let back = SkimsConfig::from_toml(&text).unwrap();
    assert_eq!(back.scan.exclude, vec!["**/test/**"]);
    assert!(back.analysis.is_language_enabled("Java"));
    assert!(!back.analysis.is_language_enabled("go"));
}
