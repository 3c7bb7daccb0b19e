//! Log filter resolution and subscriber installation.

use std::sync::Mutex;

use skims_core::tracing::{filter_from_env, init_tracing, init_tracing_with, DEFAULT_DIRECTIVE};

// `SKIMS_LOG` is process-global.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn env_directive_wins_over_default() {
    let _lock = ENV_LOCK.lock().unwrap();
    std::env::set_var("SKIMS_LOG", "skims_sast::symeval=debug");
    let filter = filter_from_env(DEFAULT_DIRECTIVE);
    std::env::remove_var("SKIMS_LOG");
    assert!(filter.to_string().contains("skims_sast::symeval=debug"));
}

#[test]
fn unparsable_env_falls_back_to_default() {
    let _lock = ENV_LOCK.lock().unwrap();
    std::env::set_var("SKIMS_LOG", "skims_sast=loud");
    let filter = filter_from_env("skims_sast=warn");
    std::env::remove_var("SKIMS_LOG");
    assert_eq!(filter.to_string(), "skims_sast=warn");
}

#[test]
fn repeated_installation_is_harmless() {
    let _lock = ENV_LOCK.lock().unwrap();
    init_tracing();
    init_tracing_with("skims_sast=trace");
    tracing::info!(path = "Main.java", "still logging");
}
