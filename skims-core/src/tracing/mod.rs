//! Log setup for skims binaries and tests.
//!
//! Libraries only emit `tracing` events. Installing a subscriber is left to
//! whoever embeds skims, through [`init_tracing`] or their own.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

/// Directive used when `SKIMS_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "skims_core=info,skims_sast=info";

static INIT: Once = Once::new();

/// Build the filter from `SKIMS_LOG`, falling back to `default`.
///
/// `SKIMS_LOG` takes per-module levels, e.g.
/// `skims_sast::symeval=debug,skims_sast::db=info`.
pub fn filter_from_env(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a global fmt subscriber with [`DEFAULT_DIRECTIVE`].
pub fn init_tracing() {
    init_tracing_with(DEFAULT_DIRECTIVE);
}

/// Install a global fmt subscriber. Only the first call in a process has
/// any effect.
pub fn init_tracing_with(default: &str) {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);
        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(filter_from_env(default))
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}
