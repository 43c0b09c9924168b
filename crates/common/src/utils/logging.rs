//! Process-wide `tracing` subscriber setup.
//!
//! Everything goes to stdout. `RUST_LOG` replaces [`DEFAULT_FILTER`] when set.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info,sqlx=warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Human-readable single-line events. Safe to call twice; later calls are no-ops.
pub fn init_logging_default() {
    let _ = fmt().with_env_filter(filter()).with_target(false).compact().with_writer(io::stdout).try_init();
}

/// One JSON object per event, for log shippers.
pub fn init_logging_json() {
    let _ = fmt().with_env_filter(filter()).with_target(false).json().with_writer(io::stdout).try_init();
}

/// Pick the subscriber by `logging.format` (`"json"`, anything else is compact).
pub fn init_logging(format: &str) {
    if format.eq_ignore_ascii_case("json") {
        init_logging_json();
    } else {
        init_logging_default();
    }
}
