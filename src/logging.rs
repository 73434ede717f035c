//! Diagnostic logging for the `prism` binary.
//!
//! Library code only emits `tracing` events; the subscriber is installed here,
//! once, by the binary. Diagnostics go to stderr so stdout stays clean for
//! reports and JSON.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

/// Base level for a `-v` count: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the `-v` count.
pub fn setup_logging(verbosity: u8) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_for_verbosity(verbosity)))
        .map_err(|e| AppError::new(2, format!("Invalid log filter: {e}")))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .map_err(|e| AppError::new(2, format!("Logger initialization failed: {e}")))
}
