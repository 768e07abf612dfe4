//! Tracing bootstrap for hosts embedding the engine.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// ## Summary
/// Installs a global `tracing` subscriber filtered by `logging.level`.
///
/// `logging.level` accepts any `EnvFilter` directive, e.g. `info` or
/// `cadence_rfc=trace,info`.
///
/// ## Errors
/// Returns `CoreError::ConfigError` if the directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> CoreResult<()> {
    let filter = EnvFilter::try_new(logging.level.as_str()).map_err(|e| {
        CoreError::ConfigError(format!("invalid log level {:?}: {e}", logging.level))
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| CoreError::ConfigError(format!("tracing already initialised: {e}")))?;

    tracing::debug!(level = %logging.level, "Tracing initialised");
    Ok(())
}
