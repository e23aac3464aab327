//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. Program logs from failed
//! simulations are emitted under the `journal_client::program_logs` target,
//! so `RUST_LOG=journal_client::program_logs=off` silences them.

use crate::config::LogConfig;
use crate::error::{JournalError, JournalResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> JournalResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| JournalError::Config(format!("invalid log level {}: {err}", config.level)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|err| JournalError::Config(format!("logging already initialized: {err}")))
}
