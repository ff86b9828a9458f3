//!
//! Log subscriber setup.
//!
//! Installs a `tracing_subscriber::fmt` subscriber writing to stderr, so log
//! output never mixes with whatever the host writes to stdout.
//!

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::errors::BridgeError;

pub fn build_filter(directives: &str) -> Result<EnvFilter, BridgeError> {
    EnvFilter::try_new(directives).map_err(|err| BridgeError::InvalidLogFilter {
        filter: directives.to_string(),
        reason: err.to_string(),
    })
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging(config: &LoggingConfig, directives: &str) -> Result<(), BridgeError> {
    let filter = build_filter(directives)?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_env_filter(filter)
        .try_init()
        .map_err(|_| BridgeError::LoggingAlreadyInitialized)
}
