///
/// Runtime error types.
///
/// Failures while setting up the bridge: reading or parsing the
/// configuration file, installing the log subscriber, and registering
/// modules. Errors raised by scripts calling into modules are
/// `rtbridge_std_core::Exception`, not these.
///

use std::path::PathBuf;
use thiserror::Error;

use rtbridge_std_core::ModuleError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("Logging is already initialized")]
    LoggingAlreadyInitialized,

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = BridgeError::ConfigNotFound {
            path: PathBuf::from("/etc/rtbridge.toml"),
        };
        assert!(err.to_string().contains("Config not found"));
        assert!(err.to_string().contains("/etc/rtbridge.toml"));

        let err = BridgeError::InvalidConfig("module name must not be empty".to_string());
        assert!(err.to_string().contains("Invalid config"));
        assert!(err.to_string().contains("module name"));

        let err = BridgeError::InvalidLogFilter {
            filter: "rtbridge=loud".to_string(),
            reason: "invalid level".to_string(),
        };
        assert!(err.to_string().contains("rtbridge=loud"));

        let err = BridgeError::from(ModuleError::AlreadyRegistered("util".to_string()));
        assert_eq!(err.to_string(), "Module 'util' is already registered");
    }
}
