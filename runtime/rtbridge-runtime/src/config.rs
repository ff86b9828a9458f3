///
/// # Bridge Configuration
///
/// Parsed from a TOML file. All tables and fields are optional.
///
/// ## Example rtbridge.toml
///
/// ```toml
/// [module]
/// name = "util"
/// product = "Datadog Agent"
/// fallback_version = "7.50.0"
///
/// [logging]
/// filter = "rtbridge=debug,info"
/// ansi = false
/// ```
///
/// The `RTBRIDGE_LOG` environment variable overrides `logging.filter`.
///

use std::path::Path;

use rtbridge_std_util::UtilConfig;
use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

pub const LOG_ENV_VAR: &str = "RTBRIDGE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub module: UtilConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            ansi: false,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.module.name.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "module.name must not be empty".to_string(),
            ));
        }
        if self.module.product.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "module.product must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Log filter after applying the `RTBRIDGE_LOG` override
    pub fn effective_log_filter(&self) -> String {
        resolve_filter(std::env::var(LOG_ENV_VAR).ok(), &self.logging.filter)
    }
}

/// A non-blank environment value wins over the configured filter
fn resolve_filter(env: Option<String>, configured: &str) -> String {
    env.filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}
