///
/// Module configuration.
///
/// Read from the `[module]` table of the bridge configuration file:
///
/// ```toml
/// [module]
/// name = "util"
/// product = "Datadog Agent"
/// fallback_version = "7.50.0"
/// ```
///
/// Every field has a default, so an empty table (or none at all) is valid.
///

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODULE_NAME: &str = "util";
pub const DEFAULT_PRODUCT: &str = "Datadog Agent";
pub const DEFAULT_FALLBACK_VERSION: &str = "0.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UtilConfig {
    /// Namespace the functions are registered under
    pub name: String,
    /// Product name used in the `User-Agent` header
    pub product: String,
    /// Version used in `User-Agent` when the host reports none
    pub fallback_version: String,
}

impl Default for UtilConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODULE_NAME.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            fallback_version: DEFAULT_FALLBACK_VERSION.to_string(),
        }
    }
}
