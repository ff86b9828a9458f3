///
/// rtbridge Runtime
///
/// Embedding glue between a host process and the interpreter:
/// - Loads `BridgeConfig` from TOML
/// - Installs the `tracing` subscriber
/// - Creates the `Interpreter` and registers the `util` module once
/// - Re-exports the host registration entry points (`rtbridge_set_*_cb`) so
///   they end up in the static library the host links against
///
/// ```rust,ignore
/// use rtbridge_runtime::{BridgeConfig, CallArgs, Runtime};
///
/// let config = BridgeConfig::load(Path::new("rtbridge.toml"))?;
/// let runtime = Runtime::new(&config)?;
/// let value = runtime.call("obfuscate_sql", &CallArgs::new().arg("select 1"))?;
/// ```
///

pub mod config;
pub mod errors;
pub mod logging;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

pub use config::{BridgeConfig, LoggingConfig};
pub use errors::BridgeError;
pub use logging::init_logging;
pub use rtbridge_std_core::{
    CallArgs, CallResult, Exception, ExceptionKind, Interpreter, Module, RtString, Value,
};
pub use rtbridge_std_util::ffi::*;
pub use rtbridge_std_util::{CallbackRegistry, UtilConfig};

pub struct Runtime {
    interpreter: Interpreter,
    registry: Arc<CallbackRegistry>,
    module: Arc<Module>,
}

impl Runtime {
    /// Runtime bound to the process-wide registry the host's C calls write to
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        Self::with_registry(config, CallbackRegistry::global())
    }

    pub fn with_registry(
        config: &BridgeConfig,
        registry: Arc<CallbackRegistry>,
    ) -> Result<Self, BridgeError> {
        let interpreter = Interpreter::new();
        let module = rtbridge_std_util::init_module(Arc::clone(&registry), &config.module);
        let module = interpreter.add_module(module)?;
        debug!(module = module.name(), "bridge runtime ready");
        Ok(Self {
            interpreter,
            registry,
            module,
        })
    }

    /// Load the config at `path` (or defaults when `None`) and build a runtime
    pub fn from_config_path(path: Option<&Path>) -> Result<(Self, BridgeConfig), BridgeError> {
        let config = match path {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };
        let runtime = Self::new(&config)?;
        Ok((runtime, config))
    }

    /// Call a function of the bridge module with the execution lock held
    pub fn call(&self, function: &str, args: &CallArgs) -> CallResult<Value> {
        self.interpreter.call(self.module.name(), function, args)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn module(&self) -> &Module {
        &self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_registers_configured_module() {
        let mut config = BridgeConfig::default();
        config.module.name = "agent_util".to_string();
        let runtime =
            Runtime::with_registry(&config, Arc::new(CallbackRegistry::new())).unwrap();

        assert_eq!(runtime.module().name(), "agent_util");
        assert!(runtime.interpreter().module("agent_util").is_ok());
        assert!(runtime.interpreter().module("util").is_err());

        let value = runtime.call("get_hostname", &CallArgs::new()).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_unknown_function() {
        let runtime =
            Runtime::with_registry(&BridgeConfig::default(), Arc::new(CallbackRegistry::new()))
                .unwrap();
        let err = runtime.call("get_hostnme", &CallArgs::new()).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::AttributeError);
    }
}
