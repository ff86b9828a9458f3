///
/// rtbridge-std-util - Host Callback Bridge Module
///
/// Exposes host-supplied callbacks to scripts as native functions.
///
/// ## Functions
///
/// - `headers(agent_config=None, http_host=None) -> dict` - Standard HTTP headers
/// - `obfuscate_sql(query: str) -> str | None` - Obfuscate a SQL query, raises
///   RuntimeError("failed to read data") when the host fails
/// - `get_hostname() -> str | None` - Hostname reported by the host
/// - `get_clustername() -> str | None` - Cluster name reported by the host
/// - `get_version() -> str | None` - Version of the host agent
/// - `log(message: str, level: int)` - Log through the host logger
///
/// Functions whose callback is not registered return `None`. The execution
/// lock is released while a host callback runs.
///
/// ## Host setup
///
/// The host binds callbacks through the `rtbridge_set_*_cb` C entry points
/// (see `ffi`), which write to `CallbackRegistry::global()`. Embedders that
/// want an isolated registry pass their own to `init_module`.
///

pub mod bridge;
pub mod config;
pub mod ffi;
pub mod foreign;
pub mod headers;
pub mod log;
pub mod registry;

use std::ffi::c_int;
use std::sync::Arc;

use rtbridge_std_core::{CallArgs, CallResult, Exception, LockGuard, Module, Value};

pub use bridge::{HOST_FAILURE_MESSAGE, NullResult};
pub use config::UtilConfig;
pub use ffi::*;
pub use foreign::ForeignBuffer;
pub use registry::{
    Callback, CallbackRegistry, LogCallback, LookupCallback, QueryCallback, ReleaseFn, Slot,
};

/// Build the module namespace, with every function bound to `registry`
pub fn init_module(registry: Arc<CallbackRegistry>, config: &UtilConfig) -> Module {
    let mut module = Module::new(config.name.clone());

    let product = config.product.clone();
    let fallback_version = config.fallback_version.clone();
    let reg = Arc::clone(&registry);
    module.add_function(
        "headers",
        "Get standard set of HTTP headers.",
        move |guard, args| headers(guard, &reg, &product, &fallback_version, args),
    );

    let reg = Arc::clone(&registry);
    module.add_function("obfuscate_sql", "Obfuscate Sql.", move |guard, args| {
        obfuscate_sql(guard, &reg, args)
    });

    let reg = Arc::clone(&registry);
    module.add_function("get_hostname", "Get the hostname.", move |guard, args| {
        args.expect_exactly("get_hostname", 0)?;
        bridge::call_lookup(guard, &reg, &reg.get_hostname, NullResult::NoValue)
    });

    let reg = Arc::clone(&registry);
    module.add_function("get_clustername", "Get the cluster name.", move |guard, args| {
        args.expect_exactly("get_clustername", 0)?;
        bridge::call_lookup(guard, &reg, &reg.get_clustername, NullResult::NoValue)
    });

    let reg = Arc::clone(&registry);
    module.add_function("get_version", "Get the agent version.", move |guard, args| {
        args.expect_exactly("get_version", 0)?;
        bridge::call_lookup(guard, &reg, &reg.get_version, NullResult::NoValue)
    });

    let reg = registry;
    module.add_function("log", "Log a message.", move |guard, args| {
        log_message(guard, &reg, args)
    });

    module
}

fn obfuscate_sql(
    guard: &mut LockGuard<'_>,
    registry: &CallbackRegistry,
    args: &CallArgs,
) -> CallResult<Value> {
    args.expect_exactly("obfuscate_sql", 1)?;
    let query = args.c_string_arg("obfuscate_sql", 0)?;
    bridge::call_query(guard, registry, &registry.obfuscate_sql, &query)
}

fn headers(
    guard: &mut LockGuard<'_>,
    registry: &CallbackRegistry,
    product: &str,
    fallback_version: &str,
    args: &CallArgs,
) -> CallResult<Value> {
    // agentConfig is accepted for compatibility and ignored
    args.expect_at_most("headers", 1)?;

    let version =
        bridge::call_lookup(guard, registry, &registry.get_version, NullResult::NoValue)?;
    let version = version.as_str().unwrap_or(fallback_version);
    let http_host = args.str_kwarg("http_host").map(|host| host.as_str());

    Ok(Value::Dict(headers::build_headers(product, version, http_host)))
}

fn log_message(
    guard: &mut LockGuard<'_>,
    registry: &CallbackRegistry,
    args: &CallArgs,
) -> CallResult<Value> {
    args.expect_exactly("log", 2)?;
    let message = args.c_string_arg("log", 0)?;
    let raw_level = args.int_arg("log", 1)?;
    let level = c_int::try_from(raw_level)
        .map_err(|_| Exception::argument(format!("log() level {} is out of range", raw_level)))?;

    if !bridge::call_log(guard, &registry.log, &message, level) {
        let text = message.to_string_lossy();
        log::emit_local(&text, log::CheckLevel::from_raw(raw_level));
    }
    Ok(Value::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtbridge_std_core::{ExceptionKind, Interpreter};
    use std::ffi::{CStr, c_char};
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    static LOGGED: AtomicUsize = AtomicUsize::new(0);
    static LAST_LEVEL: AtomicI32 = AtomicI32::new(0);

    unsafe extern "C" fn host_log(message: *const c_char, level: c_int) {
        let message = unsafe { CStr::from_ptr(message) };
        if message.to_bytes() == b"check started" {
            LAST_LEVEL.store(level, Ordering::SeqCst);
            LOGGED.fetch_add(1, Ordering::SeqCst);
        }
    }

    unsafe extern "C" fn version() -> *mut c_char {
        unsafe { libc::strdup(c"7.50.1".as_ptr()) }
    }

    unsafe extern "C" fn no_version() -> *mut c_char {
        std::ptr::null_mut()
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn interpreter(registry: &Arc<CallbackRegistry>) -> Interpreter {
        let interp = Interpreter::new();
        interp
            .add_module(init_module(Arc::clone(registry), &UtilConfig::default()))
            .unwrap();
        interp
    }

    #[test]
    fn test_module_exposes_all_functions() {
        let module = init_module(Arc::new(CallbackRegistry::new()), &UtilConfig::default());
        let names: Vec<_> = module.functions().map(|f| f.name()).collect();
        assert_eq!(
            names,
            ["headers", "obfuscate_sql", "get_hostname", "get_clustername", "get_version", "log"]
        );
        assert_eq!(module.name(), "util");
    }

    #[test]
    fn test_headers_use_host_version() {
        let registry = Arc::new(CallbackRegistry::new());
        let interp = interpreter(&registry);

        let args = CallArgs::new().kwarg("http_host", "localhost");
        let value = interp.call("util", "headers", &args).unwrap();
        let headers = value.as_dict().unwrap();
        assert_eq!(headers["User-Agent"], Value::str("Datadog Agent/0.0.0"));
        assert_eq!(headers["Host"], Value::str("localhost"));

        registry.get_version.set(Some(version));
        let value = interp.call("util", "headers", &CallArgs::new().arg(Value::None)).unwrap();
        let headers = value.as_dict().unwrap();
        assert_eq!(headers["User-Agent"], Value::str("Datadog Agent/7.50.1"));
        assert!(headers.get("Host").is_none());
    }

    #[test]
    fn test_headers_null_version_and_ignored_keywords() {
        let registry = Arc::new(CallbackRegistry::new());
        registry.get_version.set(Some(no_version));
        let interp = interpreter(&registry);

        let args = CallArgs::new().kwarg("http_host", 5i64).kwarg("junk", "x");
        let value = interp.call("util", "headers", &args).unwrap();
        let headers = value.as_dict().unwrap();
        assert_eq!(headers["User-Agent"], Value::str("Datadog Agent/0.0.0"));
        assert_eq!(headers.len(), 3);
        assert!(headers.get("Host").is_none());
        assert!(headers.get("junk").is_none());

        let args = CallArgs::new().arg(1i64).arg(2i64);
        let err = interp.call("util", "headers", &args).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::ArgumentError);
    }

    #[test]
    fn test_lookups_reject_arguments() {
        let registry = Arc::new(CallbackRegistry::new());
        let interp = interpreter(&registry);

        let err = interp
            .call("util", "get_hostname", &CallArgs::new().arg("extra"))
            .unwrap_err();
        assert_eq!(err.kind, ExceptionKind::ArgumentError);
        assert_eq!(err.message, "get_hostname() takes exactly 0 arguments (1 given)");
    }

    #[test]
    fn test_log_forwards_to_host() {
        let registry = Arc::new(CallbackRegistry::new());
        registry.log.set(Some(host_log));
        let interp = interpreter(&registry);

        let args = CallArgs::new().arg("check started").arg(log::LEVEL_WARNING);
        let value = interp.call("util", "log", &args).unwrap();
        assert!(value.is_none());
        assert_eq!(LOGGED.load(Ordering::SeqCst), 1);
        assert_eq!(LAST_LEVEL.load(Ordering::SeqCst), 30);
        assert_eq!(interp.lock().release_count(), 1);
    }

    #[test]
    fn test_log_without_host_logger() {
        let registry = Arc::new(CallbackRegistry::new());
        let interp = interpreter(&registry);

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let args = CallArgs::new().arg("disk nearly full").arg(log::LEVEL_WARNING);
            assert!(interp.call("util", "log", &args).unwrap().is_none());
            let args = CallArgs::new().arg("check crashed").arg(log::LEVEL_CRITICAL);
            assert!(interp.call("util", "log", &args).unwrap().is_none());
        });

        let output = captured.text();
        let warn_line = output
            .lines()
            .find(|line| line.contains("disk nearly full"))
            .expect("warning reached the subscriber");
        assert!(warn_line.contains("WARN"));
        assert!(warn_line.contains("rtbridge::check"));
        let error_line = output
            .lines()
            .find(|line| line.contains("check crashed"))
            .expect("critical reached the subscriber");
        assert!(error_line.contains("ERROR"));
        assert!(error_line.contains("critical=true"));

        let args = CallArgs::new().arg("bad level").arg(i64::MAX);
        let err = interp.call("util", "log", &args).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::ArgumentError);
    }
}
