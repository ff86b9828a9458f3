///
/// # Integration Tests for rtbridge-runtime
///
/// Config files on disk, and host registration through the exported C entry
/// points into the process-wide registry.
///

use std::ffi::{CStr, CString, c_char};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use rtbridge_runtime::{
    BridgeConfig, BridgeError, CallArgs, ExceptionKind, Runtime, Value,
    rtbridge_set_obfuscate_sql_cb,
};

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("rtbridge.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

unsafe extern "C" fn shout(query: *const c_char) -> *mut c_char {
    let upper = unsafe { CStr::from_ptr(query) }.to_string_lossy().to_uppercase();
    let owned = CString::new(upper).unwrap_or_default();
    unsafe { libc::strdup(owned.as_ptr()) }
}

unsafe extern "C" fn broken(_: *const c_char) -> *mut c_char {
    std::ptr::null_mut()
}

#[test]
fn test_load_config_from_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(
        temp_dir.path(),
        r#"
[module]
product = "Integration Agent"
fallback_version = "9.9.9"
"#,
    );

    let (runtime, config) = Runtime::from_config_path(Some(&path)).expect("runtime builds");
    assert_eq!(config.module.product, "Integration Agent");

    let headers = runtime.call("headers", &CallArgs::new()).unwrap();
    let headers = headers.as_dict().expect("headers returns a dict");
    assert_eq!(headers["User-Agent"], Value::str("Integration Agent/9.9.9"));
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let err = BridgeConfig::load(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, BridgeError::ConfigNotFound { .. }));
}

#[test]
fn test_malformed_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(temp_dir.path(), "[module\nname = ");
    let err = BridgeConfig::load(&path).unwrap_err();
    assert!(matches!(err, BridgeError::Toml(_)));
}

#[test]
fn test_host_registers_through_c_entry_points() {
    let runtime = Runtime::new(&BridgeConfig::default()).expect("runtime builds");

    rtbridge_set_obfuscate_sql_cb(Some(shout));
    let value = runtime
        .call("obfuscate_sql", &CallArgs::new().arg("select 1"))
        .unwrap();
    assert_eq!(value, Value::str("SELECT 1"));

    rtbridge_set_obfuscate_sql_cb(None);
    let value = runtime
        .call("obfuscate_sql", &CallArgs::new().arg("select 1"))
        .unwrap();
    assert!(value.is_none());

    rtbridge_set_obfuscate_sql_cb(Some(broken));
    let err = runtime
        .call("obfuscate_sql", &CallArgs::new().arg("select 1"))
        .unwrap_err();
    assert_eq!(err.kind, ExceptionKind::RuntimeError);
    assert_eq!(err.message, "failed to read data");

    rtbridge_set_obfuscate_sql_cb(None);
}
