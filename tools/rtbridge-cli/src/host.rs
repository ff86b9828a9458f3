//!
//! Demo host callbacks.
//!
//! Stand-ins for what a real agent would register. Every returned string is
//! allocated with `strdup` so the bridge's default release function
//! (`libc::free`) owns it correctly.
//!

use std::ffi::{CStr, CString, c_char, c_int};

use rtbridge_runtime::{
    rtbridge_set_get_clustername_cb, rtbridge_set_get_hostname_cb, rtbridge_set_get_version_cb,
    rtbridge_set_log_cb, rtbridge_set_obfuscate_sql_cb,
};

pub const CLUSTER_ENV_VAR: &str = "RTBRIDGE_DEMO_CLUSTER";

/// Register every demo callback with the process-wide registry
pub fn install() {
    rtbridge_set_obfuscate_sql_cb(Some(obfuscate_sql));
    rtbridge_set_get_hostname_cb(Some(hostname));
    rtbridge_set_get_clustername_cb(Some(clustername));
    rtbridge_set_get_version_cb(Some(version));
    rtbridge_set_log_cb(Some(log));
    tracing::debug!("demo host callbacks installed");
}

/// Replace numeric and quoted literals with `?`
pub fn obfuscate(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut chars = query.chars().peekable();
    let mut prev_ident = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let quote = c;
                while let Some(next) = chars.next() {
                    if next == quote {
                        // doubled quote is an escaped quote inside the literal
                        if chars.peek() == Some(&quote) {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
                out.push('?');
                prev_ident = false;
            }
            c if c.is_ascii_digit() && !prev_ident => {
                while chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_digit() || *next == '.')
                {
                    chars.next();
                }
                out.push('?');
            }
            c => {
                prev_ident = c.is_alphanumeric() || c == '_';
                out.push(c);
            }
        }
    }
    out
}

fn into_host_string(value: &str) -> *mut c_char {
    match CString::new(value) {
        Ok(owned) => unsafe { libc::strdup(owned.as_ptr()) },
        Err(_) => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn obfuscate_sql(query: *const c_char) -> *mut c_char {
    let query = unsafe { CStr::from_ptr(query) };
    match query.to_str() {
        Ok(query) => into_host_string(&obfuscate(query)),
        Err(_) => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn hostname() -> *mut c_char {
    let mut buf = [0 as c_char; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len() - 1) };
    if rc != 0 {
        return std::ptr::null_mut();
    }
    unsafe { libc::strdup(buf.as_ptr()) }
}

unsafe extern "C" fn clustername() -> *mut c_char {
    match std::env::var(CLUSTER_ENV_VAR) {
        Ok(name) if !name.is_empty() => into_host_string(&name),
        _ => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn version() -> *mut c_char {
    into_host_string(env!("CARGO_PKG_VERSION"))
}

unsafe extern "C" fn log(message: *const c_char, level: c_int) {
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    eprintln!("[host:{}] {}", level, message);
}
