//!
//! Host Registration Entry Points
//!
//! C functions the host calls during setup to bind its callbacks into the
//! process-wide registry. Passing NULL unbinds the slot. Bindings take effect
//! for the next call; the host should register before scripts start running.
//!

use crate::registry::{CallbackRegistry, LogCallback, LookupCallback, QueryCallback, ReleaseFn};

#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_obfuscate_sql_cb(cb: Option<QueryCallback>) {
    CallbackRegistry::global().obfuscate_sql.set(cb);
}

#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_get_hostname_cb(cb: Option<LookupCallback>) {
    CallbackRegistry::global().get_hostname.set(cb);
}

#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_get_clustername_cb(cb: Option<LookupCallback>) {
    CallbackRegistry::global().get_clustername.set(cb);
}

#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_get_version_cb(cb: Option<LookupCallback>) {
    CallbackRegistry::global().get_version.set(cb);
}

#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_log_cb(cb: Option<LogCallback>) {
    CallbackRegistry::global().log.set(cb);
}

/// Deallocator for strings returned by the other callbacks; defaults to `free(3)`
#[unsafe(no_mangle)]
pub extern "C" fn rtbridge_set_free_cb(cb: Option<ReleaseFn>) {
    CallbackRegistry::global().release.set(cb);
}
