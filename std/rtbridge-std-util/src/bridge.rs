//!
//! Bridge Call Protocol
//!
//! Every operation that forwards to a host callback follows the same steps
//! once its arguments have been parsed:
//!
//! 1. Read the slot. Unbound means the host does not offer the capability,
//!    and the call returns `None` instead of raising.
//! 2. Release the execution lock, invoke the callback, re-acquire the lock.
//!    Only the host call runs unlocked.
//! 3. A null return is a host-side failure (`RuntimeError`) for queries, and
//!    "no value" (`None`) for lookups. Nothing is freed.
//! 4. A non-null return is copied into an interpreter string, then released
//!    through the registry's deallocator.
//!

use std::ffi::{CStr, c_int};

use rtbridge_std_core::{CallResult, Exception, LockGuard, Value};
use tracing::{trace, warn};

use crate::foreign::ForeignBuffer;
use crate::registry::{CallbackRegistry, LogCallback, LookupCallback, QueryCallback, Slot};

/// Message raised when a query callback returns NULL
pub const HOST_FAILURE_MESSAGE: &str = "failed to read data";

/// How a NULL return from the host is surfaced to the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullResult {
    Raise,
    NoValue,
}

/// Forward `input` to a string-in/string-out host callback
pub fn call_query(
    guard: &mut LockGuard<'_>,
    registry: &CallbackRegistry,
    slot: &Slot<QueryCallback>,
    input: &CStr,
) -> CallResult<Value> {
    let Some(callback) = slot.get() else {
        trace!(operation = slot.name(), "no host callback bound");
        return Ok(Value::None);
    };
    let release = registry.release_fn();

    let returned = guard.allow_threads(|| unsafe {
        ForeignBuffer::from_raw(callback(input.as_ptr()), release)
    });

    finish(guard, slot.name(), returned, NullResult::Raise)
}

/// Ask a zero-argument host callback for a value
pub fn call_lookup(
    guard: &mut LockGuard<'_>,
    registry: &CallbackRegistry,
    slot: &Slot<LookupCallback>,
    on_null: NullResult,
) -> CallResult<Value> {
    let Some(callback) = slot.get() else {
        trace!(operation = slot.name(), "no host callback bound");
        return Ok(Value::None);
    };
    let release = registry.release_fn();

    let returned = guard.allow_threads(|| unsafe { ForeignBuffer::from_raw(callback(), release) });

    finish(guard, slot.name(), returned, on_null)
}

/// Hand a message to the host logger; returns false when no logger is bound
pub fn call_log(
    guard: &mut LockGuard<'_>,
    slot: &Slot<LogCallback>,
    message: &CStr,
    level: c_int,
) -> bool {
    let Some(callback) = slot.get() else {
        return false;
    };
    guard.allow_threads(|| unsafe { callback(message.as_ptr(), level) });
    true
}

fn finish(
    guard: &LockGuard<'_>,
    operation: &'static str,
    returned: Option<ForeignBuffer>,
    on_null: NullResult,
) -> CallResult<Value> {
    match (returned, on_null) {
        (Some(buffer), _) => Ok(buffer.into_value(guard)),
        (None, NullResult::NoValue) => Ok(Value::None),
        (None, NullResult::Raise) => {
            warn!(operation, "host callback signalled failure");
            Err(Exception::runtime(HOST_FAILURE_MESSAGE))
        }
    }
}
