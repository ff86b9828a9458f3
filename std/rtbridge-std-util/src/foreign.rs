//!
//! Foreign-Owned Buffers
//!
//! Strings returned by host callbacks are allocated by the host's allocator,
//! not ours. `ForeignBuffer` takes ownership of such a pointer together with
//! the host deallocator that must free it. Its only operations are copying
//! the contents out and releasing the allocation, and release happens in
//! exactly one place: `Drop`. A null return never becomes a `ForeignBuffer`,
//! so it is never freed.
//!

use std::ffi::{CStr, c_char};
use std::fmt;
use std::ptr::NonNull;

use rtbridge_std_core::{LockGuard, RtString, Value};
use tracing::trace;

use crate::registry::ReleaseFn;

pub struct ForeignBuffer {
    ptr: NonNull<c_char>,
    release: ReleaseFn,
}

impl ForeignBuffer {
    /// Take ownership of a buffer returned by a host callback
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point to a NUL-terminated string that was
    /// allocated by the allocator `release` belongs to, and the caller must
    /// not use or free `ptr` afterwards.
    pub unsafe fn from_raw(ptr: *mut c_char, release: ReleaseFn) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, release })
    }

    /// Copy the contents into a new interpreter string
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn copy_out(&self) -> RtString {
        let contents = unsafe { CStr::from_ptr(self.ptr.as_ptr()) };
        RtString::from(contents.to_string_lossy().into_owned())
    }

    /// Copy the contents into an interpreter value, then release the buffer
    pub fn into_value(self, _guard: &LockGuard<'_>) -> Value {
        let value = Value::Str(self.copy_out());
        drop(self);
        value
    }
}

impl Drop for ForeignBuffer {
    fn drop(&mut self) {
        trace!(ptr = ?self.ptr, "releasing host buffer");
        unsafe { (self.release)(self.ptr.as_ptr().cast()) }
    }
}

impl fmt::Debug for ForeignBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignBuffer").field("ptr", &self.ptr).finish_non_exhaustive()
    }
}
