//!
//! Callback Registry
//!
//! Process-wide storage for the function pointers the host hands us. Each
//! exposed operation owns one `Slot`; the host binds it once during setup
//! (or rebinds it later, or unbinds it by passing null) and every native call
//! reads the slot afresh, so a new binding is visible to the very next call.
//!
//! Slots are single atomic pointers: stores use Release ordering and loads
//! use Acquire ordering. No lock is taken on either side.
//!
//! Callback signatures:
//! - `QueryCallback`: `char *(*)(const char *)` - one string in, owned string or NULL out
//! - `LookupCallback`: `char *(*)(void)` - owned string or NULL out
//! - `LogCallback`: `void (*)(const char *, int)`
//! - `ReleaseFn`: `void (*)(void *)` - frees buffers returned by the callbacks above
//!

use std::ffi::{c_char, c_int, c_void};
use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Arc, LazyLock};

use tracing::debug;

pub type QueryCallback = unsafe extern "C" fn(*const c_char) -> *mut c_char;
pub type LookupCallback = unsafe extern "C" fn() -> *mut c_char;
pub type LogCallback = unsafe extern "C" fn(*const c_char, c_int);
pub type ReleaseFn = unsafe extern "C" fn(*mut c_void);

/// A function pointer type that can live in a `Slot`
pub trait Callback: Copy + Send + Sync + 'static {
    fn into_raw(self) -> *mut ();

    /// # Safety
    ///
    /// `raw` must have been produced by `into_raw` on the same type.
    unsafe fn from_raw(raw: *mut ()) -> Self;
}

macro_rules! impl_callback {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Callback for $ty {
                fn into_raw(self) -> *mut () {
                    self as *mut ()
                }

                unsafe fn from_raw(raw: *mut ()) -> Self {
                    unsafe { std::mem::transmute::<*mut (), $ty>(raw) }
                }
            }
        )*
    };
}

impl_callback!(QueryCallback, LookupCallback, LogCallback, ReleaseFn);

/// One late-bound callback, named after the operation it serves
pub struct Slot<F> {
    name: &'static str,
    raw: AtomicPtr<()>,
    _marker: PhantomData<F>,
}

impl<F: Callback> Slot<F> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            raw: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind the slot, or unbind it with `None`
    pub fn set(&self, callback: Option<F>) {
        let raw = callback.map_or(ptr::null_mut(), F::into_raw);
        self.raw.store(raw, Ordering::Release);
        debug!(slot = self.name, bound = callback.is_some(), "callback slot updated");
    }

    pub fn get(&self) -> Option<F> {
        let raw = self.raw.load(Ordering::Acquire);
        if raw.is_null() {
            None
        } else {
            // Only `set` writes the slot, always with a pointer of type F.
            Some(unsafe { F::from_raw(raw) })
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.raw.load(Ordering::Acquire).is_null()
    }
}

impl<F> fmt::Debug for Slot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("bound", &!self.raw.load(Ordering::Acquire).is_null())
            .finish()
    }
}

/// Every host callback the builtin modules know about
#[derive(Debug)]
pub struct CallbackRegistry {
    pub obfuscate_sql: Slot<QueryCallback>,
    pub get_hostname: Slot<LookupCallback>,
    pub get_clustername: Slot<LookupCallback>,
    pub get_version: Slot<LookupCallback>,
    pub log: Slot<LogCallback>,
    pub release: Slot<ReleaseFn>,
}

static GLOBAL: LazyLock<Arc<CallbackRegistry>> = LazyLock::new(|| Arc::new(CallbackRegistry::new()));

impl CallbackRegistry {
    pub const fn new() -> Self {
        Self {
            obfuscate_sql: Slot::new("obfuscate_sql"),
            get_hostname: Slot::new("get_hostname"),
            get_clustername: Slot::new("get_clustername"),
            get_version: Slot::new("get_version"),
            log: Slot::new("log"),
            release: Slot::new("release"),
        }
    }

    /// The registry the host's C entry points write to
    pub fn global() -> Arc<CallbackRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Deallocator for buffers returned by host callbacks
    ///
    /// Hosts allocate returned strings with the C allocator unless they
    /// register their own deallocator.
    pub fn release_fn(&self) -> ReleaseFn {
        self.release.get().unwrap_or(libc::free)
    }

    /// Whether the operation `name` currently has a callback; `None` for unknown names
    pub fn is_bound(&self, name: &str) -> Option<bool> {
        let bound = match name {
            "obfuscate_sql" => self.obfuscate_sql.is_bound(),
            "get_hostname" => self.get_hostname.is_bound(),
            "get_clustername" => self.get_clustername.is_bound(),
            "get_version" => self.get_version.is_bound(),
            "log" => self.log.is_bound(),
            "release" => self.release.is_bound(),
            _ => return None,
        };
        Some(bound)
    }

    /// `(slot name, bound)` for every slot, in a stable order
    pub fn bindings(&self) -> Vec<(&'static str, bool)> {
        vec![
            (self.obfuscate_sql.name(), self.obfuscate_sql.is_bound()),
            (self.get_hostname.name(), self.get_hostname.is_bound()),
            (self.get_clustername.name(), self.get_clustername.is_bound()),
            (self.get_version.name(), self.get_version.is_bound()),
            (self.log.name(), self.log.is_bound()),
            (self.release.name(), self.release.is_bound()),
        ]
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn first(_: *const c_char) -> *mut c_char {
        ptr::null_mut()
    }

    unsafe extern "C" fn second(_: *const c_char) -> *mut c_char {
        ptr::null_mut()
    }

    unsafe extern "C" fn noop_release(_: *mut c_void) {}

    #[test]
    fn test_slot_starts_unbound() {
        let registry = CallbackRegistry::new();
        assert!(registry.obfuscate_sql.get().is_none());
        assert_eq!(registry.is_bound("obfuscate_sql"), Some(false));
        assert_eq!(registry.is_bound("no_such_operation"), None);
    }

    #[test]
    fn test_rebinding_is_visible_immediately() {
        let registry = CallbackRegistry::new();
        registry.obfuscate_sql.set(Some(first));
        assert_eq!(registry.obfuscate_sql.get().map(|f| f as usize), Some(first as usize));

        registry.obfuscate_sql.set(Some(second));
        assert_eq!(registry.obfuscate_sql.get().map(|f| f as usize), Some(second as usize));

        registry.obfuscate_sql.set(None);
        assert!(registry.obfuscate_sql.get().is_none());
    }

    #[test]
    fn test_release_defaults_to_c_free() {
        let registry = CallbackRegistry::new();
        let default_free: ReleaseFn = libc::free;
        assert_eq!(registry.release_fn() as usize, default_free as usize);

        registry.release.set(Some(noop_release));
        assert_eq!(registry.release_fn() as usize, noop_release as usize);
    }

    #[test]
    fn test_bindings_listing() {
        let registry = CallbackRegistry::new();
        registry.obfuscate_sql.set(Some(first));
        let bindings = registry.bindings();
        assert_eq!(bindings.len(), 6);
        assert_eq!(bindings[0], ("obfuscate_sql", true));
        assert!(bindings[1..].iter().all(|(_, bound)| !bound));
    }
}
