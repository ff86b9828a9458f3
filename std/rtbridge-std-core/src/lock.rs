//!
//! Cooperative Execution Lock
//!
//! The interpreter serializes access to its objects with a single execution
//! lock. Native callables run with the lock held and receive the `LockGuard`
//! proving it. Work that may block for an unbounded time (host callbacks,
//! I/O) runs inside `LockGuard::allow_threads`, which releases the lock for
//! the duration of the closure and re-acquires it before returning.
//!
//! The closure cannot reach the guard: `allow_threads` borrows it mutably, so
//! code inside the released region cannot create or inspect interpreter
//! objects through it.
//!
//! The lock is not reentrant. A thread holding a guard must not acquire again.
//!

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

pub struct ExecutionLock {
    mutex: Mutex<()>,
    releases: AtomicU64,
}

impl ExecutionLock {
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            releases: AtomicU64::new(0),
        }
    }

    /// Block until the lock is available
    pub fn acquire(&self) -> LockGuard<'_> {
        LockGuard {
            lock: self,
            held: Some(self.lock_inner()),
        }
    }

    /// Take the lock only if nobody holds it
    pub fn try_acquire(&self) -> Option<LockGuard<'_>> {
        let held = match self.mutex.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => return None,
        };
        Some(LockGuard {
            lock: self,
            held: Some(held),
        })
    }

    /// How many times a holder has released the lock around blocking work
    pub fn release_count(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    fn lock_inner(&self) -> MutexGuard<'_, ()> {
        // A panic inside a native callable must not wedge the interpreter.
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ExecutionLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that the current thread holds the execution lock
pub struct LockGuard<'l> {
    lock: &'l ExecutionLock,
    held: Option<MutexGuard<'l, ()>>,
}

impl<'l> LockGuard<'l> {
    pub fn lock(&self) -> &'l ExecutionLock {
        self.lock
    }

    /// Run `f` with the execution lock released
    ///
    /// The lock is re-acquired before this returns, including when `f` unwinds.
    pub fn allow_threads<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        struct Reacquire<'a, 'l> {
            guard: &'a mut LockGuard<'l>,
        }

        impl Drop for Reacquire<'_, '_> {
            fn drop(&mut self) {
                self.guard.held = Some(self.guard.lock.lock_inner());
                trace!("execution lock re-acquired");
            }
        }

        self.held = None;
        self.lock.releases.fetch_add(1, Ordering::Relaxed);
        trace!("execution lock released");

        let restore = Reacquire { guard: self };
        let result = f();
        drop(restore);
        result
    }
}
