//!
//! rtbridge-std-core - Core Interpreter Types
//!
//! This crate provides the interpreter surface shared by all rtbridge builtin modules:
//!
//! - `Value` and `RtString` for interpreter-owned objects
//! - `Exception` for the native exception channel (ArgumentError, RuntimeError, ...)
//! - `CallArgs` for parsing positional and keyword arguments
//! - `ExecutionLock` and `LockGuard` for the cooperative execution lock
//! - `Module` and `Interpreter` for registering and dispatching native callables
//!
//! Interpreter objects are only created and inspected while a `LockGuard` is held.
//! Native code that may block releases the lock through `LockGuard::allow_threads`.
//!

pub mod value;
pub mod exception;
pub mod args;
pub mod lock;
pub mod module;

pub use value::*;
pub use exception::*;
pub use args::*;
pub use lock::*;
pub use module::*;
