//!
//! Module Namespaces and Dispatch
//!
//! A `Module` is a named namespace of native callables. Builtin crates build
//! one module each during initialization and hand it to the `Interpreter`,
//! which registers it exactly once and dispatches calls by
//! `(module, function)` name with the execution lock held.
//!

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::args::CallArgs;
use crate::exception::{CallResult, Exception};
use crate::lock::{ExecutionLock, LockGuard};
use crate::value::Value;

/// Signature of every native callable
pub type NativeFn =
    dyn Fn(&mut LockGuard<'_>, &CallArgs) -> CallResult<Value> + Send + Sync + 'static;

pub struct NativeFunction {
    name: &'static str,
    doc: &'static str,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    pub fn call(&self, guard: &mut LockGuard<'_>, args: &CallArgs) -> CallResult<Value> {
        (self.func)(guard, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Module {
    name: String,
    functions: IndexMap<&'static str, NativeFunction>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a callable to the namespace, replacing any previous one with the same name
    pub fn add_function<F>(&mut self, name: &'static str, doc: &'static str, func: F) -> &mut Self
    where
        F: Fn(&mut LockGuard<'_>, &CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.functions.insert(
            name,
            NativeFunction {
                name,
                doc,
                func: Box::new(func),
            },
        );
        self
    }

    pub fn function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &NativeFunction> {
        self.functions.values()
    }

    /// Call `name` with the lock already held by the caller
    pub fn call(&self, guard: &mut LockGuard<'_>, name: &str, args: &CallArgs) -> CallResult<Value> {
        let func = self.function(name).ok_or_else(|| {
            Exception::attribute(format!("module '{}' has no attribute '{}'", self.name, name))
        })?;
        trace!(module = %self.name, function = name, "dispatching native call");
        func.call(guard, args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("Module '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Module '{0}' is not registered")]
    NotRegistered(String),
}

/// The embedded interpreter: one execution lock and a table of modules
pub struct Interpreter {
    lock: ExecutionLock,
    modules: RwLock<HashMap<String, Arc<Module>>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            lock: ExecutionLock::new(),
            modules: RwLock::new(HashMap::new()),
        }
    }

    pub fn lock(&self) -> &ExecutionLock {
        &self.lock
    }

    /// Register a module namespace; each name can be registered once
    pub fn add_module(&self, module: Module) -> Result<Arc<Module>, ModuleError> {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        if modules.contains_key(module.name()) {
            return Err(ModuleError::AlreadyRegistered(module.name().to_string()));
        }
        debug!(
            module = module.name(),
            functions = module.functions.len(),
            "registered module"
        );
        let module = Arc::new(module);
        modules.insert(module.name().to_string(), Arc::clone(&module));
        Ok(module)
    }

    pub fn module(&self, name: &str) -> Result<Arc<Module>, ModuleError> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| ModuleError::NotRegistered(name.to_string()))
    }

    /// Acquire the execution lock and call `module.function(args)`
    pub fn call(&self, module: &str, function: &str, args: &CallArgs) -> CallResult<Value> {
        let module = self.module(module).map_err(|err| Exception::attribute(err.to_string()))?;
        let mut guard = self.lock.acquire();
        module.call(&mut guard, function, args)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
