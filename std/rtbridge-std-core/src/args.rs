//!
//! Argument Parsing
//!
//! Native callables receive their arguments as a `CallArgs` bundle of
//! positional values and keyword values. The helpers here validate arity and
//! types and produce `ArgumentError` exceptions with messages of the form
//! `name() takes exactly 1 argument (0 given)` or
//! `name() argument 1 must be str, not int`.
//!
//! Strings handed to the host must be valid C strings, so `c_string_arg`
//! rejects values with an embedded NUL byte.
//!

use std::ffi::CString;

use indexmap::IndexMap;

use crate::exception::{CallResult, Exception};
use crate::value::{RtString, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keywords: IndexMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keywords: IndexMap::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument
    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Require exactly `count` positional arguments
    pub fn expect_exactly(&self, func: &str, count: usize) -> CallResult<()> {
        if self.positional.len() != count {
            return Err(Exception::argument(format!(
                "{}() takes exactly {} argument{} ({} given)",
                func,
                count,
                if count == 1 { "" } else { "s" },
                self.positional.len()
            )));
        }
        Ok(())
    }

    /// Allow at most `count` positional arguments
    pub fn expect_at_most(&self, func: &str, count: usize) -> CallResult<()> {
        if self.positional.len() > count {
            return Err(Exception::argument(format!(
                "{}() takes at most {} argument{} ({} given)",
                func,
                count,
                if count == 1 { "" } else { "s" },
                self.positional.len()
            )));
        }
        Ok(())
    }

    /// Positional argument `index` as a string
    pub fn str_arg(&self, func: &str, index: usize) -> CallResult<&RtString> {
        match self.positional.get(index) {
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(Exception::argument(format!(
                "{}() argument {} must be str, not {}",
                func,
                index + 1,
                other.value_type()
            ))),
            None => Err(missing(func, index)),
        }
    }

    /// Positional argument `index` as a string suitable for a C call
    pub fn c_string_arg(&self, func: &str, index: usize) -> CallResult<CString> {
        let s = self.str_arg(func, index)?;
        CString::new(s.as_str()).map_err(|_| {
            Exception::argument(format!(
                "{}() argument {} must not contain an embedded null character",
                func,
                index + 1
            ))
        })
    }

    /// Positional argument `index` as an int
    pub fn int_arg(&self, func: &str, index: usize) -> CallResult<i64> {
        match self.positional.get(index) {
            Some(Value::Int(i)) => Ok(*i),
            Some(other) => Err(Exception::argument(format!(
                "{}() argument {} must be int, not {}",
                func,
                index + 1,
                other.value_type()
            ))),
            None => Err(missing(func, index)),
        }
    }

    /// Keyword argument `name` when present and a string
    pub fn str_kwarg(&self, name: &str) -> Option<&RtString> {
        match self.keywords.get(name) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }
}

fn missing(func: &str, index: usize) -> Exception {
    Exception::argument(format!("{}() missing argument {}", func, index + 1))
}
