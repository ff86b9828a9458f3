//!
//! Exception Handling Primitives
//!
//! Native callables report failures through `Exception`, which the interpreter
//! raises at the call site. Each exception carries a kind and a stable message.
//!
//! Exception kinds:
//! - ArgumentError: malformed call-site arguments (arity, type, embedded NUL)
//! - RuntimeError: the host signalled a failure while serving the call
//! - AttributeError: the requested function does not exist in the module
//!

use std::fmt;

use thiserror::Error;

/// Exception kinds raised by builtin modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    ArgumentError,
    RuntimeError,
    AttributeError,
}

impl ExceptionKind {
    pub fn name(self) -> &'static str {
        match self {
            ExceptionKind::ArgumentError => "ArgumentError",
            ExceptionKind::RuntimeError => "RuntimeError",
            ExceptionKind::AttributeError => "AttributeError",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Exception {
    pub kind: ExceptionKind,
    pub message: String,
}

impl Exception {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ArgumentError, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::RuntimeError, message)
    }

    pub fn attribute(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::AttributeError, message)
    }

    pub fn is(&self, kind: ExceptionKind) -> bool {
        self.kind == kind
    }
}

/// Result of a native call as seen by the interpreter
pub type CallResult<T = crate::Value> = Result<T, Exception>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_display() {
        let err = Exception::runtime("failed to read data");
        assert_eq!(err.to_string(), "RuntimeError: failed to read data");
        assert!(err.is(ExceptionKind::RuntimeError));

        let err = Exception::argument("obfuscate_sql() takes exactly 1 argument (0 given)");
        assert!(err.to_string().starts_with("ArgumentError: "));
        assert!(!err.is(ExceptionKind::RuntimeError));
    }
}
