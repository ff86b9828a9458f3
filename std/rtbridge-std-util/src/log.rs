//!
//! Check Logging
//!
//! `log(message, level)` forwards to the host logger when one is bound. The
//! numeric levels are the ones checks already use:
//!
//! | level | meaning  |
//! |-------|----------|
//! | 7     | trace    |
//! | 10    | debug    |
//! | 20    | info     |
//! | 30    | warning  |
//! | 40    | error    |
//! | 50    | critical |
//!
//! Without a host logger the message goes through `tracing` under the
//! `rtbridge::check` target, with critical folded into error.
//!

use tracing::{debug, error, info, trace, warn};

pub const LEVEL_TRACE: i64 = 7;
pub const LEVEL_DEBUG: i64 = 10;
pub const LEVEL_INFO: i64 = 20;
pub const LEVEL_WARNING: i64 = 30;
pub const LEVEL_ERROR: i64 = 40;
pub const LEVEL_CRITICAL: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl CheckLevel {
    /// Levels between the named ones round down
    pub fn from_raw(level: i64) -> Self {
        match level {
            l if l < LEVEL_DEBUG => CheckLevel::Trace,
            l if l < LEVEL_INFO => CheckLevel::Debug,
            l if l < LEVEL_WARNING => CheckLevel::Info,
            l if l < LEVEL_ERROR => CheckLevel::Warning,
            l if l < LEVEL_CRITICAL => CheckLevel::Error,
            _ => CheckLevel::Critical,
        }
    }
}

pub fn emit_local(message: &str, level: CheckLevel) {
    match level {
        CheckLevel::Trace => trace!(target: "rtbridge::check", "{}", message),
        CheckLevel::Debug => debug!(target: "rtbridge::check", "{}", message),
        CheckLevel::Info => info!(target: "rtbridge::check", "{}", message),
        CheckLevel::Warning => warn!(target: "rtbridge::check", "{}", message),
        CheckLevel::Error | CheckLevel::Critical => {
            error!(target: "rtbridge::check", critical = level == CheckLevel::Critical, "{}", message)
        }
    }
}
