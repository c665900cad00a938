//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! The ticker and the completion flow log on every tick and every save
//! attempt; the flag lets a module go quiet without touching `RUST_LOG`.
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_error};
//!
//! log_debug!("tick {}", remaining);
//! ```

/// Forwards to `log::log!` at `$level` when the caller's `ENABLE_LOGS` is set.
#[macro_export]
macro_rules! log_gated {
    ($level:expr, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::log!($level, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log_gated!(log::Level::Error, $($arg)*) };
}
