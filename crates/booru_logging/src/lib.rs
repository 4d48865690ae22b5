#![deny(missing_docs)]
//! Shared logging utilities for the booru workspace.
//!
//! Library crates log through the `booru_*` macros so every record carries the
//! same target and can be filtered as a group. Binaries pick the backend; tests
//! use [`initialize_for_tests`].

use std::sync::Once;

/// Log target shared by every record emitted through the `booru_*` macros.
pub const TARGET: &str = "booru";

/// Logs a trace-level message under the shared booru target.
#[macro_export]
macro_rules! booru_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the shared booru target.
#[macro_export]
macro_rules! booru_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the shared booru target.
#[macro_export]
macro_rules! booru_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the shared booru target.
#[macro_export]
macro_rules! booru_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the shared booru target.
#[macro_export]
macro_rules! booru_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// Safe to call from every test: only the first call installs the logger, and
/// an already-installed global logger is left in place.
pub fn initialize_for_tests() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

        // Use debug level in debug builds, info in release builds.
        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

        let _ = CombinedLogger::init(vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )]);
    });
}
