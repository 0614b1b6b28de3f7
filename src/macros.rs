//! Logging macros for ergonomic message formatting.
//!
//! These macros provide `println!`-style formatting on top of the [`Logger`]
//! methods.
//!
//! # Examples
//!
//! ```
//! use logtree::{info, stage_debug, error};
//!
//! let log = logtree::get_logger("app");
//!
//! let port = 8080;
//! info!(log, "listening on port {}", port);
//!
//! stage_debug!(log, "connection state: {}", "half-open");
//! error!(log, "request failed"); // flushes the staged context first
//! ```
//!
//! [`Logger`]: crate::Logger

/// Log a message at an explicit level.
///
/// `Error` flushes staged context first and `Fatal` additionally terminates
/// the process, exactly like the corresponding methods.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.trace(format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(format!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format!($($arg)+))
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warning(format!($($arg)+))
    };
}

/// Log an error-level message, flushing staged context first.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format!($($arg)+))
    };
}

/// Log a fatal message, shut the handler tree down and exit the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+))
    };
}

/// Stage a debug-level message until the next flush.
#[macro_export]
macro_rules! stage_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.stage_debug(format!($($arg)+))
    };
}

/// Stage an info-level message until the next flush.
#[macro_export]
macro_rules! stage_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.stage_info(format!($($arg)+))
    };
}

/// Stage a warning-level message until the next flush.
#[macro_export]
macro_rules! stage_warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.stage_warning(format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Level, Registry};

    #[test]
    fn test_macros_compile_against_logger() {
        let registry = Registry::new();
        let log = registry.get_logger("macros");
        log.set_level(Level::Trace);

        // no handlers attached; these exercise the macro expansions only
        log!(log, Level::Info, "value: {}", 42);
        trace!(log, "trace {}", 1);
        debug!(log, "debug {}", 2);
        info!(log, "info {}", 3);
        warning!(log, "warning {}", 4);
        error!(log, "error {}", 5);
        stage_debug!(log, "staged {}", 6);
        stage_info!(log, "staged {}", 7);
        stage_warning!(log, "staged {}", 8);
    }
}
