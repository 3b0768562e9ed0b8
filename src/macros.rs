//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their message like `format!` and can attach
//! structured fields after a `;`.
//!
//! # Examples
//!
//! ```
//! use pzlog::prelude::*;
//! use pzlog::{info, warn};
//!
//! let logger = Logger::nop();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With fields
//! warn!(logger, "slow query"; "table" => "users", "rows" => 12_000u64);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use pzlog::prelude::*;
/// # let logger = Logger::nop();
/// use pzlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, "retrying {}", "upload"; "attempt" => 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:expr => $value:expr),+ $(,)?) => {
        $logger.log_with_fields(
            $level,
            format!($fmt $(, $arg)*),
            $crate::Fields::new()$(.with_field($key, $value))+,
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use pzlog::prelude::*;
/// # let logger = Logger::nop();
/// use pzlog::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100; "batch" => "nightly");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a development-panic message.
///
/// Recorded at `DPANIC`; the process keeps running.
#[macro_export]
macro_rules! dpanic {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::DPanic, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// Recorded at `FATAL`; the process keeps running. There is no `panic!`
/// counterpart, use `Logger::panic` directly.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Core, JsonEncoder, LogLevel, Logger};
    use crate::sinks::ConsoleSink;
    use std::sync::Arc;

    fn capture(run: impl FnOnce(&Logger)) -> Vec<serde_json::Value> {
        let out = Arc::new(ConsoleSink::with_writer(Vec::<u8>::new()));
        let logger = Logger::builder()
            .core(Core::new(
                Arc::new(JsonEncoder::default()),
                out.clone(),
                LogLevel::Debug,
            ))
            .build();
        run(&logger);
        drop(logger);

        let bytes = Arc::try_unwrap(out).ok().expect("sole owner").into_inner();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_log_macro() {
        let records = capture(|logger| {
            log!(logger, LogLevel::Info, "Test message");
            log!(logger, LogLevel::Warn, "Formatted: {}", 42);
        });
        assert_eq!(records[0]["msg"], "Test message");
        assert_eq!(records[1]["msg"], "Formatted: 42");
        assert_eq!(records[1]["level"], "WARN");
    }

    #[test]
    fn test_level_macros() {
        let records = capture(|logger| {
            debug!(logger, "Debug message");
            info!(logger, "Items: {}", 100);
            warn!(logger, "Retry {} of {}", 1, 3);
            error!(logger, "Code: {}", 500);
            dpanic!(logger, "should not happen");
            fatal!(logger, "Critical failure: {}", "system");
        });
        let levels: Vec<_> = records.iter().map(|r| r["level"].clone()).collect();
        assert_eq!(
            levels,
            vec!["DEBUG", "INFO", "WARN", "ERROR", "DPANIC", "FATAL"]
        );
    }

    #[test]
    fn test_macro_fields() {
        let records = capture(|logger| {
            info!(logger, "request {}", 7; "status" => 200, "path" => "/items",);
            error!(logger, "plain"; "retry" => false);
        });
        assert_eq!(records[0]["msg"], "request 7");
        assert_eq!(records[0]["status"], 200);
        assert_eq!(records[0]["path"], "/items");
        assert_eq!(records[1]["retry"], false);
    }
}
