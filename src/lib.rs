//! # pzlog
//!
//! Structured application logging built from a small flat configuration.
//!
//! A [`Config`] is normalized, turned into an encoder and a rotating file
//! sink (plus an optional console echo), and composed into a [`Logger`]
//! that records the caller of every log call. With the `http` feature an
//! axum middleware emits one record per request.
//!
//! ## Features
//!
//! - **Two layouts**: human-readable console lines or one JSON object per line
//! - **Rotation**: size, backup-count and age limits with optional gzip
//! - **Fan-out**: file and console cores fed the same record, each in its own layout
//! - **Never fails**: bad settings fall back to defaults, sink errors are contained
//!
//! ```no_run
//! use pzlog::{build_logger, info, Config};
//!
//! let logger = build_logger(Some(Config {
//!     filename: "./logs/app.log".to_string(),
//!     print_console: true,
//!     ..Config::default()
//! }));
//! info!(logger, "listening on {}", 8080; "tls" => false);
//! ```

pub mod core;
pub mod macros;
#[cfg(feature = "http")]
pub mod middleware;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        build_logger, compose, select_encoder, Caller, Config, ConsoleEncoder, Core, CoreSet,
        Encoder, EncoderConfig, EncoderKind, FieldValue, Fields, JsonEncoder, LogLevel, Logger,
        LoggerBuilder, LoggerError, LoggerMetrics, Record, Result,
    };
    #[cfg(feature = "http")]
    pub use crate::middleware::{request_logging, RequestErrors};
    pub use crate::sinks::{ConsoleSink, RotatingFile, RotationPolicy, WriteTarget};
}

pub use core::{
    build_logger, compose, select_encoder, Caller, Config, ConsoleEncoder, Core, CoreSet, Encoder,
    EncoderConfig, EncoderKind, FieldValue, Fields, JsonEncoder, LogLevel, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, Record, Result,
};
