//! Core logger types and traits

pub mod config;
pub mod core_set;
pub mod encoder;
pub mod error;
pub mod fields;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod timestamp;

pub use config::Config;
pub use core_set::{compose, Core, CoreSet};
pub use encoder::{select_encoder, ConsoleEncoder, Encoder, EncoderConfig, EncoderKind, JsonEncoder};
pub use error::{LoggerError, Result};
pub use fields::{FieldValue, Fields};
pub use log_level::LogLevel;
pub use logger::{build_logger, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use record::{Caller, Record};
