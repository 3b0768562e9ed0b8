//! Logger configuration and its normalization rules

use super::encoder::EncoderKind;
use super::error::Result;
use super::log_level::LogLevel;
use super::timestamp::{self, DEFAULT_TIME_FORMAT};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FILENAME: &str = "./logs/pzlog.log";
pub const DEFAULT_MAX_SIZE: i64 = 100;
pub const DEFAULT_MAX_BACKUPS: i64 = 10;
pub const DEFAULT_MAX_AGE: i64 = 30;
pub const DEFAULT_LEVEL: &str = "info";
pub const DEFAULT_ENCODER: &str = "structured";

/// Flat logger configuration
///
/// Keys missing from a serialized form take the values of
/// [`Config::default`]. Whatever the source, [`Config::normalize`] turns the
/// config into one that is safe to build a logger from.
///
/// # Example
///
/// ```
/// use pzlog::Config;
///
/// let config = Config::from_json_str(r#"{"loglevel": "WARN", "max_size": -1}"#)
///     .unwrap()
///     .normalize();
/// assert_eq!(config.log_level, "warn");
/// assert_eq!(config.max_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log file path
    pub filename: String,

    /// strftime format for record timestamps
    #[serde(rename = "timeformat")]
    pub time_format: String,

    /// Minimum level name, case-insensitive
    #[serde(rename = "loglevel")]
    pub log_level: String,

    /// Echo every record to standard output as well
    #[serde(rename = "printconsole")]
    pub print_console: bool,

    /// `console` or `structured`
    #[serde(alias = "format")]
    pub encoder: String,

    /// Maximum size of one log file in megabytes; 0 means the rotation default
    #[serde(alias = "maxsize")]
    pub max_size: i64,

    /// Number of rotated files to keep; 0 keeps all of them
    #[serde(alias = "maxbackups")]
    pub max_backups: i64,

    /// Days to keep rotated files; 0 disables age-based removal
    #[serde(alias = "maxage")]
    pub max_age: i64,

    /// Gzip rotated files
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            log_level: DEFAULT_LEVEL.to_string(),
            print_console: false,
            encoder: DEFAULT_ENCODER.to_string(),
            max_size: DEFAULT_MAX_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE,
            compress: false,
        }
    }
}

impl Config {
    /// Parse a JSON document. The result is not normalized.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace every missing or invalid field with its default.
    ///
    /// This never fails and is idempotent. Each field is handled on its own:
    /// - empty `filename` becomes [`DEFAULT_FILENAME`]
    /// - empty or unrenderable `time_format` becomes [`DEFAULT_TIME_FORMAT`]
    /// - negative `max_size`, `max_backups`, `max_age` become 100, 10, 30;
    ///   zero is kept
    /// - empty or unknown `log_level` becomes `info`; known names are lower-cased
    /// - empty `encoder` becomes `structured`
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.filename.is_empty() {
            self.filename = DEFAULT_FILENAME.to_string();
        }
        if self.time_format.is_empty() || !timestamp::is_valid_format(&self.time_format) {
            self.time_format = DEFAULT_TIME_FORMAT.to_string();
        }
        if self.max_size < 0 {
            self.max_size = DEFAULT_MAX_SIZE;
        }
        if self.max_backups < 0 {
            self.max_backups = DEFAULT_MAX_BACKUPS;
        }
        if self.max_age < 0 {
            self.max_age = DEFAULT_MAX_AGE;
        }
        self.log_level = LogLevel::from_name_or_default(&self.log_level)
            .name()
            .to_string();
        if self.encoder.is_empty() {
            self.encoder = DEFAULT_ENCODER.to_string();
        }
        self
    }

    /// Effective minimum level.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_name_or_default(&self.log_level)
    }

    /// Effective file layout.
    pub fn encoder_kind(&self) -> EncoderKind {
        EncoderKind::from_name(&self.encoder)
    }
}
