//! Log record structure

use super::fields::Fields;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::fmt;
use std::panic::Location;

/// Source location of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    /// Location of the code that called into the logger.
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// The last directory and the file name, e.g. `core/logger.rs`.
    pub fn trimmed_path(&self) -> &'static str {
        let file = self.file;
        let is_sep = |c: char| c == '/' || c == '\\';
        let Some(last) = file.rfind(is_sep) else {
            return file;
        };
        match file[..last].rfind(is_sep) {
            Some(prev) => &file[prev + 1..],
            None => file,
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trimmed_path(), self.line)
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub caller: Option<Caller>,
    pub fields: Fields,
}

impl Record {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so one record always encodes to one line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Local::now(),
            caller: None,
            fields: Fields::new(),
        }
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
