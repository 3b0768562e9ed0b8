//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Development-time panic severity. Recorded like any other level.
    DPanic = 4,
    Panic = 5,
    Fatal = 6,
}

/// Canonical level names. Read-only for the life of the process.
const LEVEL_NAMES: [(&str, LogLevel); 7] = [
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("error", LogLevel::Error),
    ("dpanic", LogLevel::DPanic),
    ("panic", LogLevel::Panic),
    ("fatal", LogLevel::Fatal),
];

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::DPanic,
        LogLevel::Panic,
        LogLevel::Fatal,
    ];

    /// Upper-case name used in encoded output.
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::DPanic => "DPANIC",
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lower-case configuration name.
    pub fn name(&self) -> &'static str {
        LEVEL_NAMES[*self as usize].0
    }

    /// Look up one of the seven canonical names, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self> {
        LEVEL_NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, level)| *level)
    }

    /// Resolve a configured name, falling back to `Info` for anything unrecognised.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::lookup(name).unwrap_or_default()
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("Invalid log level: '{}'", s))
    }
}
