//! Record encoders
//!
//! Provides two layouts for the same record content:
//! - Console: human-readable, tab separated, fields appended as a JSON object
//! - Structured: one JSON object per line

use super::fields::Fields;
use super::record::Record;
use super::timestamp::{self, DEFAULT_TIME_FORMAT};
use std::sync::Arc;

/// Turns a record into one serialized line, newline included.
///
/// Encoders are pure: they hold no mutable state and may be shared by
/// any number of threads.
pub trait Encoder: Send + Sync {
    fn encode(&self, record: &Record) -> String;
    fn name(&self) -> &str;
}

/// The two supported layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncoderKind {
    /// Human-readable layout
    ///
    /// Example: `[2025-01-08 10:30:45]	[INFO]	[api/items.rs:42]	/items	{"status":200}`
    Console,

    /// Machine-readable layout
    ///
    /// Example: `{"ts":"2025-01-08 10:30:45","level":"INFO","caller":"api/items.rs:42","msg":"/items","status":200}`
    #[default]
    Structured,
}

impl EncoderKind {
    /// Resolve a format name. Anything other than `console` is structured.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("console") {
            EncoderKind::Console
        } else {
            EncoderKind::Structured
        }
    }
}

/// Formatting options shared by both encoders
///
/// # Examples
///
/// ```
/// use pzlog::core::EncoderConfig;
///
/// let config = EncoderConfig::new()
///     .with_time_format("%H:%M:%S")
///     .with_brackets(false);
/// assert_eq!(config.time_format, "%H:%M:%S");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// strftime format for the record timestamp
    pub time_format: String,
    pub time_key: String,
    pub level_key: String,
    pub caller_key: String,
    pub message_key: String,
    /// Wrap time, level and caller in `[...]` (console layout only)
    pub brackets: bool,
    /// Colour the level name (console layout only)
    pub colors: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_key: "ts".to_string(),
            level_key: "level".to_string(),
            caller_key: "caller".to_string(),
            message_key: "msg".to_string(),
            brackets: true,
            colors: false,
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    #[must_use]
    pub fn with_caller_key(mut self, key: impl Into<String>) -> Self {
        self.caller_key = key.into();
        self
    }

    #[must_use]
    pub fn with_brackets(mut self, brackets: bool) -> Self {
        self.brackets = brackets;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }
}

/// Pick the encoder for a format name. Never fails: unknown names select
/// the structured layout.
pub fn select_encoder(name: &str, config: &EncoderConfig) -> Arc<dyn Encoder> {
    match EncoderKind::from_name(name) {
        EncoderKind::Console => Arc::new(ConsoleEncoder::new(config.clone())),
        EncoderKind::Structured => Arc::new(JsonEncoder::new(config.clone())),
    }
}

/// Human-readable layout
#[derive(Debug, Clone, Default)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    fn decorate(&self, out: &mut String, part: &str) {
        if self.config.brackets {
            out.push('[');
            out.push_str(part);
            out.push(']');
        } else {
            out.push_str(part);
        }
    }

    fn level_text(&self, record: &Record) -> String {
        #[cfg(feature = "console")]
        if self.config.colors {
            use colored::Colorize;
            return record
                .level
                .to_str()
                .color(record.level.color_code())
                .to_string();
        }
        record.level.to_str().to_string()
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, record: &Record) -> String {
        let mut out = String::with_capacity(128);

        self.decorate(
            &mut out,
            &timestamp::format_local(&record.timestamp, &self.config.time_format),
        );
        out.push('\t');
        self.decorate(&mut out, &self.level_text(record));
        if let Some(caller) = record.caller {
            out.push('\t');
            self.decorate(&mut out, &caller.to_string());
        }
        out.push('\t');
        out.push_str(&record.message);

        if !record.fields.is_empty() {
            out.push('\t');
            push_json_object(&mut out, &record.fields);
        }

        out.push('\n');
        out
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Machine-readable layout, one JSON object per line
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, record: &Record) -> String {
        let mut out = String::with_capacity(192);
        out.push('{');

        let timestamp = timestamp::format_local(&record.timestamp, &self.config.time_format);
        push_json_pair(&mut out, &self.config.time_key, &serde_json::Value::String(timestamp));
        out.push(',');
        push_json_pair(
            &mut out,
            &self.config.level_key,
            &serde_json::Value::String(record.level.to_str().to_string()),
        );
        if let Some(caller) = record.caller {
            out.push(',');
            push_json_pair(
                &mut out,
                &self.config.caller_key,
                &serde_json::Value::String(caller.to_string()),
            );
        }
        out.push(',');
        push_json_pair(
            &mut out,
            &self.config.message_key,
            &serde_json::Value::String(record.message.clone()),
        );

        for (key, value) in record.fields.iter() {
            out.push(',');
            push_json_pair(&mut out, key, &value.to_json_value());
        }

        out.push_str("}\n");
        out
    }

    fn name(&self) -> &str {
        "structured"
    }
}

/// Write `"key":value`. Keys are escaped but otherwise kept verbatim.
fn push_json_pair(out: &mut String, key: &str, value: &serde_json::Value) {
    out.push_str(&serde_json::Value::String(key.to_string()).to_string());
    out.push(':');
    out.push_str(&value.to_string());
}

/// Write all fields as one JSON object, duplicates included.
fn push_json_object(out: &mut String, fields: &Fields) {
    out.push('{');
    for (idx, (key, value)) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        push_json_pair(out, key, &value.to_json_value());
    }
    out.push('}');
}
