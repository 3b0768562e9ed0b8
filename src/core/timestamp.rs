//! Timestamp formatting utilities
//!
//! Record timestamps are rendered in local wall-clock time using a
//! strftime-compatible format string taken from the configuration.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt::Write;

/// `YYYY-MM-DD HH:MM:SS`
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of the timestamp embedded in rotated backup file names.
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Whether chrono can render `format` at all.
///
/// Format strings with unknown or truncated specifiers make chrono's
/// `Display` impl fail, so they are rejected up front.
#[must_use]
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Render `datetime` with `format`, falling back to [`DEFAULT_TIME_FORMAT`].
///
/// Tabs and line breaks produced by the format (`%t`, `%n`, or literal ones)
/// become spaces, so a timestamp never splits a console column or a line.
#[must_use]
pub fn format_local(datetime: &DateTime<Local>, format: &str) -> String {
    let mut out = String::with_capacity(32);
    if write!(out, "{}", datetime.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", datetime.format(DEFAULT_TIME_FORMAT));
    }
    if out.contains(['\t', '\n', '\r']) {
        out = out.replace(['\t', '\n', '\r'], " ");
    }
    out
}

/// Timestamp part of a backup file name, in UTC.
#[must_use]
pub fn backup_stamp(datetime: &DateTime<Utc>) -> String {
    datetime.format(BACKUP_TIME_FORMAT).to_string()
}

/// Parse the timestamp part of a backup file name.
pub fn parse_backup_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
