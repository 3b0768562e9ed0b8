//! Rotating file write target
//!
//! Bounds log growth by file size, backup count and backup age. When the next
//! write would push the current file past its size limit, the file is renamed
//! to a timestamped backup (`app-2025-01-08T10-30-45.123.log`, UTC) and a
//! fresh file is started. Old backups are then pruned and optionally gzipped.

use super::write_target::WriteTarget;
use crate::core::config::Config;
use crate::core::error::{LoggerError, Result};
use crate::core::timestamp::{backup_stamp, parse_backup_stamp};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Size limit used when `max_size` is zero or negative, in size units
pub const DEFAULT_MAX_SIZE: u64 = 100;

const MEGABYTE: u64 = 1024 * 1024;

/// Rotation thresholds
///
/// Values are stored exactly as configured. Zero means "use the default size"
/// for `max_size`, "keep everything" for `max_backups`, and "never expire"
/// for `max_age`.
///
/// # Examples
///
/// ```
/// use pzlog::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50)
///     .with_max_backups(7)
///     .with_max_age(14)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Maximum file size in size units (megabytes by default)
    pub max_size: i64,
    /// Maximum number of rotated files to keep
    pub max_backups: i64,
    /// Maximum age of rotated files in days
    pub max_age: i64,
    /// Whether to gzip rotated files
    pub compress: bool,
    /// Bytes per size unit
    pub size_unit: u64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: 0,
            max_backups: 0,
            max_age: 0,
            compress: false,
            size_unit: MEGABYTE,
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the rotation thresholds from a configuration, unchanged.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_size: config.max_size,
            max_backups: config.max_backups,
            max_age: config.max_age,
            compress: config.compress,
            size_unit: MEGABYTE,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: i64) -> Self {
        self.max_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: i64) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: i64) -> Self {
        self.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Interpret `max_size` in units of `bytes` instead of megabytes.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_size_unit(mut self, bytes: u64) -> Self {
        self.size_unit = bytes.max(1);
        self
    }

    /// Effective size limit in bytes
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        let units = if self.max_size > 0 {
            self.max_size as u64
        } else {
            DEFAULT_MAX_SIZE
        };
        units.saturating_mul(self.size_unit.max(1))
    }

    /// Number of backups to keep, `None` for unlimited
    #[must_use]
    pub fn backup_limit(&self) -> Option<usize> {
        (self.max_backups > 0).then(|| usize::try_from(self.max_backups).unwrap_or(usize::MAX))
    }

    /// Age after which backups are removed, `None` for never
    #[must_use]
    pub fn age_limit(&self) -> Option<chrono::Duration> {
        if self.max_age > 0 {
            chrono::Duration::try_days(self.max_age)
        } else {
            None
        }
    }
}

struct FileState {
    file: Option<File>,
    size: u64,
}

struct BackupFile {
    path: PathBuf,
    stamp: DateTime<Utc>,
    compressed: bool,
}

/// Size/age/count bounded log file
///
/// Nothing touches the disk until the first write: the parent directory is
/// created and the file opened lazily, so construction cannot fail.
///
/// # Examples
///
/// ```no_run
/// use pzlog::sinks::{RotatingFile, RotationPolicy, WriteTarget};
///
/// let policy = RotationPolicy::new().with_max_size(10).with_max_backups(3);
/// let file = RotatingFile::with_policy("/var/log/app.log", policy);
/// file.write(b"hello\n").unwrap();
/// ```
pub struct RotatingFile {
    base_path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<FileState>,
    /// Serializes pruning and compression, which run outside `state`
    mill_lock: Mutex<()>,
}

impl RotatingFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_policy(path, RotationPolicy::default())
    }

    pub fn with_policy<P: Into<PathBuf>>(path: P, policy: RotationPolicy) -> Self {
        Self {
            base_path: path.into(),
            policy,
            state: Mutex::new(FileState {
                file: None,
                size: 0,
            }),
            mill_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the current file, as tracked since it was opened
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    /// Start a new file now, regardless of size.
    pub fn rotate(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)?;
        drop(state);
        self.mill();
        Ok(())
    }

    /// Close the current file. The next write reopens it.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.file = None;
        state.size = 0;
    }

    /// Rotated files on disk, newest first.
    pub fn backup_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.list_backups()?.into_iter().map(|b| b.path).collect())
    }

    fn dir(&self) -> PathBuf {
        match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// `("app-", ".log")` for `app.log`
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        let ext = self
            .base_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (format!("{}-", stem), ext)
    }

    fn open_existing_or_new(&self, state: &mut FileState, write_len: u64) -> Result<()> {
        let metadata = match fs::metadata(&self.base_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.open_new(state),
            Err(e) => {
                return Err(LoggerError::io_operation(
                    "stat log file",
                    format!("Cannot access '{}'", self.base_path.display()),
                    e,
                ))
            }
        };

        if metadata.len() + write_len >= self.policy.max_bytes() {
            return self.rotate_locked(state);
        }

        match OpenOptions::new().append(true).open(&self.base_path) {
            Ok(file) => {
                state.file = Some(file);
                state.size = metadata.len();
                Ok(())
            }
            // Unusable existing file: move it aside and start over
            Err(_) => self.open_new(state),
        }
    }

    fn open_new(&self, state: &mut FileState) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", dir.display()),
                e,
            )
        })?;

        if self.base_path.exists() {
            let backup = self.next_backup_path();
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        state.file = Some(file);
        state.size = 0;
        Ok(())
    }

    fn rotate_locked(&self, state: &mut FileState) -> Result<()> {
        // Release the handle before renaming
        state.file = None;
        self.open_new(state)
    }

    /// Backup name for "now", bumped by a millisecond until it is unused.
    fn next_backup_path(&self) -> PathBuf {
        let (prefix, ext) = self.name_parts();
        let dir = self.dir();
        let mut stamp = Utc::now();
        loop {
            let candidate = dir.join(format!("{}{}{}", prefix, backup_stamp(&stamp), ext));
            if !candidate.exists() && !gz_path(&candidate).exists() {
                return candidate;
            }
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    fn list_backups(&self) -> Result<Vec<BackupFile>> {
        let (prefix, ext) = self.name_parts();
        let dir = self.dir();
        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "list log directory",
                format!("Cannot read '{}'", dir.display()),
                e,
            )
        })?;

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(rest) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let (rest, compressed) = match rest.strip_suffix(".gz") {
                Some(rest) => (rest, true),
                None => (rest, false),
            };
            let Some(stamp) = rest
                .strip_suffix(ext.as_str())
                .and_then(parse_backup_stamp)
            else {
                continue;
            };
            backups.push(BackupFile {
                path: entry.path(),
                stamp,
                compressed,
            });
        }

        backups.sort_by(|a, b| b.stamp.cmp(&a.stamp));
        Ok(backups)
    }

    /// Prune and compress backups. Failures are reported, never returned:
    /// cleanup must not cost the caller its log line.
    ///
    /// Must be called without holding `state`, so other writers keep going
    /// while a large backup is compressed.
    fn mill(&self) {
        let _milling = self.mill_lock.lock();
        if let Err(e) = self.mill_once() {
            eprintln!(
                "[WARN] Log backup cleanup failed for {}: {}",
                self.base_path.display(),
                e
            );
        }
    }

    fn mill_once(&self) -> Result<()> {
        let limit = self.policy.backup_limit();
        let age_limit = self.policy.age_limit();
        if limit.is_none() && age_limit.is_none() && !self.policy.compress {
            return Ok(());
        }

        let backups = self.list_backups()?;
        let mut remaining = Vec::with_capacity(backups.len());
        let mut removals = Vec::new();

        match limit {
            Some(limit) => {
                // A backup and its .gz twin count once
                let mut preserved: HashSet<DateTime<Utc>> = HashSet::new();
                for backup in backups {
                    if preserved.contains(&backup.stamp) || preserved.len() < limit {
                        preserved.insert(backup.stamp);
                        remaining.push(backup);
                    } else {
                        removals.push(backup);
                    }
                }
            }
            None => remaining = backups,
        }

        // A cutoff before the earliest representable date expires nothing
        if let Some(cutoff) = age_limit.and_then(|age| Utc::now().checked_sub_signed(age)) {
            let (expired, kept): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|b| b.stamp < cutoff);
            removals.extend(expired);
            remaining = kept;
        }

        for backup in &removals {
            if let Err(e) = fs::remove_file(&backup.path) {
                eprintln!(
                    "[WARN] Failed to remove old backup {}: {}",
                    backup.path.display(),
                    e
                );
            }
        }

        if self.policy.compress {
            for backup in remaining.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }

    /// Reopen the log file in append mode after a failed rotation.
    fn try_reopen_file(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Failed to reopen after rotation failure: {}", e),
                )
            })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok((file, size))
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` to `path.gz` with streaming I/O
///
/// The original is only deleted once the compressed file is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let gz_path = gz_path(path);
    let mut temp_name = gz_path.clone().into_os_string();
    temp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| writer.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

impl WriteTarget for RotatingFile {
    fn write(&self, buf: &[u8]) -> Result<()> {
        let len = buf.len() as u64;
        let max = self.policy.max_bytes();
        if len > max {
            return Err(LoggerError::write_too_large(len, max));
        }

        let mut state = self.state.lock();
        let mut mill_due = false;
        if state.file.is_none() {
            self.open_existing_or_new(&mut state, len)?;
            mill_due = true;
        }

        if state.size + len > max {
            match self.rotate_locked(&mut state) {
                Ok(()) => mill_due = true,
                Err(e) => {
                    // Keep logging into the current file rather than losing lines
                    eprintln!(
                        "[WARN] Log rotation failed: {}. Continuing with current file.",
                        e
                    );
                    if state.file.is_none() {
                        let (file, size) =
                            Self::try_reopen_file(&self.base_path).map_err(|reopen_err| {
                                eprintln!(
                                    "[ERROR] Failed to reopen log file after rotation failure: {}",
                                    reopen_err
                                );
                                e
                            })?;
                        state.file = Some(file);
                        state.size = size;
                    }
                }
            }
        }

        let written = match state.file.as_mut() {
            Some(file) => file.write_all(buf).map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            }),
            None => Err(LoggerError::writer("Log file not open")),
        };
        if written.is_ok() {
            state.size += len;
        }
        drop(state);

        if mill_due {
            self.mill();
        }
        written
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(file) = state.file.as_mut() {
            file.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}
