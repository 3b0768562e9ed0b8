//! Stress tests for concurrent logging into a rotating file
//!
//! These tests verify:
//! - No record is lost or torn while many threads write and the file rotates
//! - Backup count limits hold under load
//! - Console echo and file writes stay line-atomic together

mod common;

use common::MemoryTarget;
use pzlog::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn read_all_lines(dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read log dir") {
        let path = entry.expect("dir entry").path();
        let content = fs::read_to_string(&path).expect("Failed to read log file");
        lines.extend(content.lines().map(str::to_string));
    }
    lines
}

fn rotating_logger(dir: &TempDir, policy: RotationPolicy) -> (Logger, Arc<RotatingFile>) {
    let file = Arc::new(RotatingFile::with_policy(dir.path().join("stress.log"), policy));
    let logger = Logger::builder()
        .core(Core::new(
            Arc::new(JsonEncoder::default()),
            file.clone(),
            LogLevel::Debug,
        ))
        .build();
    (logger, file)
}

#[test]
fn test_no_lines_lost_across_rotations() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (logger, file) = rotating_logger(
        &temp_dir,
        RotationPolicy::new().with_size_unit(1024).with_max_size(8),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    logger.info_with_fields(
                        "stress",
                        Fields::new().with_field("thread", t).with_field("seq", i),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    assert!(!file.backup_files().unwrap().is_empty(), "expected rotations");

    let lines = read_all_lines(temp_dir.path());
    assert_eq!(lines.len(), 2000);

    let mut seen = HashSet::new();
    for line in &lines {
        let record: serde_json::Value = serde_json::from_str(line).expect("torn line");
        let key = (
            record["thread"].as_i64().unwrap(),
            record["seq"].as_i64().unwrap(),
        );
        assert!(seen.insert(key), "duplicate record {:?}", key);
    }
    assert_eq!(logger.metrics().total_logged(), 2000);
    assert_eq!(logger.metrics().sink_failures(), 0);
}

#[test]
fn test_backup_limit_holds_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (logger, file) = rotating_logger(
        &temp_dir,
        RotationPolicy::new()
            .with_size_unit(512)
            .with_max_size(1)
            .with_max_backups(3),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    logger.warn(format!("thread {} message {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(file.backup_files().unwrap().len(), 3);
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 4);
}

#[test]
fn test_rapid_burst_with_console_echo() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let console = MemoryTarget::new();
    let logger = Logger::builder()
        .config(Config {
            filename: temp_dir.path().join("burst.log").to_string_lossy().into_owned(),
            print_console: true,
            encoder: "console".to_string(),
            ..Config::default()
        })
        .console_target(Arc::new(console.clone()))
        .build();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    logger.error(format!("burst {}-{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let file_lines = read_all_lines(temp_dir.path());
    let console_lines = console.lines();
    assert_eq!(file_lines.len(), 2000);
    assert_eq!(console_lines.len(), 2000);
    for line in file_lines.iter().chain(console_lines.iter()) {
        assert!(line.starts_with('['), "malformed line {:?}", line);
        assert!(line.contains("[ERROR]"), "malformed line {:?}", line);
    }
}
