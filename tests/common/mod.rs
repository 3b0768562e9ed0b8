//! Shared helpers for integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use pzlog::core::Record;
use pzlog::sinks::WriteTarget;
use pzlog::{Encoder, LoggerError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Write target that keeps everything in memory
#[derive(Clone, Default)]
pub struct MemoryTarget {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl WriteTarget for MemoryTarget {
    fn write(&self, buf: &[u8]) -> Result<()> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Write target that always fails
pub struct FailingTarget;

impl WriteTarget for FailingTarget {
    fn write(&self, _buf: &[u8]) -> Result<()> {
        Err(LoggerError::writer("simulated write failure"))
    }

    fn flush(&self) -> Result<()> {
        Err(LoggerError::writer("simulated flush failure"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Encoder wrapper that counts invocations
pub struct CountingEncoder {
    inner: Arc<dyn Encoder>,
    calls: Arc<AtomicUsize>,
}

impl CountingEncoder {
    pub fn new(inner: Arc<dyn Encoder>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn count(calls: &AtomicUsize) -> usize {
        calls.load(Ordering::SeqCst)
    }
}

impl Encoder for CountingEncoder {
    fn encode(&self, record: &Record) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encode(record)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
