//! Write target trait for log output destinations

use crate::core::Result;

/// Where encoded bytes go, independent of how they were formatted.
///
/// Implementations take `&self` and do their own locking, so one target
/// can be shared by every thread holding the logger.
pub trait WriteTarget: Send + Sync {
    /// Write one encoded record. Concurrent calls must not interleave.
    fn write(&self, buf: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}
