//! Write targets: where encoded records end up

pub mod console;
pub mod rotating_file;
pub mod write_target;

pub use console::ConsoleSink;
pub use rotating_file::{RotatingFile, RotationPolicy};
pub use write_target::WriteTarget;

use crate::core::config::Config;
use std::io::Stdout;
use std::sync::Arc;

/// Rotating file at `config.filename` with the config's rotation thresholds.
///
/// Opening is deferred to the first write, so a bad path surfaces as a
/// write error rather than a construction failure.
pub fn build_file_sink(config: &Config) -> Arc<RotatingFile> {
    Arc::new(RotatingFile::with_policy(
        &config.filename,
        RotationPolicy::from_config(config),
    ))
}

/// Process standard output
pub fn build_console_sink() -> Arc<ConsoleSink<Stdout>> {
    Arc::new(ConsoleSink::stdout())
}
