//! Build a logger from a JSON configuration and write a few records.
//!
//! Run with: cargo run --example basic_usage

use pzlog::prelude::*;
use pzlog::{info, warn};
use std::time::Duration;

fn main() -> pzlog::Result<()> {
    let config = Config::from_json_str(
        r#"{
            "filename": "./logs/basic_usage.log",
            "loglevel": "debug",
            "printconsole": true,
            "encoder": "structured",
            "max_size": 10,
            "max_backups": 3,
            "max_age": 7
        }"#,
    )?;

    let logger = build_logger(Some(config));

    logger.debug("starting up");
    info!(logger, "listening on port {}", 8080; "tls" => false);
    warn!(logger, "cache warmup slow"; "cost" => Duration::from_millis(840));
    logger.error_with_fields(
        "upstream unavailable",
        Fields::new()
            .with_field("host", "db-1")
            .with_field("retry_in", Duration::from_secs(5)),
    );

    logger.flush()?;

    let metrics = logger.metrics();
    println!(
        "logged={} filtered={} sink_failures={}",
        metrics.total_logged(),
        metrics.filtered_count(),
        metrics.sink_failures()
    );
    Ok(())
}
