//! Cores and their fan-out composition
//!
//! A [`Core`] binds one encoder to one write target behind a severity gate.
//! A [`CoreSet`] is either a single core or a tee that hands the same record
//! to every member, each encoding it in its own layout.

use super::config::Config;
use super::encoder::Encoder;
use super::error::Result;
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::record::Record;
use crate::sinks::WriteTarget;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// One (encoder, write target, gate) binding
#[derive(Clone)]
pub struct Core {
    encoder: Arc<dyn Encoder>,
    sink: Arc<dyn WriteTarget>,
    gate: LogLevel,
}

impl Core {
    pub fn new(encoder: Arc<dyn Encoder>, sink: Arc<dyn WriteTarget>, gate: LogLevel) -> Self {
        Self {
            encoder,
            sink,
            gate,
        }
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.gate
    }

    /// Encode `record` and hand the bytes to the write target.
    pub fn write(&self, record: &Record) -> Result<()> {
        let line = self.encoder.encode(record);
        self.sink.write(line.as_bytes())
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    pub fn gate(&self) -> LogLevel {
        self.gate
    }

    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    pub fn sink(&self) -> &Arc<dyn WriteTarget> {
        &self.sink
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("encoder", &self.encoder.name())
            .field("sink", &self.sink.name())
            .field("gate", &self.gate)
            .finish()
    }
}

/// Composed cores owned by a logger
#[derive(Debug, Clone)]
pub enum CoreSet {
    Single(Core),
    Tee(Vec<Core>),
}

impl CoreSet {
    /// Combine cores. A single core is not wrapped.
    pub fn tee(mut cores: Vec<Core>) -> Self {
        if cores.len() == 1 {
            if let Some(core) = cores.pop() {
                return CoreSet::Single(core);
            }
        }
        CoreSet::Tee(cores)
    }

    pub fn cores(&self) -> &[Core] {
        match self {
            CoreSet::Single(core) => std::slice::from_ref(core),
            CoreSet::Tee(cores) => cores,
        }
    }

    pub fn is_tee(&self) -> bool {
        matches!(self, CoreSet::Tee(_))
    }

    /// Whether any core would accept a record at `level`
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.cores().iter().any(|core| core.enabled(level))
    }

    /// Deliver `record` to every core whose gate it passes.
    ///
    /// Each core is isolated: an error or panic in one is reported and
    /// counted, and the remaining cores still receive the record.
    pub fn write(&self, record: &Record, metrics: &LoggerMetrics) {
        let mut has_error = false;

        for (idx, core) in self.cores().iter().enumerate() {
            if !core.enabled(record.level) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| core.write(record))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Core #{} ({}) failed: {}",
                        idx,
                        core.sink.name(),
                        e
                    );
                    metrics.record_sink_failure();
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Core #{} ({}) panicked: {}. \
                         Other cores continue to function.",
                        idx,
                        core.sink.name(),
                        panic_msg
                    );
                    metrics.record_sink_failure();
                    has_error = true;
                }
            }
        }

        if !has_error {
            metrics.record_logged();
        }
    }

    /// Flush every core, returning the first error.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for core in self.cores() {
            if let Err(e) = core.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Bind the file core and, when console echo is on, a console core beside it.
///
/// Both cores share the configured level as their gate. `console` is only
/// consulted if `config.print_console` is set.
pub fn compose(
    config: &Config,
    file_encoder: Arc<dyn Encoder>,
    file_sink: Arc<dyn WriteTarget>,
    console: Option<(Arc<dyn Encoder>, Arc<dyn WriteTarget>)>,
) -> CoreSet {
    let gate = config.level();
    let file_core = Core::new(file_encoder, file_sink, gate);

    match console {
        Some((console_encoder, console_sink)) if config.print_console => CoreSet::Tee(vec![
            file_core,
            Core::new(console_encoder, console_sink, gate),
        ]),
        _ => CoreSet::Single(file_core),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::{ConsoleEncoder, JsonEncoder};
    use crate::core::error::LoggerError;
    use crate::sinks::ConsoleSink;

    struct Broken;

    impl WriteTarget for Broken {
        fn write(&self, _buf: &[u8]) -> Result<()> {
            Err(LoggerError::writer("disk on fire"))
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    struct Panicking;

    impl WriteTarget for Panicking {
        fn write(&self, _buf: &[u8]) -> Result<()> {
            panic!("sink exploded")
        }
        fn flush(&self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn memory() -> Arc<ConsoleSink<Vec<u8>>> {
        Arc::new(ConsoleSink::with_writer(Vec::new()))
    }

    fn take(sink: Arc<ConsoleSink<Vec<u8>>>) -> String {
        let sink = Arc::try_unwrap(sink).ok().expect("sole owner");
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_compose_without_console_is_single() {
        let config = Config::default();
        let set = compose(
            &config,
            Arc::new(JsonEncoder::default()),
            memory(),
            Some((Arc::new(ConsoleEncoder::default()), memory())),
        );
        assert!(!set.is_tee());
        assert_eq!(set.cores().len(), 1);
        assert_eq!(set.cores()[0].gate(), LogLevel::Info);
    }

    #[test]
    fn test_compose_with_console_is_tee() {
        let config = Config {
            print_console: true,
            log_level: "error".to_string(),
            ..Config::default()
        };
        let set = compose(
            &config,
            Arc::new(JsonEncoder::default()),
            memory(),
            Some((Arc::new(ConsoleEncoder::default()), memory())),
        );
        assert!(set.is_tee());
        assert!(set.cores().iter().all(|c| c.gate() == LogLevel::Error));
        assert_eq!(set.cores()[0].encoder().name(), "structured");
        assert_eq!(set.cores()[1].encoder().name(), "console");
    }

    #[test]
    fn test_tee_delivers_to_every_core() {
        let file = memory();
        let console = memory();
        let set = CoreSet::tee(vec![
            Core::new(Arc::new(JsonEncoder::default()), file.clone(), LogLevel::Info),
            Core::new(Arc::new(ConsoleEncoder::default()), console.clone(), LogLevel::Info),
        ]);
        let metrics = LoggerMetrics::new();

        set.write(&Record::new(LogLevel::Warn, "both"), &metrics);
        drop(set);

        assert!(take(file).contains("\"msg\":\"both\""));
        assert!(take(console).contains("\tboth\n"));
        assert_eq!(metrics.total_logged(), 1);
    }

    #[test]
    fn test_gate_skips_core() {
        let out = memory();
        let set = CoreSet::tee(vec![Core::new(
            Arc::new(JsonEncoder::default()),
            out.clone(),
            LogLevel::Error,
        )]);
        assert!(!set.enabled(LogLevel::Warn));
        assert!(set.enabled(LogLevel::Fatal));
        drop(set);
        assert!(take(out).is_empty());
    }

    #[test]
    fn test_failing_core_does_not_block_others() {
        let good = memory();
        let set = CoreSet::tee(vec![
            Core::new(Arc::new(JsonEncoder::default()), Arc::new(Broken), LogLevel::Debug),
            Core::new(Arc::new(JsonEncoder::default()), Arc::new(Panicking), LogLevel::Debug),
            Core::new(Arc::new(JsonEncoder::default()), good.clone(), LogLevel::Debug),
        ]);
        let metrics = LoggerMetrics::new();

        set.write(&Record::new(LogLevel::Error, "survives"), &metrics);
        drop(set);

        assert!(take(good).contains("survives"));
        assert_eq!(metrics.sink_failures(), 2);
        assert_eq!(metrics.total_logged(), 0);
    }

    #[test]
    fn test_empty_tee_accepts_nothing() {
        let set = CoreSet::tee(Vec::new());
        assert!(!set.enabled(LogLevel::Fatal));
        assert!(set.flush().is_ok());
    }
}
