//! Logger facade and construction pipeline

use super::{
    config::Config,
    core_set::{compose, Core, CoreSet},
    encoder::{select_encoder, ConsoleEncoder, Encoder, EncoderConfig},
    error::Result,
    fields::Fields,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record::{Caller, Record},
};
use crate::sinks::{self, WriteTarget};
use std::io::IsTerminal;
use std::sync::Arc;

struct LoggerInner {
    cores: CoreSet,
    metrics: LoggerMetrics,
}

/// Handle to a composed set of cores
///
/// Cloning is cheap and every clone writes to the same cores. The core set is
/// fixed at construction; to change the configuration build a new logger.
///
/// Every emitting method is `#[track_caller]`, so records carry the file and
/// line of the code that called the logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $with_fields:ident;)+) => {
        $(
            #[track_caller]
            pub fn $plain(&self, message: impl Into<String>) {
                self.log(LogLevel::$level, message);
            }

            #[track_caller]
            pub fn $with_fields(&self, message: impl Into<String>, fields: Fields) {
                self.log_with_fields(LogLevel::$level, message, fields);
            }
        )+
    };
}

impl Logger {
    fn from_cores(cores: CoreSet) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                cores,
                metrics: LoggerMetrics::new(),
            }),
        }
    }

    /// A logger with no cores. Every record is filtered.
    #[must_use]
    pub fn nop() -> Self {
        Self::from_cores(CoreSet::Tee(Vec::new()))
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether a record at `level` would reach any core
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.inner.cores.enabled(level)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with_fields(level, message, Fields::new());
    }

    /// Emit one record.
    ///
    /// The gate is checked first: a filtered record is never built or
    /// encoded. `Panic` and `Fatal` are written like any other level and do
    /// not unwind or exit.
    #[track_caller]
    pub fn log_with_fields(&self, level: LogLevel, message: impl Into<String>, fields: Fields) {
        if !self.enabled(level) {
            self.inner.metrics.record_filtered();
            return;
        }

        let record = Record::new(level, message.into())
            .with_caller(Caller::here())
            .with_fields(fields);
        self.inner.cores.write(&record, &self.inner.metrics);
    }

    level_methods! {
        Debug => debug, debug_with_fields;
        Info => info, info_with_fields;
        Warn => warn, warn_with_fields;
        Error => error, error_with_fields;
        DPanic => dpanic, dpanic_with_fields;
        Panic => panic, panic_with_fields;
        Fatal => fatal, fatal_with_fields;
    }

    /// Flush every write target.
    pub fn flush(&self) -> Result<()> {
        self.inner.cores.flush()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn cores(&self) -> &CoreSet {
        &self.inner.cores
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("cores", &self.inner.cores)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        build_logger(None)
    }
}

/// Build a logger from a configuration. `None` means all defaults.
///
/// Never fails: the configuration is normalized first and the log file is
/// only opened by the first write.
///
/// # Example
///
/// ```no_run
/// use pzlog::{build_logger, Config};
///
/// let logger = build_logger(Some(Config {
///     filename: "/var/log/app/app.log".to_string(),
///     log_level: "warn".to_string(),
///     print_console: true,
///     ..Config::default()
/// }));
/// logger.warn("disk almost full");
/// ```
pub fn build_logger(config: Option<Config>) -> Logger {
    Logger::builder().config(config.unwrap_or_default()).build()
}

/// Builder for constructing a Logger with a fluent API
///
/// With a [`Config`], `build` runs the full pipeline. The write targets can
/// be replaced, which is how tests capture output. Extra cores are appended
/// to whatever the config produced; without a config they are the only cores.
///
/// # Example
/// ```
/// use pzlog::prelude::*;
/// use pzlog::sinks::ConsoleSink;
/// use std::sync::Arc;
///
/// let captured = Arc::new(ConsoleSink::with_writer(Vec::<u8>::new()));
/// let logger = Logger::builder()
///     .core(Core::new(
///         Arc::new(JsonEncoder::default()),
///         captured.clone(),
///         LogLevel::Debug,
///     ))
///     .build();
/// logger.debug("captured");
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    config: Option<Config>,
    file_target: Option<Arc<dyn WriteTarget>>,
    console_target: Option<Arc<dyn WriteTarget>>,
    cores: Vec<Core>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the rotating file built from `config.filename`
    #[must_use = "builder methods return a new value"]
    pub fn file_target(mut self, target: Arc<dyn WriteTarget>) -> Self {
        self.file_target = Some(target);
        self
    }

    /// Replace standard output as the console echo target
    #[must_use = "builder methods return a new value"]
    pub fn console_target(mut self, target: Arc<dyn WriteTarget>) -> Self {
        self.console_target = Some(target);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn core(mut self, core: Core) -> Self {
        self.cores.push(core);
        self
    }

    pub fn build(self) -> Logger {
        let Some(config) = self.config else {
            return Logger::from_cores(CoreSet::tee(self.cores));
        };
        let config = config.normalize();

        let encoder_config = EncoderConfig::new().with_time_format(config.time_format.clone());
        let file_encoder = select_encoder(&config.encoder, &encoder_config);
        let file_sink: Arc<dyn WriteTarget> = match self.file_target {
            Some(target) => target,
            None => sinks::build_file_sink(&config),
        };

        let console = if config.print_console {
            let (target, colors): (Arc<dyn WriteTarget>, bool) = match self.console_target {
                Some(target) => (target, false),
                None => (sinks::build_console_sink(), std::io::stdout().is_terminal()),
            };
            let encoder: Arc<dyn Encoder> =
                Arc::new(ConsoleEncoder::new(encoder_config.with_colors(colors)));
            Some((encoder, target))
        } else {
            None
        };

        let cores = compose(&config, file_encoder, file_sink, console);
        if self.cores.is_empty() {
            return Logger::from_cores(cores);
        }

        let mut all = cores.cores().to_vec();
        all.extend(self.cores);
        Logger::from_cores(CoreSet::tee(all))
    }
}
