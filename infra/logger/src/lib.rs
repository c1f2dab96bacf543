//! # Logger
//!
//! A self-contained `tracing` logger for deprecation warnings.
//!
//! Unlike an application logger, a [`Logger`] never installs a global subscriber.
//! It owns its own [`Dispatch`] and routes every event through it, so a library
//! can emit warnings to standard output (or a file, or any custom writer)
//! regardless of what the host application configured.
//!
//! * Console output goes to stdout or stderr, compact or JSON.
//! * File output uses a rolling, non-blocking appender.
//! * Use [`LoggerBuilder::env_filter`] to set directives explicitly; otherwise
//!   built loggers honour `RUST_LOG` on top of [`LoggerBuilder::level`].
//!   [`Logger::stdout`] always uses its fixed `INFO` filter.
//!
//! ## Example
//!
//! ```rust
//! # use dh_logger::{ConsoleTarget, Logger, LevelFilter};
//!
//! let logger = Logger::builder()
//!     .name("my-lib")
//!     .console(ConsoleTarget::Stderr)
//!     .level(LevelFilter::WARN)
//!     .build()
//!     .unwrap();
//!
//! logger.warn("`old_api` is deprecated, use `new_api`");
//! ```

mod error;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Target attached to every event emitted by a [`Logger`].
pub const LOG_TARGET: &str = "deprecation";

const DEFAULT_NAME: &str = "deprecation";
const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Where console output is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
    Off,
}

#[derive(Debug)]
pub struct LoggerConfig {
    console: ConsoleTarget,
    path: Option<PathBuf>,
    writer: Option<BoxMakeWriter>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleTarget::Stdout,
            path: None,
            writer: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring a scoped [`Logger`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: std::marker::PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder {
            name: WithName(name.into()),
            config: self.config,
            file_state: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Configures maximum number of log files to keep.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Configures the log file rotation strategy.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `deprecation=warn`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::build`] to return an error.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Selects the console stream, or disables console output.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub const fn console(mut self, target: ConsoleTarget) -> Self {
        self.config.console = target;
        self
    }

    /// Switches every output layer to JSON formatting.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    /// Adds an extra output layer writing to a custom sink.
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub fn writer<W>(mut self, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        self.config.writer = Some(BoxMakeWriter::new(make_writer));
        self
    }

    /// Sets the directory for rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: std::marker::PhantomData }
    }

    /// Consumes the builder and assembles the logger's private subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. For file output it holds the [`WorkerGuard`] of the
    /// non-blocking writer; buffered lines are flushed when the last clone is dropped.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    /// Returns [`LoggerError::Appender`] if the rolling file appender cannot be created.
    pub fn build(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;
        let json = self.config.json;

        let mut layers: Vec<BoxedLayer> = Vec::new();

        match self.config.console {
            ConsoleTarget::Stdout => layers.push(fmt_layer(std::io::stdout, json, true)),
            ConsoleTarget::Stderr => layers.push(fmt_layer(std::io::stderr, json, true)),
            ConsoleTarget::Off => {},
        }

        if let Some(writer) = self.config.writer {
            layers.push(fmt_layer(writer, json, false));
        }

        let guard = if let Some(path) = self.config.path {
            fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create path: {}", path.display()).into()),
            })?;

            let file_appender = RollingFileAppender::builder()
                .rotation(self.config.rotation)
                .filename_prefix(&self.name.0)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(self.config.max_files)
                .build(path)?;

            let (non_blocking, g) = tracing_appender::non_blocking(file_appender);
            layers.push(fmt_layer(non_blocking, json, false));
            Some(Arc::new(g))
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console, file or writer output.".into(),
                context: None,
            });
        }

        Ok(Logger::assemble(self.name.0, env_filter, layers, guard))
    }
}

/// A handle to a scoped logging pipeline.
///
/// Cloning is cheap; clones share the same dispatcher and file guard.
#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
    dispatch: Dispatch,
    guard: Option<Arc<WorkerGuard>>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    ///
    /// The `name` identifies the logger and prefixes rolling log files
    /// (e.g., `my-lib.2026-10-16.log`).
    #[must_use = "The builder must be configured before it can be used to build the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: NoName,
            file_state: std::marker::PhantomData,
        }
    }

    /// Compact, `INFO`-level logger writing to standard output.
    ///
    /// This is the default sink of the logging strategies and cannot fail.
    /// `RUST_LOG` is ignored, so a quiet host filter never mutes deprecations.
    #[must_use]
    pub fn stdout() -> Self {
        Self::fixed(std::io::stdout, true)
    }

    fn fixed<W>(writer: W, ansi: bool) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let env_filter = fixed_env_filter(LoggerConfig::default().level);
        let layers = vec![fmt_layer(writer, false, ansi)];
        Self::assemble(DEFAULT_NAME.to_owned(), env_filter, layers, None)
    }

    fn assemble(
        name: String,
        env_filter: EnvFilter,
        layers: Vec<BoxedLayer>,
        guard: Option<Arc<WorkerGuard>>,
    ) -> Self {
        let subscriber = tracing_subscriber::registry().with(env_filter).with(layers);
        Self { name: name.into(), dispatch: Dispatch::new(subscriber), guard }
    }

    /// Logger name as given to the builder.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emits `message` as a warning.
    pub fn warn(&self, message: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::warn!(target: LOG_TARGET, "{message}");
        });
    }

    /// Emits `message` as a warning with the call stack attached as a structured field.
    pub fn warn_with_backtrace<S: AsRef<str>>(&self, message: &str, backtrace: &[S]) {
        let frames: Vec<&str> = backtrace.iter().map(AsRef::as_ref).collect();
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::warn!(target: LOG_TARGET, backtrace = ?frames, "{message}");
        });
    }

    /// Returns a reference to the underlying worker guard, if present.
    #[must_use]
    pub fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_deref()
    }
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = layer().with_writer(writer).with_ansi(ansi);
    if json { layer.json().boxed() } else { layer.compact().boxed() }
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn default_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

fn fixed_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).parse_lossy("")
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    config.env_filter.as_ref().map_or_else(
        || Ok(default_env_filter(config.level)),
        |filter| {
            EnvFilter::builder()
                .with_default_directive(config.level.into())
                .parse(filter)
                .map_err(|e| LoggerError::InvalidConfiguration {
                    message: format!("Invalid env filter '{filter}': {e}").into(),
                    context: None,
                })
        },
    )
}
