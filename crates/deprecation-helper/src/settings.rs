//! File and environment driven setup of the strategy list.
//!
//! ```toml
//! # deprecation.toml
//! strategies = ["log_error_and_stacktrace", "raise_error"]
//!
//! [logger]
//! target = "stderr"
//! level = "warn"
//! path = "logs"          # optional rolling files next to the console output
//! rotation = "daily"
//! max_files = 7
//! ```
//!
//! Every value can be overridden from the environment with the `DEPRECATION`
//! prefix and `__` as the nesting separator (e.g. `DEPRECATION__LOGGER__JSON=true`).

use crate::dispatch::Deprecator;
use crate::error::{ConfigError, ConfigErrorExt};
use crate::strategy::{
    DeprecationLogger, LogError, LogErrorAndStacktrace, RaiseError, SharedStrategy,
};
use config::{Config, Environment, File, Map};
use dh_logger::{ConsoleTarget, LevelFilter, Logger, Rotation};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const DEFAULT_SETTINGS_FILE: &str = "deprecation";
const ENV_PREFIX: &str = "DEPRECATION";

/// Built-in strategy selectable from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RaiseError,
    LogError,
    LogErrorAndStacktrace,
}

/// Console stream for the settings-built logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
    /// No console output; only useful together with a file `path`.
    Off,
}

/// Rotation period of the settings-built log files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

/// Minimum level for the settings-built logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// Logger used by the logging strategies built from [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub name: String,
    pub target: LogTarget,
    pub level: LogLevel,
    pub json: bool,
    /// Directory for rolling log files named after `name`.
    pub path: Option<PathBuf>,
    pub rotation: LogRotation,
    pub max_files: Option<usize>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            name: "deprecation".to_owned(),
            target: LogTarget::Stdout,
            level: LogLevel::Info,
            json: false,
            path: None,
            rotation: LogRotation::Daily,
            max_files: None,
        }
    }
}

/// Declarative strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Strategies in execution order.
    pub strategies: Vec<StrategyKind>,
    pub logger: LoggerSettings,
}

impl Settings {
    /// Builds the strategy list, sharing one logger between the logging strategies.
    ///
    /// The logger is only built if a logging strategy is listed.
    ///
    /// # Errors
    /// Returns [`ConfigError::Logger`] if the logger cannot be built.
    pub fn build_strategies(&self) -> Result<Vec<SharedStrategy>, ConfigError> {
        let mut logger: Option<Arc<dyn DeprecationLogger>> = None;
        let mut strategies: Vec<SharedStrategy> = Vec::with_capacity(self.strategies.len());

        for kind in &self.strategies {
            let strategy: SharedStrategy = match kind {
                StrategyKind::RaiseError => Arc::new(RaiseError::new()),
                StrategyKind::LogError => {
                    Arc::new(LogError::with_logger(self.shared_logger(&mut logger)?))
                },
                StrategyKind::LogErrorAndStacktrace => {
                    Arc::new(LogErrorAndStacktrace::with_logger(self.shared_logger(&mut logger)?))
                },
            };
            strategies.push(strategy);
        }

        Ok(strategies)
    }

    /// Installs the strategies described by these settings into `deprecator`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Logger`] if the logger cannot be built; the
    /// deprecator is left untouched in that case.
    pub fn apply(&self, deprecator: &Deprecator) -> Result<(), ConfigError> {
        let strategies = self.build_strategies()?;
        deprecator.configure(|config| config.set_deprecation_strategies(strategies));
        Ok(())
    }

    fn shared_logger(
        &self,
        slot: &mut Option<Arc<dyn DeprecationLogger>>,
    ) -> Result<Arc<dyn DeprecationLogger>, ConfigError> {
        if let Some(logger) = slot {
            return Ok(Arc::clone(logger));
        }
        let logger: Arc<dyn DeprecationLogger> = Arc::new(self.logger.build()?);
        *slot = Some(Arc::clone(&logger));
        Ok(logger)
    }
}

impl LoggerSettings {
    /// # Errors
    /// Returns [`ConfigError::Logger`] for an empty name, a zero `max_files`,
    /// no output at all, or a log directory that cannot be created.
    pub fn build(&self) -> Result<Logger, ConfigError> {
        let console = match self.target {
            LogTarget::Stdout => ConsoleTarget::Stdout,
            LogTarget::Stderr => ConsoleTarget::Stderr,
            LogTarget::Off => ConsoleTarget::Off,
        };
        let builder = Logger::builder().name(&self.name).console(console).level(self.level.into());
        let builder = if self.json { builder.json() } else { builder };

        let logger = match &self.path {
            Some(path) => {
                let builder = builder.path(path).rotation(self.rotation.into());
                let builder = match self.max_files {
                    Some(max) => builder.max_files(max),
                    None => builder,
                };
                builder.build()
            },
            None => builder.build(),
        };

        logger.context("Failed to build deprecation logger")
    }
}

/// Loads [`Settings`] from a file overlaid with `DEPRECATION__*` environment variables.
///
/// The file is optional: without it, defaults and environment values apply.
/// If no path is given, `deprecation.{toml,yaml,json,...}` in the working
/// directory is tried.
///
/// # Errors
/// Returns [`ConfigError::Load`] if the file is malformed or values do not deserialize.
pub fn load_settings(path: Option<impl AsRef<Path>>) -> Result<Settings, ConfigError> {
    load(path, None)
}

/// Like [`load_settings`], but reads the overlay from `vars` instead of the
/// process environment.
///
/// Keys are full variable names (`DEPRECATION__LOGGER__JSON`); list values
/// such as `DEPRECATION__STRATEGIES` are comma separated.
///
/// # Errors
/// Returns [`ConfigError::Load`] if the file is malformed or values do not deserialize.
pub fn load_settings_with_env<I, K, V>(
    path: Option<impl AsRef<Path>>,
    vars: I,
) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars: Map<String, String> = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    load(path, Some(vars))
}

fn load(
    path: Option<impl AsRef<Path>>,
    vars: Option<Map<String, String>>,
) -> Result<Settings, ConfigError> {
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("strategies")
                .try_parsing(true)
                .source(vars),
        );

    info!("Loading deprecation settings from {}", effective_path.display());

    let settings = builder
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")?;

    Ok(settings)
}
