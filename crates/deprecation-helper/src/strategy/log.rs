use crate::error::DeprecationError;
use crate::stack::Stack;
use crate::strategy::Strategy;
use dh_logger::{LOG_TARGET, Logger};
use std::fmt;
use std::sync::Arc;

/// What a logging strategy hands to its logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnPayload<'a> {
    /// The deprecation message alone.
    Text(&'a str),
    /// The message together with the captured stack.
    Structured { message: &'a str, backtrace: &'a [String] },
}

impl WarnPayload<'_> {
    #[must_use]
    pub const fn message(&self) -> &str {
        match self {
            Self::Text(message) | Self::Structured { message, .. } => message,
        }
    }
}

/// Logging collaborator of [`LogError`] and [`LogErrorAndStacktrace`].
pub trait DeprecationLogger: fmt::Debug + Send + Sync {
    /// Writes one warning-level entry.
    fn warn(&self, payload: &WarnPayload<'_>);
}

impl DeprecationLogger for Logger {
    fn warn(&self, payload: &WarnPayload<'_>) {
        match *payload {
            WarnPayload::Text(message) => Self::warn(self, message),
            WarnPayload::Structured { message, backtrace } => {
                self.warn_with_backtrace(message, backtrace);
            },
        }
    }
}

/// Emits warnings into whatever `tracing` subscriber the host application installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl DeprecationLogger for TracingLogger {
    fn warn(&self, payload: &WarnPayload<'_>) {
        match *payload {
            WarnPayload::Text(message) => tracing::warn!(target: LOG_TARGET, "{message}"),
            WarnPayload::Structured { message, backtrace } => {
                tracing::warn!(target: LOG_TARGET, backtrace = ?backtrace, "{message}");
            },
        }
    }
}

fn default_logger() -> Arc<dyn DeprecationLogger> {
    Arc::new(Logger::stdout())
}

/// Logs the deprecation message as a warning and lets the call continue.
#[derive(Debug, Clone)]
pub struct LogError {
    logger: Arc<dyn DeprecationLogger>,
}

impl LogError {
    /// Logs to standard output through a logger created right here.
    #[must_use]
    pub fn new() -> Self {
        Self { logger: default_logger() }
    }

    #[must_use]
    pub fn with_logger(logger: Arc<dyn DeprecationLogger>) -> Self {
        Self { logger }
    }

    #[must_use]
    pub const fn logger(&self) -> &Arc<dyn DeprecationLogger> {
        &self.logger
    }
}

impl Default for LogError {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for LogError {
    fn apply(&self, message: &str, _stack: &Stack) -> Result<(), DeprecationError> {
        self.logger.warn(&WarnPayload::Text(message));
        Ok(())
    }
}

/// Logs the deprecation message together with the captured stack.
#[derive(Debug, Clone)]
pub struct LogErrorAndStacktrace {
    logger: Arc<dyn DeprecationLogger>,
}

impl LogErrorAndStacktrace {
    /// Logs to standard output through a logger created right here.
    #[must_use]
    pub fn new() -> Self {
        Self { logger: default_logger() }
    }

    #[must_use]
    pub fn with_logger(logger: Arc<dyn DeprecationLogger>) -> Self {
        Self { logger }
    }

    #[must_use]
    pub const fn logger(&self) -> &Arc<dyn DeprecationLogger> {
        &self.logger
    }
}

impl Default for LogErrorAndStacktrace {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for LogErrorAndStacktrace {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        self.logger.warn(&WarnPayload::Structured { message, backtrace: stack.frames() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<(String, Option<Vec<String>>)>>);

    impl DeprecationLogger for Recorder {
        fn warn(&self, payload: &WarnPayload<'_>) {
            let backtrace = match payload {
                WarnPayload::Text(_) => None,
                WarnPayload::Structured { backtrace, .. } => Some(backtrace.to_vec()),
            };
            self.0.lock().push((payload.message().to_owned(), backtrace));
        }
    }

    #[test]
    fn log_error_writes_message_only() {
        let recorder = Arc::new(Recorder::default());
        let strategy = LogError::with_logger(recorder.clone());

        strategy.apply("old", &Stack::from_iter(["frame0"])).expect("logging never fails");

        assert_eq!(*recorder.0.lock(), vec![("old".to_owned(), None)]);
    }

    #[test]
    fn log_error_and_stacktrace_writes_both() {
        let recorder = Arc::new(Recorder::default());
        let strategy = LogErrorAndStacktrace::with_logger(recorder.clone());

        strategy.apply("old", &Stack::from_iter(["frame0", "frame1"])).expect("logging never fails");

        let expected = vec!["frame0".to_owned(), "frame1".to_owned()];
        assert_eq!(*recorder.0.lock(), vec![("old".to_owned(), Some(expected))]);
    }

    #[test]
    fn default_logger_is_built_eagerly() {
        let strategy = LogError::default();
        assert!(format!("{:?}", strategy.logger()).contains("Logger"));
        assert!(strategy.apply("to stdout", &Stack::default()).is_ok());
    }

    #[test]
    fn tracing_logger_never_fails() {
        let strategy = LogErrorAndStacktrace::with_logger(Arc::new(TracingLogger));
        assert!(strategy.apply("to tracing", &Stack::from_iter(["frame0"])).is_ok());
    }

    #[test]
    fn payload_exposes_message() {
        let frames = ["frame0".to_owned()];
        assert_eq!(WarnPayload::Text("a").message(), "a");
        assert_eq!(WarnPayload::Structured { message: "b", backtrace: &frames }.message(), "b");
    }
}
