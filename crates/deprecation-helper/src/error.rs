//! # Deprecation Errors
//!
//! [`DeprecationError`] is what a dispatch can fail with. [`ConfigError`] covers
//! setup-time failures: malformed allow-list patterns, unreadable settings and
//! logger construction.

use crate::stack::Stack;
use std::borrow::Cow;

/// Failure surfaced by [`crate::deprecate`] and by [`crate::Strategy::apply`].
#[derive(Debug, thiserror::Error)]
pub enum DeprecationError {
    /// A deprecated code path was reached and a strategy chose to fail the call.
    ///
    /// Displays as the original message, verbatim.
    #[error("{message}")]
    Signaled { message: String, backtrace: Stack },

    /// A user-defined strategy failed with its own error.
    #[error("Deprecation strategy failed{}: {source}", format_context(.context))]
    Strategy {
        source: Box<dyn std::error::Error + Send + Sync>,
        context: Option<Cow<'static, str>>,
    },
}

impl DeprecationError {
    /// Builds the error raised for a deprecated call, carrying the captured stack as its trace.
    pub fn signaled(message: impl Into<String>, backtrace: Stack) -> Self {
        Self::Signaled { message: message.into(), backtrace }
    }

    /// Wraps an arbitrary error coming out of a custom strategy.
    pub fn strategy(
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
        context: Option<Cow<'static, str>>,
    ) -> Self {
        Self::Strategy { source: source.into(), context }
    }

    /// Deprecation message for [`DeprecationError::Signaled`].
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Signaled { message, .. } => Some(message),
            Self::Strategy { .. } => None,
        }
    }

    /// Captured call stack for [`DeprecationError::Signaled`].
    #[must_use]
    pub const fn backtrace(&self) -> Option<&Stack> {
        match self {
            Self::Signaled { backtrace, .. } => Some(backtrace),
            Self::Strategy { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_signaled(&self) -> bool {
        matches!(self, Self::Signaled { .. })
    }
}

/// Errors raised while preparing allow-lists, settings or strategies.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An allow-list pattern is not a valid regular expression.
    #[error("Invalid allow-list pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: regex::Error },

    /// Settings could not be read or deserialized.
    #[error("Settings error{}: {source}", format_context(.context))]
    Load { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// The logger backing the logging strategies could not be built.
    #[error("Logger error{}: {source}", format_context(.context))]
    Logger { source: dh_logger::LoggerError, context: Option<Cow<'static, str>> },
}

/// Attaches a context message to setup-time failures.
pub trait ConfigErrorExt<T> {
    /// # Errors
    /// Returns the original error converted into [`ConfigError`] with `context` attached.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Load { source, context: Some(context.into()) })
    }
}

impl<T> ConfigErrorExt<T> for Result<T, dh_logger::LoggerError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Logger { source, context: Some(context.into()) })
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(source: config::ConfigError) -> Self {
        Self::Load { source, context: None }
    }
}

impl From<dh_logger::LoggerError> for ConfigError {
    fn from(source: dh_logger::LoggerError) -> Self {
        Self::Logger { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signaled_displays_message_verbatim() {
        let err = DeprecationError::signaled("This thing is deprecated", Stack::default());
        assert_eq!(err.to_string(), "This thing is deprecated");
        assert!(err.is_signaled());
        assert_eq!(err.message(), Some("This thing is deprecated"));
    }

    #[test]
    fn signaled_keeps_backtrace() {
        let stack = Stack::from(vec!["frame0".to_owned(), "frame1".to_owned()]);
        let err = DeprecationError::signaled("msg", stack.clone());
        assert_eq!(err.backtrace(), Some(&stack));
    }

    #[test]
    fn strategy_error_formats_context() {
        let err = DeprecationError::strategy("sink unavailable", Some("audit".into()));
        assert_eq!(err.to_string(), "Deprecation strategy failed (audit): sink unavailable");
        assert!(!err.is_signaled());
        assert!(err.message().is_none());
        assert!(err.backtrace().is_none());
    }
}
