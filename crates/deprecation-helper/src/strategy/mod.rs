//! # Strategies
//!
//! A strategy is one concrete action taken for a deprecation notice. The
//! dispatcher runs them in registration order; the first one that fails stops
//! the rest.
//!
//! The built-in actions form the closed [`BuiltinStrategy`] set. Anything else
//! implements [`Strategy`] directly, or [`ErrorStrategy`] when it only wants to
//! decide what happens to the deprecation error.

mod error_strategy;
mod log;
mod raise;

pub use error_strategy::{ErrorStrategy, ErrorStrategyAdapter};
pub use log::{DeprecationLogger, LogError, LogErrorAndStacktrace, TracingLogger, WarnPayload};
pub use raise::RaiseError;

use crate::error::DeprecationError;
use crate::stack::Stack;
use std::fmt;
use std::sync::Arc;

/// The capability every deprecation strategy provides.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Acts on one deprecation notice.
    ///
    /// # Errors
    /// Returning an error aborts the remaining strategies of the current dispatch
    /// and surfaces unchanged to the caller of [`crate::deprecate`].
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError>;
}

/// Shared handle to a strategy, as stored in a [`crate::Configuration`].
pub type SharedStrategy = Arc<dyn Strategy>;

impl<S: Strategy + ?Sized> Strategy for Arc<S> {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        (**self).apply(message, stack)
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        (**self).apply(message, stack)
    }
}

/// The built-in strategies as one closed set.
#[derive(Debug, Clone)]
pub enum BuiltinStrategy {
    RaiseError(RaiseError),
    LogError(LogError),
    LogErrorAndStacktrace(LogErrorAndStacktrace),
}

impl Strategy for BuiltinStrategy {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        match self {
            Self::RaiseError(strategy) => strategy.apply(message, stack),
            Self::LogError(strategy) => strategy.apply(message, stack),
            Self::LogErrorAndStacktrace(strategy) => strategy.apply(message, stack),
        }
    }
}

impl From<RaiseError> for BuiltinStrategy {
    fn from(strategy: RaiseError) -> Self {
        Self::RaiseError(strategy)
    }
}

impl From<LogError> for BuiltinStrategy {
    fn from(strategy: LogError) -> Self {
        Self::LogError(strategy)
    }
}

impl From<LogErrorAndStacktrace> for BuiltinStrategy {
    fn from(strategy: LogErrorAndStacktrace) -> Self {
        Self::LogErrorAndStacktrace(strategy)
    }
}
