use crate::error::DeprecationError;
use crate::stack::Stack;
use crate::strategy::Strategy;
use std::fmt;

/// A strategy that only decides what to do with the deprecation error.
///
/// Wrap an implementation in [`ErrorStrategyAdapter`] (or call
/// [`ErrorStrategy::into_strategy`]) to register it. The adapter builds the
/// [`DeprecationError::Signaled`] error with the captured stack and hands it
/// over; returning it fails the call, returning `Ok(())` swallows it.
pub trait ErrorStrategy: fmt::Debug + Send + Sync {
    /// # Errors
    /// Whatever error is returned aborts the dispatch, unchanged.
    fn apply_to_error(&self, error: DeprecationError) -> Result<(), DeprecationError>;

    fn into_strategy(self) -> ErrorStrategyAdapter<Self>
    where
        Self: Sized,
    {
        ErrorStrategyAdapter::new(self)
    }
}

/// Turns an [`ErrorStrategy`] into a [`Strategy`].
#[derive(Debug, Clone)]
pub struct ErrorStrategyAdapter<H> {
    handler: H,
}

impl<H: ErrorStrategy> ErrorStrategyAdapter<H> {
    pub const fn new(handler: H) -> Self {
        Self { handler }
    }

    pub const fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: ErrorStrategy> Strategy for ErrorStrategyAdapter<H> {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        self.handler.apply_to_error(DeprecationError::signaled(message, stack.clone()))
    }
}
