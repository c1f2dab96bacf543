use crate::error::DeprecationError;
use crate::stack::Stack;
use crate::strategy::Strategy;

/// Fails the deprecated call with [`DeprecationError::Signaled`].
///
/// The error carries the message verbatim and the captured stack as its trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaiseError;

impl RaiseError {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Strategy for RaiseError {
    fn apply(&self, message: &str, stack: &Stack) -> Result<(), DeprecationError> {
        Err(DeprecationError::signaled(message, stack.clone()))
    }
}
