use crate::strategy::SharedStrategy;

/// The strategies a [`crate::Deprecator`] runs when no override is given.
///
/// Handed out mutably by [`crate::Deprecator::configure`]. Nothing is validated
/// on assignment.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    deprecation_strategies: Option<Vec<SharedStrategy>>,
}

impl Configuration {
    #[must_use]
    pub const fn new() -> Self {
        Self { deprecation_strategies: None }
    }

    /// Replaces the configured strategies; order is execution order.
    pub fn set_deprecation_strategies(
        &mut self,
        strategies: impl IntoIterator<Item = SharedStrategy>,
    ) {
        self.deprecation_strategies = Some(strategies.into_iter().collect());
    }

    /// Appends one strategy after the ones already configured.
    pub fn push_strategy(&mut self, strategy: SharedStrategy) {
        self.deprecation_strategies.get_or_insert_with(Vec::new).push(strategy);
    }

    /// Configured strategies, or an empty slice if none were ever set.
    #[must_use]
    pub fn deprecation_strategies(&self) -> &[SharedStrategy] {
        self.deprecation_strategies.as_deref().unwrap_or_default()
    }
}
