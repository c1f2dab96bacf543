use crate::allow_list::AllowList;
use crate::configuration::Configuration;
use crate::error::DeprecationError;
use crate::stack::{BacktraceSource, Stack, StackSource};
use crate::strategy::SharedStrategy;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

static GLOBAL: LazyLock<Deprecator> = LazyLock::new(Deprecator::new);

/// Dispatches deprecation notices to the configured strategies.
///
/// A `Deprecator` owns its [`Configuration`] and the [`StackSource`] used to
/// capture call sites. Clones share both, so a single instance can be handed to
/// every subsystem that reports deprecations. The free functions of this crate
/// delegate to a process-wide instance, see [`global`].
///
/// ### Concurrency
/// The configuration sits behind a read-write lock. [`Deprecator::deprecate`]
/// takes a snapshot of the strategy list and releases the lock before running
/// any strategy, so a concurrent [`Deprecator::configure`] only affects later calls.
///
/// ### Example
/// ```rust
/// use deprecation_helper::{AllowList, Deprecator, RaiseError, Stack, strategies};
///
/// let deprecator = Deprecator::builder()
///     .strategies(strategies![RaiseError::new()])
///     .stack_source(|| Stack::from_iter(["legacy::caller"]))
///     .build();
///
/// let allow = AllowList::new().literal("legacy::");
/// assert!(deprecator.deprecate("old_api is deprecated", &allow, None).is_ok());
/// assert!(deprecator.deprecate("old_api is deprecated", &AllowList::new(), None).is_err());
/// ```
#[derive(Clone)]
pub struct Deprecator {
    config: Arc<RwLock<Configuration>>,
    stack_source: Arc<dyn StackSource>,
}

impl fmt::Debug for Deprecator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deprecator")
            .field("config", &*self.config.read())
            .finish_non_exhaustive()
    }
}

impl Default for Deprecator {
    fn default() -> Self {
        Self::new()
    }
}

impl Deprecator {
    /// A deprecator with no strategies that captures native backtraces.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> DeprecatorBuilder {
        DeprecatorBuilder::default()
    }

    /// Runs `f` on a copy of the configuration and installs the result.
    ///
    /// Concurrent `configure` calls are serialized. Readers are not blocked
    /// while `f` runs, so `f` may call [`Deprecator::deprecate`] (which still
    /// sees the previous configuration). Calling `configure` on the same
    /// deprecator from inside `f` deadlocks.
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut Configuration),
    {
        let guard = self.config.upgradable_read();
        let mut next = Configuration::clone(&guard);
        f(&mut next);
        *RwLockUpgradableReadGuard::upgrade(guard) = next;
    }

    /// Snapshot of the configured strategies.
    #[must_use]
    pub fn deprecation_strategies(&self) -> Vec<SharedStrategy> {
        self.config.read().deprecation_strategies().to_vec()
    }

    /// Reports a call into deprecated functionality.
    ///
    /// The stack is captured first. If `allow_list` covers any frame, nothing
    /// happens. Otherwise every strategy runs in order: `strategies` when
    /// given (an empty slice runs nothing), the configured ones otherwise.
    ///
    /// # Errors
    /// Returns the first error raised by a strategy; later strategies do not run.
    #[inline(never)]
    pub fn deprecate(
        &self,
        message: &str,
        allow_list: &AllowList,
        strategies: Option<&[SharedStrategy]>,
    ) -> Result<(), DeprecationError> {
        let stack = self.stack_source.capture();
        self.dispatch(message, allow_list, strategies, &stack)
    }

    fn dispatch(
        &self,
        message: &str,
        allow_list: &AllowList,
        strategies: Option<&[SharedStrategy]>,
        stack: &Stack,
    ) -> Result<(), DeprecationError> {
        if allow_list.allows(stack.frames()) {
            trace!(deprecation = message, "Deprecation exempted by allow-list");
            return Ok(());
        }

        let configured;
        let strategies = match strategies {
            Some(strategies) => strategies,
            None => {
                configured = self.deprecation_strategies();
                configured.as_slice()
            },
        };

        debug!(deprecation = message, strategies = strategies.len(), "Dispatching deprecation");

        for strategy in strategies {
            strategy.apply(message, stack)?;
        }

        Ok(())
    }
}

/// Builder for a [`Deprecator`] with injected strategies or stack source.
pub struct DeprecatorBuilder {
    config: Configuration,
    stack_source: Arc<dyn StackSource>,
}

impl fmt::Debug for DeprecatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeprecatorBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Default for DeprecatorBuilder {
    fn default() -> Self {
        Self { config: Configuration::new(), stack_source: Arc::new(BacktraceSource) }
    }
}

impl DeprecatorBuilder {
    /// Initial strategy list.
    #[must_use]
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = SharedStrategy>) -> Self {
        self.config.set_deprecation_strategies(strategies);
        self
    }

    /// Replaces native backtrace capture.
    #[must_use]
    pub fn stack_source(mut self, source: impl StackSource + 'static) -> Self {
        self.stack_source = Arc::new(source);
        self
    }

    #[must_use]
    pub fn build(self) -> Deprecator {
        Deprecator { config: Arc::new(RwLock::new(self.config)), stack_source: self.stack_source }
    }
}

/// The process-wide deprecator behind [`configure`], [`deprecate`] and [`crate::deprecate!`].
///
/// Created on first use with no strategies.
pub fn global() -> &'static Deprecator {
    &GLOBAL
}

/// Configures the process-wide deprecator.
///
/// ```rust
/// use deprecation_helper::{LogError, RaiseError, strategies};
///
/// deprecation_helper::configure(|config| {
///     config.set_deprecation_strategies(strategies![LogError::new(), RaiseError::new()]);
/// });
/// # deprecation_helper::configure(|config| config.set_deprecation_strategies(strategies![]));
/// ```
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Configuration),
{
    GLOBAL.configure(f);
}

/// Snapshot of the process-wide strategies, for systems composing on top of this one.
#[must_use]
pub fn deprecation_strategies() -> Vec<SharedStrategy> {
    GLOBAL.deprecation_strategies()
}

/// Reports a deprecated call through the process-wide deprecator.
///
/// See [`Deprecator::deprecate`].
///
/// # Errors
/// Returns the first error raised by a strategy.
#[inline(never)]
pub fn deprecate(
    message: &str,
    allow_list: &AllowList,
    strategies: Option<&[SharedStrategy]>,
) -> Result<(), DeprecationError> {
    GLOBAL.deprecate(message, allow_list, strategies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RaiseError;
    use crate::strategies;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn fixed_stack() -> Stack {
        Stack::from_iter(["frame0", "frame1", "frame2"])
    }

    #[test]
    fn no_strategies_is_a_no_op() {
        let deprecator = Deprecator::builder().stack_source(fixed_stack).build();
        assert!(deprecator.deprecate("M", &AllowList::new(), None).is_ok());
    }

    #[test]
    fn exemption_skips_strategies() {
        let deprecator = Deprecator::builder()
            .strategies(strategies![RaiseError::new()])
            .stack_source(fixed_stack)
            .build();

        let allow = AllowList::new().literal("frame1");
        assert!(deprecator.deprecate("M", &allow, None).is_ok());
    }

    #[test]
    fn empty_override_suppresses_configured() {
        let deprecator = Deprecator::builder()
            .strategies(strategies![RaiseError::new()])
            .stack_source(fixed_stack)
            .build();

        let none = strategies![];
        assert!(deprecator.deprecate("M", &AllowList::new(), Some(none.as_slice())).is_ok());
    }

    #[test]
    fn configure_is_shared_between_clones() {
        let deprecator = Deprecator::builder().stack_source(fixed_stack).build();
        let clone = deprecator.clone();

        clone.configure(|config| config.set_deprecation_strategies(strategies![RaiseError::new()]));

        assert_eq!(deprecator.deprecation_strategies().len(), 1);
        let err = deprecator.deprecate("M", &AllowList::new(), None).expect_err("raise");
        assert_eq!(err.backtrace(), Some(&fixed_stack()));
    }

    #[test]
    fn configure_closure_can_report_deprecations() {
        let deprecator = Deprecator::builder()
            .strategies(strategies![RaiseError::new()])
            .stack_source(fixed_stack)
            .build();
        let (tx, rx) = mpsc::channel();

        let worker = deprecator.clone();
        let handle = thread::spawn(move || {
            worker.configure(|config| {
                let inside = worker.deprecate("old ctor", &AllowList::new(), None);
                let snapshot = worker.deprecation_strategies().len();
                config.set_deprecation_strategies(strategies![]);
                let _ = tx.send((inside.is_err(), snapshot, format!("{worker:?}")));
            });
        });

        let (raised, snapshot, debug) =
            rx.recv_timeout(Duration::from_secs(5)).expect("configure must not block readers");
        assert!(raised, "the previous configuration applies while configuring");
        assert_eq!(snapshot, 1);
        assert!(debug.starts_with("Deprecator"));

        handle.join().expect("configure thread");
        assert!(deprecator.deprecate("M", &AllowList::new(), None).is_ok());
    }

    #[test]
    fn concurrent_configure_keeps_every_push() {
        let deprecator = Deprecator::builder().stack_source(fixed_stack).build();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let deprecator = deprecator.clone();
                thread::spawn(move || {
                    deprecator.configure(|config| config.push_strategy(Arc::new(RaiseError::new())));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("configure thread");
        }

        assert_eq!(deprecator.deprecation_strategies().len(), 8);
    }

    #[test]
    fn native_capture_starts_outside_the_dispatcher() {
        let deprecator = Deprecator::builder().strategies(strategies![RaiseError::new()]).build();

        let err = deprecator.deprecate("M", &AllowList::new(), None).expect_err("raise");
        let stack = err.backtrace().expect("signaled errors carry a stack");
        assert!(stack.iter().all(|frame| !frame.contains("deprecation_helper::dispatch::Deprecator")));
    }
}
