//! # Deprecation Helper
//!
//! Marks code paths as deprecated and dispatches each notice through an
//! ordered list of strategies: fail the call, log a warning, or log the
//! warning together with the call stack.
//!
//! ## Overview
//!
//! * **Strategies** run in registration order. The first one that fails
//!   (e.g. [`RaiseError`]) aborts the rest and its error reaches the caller.
//! * **Allow-lists** exempt known call sites: if any pattern matches any frame
//!   of the captured stack, nothing happens.
//! * **Overrides** replace the configured strategies for one call. An empty
//!   override runs nothing, which is different from passing no override.
//! * **Dependency injection**: [`Deprecator`] is an explicit handle with its own
//!   configuration. The free functions and [`deprecate!`] use a process-wide one.
//!
//! ## Example
//!
//! ```rust
//! use deprecation_helper::{DeprecationError, LogError, RaiseError, TracingLogger};
//! use deprecation_helper::{deprecate, strategies};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), DeprecationError> {
//! deprecation_helper::configure(|config| {
//!     config.set_deprecation_strategies(strategies![
//!         LogError::with_logger(Arc::new(TracingLogger)),
//!         RaiseError::new(),
//!     ]);
//! });
//!
//! // Explicit empty override: nothing runs.
//! deprecate!("`old_api` is deprecated", strategies = strategies![])?;
//!
//! // No frame comes from `legacy_reports`, so the call is not exempted.
//! let err = deprecate!("`old_api` is deprecated", allow_list = ["legacy_reports::"]).unwrap_err();
//! assert_eq!(err.to_string(), "`old_api` is deprecated");
//! # deprecation_helper::configure(|config| config.set_deprecation_strategies(strategies![]));
//! # Ok(())
//! # }
//! ```

mod allow_list;
mod configuration;
mod dispatch;
mod error;
pub mod settings;
mod stack;
pub mod strategy;

pub use allow_list::{AllowList, AllowPattern, allowed};
pub use configuration::Configuration;
pub use dispatch::{
    Deprecator, DeprecatorBuilder, configure, deprecate, deprecation_strategies, global,
};
pub use error::{ConfigError, ConfigErrorExt, DeprecationError};
pub use regex;
pub use settings::{Settings, load_settings, load_settings_with_env};
pub use stack::{BacktraceSource, Stack, StackSource, capture};
pub use strategy::{
    BuiltinStrategy, DeprecationLogger, ErrorStrategy, ErrorStrategyAdapter, LogError,
    LogErrorAndStacktrace, RaiseError, SharedStrategy, Strategy, TracingLogger, WarnPayload,
};

pub mod prelude {
    pub use crate::allow_list::{AllowList, AllowPattern};
    pub use crate::dispatch::{Deprecator, configure, deprecation_strategies};
    pub use crate::error::DeprecationError;
    pub use crate::stack::Stack;
    pub use crate::strategy::{
        ErrorStrategy, LogError, LogErrorAndStacktrace, RaiseError, SharedStrategy, Strategy,
    };
    pub use crate::{deprecate, strategies};
}

/// Builds a `Vec<SharedStrategy>` from strategy values, keeping their order.
///
/// ```rust
/// use deprecation_helper::{RaiseError, SharedStrategy, strategies};
///
/// let list: Vec<SharedStrategy> = strategies![RaiseError::new()];
/// assert_eq!(list.len(), 1);
/// assert!(strategies![].is_empty());
/// ```
#[macro_export]
macro_rules! strategies {
    () => {
        ::std::vec::Vec::<$crate::SharedStrategy>::new()
    };
    ($($strategy:expr),+ $(,)?) => {
        ::std::vec![$(::std::sync::Arc::new($strategy) as $crate::SharedStrategy),+]
    };
}

/// Reports a call into deprecated functionality through the process-wide deprecator.
///
/// ```text
/// deprecate!(message)
/// deprecate!(message, allow_list = [pattern, ...])
/// deprecate!(message, strategies = override)
/// deprecate!(message, allow_list = [pattern, ...], strategies = override)
/// ```
///
/// `message` is anything `AsRef<str>`. Patterns are anything convertible into
/// [`AllowPattern`]: `&str`/`String` match as substrings, [`regex::Regex`] as
/// expressions. `override` is anything `AsRef<[SharedStrategy]>`.
///
/// Evaluates to `Result<(), DeprecationError>`.
#[macro_export]
macro_rules! deprecate {
    (@allow_list $($pattern:expr),*) => {{
        #[allow(unused_mut)]
        let mut list = $crate::AllowList::new();
        $( list.push($pattern); )*
        list
    }};
    ($message:expr $(,)?) => {
        $crate::deprecate(
            ::core::convert::AsRef::<str>::as_ref(&$message),
            &$crate::AllowList::new(),
            ::core::option::Option::None,
        )
    };
    ($message:expr, allow_list = [$($pattern:expr),* $(,)?] $(,)?) => {
        $crate::deprecate(
            ::core::convert::AsRef::<str>::as_ref(&$message),
            &$crate::deprecate!(@allow_list $($pattern),*),
            ::core::option::Option::None,
        )
    };
    ($message:expr, strategies = $strategies:expr $(,)?) => {
        $crate::deprecate(
            ::core::convert::AsRef::<str>::as_ref(&$message),
            &$crate::AllowList::new(),
            ::core::option::Option::Some(
                ::core::convert::AsRef::<[$crate::SharedStrategy]>::as_ref(&$strategies),
            ),
        )
    };
    ($message:expr, allow_list = [$($pattern:expr),* $(,)?], strategies = $strategies:expr $(,)?) => {
        $crate::deprecate(
            ::core::convert::AsRef::<str>::as_ref(&$message),
            &$crate::deprecate!(@allow_list $($pattern),*),
            ::core::option::Option::Some(
                ::core::convert::AsRef::<[$crate::SharedStrategy]>::as_ref(&$strategies),
            ),
        )
    };
}
