#![allow(dead_code, unreachable_pub)]

use deprecation_helper::{
    DeprecationError, DeprecationLogger, Deprecator, SharedStrategy, Stack, Strategy, WarnPayload,
};
use parking_lot::Mutex;
use std::sync::Arc;

pub const MESSAGE: &str = "This thing is deprecated";

/// The stack every injected deprecator reports.
pub fn error_backtrace() -> Stack {
    Stack::from_iter(["frame0", "frame1", "frame2", "some_special_complicated_frame"])
}

/// Deprecator with a pinned stack and the given strategies.
pub fn deprecator(strategies: Vec<SharedStrategy>) -> Deprecator {
    Deprecator::builder().strategies(strategies).stack_source(error_backtrace).build()
}

/// Clears the process-wide configuration.
pub fn reset_global() {
    deprecation_helper::configure(|config| config.set_deprecation_strategies(Vec::new()));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Warn(String),
    WarnWithBacktrace(String, Vec<String>),
    Applied(&'static str),
}

/// Ordered record of everything the test doubles observed.
#[derive(Debug, Default)]
pub struct Journal(Mutex<Vec<Entry>>);

impl Journal {
    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().clone()
    }

    fn push(&self, entry: Entry) {
        self.0.lock().push(entry);
    }
}

/// Logger double that records every warning.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub journal: Arc<Journal>,
}

impl RecordingLogger {
    pub fn with_journal(journal: &Arc<Journal>) -> Self {
        Self { journal: Arc::clone(journal) }
    }

    pub fn warnings(&self) -> Vec<Entry> {
        self.journal.entries()
    }
}

impl DeprecationLogger for RecordingLogger {
    fn warn(&self, payload: &WarnPayload<'_>) {
        let entry = match *payload {
            WarnPayload::Text(message) => Entry::Warn(message.to_owned()),
            WarnPayload::Structured { message, backtrace } => {
                Entry::WarnWithBacktrace(message.to_owned(), backtrace.to_vec())
            },
        };
        self.journal.push(entry);
    }
}

/// Strategy double that records being called.
#[derive(Debug)]
pub struct Probe {
    pub name: &'static str,
    pub journal: Arc<Journal>,
}

impl Strategy for Probe {
    fn apply(&self, _message: &str, _stack: &Stack) -> Result<(), DeprecationError> {
        self.journal.push(Entry::Applied(self.name));
        Ok(())
    }
}
