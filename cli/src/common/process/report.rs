//! Diagnostics sinks for runner failures.
//!
//! The runner only ever answers `true` or `false`; the reason for a `false`
//! goes to a `Reporter`. The default logs through `tracing`. `MemoryReporter`
//! keeps messages so callers (and tests) can inspect them without capturing
//! the process's stderr.

use crate::core::error::RunError;
use std::sync::Mutex;
use tracing::error;

/// Receives every failure a runner absorbs.
pub trait Reporter: Send + Sync {
    fn report(&self, error: &RunError);
}

/// Logs failures at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, err: &RunError) {
        error!(step = err.step(), "{}", err);
    }
}

/// Collects failures in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    errors: Mutex<Vec<RunError>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<RunError> {
        self.errors
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Rendered messages, in the order they were reported.
    pub fn messages(&self) -> Vec<String> {
        self.errors().iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn clear(&self) {
        self.errors
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, err: &RunError) {
        self.errors
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(err.clone());
    }
}
