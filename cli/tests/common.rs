//! # Sysrun Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: a handle on the
//! compiled `sysrun` binary, a runner wired to an in-memory reporter, and a
//! guard that serializes tests which inspect process-wide state (open
//! descriptors, unreaped children).
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use sysrun::{MemoryReporter, Runner};

/// `assert_cmd::Command` pointing at the `sysrun` binary under test.
pub fn sysrun_cmd() -> Command {
    Command::cargo_bin("sysrun").expect("Failed to find sysrun binary for testing")
}

/// A default runner whose failures land in the returned reporter.
pub fn capturing_runner() -> (Runner, Arc<MemoryReporter>) {
    let reporter = Arc::new(MemoryReporter::new());
    let runner = Runner::default().with_reporter(reporter.clone());
    (runner, reporter)
}

/// Serializes tests within one test binary.
pub fn serial_guard() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

/// Number of descriptors currently open in this process.
#[cfg(target_os = "linux")]
pub fn open_fd_count() -> usize {
    std::fs::read_dir("/proc/self/fd")
        .expect("read /proc/self/fd")
        .count()
}
