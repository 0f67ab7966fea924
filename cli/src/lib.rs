//! # Sysrun Library Root
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `sysrun` runs external commands from a host process and reports success as
//! a plain boolean:
//!
//! - `run_shell`: a command string, interpreted by `/bin/sh -c`
//! - `run_exec`: an argument vector, executed directly
//! - `run_exec_redirected`: an argument vector with stdout sent to a file
//!
//! The `sysrun` binary in this crate is a thin command-line driver over these
//! same functions.
//!
//! ```rust,no_run
//! assert!(sysrun::run_exec(&["/bin/true"]));
//! assert!(!sysrun::run_shell(None));
//! ```
//!
pub mod common;
pub mod core;

pub use common::process::{
    run_exec, run_exec_redirected, run_shell, MemoryReporter, Reporter, Runner, Termination,
    TracingReporter,
};
pub use crate::core::config::RunnerConfig;
pub use crate::core::error::{ChildStep, RunError};
