//! # Sysrun Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared utilities used by the library API and the CLI driver. Today that is
//! the process runner; the CLI's command handlers are thin wrappers over it.
//!
//! ```rust,no_run
//! use sysrun::common::process;
//!
//! let ok = process::run_exec(&["/bin/true"]);
//! ```
//!

/// Fork/exec/wait helpers for running external commands.
pub mod process;
