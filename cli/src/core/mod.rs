//! # Sysrun Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Foundational pieces shared by the runner and the CLI driver:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: The runner failure taxonomy and application error types
//!
//! ```rust
//! use sysrun::core::config; // For loading configuration
//! use sysrun::core::error::{RunError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
