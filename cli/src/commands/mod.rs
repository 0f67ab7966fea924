//! # Sysrun Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! One module per `sysrun` subcommand. Each defines a Clap `Args` struct and
//! a `handle_*` function that forwards to the matching `Runner` operation and
//! turns a `false` result into `SysrunError::CommandFailed`.
//!
//! - `shell`: `sysrun shell <COMMAND>`
//! - `exec`: `sysrun exec -- <PROGRAM> [ARGS]...`
//! - `redirect`: `sysrun redirect --output <PATH> -- <PROGRAM> [ARGS]...`
//!

/// Run an argument vector directly.
pub mod exec;
/// Run an argument vector with stdout redirected to a file.
pub mod redirect;
/// Run a command string through the configured interpreter.
pub mod shell;
