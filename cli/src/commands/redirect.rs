//! # Sysrun Redirect Command
//!
//! File: cli/src/commands/redirect.rs
//! Author: Christi Mahu
//!
//! `sysrun redirect --output <PATH> -- <PROGRAM> [ARGS]...` runs the program
//! with its stdout written to `PATH`. The file is created if missing and
//! truncated if present; stderr is left alone.
//!
use clap::Parser;
use std::path::PathBuf;
use sysrun::common::process::Runner;
use sysrun::core::error::{Result, SysrunError};
use tracing::info;

/// Arguments for `sysrun redirect`.
#[derive(Parser, Debug)]
pub struct RedirectArgs {
    /// File that receives the program's standard output.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Program path followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

pub fn handle_redirect(args: RedirectArgs, runner: &Runner) -> Result<()> {
    if runner.run_exec_redirected(&args.output, &args.command) {
        info!("Output written to {}", args.output.display());
        Ok(())
    } else {
        Err(SysrunError::CommandFailed {
            command: args.command.join(" "),
        }
        .into())
    }
}
