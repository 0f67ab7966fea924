//! # Sysrun Exec Command
//!
//! File: cli/src/commands/exec.rs
//! Author: Christi Mahu
//!
//! `sysrun exec -- <PROGRAM> [ARGS]...` runs the program directly. Arguments
//! reach it verbatim: no shell, no quoting, no `$VAR` expansion. `PROGRAM`
//! must be a path.
//!
use clap::Parser;
use sysrun::common::process::Runner;
use sysrun::core::error::{Result, SysrunError};

/// Arguments for `sysrun exec`.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Program path followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

pub fn handle_exec(args: ExecArgs, runner: &Runner) -> Result<()> {
    if runner.run_exec(&args.command) {
        Ok(())
    } else {
        Err(SysrunError::CommandFailed {
            command: args.command.join(" "),
        }
        .into())
    }
}
