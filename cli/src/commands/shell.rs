//! # Sysrun Shell Command
//!
//! File: cli/src/commands/shell.rs
//! Author: Christi Mahu
//!
//! `sysrun shell "<COMMAND>"` passes the string unmodified to the configured
//! interpreter (`/bin/sh -c` by default). Globbing, pipes and variables are
//! the interpreter's business.
//!
use clap::Parser;
use sysrun::common::process::Runner;
use sysrun::core::error::{Result, SysrunError};
use tracing::debug;

/// Arguments for `sysrun shell`.
#[derive(Parser, Debug)]
pub struct ShellArgs {
    /// Command string handed to the interpreter.
    pub command: String,
}

pub fn handle_shell(args: ShellArgs, runner: &Runner) -> Result<()> {
    debug!(shell = %runner.config().shell, command = %args.command, "running shell command");
    if runner.run_shell(args.command.as_str()) {
        Ok(())
    } else {
        Err(SysrunError::CommandFailed {
            command: args.command,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_args_parse() {
        let args = ShellArgs::try_parse_from(["shell", "echo $HOME | wc -c"]).unwrap();
        assert_eq!(args.command, "echo $HOME | wc -c");
    }

    #[test]
    fn test_handle_shell_maps_failure() {
        let runner = Runner::default();
        assert!(handle_shell(
            ShellArgs {
                command: "exit 0".into()
            },
            &runner
        )
        .is_ok());

        let err = handle_shell(
            ShellArgs {
                command: "exit 7".into(),
            },
            &runner,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exit 7"));
    }
}
