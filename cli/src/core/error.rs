//! # Sysrun Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout sysrun. There are two
//! layers:
//!
//! - `RunError`: the failure taxonomy of the process runner (invalid input,
//!   spawn failure, child-side setup failure, wait failure). The runner never
//!   returns these to its callers; it hands them to a `Reporter` and collapses
//!   them into `false`.
//! - `SysrunError`: application-level errors for configuration loading and the
//!   CLI driver. These travel inside `anyhow::Error` via the `Result<T>` alias.
//!
//! ## Examples
//!
//! ```rust
//! use sysrun::core::error::{ChildStep, RunError};
//! use nix::errno::Errno;
//!
//! let err = RunError::ChildSetup { step: ChildStep::Exec, errno: Errno::ENOENT };
//! assert_eq!(err.step(), "execv");
//! ```
//!
use nix::errno::Errno;
use std::fmt;
use thiserror::Error;

/// Setup steps performed inside the forked child before (or as) the image is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChildStep {
    /// Opening the redirect target.
    Open = 1,
    /// Duplicating the redirect descriptor onto standard output.
    Dup2 = 2,
    /// Replacing the process image.
    Exec = 3,
}

impl ChildStep {
    /// Name of the underlying system call, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ChildStep::Open => "open",
            ChildStep::Dup2 => "dup2",
            ChildStep::Exec => "execv",
        }
    }

    /// Wire tag used on the child status pipe.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ChildStep::Open),
            2 => Some(ChildStep::Dup2),
            3 => Some(ChildStep::Exec),
            _ => None,
        }
    }
}

impl fmt::Display for ChildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every way a single runner invocation can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("No command string supplied")]
    MissingCommand,

    #[error("Argument list is empty; the first element must name the executable")]
    EmptyCommand,

    #[error("Argument contains an interior NUL byte: {arg:?}")]
    InteriorNul { arg: String },

    #[error("Failed to create child status pipe: {0}")]
    StatusPipe(Errno),

    #[error("fork failed: {0}")]
    Fork(Errno),

    #[error("{step} failed in child: {errno}")]
    ChildSetup { step: ChildStep, errno: Errno },

    #[error("waitpid({pid}) failed: {errno}")]
    Wait { pid: i32, errno: Errno },
}

impl RunError {
    /// Short name of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            RunError::MissingCommand | RunError::EmptyCommand | RunError::InteriorNul { .. } => {
                "input"
            }
            RunError::StatusPipe(_) => "pipe",
            RunError::Fork(_) => "fork",
            RunError::ChildSetup { step, .. } => step.name(),
            RunError::Wait { .. } => "waitpid",
        }
    }
}

/// Application-level errors for configuration and the CLI driver.
#[derive(Error, Debug)]
pub enum SysrunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command '{command}' did not complete successfully")]
    CommandFailed { command: String },
}

/// Type alias for Result using anyhow::Error for the application layer.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = SysrunError::Config("shell must be absolute".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: shell must be absolute"
        );

        let failed = SysrunError::CommandFailed {
            command: "/bin/false".into(),
        };
        assert_eq!(
            failed.to_string(),
            "Command '/bin/false' did not complete successfully"
        );

        let exec = RunError::ChildSetup {
            step: ChildStep::Exec,
            errno: Errno::ENOENT,
        };
        assert!(exec.to_string().starts_with("execv failed in child"));
    }

    #[test]
    fn test_step_names() {
        assert_eq!(RunError::MissingCommand.step(), "input");
        assert_eq!(RunError::Fork(Errno::EAGAIN).step(), "fork");
        assert_eq!(
            RunError::Wait {
                pid: 42,
                errno: Errno::ECHILD
            }
            .step(),
            "waitpid"
        );
        assert_eq!(
            RunError::ChildSetup {
                step: ChildStep::Open,
                errno: Errno::EACCES
            }
            .step(),
            "open"
        );
    }

    #[test]
    fn test_child_step_tags() {
        for step in [ChildStep::Open, ChildStep::Dup2, ChildStep::Exec] {
            assert_eq!(ChildStep::from_tag(step.tag()), Some(step));
        }
        assert_eq!(ChildStep::from_tag(0), None);
        assert_eq!(ChildStep::from_tag(9), None);
    }
}
