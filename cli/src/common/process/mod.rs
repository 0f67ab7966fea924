//! # Sysrun Process Runner (`common::process`)
//!
//! File: cli/src/common/process/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Three synchronous helpers for running external commands:
//!
//! - **`run_shell`**: hands a command string to the interpreter (`/bin/sh -c`).
//! - **`run_exec`**: runs an argument vector directly, with no shell expansion.
//! - **`run_exec_redirected`**: like `run_exec`, with the child's stdout sent to
//!   a file that is created or truncated first.
//!
//! Each call forks exactly one child, blocks on `waitpid` for that pid, and
//! answers `true` only when the child exited normally with status 0. Every
//! other outcome (bad input, fork failure, failed setup or exec in the child,
//! non-zero exit, death by signal, wait failure) is `false`; the reason is
//! handed to the runner's `Reporter`.
//!
//! ## Architecture
//!
//! A run moves through these states:
//!
//! ```text
//! SPAWNING -> SPAWN_FAILED
//!          -> CHILD_SETUP -> SETUP_FAILED | IMAGE_REPLACED
//!                         -> WAITING -> WAIT_FAILED | EXITED(code) | SIGNALED
//! ```
//!
//! - `argv`: converts arguments and paths to C strings before the fork.
//! - `child`: the child entry point (returns `!`), which reports setup or exec
//!   failures back over a close-on-exec pipe.
//! - `report`: the `Reporter` trait and its tracing and in-memory sinks.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sysrun::common::process::{run_exec, run_exec_redirected, run_shell};
//!
//! assert!(run_exec(&["/bin/true"]));
//! assert!(!run_exec(&["/bin/false"]));
//! assert!(run_shell("exit 0"));
//! assert!(run_exec_redirected("/tmp/out.txt", &["/bin/echo", "hi"]));
//! ```
//!
//! No timeout or cancellation is offered; a call blocks until its child ends.
//!

pub mod argv;
pub mod child;
pub mod report;

pub use argv::{path_to_cstring, ArgVector};
pub use report::{MemoryReporter, Reporter, TracingReporter};

use crate::core::config::RunnerConfig;
use crate::core::error::RunError;
use child::{ChildFailure, ChildSetup, Redirect};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, read, ForkResult, Pid};
use std::fmt;
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a reaped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(Signal),
}

impl Termination {
    /// Only a normal exit with status 0 counts as success.
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exited with status {}", code),
            Termination::Signaled(signal) => write!(f, "killed by {}", signal.as_str()),
        }
    }
}

/// A runner bound to a configuration and a diagnostics sink.
///
/// Holds no per-call state; one runner can serve any number of calls.
#[derive(Clone)]
pub struct Runner {
    config: RunnerConfig,
    reporter: Arc<dyn Reporter>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(RunnerConfig::default(), Arc::new(TracingReporter))
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub fn new(config: RunnerConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `command` through the configured interpreter as `<shell> -c <command>`.
    ///
    /// `None` is rejected without spawning anything. Interpreter start-up
    /// failure, "command not found" and a failing command are all just `false`.
    pub fn run_shell<'a>(&self, command: impl Into<Option<&'a str>>) -> bool {
        let Some(command) = command.into() else {
            self.reporter.report(&RunError::MissingCommand);
            return false;
        };
        let argv = match ArgVector::new(&[self.config.shell.as_str(), "-c", command]) {
            Ok(argv) => argv,
            Err(err) => {
                self.reporter.report(&err);
                return false;
            }
        };
        self.finish(&argv, spawn_and_wait(&argv, None))
    }

    /// Runs `command[0]` with `command` as its argument vector.
    ///
    /// `command[0]` must be a path; no PATH search and no shell expansion is done.
    pub fn run_exec<S: AsRef<str>>(&self, command: &[S]) -> bool {
        let argv = match ArgVector::new(command) {
            Ok(argv) => argv,
            Err(err) => {
                self.reporter.report(&err);
                return false;
            }
        };
        self.finish(&argv, spawn_and_wait(&argv, None))
    }

    /// Like [`Runner::run_exec`], with the child's stdout written to `output`.
    ///
    /// `output` is opened in the child (write-only, created with the configured
    /// mode, truncated) before exec. If the open fails the command never runs.
    pub fn run_exec_redirected<P: AsRef<Path>, S: AsRef<str>>(
        &self,
        output: P,
        command: &[S],
    ) -> bool {
        let prepared = ArgVector::new(command)
            .and_then(|args| Ok((args, path_to_cstring(output.as_ref())?)));
        let (argv, path) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                self.reporter.report(&err);
                return false;
            }
        };
        let redirect = Redirect {
            path: &path,
            mode: creation_mode(self.config.output_mode),
        };
        debug!(output = %output.as_ref().display(), "redirecting child stdout");
        self.finish(&argv, spawn_and_wait(&argv, Some(redirect)))
    }

    fn finish(&self, argv: &ArgVector, result: Result<Termination, RunError>) -> bool {
        match result {
            Ok(termination) if termination.success() => {
                debug!(command = %argv.display(), "command succeeded");
                true
            }
            Ok(termination) => {
                info!(command = %argv.display(), "command {}", termination);
                false
            }
            Err(err) => {
                self.reporter.report(&err);
                false
            }
        }
    }
}

/// Permission bits for a redirect target. Anything outside `0o7777` (file type
/// bits, garbage from a hand-built config) is dropped.
fn creation_mode(output_mode: u32) -> Mode {
    let masked = output_mode & 0o7777;
    if masked != output_mode {
        warn!(
            "output_mode {:#o} has bits outside 0o7777; using {:#o}",
            output_mode, masked
        );
    }
    Mode::from_bits_truncate(masked as libc::mode_t)
}

/// [`Runner::run_shell`] on a default runner.
pub fn run_shell<'a>(command: impl Into<Option<&'a str>>) -> bool {
    Runner::default().run_shell(command)
}

/// [`Runner::run_exec`] on a default runner.
pub fn run_exec<S: AsRef<str>>(command: &[S]) -> bool {
    Runner::default().run_exec(command)
}

/// [`Runner::run_exec_redirected`] on a default runner.
pub fn run_exec_redirected<P: AsRef<Path>, S: AsRef<str>>(output: P, command: &[S]) -> bool {
    Runner::default().run_exec_redirected(output, command)
}

/// Forks, runs the child setup and waits for the child.
///
/// The parent first blocks on the status pipe until it closes. In a
/// multi-threaded host, a `fork` made by another thread while the pipe is open
/// inherits its write end; if that other child never execs, this call waits
/// until that unrelated process exits too.
fn spawn_and_wait(
    argv: &ArgVector,
    redirect: Option<Redirect<'_>>,
) -> Result<Termination, RunError> {
    let (status_read, status_write) = status_pipe()?;

    // SAFETY: the child branch only calls async-signal-safe functions on
    // memory prepared before this point (see `child`).
    match unsafe { fork() } {
        Err(errno) => Err(RunError::Fork(errno)),
        Ok(ForkResult::Child) => {
            // close(2) only; frees the slot so a redirect can land on fd 1.
            drop(status_read);
            let setup = ChildSetup {
                program: argv.program(),
                argv: argv.as_ptr(),
                redirect,
                status: status_write.as_fd(),
            };
            child::run(&setup)
        }
        Ok(ForkResult::Parent { child }) => {
            drop(status_write);
            debug!(pid = child.as_raw(), command = %argv.display(), "spawned child");
            let failure = read_child_failure(status_read);
            let termination = wait_for_child(child)?;
            match failure {
                Some(ChildFailure { step, errno }) => Err(RunError::ChildSetup { step, errno }),
                None => Ok(termination),
            }
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn status_pipe() -> Result<(OwnedFd, OwnedFd), RunError> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC).map_err(RunError::StatusPipe)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn status_pipe() -> Result<(OwnedFd, OwnedFd), RunError> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};

    let (read_end, write_end) = nix::unistd::pipe().map_err(RunError::StatusPipe)?;
    for fd in [&read_end, &write_end] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
            .map_err(RunError::StatusPipe)?;
    }
    Ok((read_end, write_end))
}

/// Blocks until the child either execs (pipe closes empty) or reports a failure.
fn read_child_failure(status: OwnedFd) -> Option<ChildFailure> {
    let mut buf = [0u8; ChildFailure::ENCODED_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        match read(status.as_raw_fd(), &mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!(%errno, "could not read child status pipe");
                break;
            }
        }
    }
    ChildFailure::decode(&buf[..filled])
}

/// Reaps exactly `pid`.
///
/// An interrupted wait fails the run, but waiting continues until the child
/// is reaped so it is never left as a zombie; the `EINTR` error is returned
/// afterwards in place of the termination.
fn wait_for_child(pid: Pid) -> Result<Termination, RunError> {
    let mut interrupted = false;
    loop {
        let termination = match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => Termination::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => Termination::Signaled(signal),
            Ok(other) => {
                debug!(?other, "ignoring non-terminal wait status");
                continue;
            }
            Err(Errno::EINTR) => {
                debug!(pid = pid.as_raw(), "waitpid interrupted; still reaping");
                interrupted = true;
                continue;
            }
            Err(errno) => {
                return Err(RunError::Wait {
                    pid: pid.as_raw(),
                    errno,
                })
            }
        };
        if interrupted {
            debug!(pid = pid.as_raw(), %termination, "reaped after interrupted wait");
            return Err(RunError::Wait {
                pid: pid.as_raw(),
                errno: Errno::EINTR,
            });
        }
        return Ok(termination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::kill;

    #[test]
    fn test_only_exit_zero_is_success() {
        assert!(Termination::Exited(0).success());
        assert!(!Termination::Exited(1).success());
        assert!(!Termination::Exited(255).success());
        assert!(!Termination::Signaled(Signal::SIGKILL).success());
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Exited(3).to_string(), "exited with status 3");
        assert_eq!(
            Termination::Signaled(Signal::SIGTERM).to_string(),
            "killed by SIGTERM"
        );
    }

    #[test]
    fn test_wait_for_child_returns_exit_status() {
        match unsafe { fork() } {
            Ok(ForkResult::Child) => unsafe { libc::_exit(42) },
            Ok(ForkResult::Parent { child }) => {
                assert_eq!(wait_for_child(child).unwrap(), Termination::Exited(42));
            }
            Err(e) => panic!("fork failed: {}", e),
        }
    }

    #[test]
    fn test_wait_for_child_reports_signal() {
        match unsafe { fork() } {
            Ok(ForkResult::Child) => loop {
                unsafe { libc::pause() };
            },
            Ok(ForkResult::Parent { child }) => {
                kill(child, Signal::SIGKILL).unwrap();
                assert_eq!(
                    wait_for_child(child).unwrap(),
                    Termination::Signaled(Signal::SIGKILL)
                );
            }
            Err(e) => panic!("fork failed: {}", e),
        }
    }

    #[test]
    fn test_wait_for_foreign_pid_fails() {
        // init is never our child.
        let err = wait_for_child(Pid::from_raw(1)).unwrap_err();
        assert_eq!(err.step(), "waitpid");
    }

    #[test]
    fn test_creation_mode_masks_extra_bits() {
        assert_eq!(creation_mode(0o644), Mode::from_bits_truncate(0o644));
        assert_eq!(creation_mode(0o100600), Mode::from_bits_truncate(0o600));
        assert_eq!(creation_mode(0o4755), Mode::from_bits_truncate(0o4755));
    }

    #[test]
    fn test_status_pipe_reports_nothing_on_exec() {
        let argv = ArgVector::new(&["/bin/true"]).unwrap();
        assert_eq!(spawn_and_wait(&argv, None), Ok(Termination::Exited(0)));
    }

    #[test]
    fn test_exec_failure_travels_back() {
        let argv = ArgVector::new(&["/nonexistent/sysrun-test-binary"]).unwrap();
        assert_eq!(
            spawn_and_wait(&argv, None),
            Err(RunError::ChildSetup {
                step: crate::core::error::ChildStep::Exec,
                errno: Errno::ENOENT,
            })
        );
    }

    #[test]
    fn test_missing_shell_command_is_rejected() {
        let reporter = Arc::new(MemoryReporter::new());
        let runner = Runner::default().with_reporter(reporter.clone());
        assert!(!runner.run_shell(None));
        assert_eq!(reporter.errors(), vec![RunError::MissingCommand]);
    }

    #[test]
    fn test_configured_shell_is_used() {
        let reporter = Arc::new(MemoryReporter::new());
        let runner = Runner::default()
            .with_reporter(reporter.clone())
            .with_config(RunnerConfig {
                shell: "/nonexistent/shell".into(),
                ..Default::default()
            });
        assert!(!runner.run_shell("true"));
        assert_eq!(reporter.errors()[0].step(), "execv");
    }
}
