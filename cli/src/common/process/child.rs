//! The forked child's side of a run.
//!
//! After `fork` in a possibly multi-threaded parent, the child may only call
//! async-signal-safe functions until it execs. Nothing in this module
//! allocates, formats, locks or logs. Failures travel back to the parent as
//! five bytes on a close-on-exec status pipe (step tag + native-endian errno)
//! and are echoed to the inherited stderr with raw `write` calls.

use crate::core::error::ChildStep;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2, write};
use std::ffi::CStr;
use std::os::fd::{BorrowedFd, RawFd};

/// Redirect target, prepared before the fork.
#[derive(Debug, Clone, Copy)]
pub struct Redirect<'a> {
    pub path: &'a CStr,
    pub mode: Mode,
}

/// Everything the child branch needs; borrowed from the parent's pre-fork state.
pub struct ChildSetup<'a> {
    pub program: &'a CStr,
    pub argv: *const *const libc::c_char,
    pub redirect: Option<Redirect<'a>>,
    pub status: BorrowedFd<'a>,
}

/// A child-side failure as decoded by the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildFailure {
    pub step: ChildStep,
    pub errno: Errno,
}

impl ChildFailure {
    pub const ENCODED_LEN: usize = 5;

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        buf[0] = self.step.tag();
        buf[1..].copy_from_slice(&(self.errno as i32).to_ne_bytes());
        buf
    }

    /// Returns `None` for anything other than one complete, well-formed record.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != Self::ENCODED_LEN {
            return None;
        }
        let step = ChildStep::from_tag(buf[0])?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&buf[1..]);
        Some(Self {
            step,
            errno: Errno::from_raw(i32::from_ne_bytes(raw)),
        })
    }
}

/// Child entry point: set up stdout if asked, then replace the image.
///
/// Never returns. Either `execv` succeeds or the process exits with
/// `EXIT_FAILURE`.
pub fn run(setup: &ChildSetup<'_>) -> ! {
    if let Some(redirect) = setup.redirect {
        let fd = match open(
            redirect.path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            redirect.mode,
        ) {
            Ok(fd) => fd,
            Err(errno) => fail(setup.status, ChildStep::Open, errno),
        };
        redirect_stdout(setup.status, fd);
    }

    // SAFETY: `program` and `argv` point into a live ArgVector owned by the
    // parent frame that forked us; argv is null-terminated.
    unsafe { libc::execv(setup.program.as_ptr(), setup.argv) };
    fail(setup.status, ChildStep::Exec, Errno::last())
}

fn redirect_stdout(status: BorrowedFd<'_>, fd: RawFd) {
    if fd == libc::STDOUT_FILENO {
        // stdout was closed and open() reused its slot; already in place.
        return;
    }
    if let Err(errno) = dup2(fd, libc::STDOUT_FILENO) {
        let _ = close(fd);
        fail(status, ChildStep::Dup2, errno);
    }
    let _ = close(fd);
}

fn fail(status: BorrowedFd<'_>, step: ChildStep, errno: Errno) -> ! {
    let record = ChildFailure { step, errno }.encode();
    let _ = write(status, &record);

    // SAFETY: STDERR_FILENO is valid for the lifetime of the process, even if
    // closed (write then just fails).
    let stderr = unsafe { BorrowedFd::borrow_raw(libc::STDERR_FILENO) };
    for part in [
        "sysrun: ",
        step.name(),
        " failed: ",
        errno.desc(),
        "\n",
    ] {
        let _ = write(stderr, part.as_bytes());
    }

    // SAFETY: _exit skips atexit handlers and stdio flushing, which would run
    // the parent's cleanup a second time.
    unsafe { libc::_exit(libc::EXIT_FAILURE) }
}
