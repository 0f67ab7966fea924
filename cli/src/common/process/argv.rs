//! Native argument vectors.
//!
//! Everything the child needs is converted to C strings here, in the parent,
//! before `fork`. The child then only touches raw pointers into memory that
//! was allocated ahead of time.

use crate::core::error::RunError;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

/// A null-terminated `argv` array plus the strings it points into.
#[derive(Debug)]
pub struct ArgVector {
    // The pointers in `ptrs` borrow these buffers; CString contents stay put
    // when the Vec itself moves.
    args: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl ArgVector {
    /// Builds the vector. Fails on an empty list or an argument with an interior NUL.
    pub fn new<S: AsRef<str>>(command: &[S]) -> Result<Self, RunError> {
        if command.is_empty() {
            return Err(RunError::EmptyCommand);
        }
        let args = command
            .iter()
            .map(|arg| {
                CString::new(arg.as_ref()).map_err(|_| RunError::InteriorNul {
                    arg: arg.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut ptrs: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        ptrs.push(ptr::null());

        Ok(Self { args, ptrs })
    }

    /// The executable path (element 0).
    pub fn program(&self) -> &CStr {
        &self.args[0]
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Pointer suitable for the `argv` parameter of `execv`.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    /// Lossy rendering for log messages.
    pub fn display(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Converts a filesystem path to a C string ahead of the fork.
pub fn path_to_cstring(path: &Path) -> Result<CString, RunError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| RunError::InteriorNul {
        arg: path.display().to_string(),
    })
}
