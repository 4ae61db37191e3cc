//! Error types for norprog-core
//!
//! This module provides a no_std compatible error type describing every way
//! a single word program can fail, plus the closed outcome enumeration with
//! stable numeric codes for callers that need them.

use crate::io::{Address, Word};
use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Programming voltage was out of range during the operation
    VppError,
    /// The device reported a program failure
    ProgramError,
    /// The target block is protected against programming
    ProtectedBlockError,
    /// The device reported a condition that does not map to a specific error
    UnknownProgramError {
        /// Raw status word read from the device
        status: Word,
    },
    /// The device reported success but the word did not read back
    ReadBackError {
        /// Address that was programmed
        address: Address,
        /// Value that was written
        expected: Word,
        /// Value that was read back
        found: Word,
    },
    /// The device never reported ready within the timeout
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VppError => write!(f, "programming voltage (Vpp) error"),
            Self::ProgramError => write!(f, "program operation failed"),
            Self::ProtectedBlockError => write!(f, "block is protected"),
            Self::UnknownProgramError { status } => {
                write!(f, "unknown program error (status 0x{:04X})", status)
            }
            Self::ReadBackError {
                address,
                expected,
                found,
            } => write!(
                f,
                "read back failed at 0x{:08X}: expected 0x{:04X}, found 0x{:04X}",
                address, expected, found
            ),
            Self::Timeout => write!(f, "timed out waiting for device ready"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

/// Terminal outcome of a word program, including success
///
/// Discriminants are the numeric result codes reported to callers that
/// cannot consume a Rust `Result` (register dumps, log records, FFI shims).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ProgramOutcome {
    /// The word was programmed and verified
    Success = 0,
    /// See [`Error::VppError`]
    VppError = 1,
    /// See [`Error::ProgramError`]
    ProgramError = 2,
    /// See [`Error::ProtectedBlockError`]
    ProtectedBlockError = 3,
    /// See [`Error::UnknownProgramError`]
    UnknownProgramError = 4,
    /// See [`Error::ReadBackError`]
    ReadBackError = 5,
    /// See [`Error::Timeout`]
    TimeoutError = 6,
}

impl ProgramOutcome {
    /// Numeric result code
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Whether this outcome is a success
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Error> for ProgramOutcome {
    fn from(err: Error) -> Self {
        match err {
            Error::VppError => Self::VppError,
            Error::ProgramError => Self::ProgramError,
            Error::ProtectedBlockError => Self::ProtectedBlockError,
            Error::UnknownProgramError { .. } => Self::UnknownProgramError,
            Error::ReadBackError { .. } => Self::ReadBackError,
            Error::Timeout => Self::TimeoutError,
        }
    }
}

impl From<Result<()>> for ProgramOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => e.into(),
        }
    }
}

impl fmt::Display for ProgramOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::VppError => "vpp error",
            Self::ProgramError => "program error",
            Self::ProtectedBlockError => "protected block error",
            Self::UnknownProgramError => "unknown program error",
            Self::ReadBackError => "read back error",
            Self::TimeoutError => "timeout error",
        };
        write!(f, "{}", name)
    }
}
