//! Program loading support. Only argument marshaling lives here; mapping the
//! program image is left to the loader that calls into it.

pub mod argv;

use core::fmt;

use fdk_abi::Errno;
use fdk_mm::UserPtrError;

pub use argv::{ArgvImage, copy_in_argv, stage_args};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// Too many arguments, or their total size exceeds `ARG_MAX`
    TooManyArgs,
    /// An argument pointer or the stack range is not valid user memory
    Fault(UserPtrError),
    NoMem,
}

impl ExecError {
    pub const fn errno(self) -> Errno {
        match self {
            Self::TooManyArgs => Errno::E2BIG,
            Self::Fault(_) => Errno::EFAULT,
            Self::NoMem => Errno::ENOMEM,
        }
    }
}

impl From<UserPtrError> for ExecError {
    fn from(err: UserPtrError) -> Self {
        Self::Fault(err)
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyArgs => f.write_str("argument list too long"),
            Self::Fault(err) => write!(f, "bad argument pointer: {}", err),
            Self::NoMem => f.write_str("out of memory for arguments"),
        }
    }
}
