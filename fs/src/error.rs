//! Error taxonomy of the descriptor subsystem.
//!
//! Every failure inside the fs crate is an [`FsError`]; the syscall boundary
//! turns it into exactly one [`Errno`] with [`FsError::errno`]. Errors raised by
//! an underlying file object are carried through unchanged in
//! [`FsError::Underlying`].

use core::fmt;

use fdk_abi::Errno;
use fdk_mm::UserPtrError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsError {
    /// Descriptor out of range or not open
    BadDescriptor,
    /// Operation not permitted by the handle's access mode
    AccessMode,
    /// No free descriptor slot
    TableFull,
    /// Kernel allocation failed
    NoMemory,
    /// Caller-supplied address could not be accessed
    Fault(UserPtrError),
    /// Bad whence, flags or capacity
    InvalidArgument,
    /// Underlying object cannot be repositioned
    NotSeekable,
    /// Seek would land before the start of the file
    NegativeOffset,
    /// Error reported by the underlying file object
    Underlying(Errno),
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    pub const fn errno(self) -> Errno {
        match self {
            Self::BadDescriptor | Self::AccessMode => Errno::EBADF,
            Self::TableFull => Errno::EMFILE,
            Self::NoMemory => Errno::ENOMEM,
            Self::Fault(UserPtrError::TooLong) => Errno::ENAMETOOLONG,
            Self::Fault(_) => Errno::EFAULT,
            Self::InvalidArgument | Self::NegativeOffset => Errno::EINVAL,
            Self::NotSeekable => Errno::ESPIPE,
            Self::Underlying(errno) => errno,
        }
    }
}

impl From<UserPtrError> for FsError {
    fn from(err: UserPtrError) -> Self {
        Self::Fault(err)
    }
}

impl From<Errno> for FsError {
    fn from(errno: Errno) -> Self {
        Self::Underlying(errno)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDescriptor => f.write_str("bad file descriptor"),
            Self::AccessMode => f.write_str("descriptor not open for this access"),
            Self::TableFull => f.write_str("descriptor table full"),
            Self::NoMemory => f.write_str("out of kernel memory"),
            Self::Fault(err) => write!(f, "user memory fault: {}", err),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::NotSeekable => f.write_str("object is not seekable"),
            Self::NegativeOffset => f.write_str("resulting offset is negative"),
            Self::Underlying(errno) => write!(f, "{}", errno),
        }
    }
}
