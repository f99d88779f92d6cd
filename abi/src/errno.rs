//! Kernel error numbers reported to userland.
//!
//! A failing syscall returns -1 and leaves one of these in the errno slot of
//! the syscall return. The numbering is part of the ABI and must not change.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Errno {
    /// Function not implemented
    ENOSYS = 1,
    /// Out of memory
    ENOMEM = 3,
    /// Operation would block
    EAGAIN = 4,
    /// Interrupted system call
    EINTR = 5,
    /// Bad memory reference
    EFAULT = 6,
    /// String too long
    ENAMETOOLONG = 7,
    /// Invalid argument
    EINVAL = 8,
    /// Operation not permitted
    EPERM = 9,
    /// Permission denied
    EACCES = 10,
    /// Argument list too long
    E2BIG = 14,
    /// Not a directory
    ENOTDIR = 17,
    /// Is a directory
    EISDIR = 18,
    /// No such file or directory
    ENOENT = 19,
    /// Directory not empty
    ENOTEMPTY = 21,
    /// File or object exists
    EEXIST = 22,
    /// No such device
    ENODEV = 25,
    /// Too many open files
    EMFILE = 28,
    /// Too many open files in system
    ENFILE = 29,
    /// Bad file number
    EBADF = 30,
    /// Input/output error
    EIO = 32,
    /// Illegal seek
    ESPIPE = 33,
    /// Read-only file system
    EROFS = 35,
    /// No space left on device
    ENOSPC = 36,
    /// File too large
    EFBIG = 38,
}

impl Errno {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ENOSYS => "function not implemented",
            Self::ENOMEM => "out of memory",
            Self::EAGAIN => "operation would block",
            Self::EINTR => "interrupted system call",
            Self::EFAULT => "bad memory reference",
            Self::ENAMETOOLONG => "string too long",
            Self::EINVAL => "invalid argument",
            Self::EPERM => "operation not permitted",
            Self::EACCES => "permission denied",
            Self::E2BIG => "argument list too long",
            Self::ENOTDIR => "not a directory",
            Self::EISDIR => "is a directory",
            Self::ENOENT => "no such file or directory",
            Self::ENOTEMPTY => "directory not empty",
            Self::EEXIST => "file or object exists",
            Self::ENODEV => "no such device",
            Self::EMFILE => "too many open files",
            Self::ENFILE => "too many open files in system",
            Self::EBADF => "bad file number",
            Self::EIO => "input/output error",
            Self::ESPIPE => "illegal seek",
            Self::EROFS => "read-only file system",
            Self::ENOSPC => "no space left on device",
            Self::EFBIG => "file too large",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (errno {})", self.description(), self.as_i32())
    }
}
