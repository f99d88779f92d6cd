use fdk_abi::Errno;
use fdk_fs::{Fd, FsResult};

use crate::syscall::context::SyscallContext;

/// What a syscall hands back to userland: a value and an error number.
///
/// On success `errno` is 0. On failure `retval` is -1 and `errno` says why.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyscallReturn {
    pub retval: i64,
    pub errno: i32,
}

impl SyscallReturn {
    #[inline]
    pub const fn ok(value: u64) -> Self {
        Self {
            retval: value as i64,
            errno: 0,
        }
    }

    #[inline]
    pub const fn err(errno: Errno) -> Self {
        Self {
            retval: -1,
            errno: errno.as_i32(),
        }
    }

    pub fn from_result(result: SyscallResult) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::err(err.errno()),
        }
    }

    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.errno == 0
    }
}

/// Result of a handler body before conversion to [`SyscallReturn`].
pub type SyscallResult = FsResult<u64>;

pub type SyscallHandler = fn(&SyscallContext<'_>) -> SyscallReturn;

#[derive(Copy, Clone)]
pub struct SyscallEntry {
    pub handler: Option<SyscallHandler>,
    pub name: &'static str,
}

impl SyscallEntry {
    pub const EMPTY: Self = Self {
        handler: None,
        name: "",
    };
}

/// Descriptor argument from a raw register. Values that do not fit an `i32`
/// are passed on as -1 so they fail descriptor validation.
#[inline]
pub fn fd_arg(raw: u64) -> Fd {
    Fd::try_from(raw as i64).unwrap_or(-1)
}

#[cfg(feature = "syscall-trace")]
pub fn trace_return(name: &str, ctx: &SyscallContext<'_>, ret: &SyscallReturn) {
    fdk_lib::klog_trace!(
        "SYSCALL: pid {} {} -> {} (errno {})",
        ctx.process().pid(),
        name,
        ret.retval,
        ret.errno
    );
}
