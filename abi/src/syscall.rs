//! Syscall numbers and the kernel-to-user return convention.

pub const SYSCALL_OPEN: u64 = 45;
pub const SYSCALL_DUP: u64 = 47;
pub const SYSCALL_DUP2: u64 = 48;
pub const SYSCALL_CLOSE: u64 = 49;
pub const SYSCALL_READ: u64 = 50;
pub const SYSCALL_GETDIRENTRY: u64 = 54;
pub const SYSCALL_WRITE: u64 = 55;
pub const SYSCALL_LSEEK: u64 = 59;
pub const SYSCALL_FSTAT: u64 = 63;
pub const SYSCALL_CHDIR: u64 = 74;
pub const SYSCALL_GETCWD: u64 = 76;

/// Size of the dispatch table; every syscall number is below this.
pub const SYSCALL_TABLE_SIZE: usize = 128;
