//! Kernel-userland ABI types for the file descriptor subsystem.
//!
//! This crate is the single source of truth for every value that crosses the
//! syscall boundary: error numbers, open flags, whence values, syscall
//! numbers, limits and the `stat` record layout. Kernel crates and user
//! programs both depend on it, so nothing here may pull in kernel state.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod addr;
pub mod errno;
pub mod fcntl;
pub mod limits;
pub mod stat;
pub mod syscall;

pub use addr::VirtAddr;
pub use errno::Errno;
pub use fcntl::*;
pub use limits::*;
pub use stat::{S_IFCHR, S_IFDIR, S_IFMT, S_IFREG, Stat};
pub use syscall::*;
