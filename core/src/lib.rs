//! Process context and the file syscall surface.
//!
//! A [`process::Process`] owns one descriptor table and a current directory.
//! Syscalls arrive through [`syscall::syscall_dispatch`] with a
//! [`syscall::SyscallContext`] naming the calling process and its address
//! space; handlers reach user memory only through that context.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod exec;
pub mod process;
#[macro_use]
pub mod syscall;

pub use process::{Pid, Process};
pub use syscall::{SyscallArgs, SyscallContext, SyscallReturn, syscall_dispatch};
