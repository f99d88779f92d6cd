//! User/kernel memory boundary for the file descriptor subsystem.
//!
//! Nothing outside this crate touches caller-supplied addresses. Syscall code
//! wraps raw register values in [`user_ptr`] types, moves bytes with the
//! [`user_copy`] primitives or a [`uio::Uio`] transfer descriptor, and the
//! address space itself is reached only through the [`user_copy::UserMemory`]
//! contract.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod memory_layout_defs;
pub mod uio;
pub mod user_arena;
pub mod user_copy;
pub mod user_ptr;

pub use uio::{Uio, UioRw};
pub use user_arena::UserArena;
pub use user_copy::{
    UserMemory, copy_bytes_from_user, copy_bytes_to_user, copy_in_string, copy_in_u64,
};
pub use user_ptr::{UserBytes, UserPtr, UserPtrError, UserSlice, UserVirtAddr};
