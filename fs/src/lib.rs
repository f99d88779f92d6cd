//! Open files and per-process descriptor tables.
//!
//! [`file::FileHandle`] is the shared, reference-counted open file with its
//! offset lock; [`fdtable::FdTable`] maps descriptor numbers to handles and
//! implements dup, dup2 and fork-time replication. The storage below is
//! reached only through the [`vnode::Vnode`] and [`vfs::Vfs`] contracts, with
//! [`ramfs::RamFs`] and [`console::ConsoleDevice`] as in-tree providers.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod console;
pub mod error;
pub mod fdtable;
pub mod file;
pub mod path;
pub mod ramfs;
pub mod vfs;
pub mod vnode;

pub use console::{Console, ConsoleDevice};
pub use error::{FsError, FsResult};
pub use fdtable::{Fd, FdTable, SlotReservation};
pub use file::{AccessMode, FileHandle, OpenFlags};
pub use ramfs::RamFs;
pub use vfs::Vfs;
pub use vnode::{Vnode, VnodeKind};
