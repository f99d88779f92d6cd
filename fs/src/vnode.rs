//! The underlying file object contract.
//!
//! A vnode performs the actual storage or device I/O. Descriptor-level state
//! (offset, access mode, sharing) lives above it in [`crate::file`]; a vnode
//! only ever sees a [`Uio`] already positioned at the offset to use, and it
//! reports where the transfer ended by advancing that same `Uio`.

use fdk_abi::{Errno, S_IFCHR, S_IFDIR, S_IFREG, Stat};
use fdk_mm::Uio;

use crate::error::FsResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VnodeKind {
    Regular,
    Directory,
    CharDevice,
}

impl VnodeKind {
    /// File-type bits for `st_mode`.
    pub const fn type_bits(self) -> u32 {
        match self {
            Self::Regular => S_IFREG,
            Self::Directory => S_IFDIR,
            Self::CharDevice => S_IFCHR,
        }
    }
}

pub trait Vnode: Send + Sync {
    fn kind(&self) -> VnodeKind;

    /// Move data starting at `uio.offset()` to the caller. Reaching end of
    /// file is a short (possibly empty) transfer, not an error.
    fn read(&self, uio: &mut Uio<'_>) -> FsResult<()>;

    /// Move caller data into the object starting at `uio.offset()`.
    fn write(&self, uio: &mut Uio<'_>) -> FsResult<()>;

    fn stat(&self) -> FsResult<Stat>;

    /// Check whether `pos` is a legal position; must not change any state.
    fn try_seek(&self, pos: u64) -> FsResult<()>;

    /// Return the entry at directory position `uio.offset()` and leave the
    /// position of the next entry in `uio`. An exhausted directory yields an
    /// empty transfer.
    fn getdirentry(&self, _uio: &mut Uio<'_>) -> FsResult<()> {
        Err(Errno::ENOTDIR.into())
    }
}
