//! Name-space side of the underlying file object contract.

use alloc::sync::Arc;

use crate::error::FsResult;
use crate::file::OpenFlags;
use crate::vnode::Vnode;

pub trait Vfs: Send + Sync {
    /// Resolve an absolute, normalized path to an opened vnode.
    ///
    /// Every successful call is paired with exactly one later [`Vfs::close`]
    /// of the returned vnode.
    fn open(&self, path: &[u8], flags: OpenFlags, mode: u32) -> FsResult<Arc<dyn Vnode>>;

    /// Release one reference taken by [`Vfs::open`].
    fn close(&self, vnode: Arc<dyn Vnode>);

    /// Check that `path` names a directory.
    fn lookup_dir(&self, path: &[u8]) -> FsResult<()>;
}
