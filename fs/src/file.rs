//! File Object Handle.
//!
//! An [`OpenFile`] binds one opened vnode to an access mode and a byte offset.
//! Descriptor-table slots never own an `OpenFile` directly; they hold a
//! [`FileHandle`], a counted reference to it. Duplicated descriptors and
//! descriptors inherited across fork hold handles to the same `OpenFile` and
//! therefore share its offset. The vnode is handed back to its [`Vfs`] exactly
//! once, when the last handle is released.
//!
//! Lock ordering: a descriptor table lock may be held while acquiring a handle
//! reference, but never while a handle's offset lock is held.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;
use spin::Mutex;

use fdk_abi::{
    O_ACCMODE, O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_VALID_MASK, O_WRONLY,
    SEEK_CUR, SEEK_END, SEEK_SET, Stat,
};
use fdk_lib::klog_debug;
use fdk_mm::Uio;

use crate::error::{FsError, FsResult};
use crate::vfs::Vfs;
use crate::vnode::Vnode;

bitflags! {
    /// Flags accepted by `open`. The access mode occupies the low two bits
    /// and is read with [`OpenFlags::access_mode`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const WRONLY = O_WRONLY;
        const RDWR = O_RDWR;
        const CREAT = O_CREAT;
        const EXCL = O_EXCL;
        const TRUNC = O_TRUNC;
        const APPEND = O_APPEND;
    }
}

impl OpenFlags {
    /// Validate raw flags from userland.
    pub fn from_raw(raw: u32) -> FsResult<Self> {
        if raw & !O_VALID_MASK != 0 || raw & O_ACCMODE == O_ACCMODE {
            return Err(FsError::InvalidArgument);
        }
        Ok(Self::from_bits_retain(raw))
    }

    pub fn access_mode(self) -> AccessMode {
        match self.bits() & O_ACCMODE {
            O_RDONLY => AccessMode::ReadOnly,
            O_WRONLY => AccessMode::WriteOnly,
            _ => AccessMode::ReadWrite,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    #[inline]
    pub const fn readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    #[inline]
    pub const fn writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

pub struct OpenFile {
    vnode: Arc<dyn Vnode>,
    owner: Option<Arc<dyn Vfs>>,
    mode: AccessMode,
    append: bool,
    path: Vec<u8>,
    offset: Mutex<u64>,
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        klog_debug!(
            "fs: releasing open file {}",
            core::str::from_utf8(&self.path).unwrap_or("<non-utf8>")
        );
        if let Some(vfs) = self.owner.take() {
            vfs.close(Arc::clone(&self.vnode));
        }
    }
}

/// Counted reference to an [`OpenFile`].
pub struct FileHandle(Arc<OpenFile>);

impl FileHandle {
    /// Open `path` (absolute, normalized) through `vfs`.
    pub fn open(vfs: &Arc<dyn Vfs>, path: &[u8], flags: OpenFlags, mode: u32) -> FsResult<Self> {
        let mut name = Vec::new();
        name.try_reserve_exact(path.len())
            .map_err(|_| FsError::NoMemory)?;
        name.extend_from_slice(path);
        let vnode = vfs.open(path, flags, mode)?;
        Ok(Self(Arc::new(OpenFile {
            vnode,
            owner: Some(Arc::clone(vfs)),
            mode: flags.access_mode(),
            append: flags.contains(OpenFlags::APPEND),
            path: name,
            offset: Mutex::new(0),
        })))
    }

    /// Wrap a vnode that was not obtained from a [`Vfs`], such as a device
    /// owned by the kernel. Releasing the last handle does not close it.
    pub fn from_vnode(vnode: Arc<dyn Vnode>, mode: AccessMode, name: &[u8]) -> Self {
        Self(Arc::new(OpenFile {
            vnode,
            owner: None,
            mode,
            append: false,
            path: name.to_vec(),
            offset: Mutex::new(0),
        }))
    }

    /// Take another reference to the same open file.
    #[inline]
    pub fn acquire(&self) -> Self {
        Self(Arc::clone(&self.0))
    }

    /// Drop this reference. Returns `true` when it was the last one and the
    /// underlying file has been released.
    pub fn release(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    #[inline]
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether two handles reference the same open file.
    #[inline]
    pub fn same_file(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn mode(&self) -> AccessMode {
        self.0.mode
    }

    #[inline]
    pub fn path(&self) -> &[u8] {
        &self.0.path
    }

    #[inline]
    pub fn vnode(&self) -> &Arc<dyn Vnode> {
        &self.0.vnode
    }

    pub fn offset(&self) -> u64 {
        *self.0.offset.lock()
    }

    /// Read at the current offset and advance it by the bytes transferred.
    pub fn read(&self, uio: &mut Uio<'_>) -> FsResult<usize> {
        if !self.0.mode.readable() {
            return Err(FsError::AccessMode);
        }
        let mut offset = self.0.offset.lock();
        uio.set_offset(*offset);
        self.0.vnode.read(uio)?;
        *offset = uio.offset();
        Ok(uio.transferred())
    }

    /// Write at the current offset (or at end of file for append handles)
    /// and advance it by the bytes transferred.
    pub fn write(&self, uio: &mut Uio<'_>) -> FsResult<usize> {
        if !self.0.mode.writable() {
            return Err(FsError::AccessMode);
        }
        let mut offset = self.0.offset.lock();
        let start = if self.0.append {
            stat_size(&self.0.vnode.stat()?)
        } else {
            *offset
        };
        uio.set_offset(start);
        self.0.vnode.write(uio)?;
        *offset = uio.offset();
        Ok(uio.transferred())
    }

    /// Reposition the offset. On any failure the stored offset is unchanged.
    pub fn seek(&self, delta: i64, whence: u32) -> FsResult<u64> {
        let mut offset = self.0.offset.lock();
        let base = match whence {
            SEEK_SET => 0,
            SEEK_CUR => i64::try_from(*offset).map_err(|_| FsError::InvalidArgument)?,
            SEEK_END => self.0.vnode.stat()?.st_size,
            _ => return Err(FsError::InvalidArgument),
        };
        let target = base.checked_add(delta).ok_or(FsError::InvalidArgument)?;
        if target < 0 {
            return Err(FsError::NegativeOffset);
        }
        let target = target as u64;
        self.0.vnode.try_seek(target)?;
        *offset = target;
        Ok(target)
    }

    pub fn stat(&self) -> FsResult<Stat> {
        let _offset = self.0.offset.lock();
        self.0.vnode.stat()
    }

    /// Fetch the directory entry at the current offset and advance it.
    pub fn getdirentry(&self, uio: &mut Uio<'_>) -> FsResult<usize> {
        if !self.0.mode.readable() {
            return Err(FsError::AccessMode);
        }
        let mut offset = self.0.offset.lock();
        uio.set_offset(*offset);
        self.0.vnode.getdirentry(uio)?;
        *offset = uio.offset();
        Ok(uio.transferred())
    }
}

fn stat_size(stat: &Stat) -> u64 {
    u64::try_from(stat.st_size).unwrap_or(0)
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &core::str::from_utf8(&self.0.path).unwrap_or("<non-utf8>"))
            .field("mode", &self.0.mode)
            .field("refs", &self.refcount())
            .finish()
    }
}
