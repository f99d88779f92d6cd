//! In-memory filesystem.
//!
//! A tree of [`RamNode`]s keyed by inode number. Regular files keep their
//! contents in a growable buffer; directories keep a name-ordered child map,
//! which also gives `getdirentry` its positions: entry `n` in name order is at
//! directory offset `n`.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use spin::Mutex;

use fdk_abi::{Errno, Stat};
use fdk_mm::Uio;

use crate::error::{FsError, FsResult};
use crate::file::OpenFlags;
use crate::path::{self, split_last};
use crate::vfs::Vfs;
use crate::vnode::{Vnode, VnodeKind};

/// Largest regular file the filesystem will grow.
pub const RAMFS_MAX_FILE_SIZE: usize = 1 << 20;

/// Device number reported in `st_dev`.
pub const RAMFS_DEV: u32 = 0x0101;

const ROOT_INO: u64 = 1;

pub struct RamNode {
    ino: u64,
    kind: VnodeKind,
    perm: u32,
    data: Mutex<Vec<u8>>,
    children: Mutex<BTreeMap<Vec<u8>, u64>>,
    opens: AtomicUsize,
}

impl RamNode {
    fn new(ino: u64, kind: VnodeKind, perm: u32) -> Self {
        Self {
            ino,
            kind,
            perm: perm & 0o777,
            data: Mutex::new(Vec::new()),
            children: Mutex::new(BTreeMap::new()),
            opens: AtomicUsize::new(0),
        }
    }

    fn is_dir(&self) -> bool {
        self.kind == VnodeKind::Directory
    }
}

impl Vnode for RamNode {
    fn kind(&self) -> VnodeKind {
        self.kind
    }

    fn read(&self, uio: &mut Uio<'_>) -> FsResult<()> {
        if self.is_dir() {
            return Err(Errno::EISDIR.into());
        }
        let data = self.data.lock();
        let Ok(pos) = usize::try_from(uio.offset()) else {
            return Ok(());
        };
        if pos < data.len() {
            uio.move_out(&data[pos..])?;
        }
        Ok(())
    }

    fn write(&self, uio: &mut Uio<'_>) -> FsResult<()> {
        if self.is_dir() {
            return Err(Errno::EISDIR.into());
        }
        let pos = usize::try_from(uio.offset()).map_err(|_| Errno::EFBIG)?;
        let end = pos.checked_add(uio.resid()).ok_or(Errno::EFBIG)?;
        if end > RAMFS_MAX_FILE_SIZE {
            return Err(Errno::EFBIG.into());
        }
        let mut incoming = vec![0u8; uio.resid()];
        let n = uio.move_in(&mut incoming)?;
        let mut data = self.data.lock();
        if data.len() < pos + n {
            data.resize(pos + n, 0);
        }
        data[pos..pos + n].copy_from_slice(&incoming[..n]);
        Ok(())
    }

    fn stat(&self) -> FsResult<Stat> {
        let size = if self.is_dir() {
            self.children.lock().len()
        } else {
            self.data.lock().len()
        };
        Ok(Stat {
            st_size: size as i64,
            st_mode: self.kind.type_bits() | self.perm,
            st_nlink: if self.is_dir() { 2 } else { 1 },
            st_blocks: (size as u64).div_ceil(512),
            st_dev: RAMFS_DEV,
            st_rdev: 0,
            st_ino: self.ino,
        })
    }

    fn try_seek(&self, _pos: u64) -> FsResult<()> {
        Ok(())
    }

    fn getdirentry(&self, uio: &mut Uio<'_>) -> FsResult<()> {
        if !self.is_dir() {
            return Err(Errno::ENOTDIR.into());
        }
        let index = uio.offset();
        let children = self.children.lock();
        let Some(name) = usize::try_from(index)
            .ok()
            .and_then(|i| children.keys().nth(i))
        else {
            return Ok(());
        };
        uio.move_out(name)?;
        uio.set_offset(index + 1);
        Ok(())
    }
}

pub struct RamFs {
    nodes: Mutex<BTreeMap<u64, Arc<RamNode>>>,
    next_ino: AtomicU64,
}

impl RamFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            ROOT_INO,
            Arc::new(RamNode::new(ROOT_INO, VnodeKind::Directory, 0o755)),
        );
        Self {
            nodes: Mutex::new(nodes),
            next_ino: AtomicU64::new(ROOT_INO + 1),
        }
    }

    fn walk(nodes: &BTreeMap<u64, Arc<RamNode>>, path: &[u8]) -> FsResult<Arc<RamNode>> {
        let mut node = nodes.get(&ROOT_INO).cloned().ok_or(Errno::EIO)?;
        for comp in path::components(path) {
            if !node.is_dir() {
                return Err(Errno::ENOTDIR.into());
            }
            let ino = node
                .children
                .lock()
                .get(comp)
                .copied()
                .ok_or(Errno::ENOENT)?;
            node = nodes.get(&ino).cloned().ok_or(Errno::EIO)?;
        }
        Ok(node)
    }

    fn lookup(&self, path: &[u8]) -> FsResult<Arc<RamNode>> {
        let path = path::resolve(b"/", path)?;
        Self::walk(&self.nodes.lock(), &path)
    }

    /// Create the node at `path` inside an existing directory. Callers hold
    /// the node map.
    fn create(
        &self,
        nodes: &mut BTreeMap<u64, Arc<RamNode>>,
        path: &[u8],
        kind: VnodeKind,
        perm: u32,
    ) -> FsResult<Arc<RamNode>> {
        let (parent, name) = split_last(path).ok_or(Errno::EEXIST)?;
        let dir = Self::walk(nodes, parent)?;
        if !dir.is_dir() {
            return Err(Errno::ENOTDIR.into());
        }
        let mut children = dir.children.lock();
        if children.contains_key(name) {
            return Err(Errno::EEXIST.into());
        }
        let ino = self.next_ino.fetch_add(1, Ordering::Relaxed);
        let node = Arc::new(RamNode::new(ino, kind, perm));
        children.insert(name.to_vec(), ino);
        nodes.insert(ino, Arc::clone(&node));
        Ok(node)
    }

    pub fn mkdir(&self, path: &[u8]) -> FsResult<()> {
        let path = path::resolve(b"/", path)?;
        let mut nodes = self.nodes.lock();
        self.create(&mut nodes, &path, VnodeKind::Directory, 0o755)?;
        Ok(())
    }

    /// Create or replace a regular file's contents.
    pub fn write_file(&self, path: &[u8], contents: &[u8]) -> FsResult<()> {
        let path = path::resolve(b"/", path)?;
        let mut nodes = self.nodes.lock();
        let node = match Self::walk(&nodes, &path) {
            Ok(node) => node,
            Err(_) => self.create(&mut nodes, &path, VnodeKind::Regular, 0o644)?,
        };
        if node.is_dir() {
            return Err(Errno::EISDIR.into());
        }
        *node.data.lock() = contents.to_vec();
        Ok(())
    }

    pub fn read_file(&self, path: &[u8]) -> FsResult<Vec<u8>> {
        let node = self.lookup(path)?;
        if node.is_dir() {
            return Err(Errno::EISDIR.into());
        }
        let data = node.data.lock().clone();
        Ok(data)
    }

    /// How many opens of `path` have not been closed yet.
    pub fn open_count(&self, path: &[u8]) -> FsResult<usize> {
        Ok(self.lookup(path)?.opens.load(Ordering::Acquire))
    }
}

impl Default for RamFs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs for RamFs {
    fn open(&self, path: &[u8], flags: OpenFlags, mode: u32) -> FsResult<Arc<dyn Vnode>> {
        let path = path::resolve(b"/", path)?;
        let writable = flags.access_mode().writable();
        let mut nodes = self.nodes.lock();
        let node = match Self::walk(&nodes, &path) {
            Ok(_) if flags.contains(OpenFlags::CREAT | OpenFlags::EXCL) => {
                return Err(Errno::EEXIST.into());
            }
            Ok(node) => node,
            Err(FsError::Underlying(Errno::ENOENT)) if flags.contains(OpenFlags::CREAT) => {
                self.create(&mut nodes, &path, VnodeKind::Regular, mode)?
            }
            Err(e) => return Err(e),
        };
        if node.is_dir() && writable {
            return Err(Errno::EISDIR.into());
        }
        if writable && flags.contains(OpenFlags::TRUNC) {
            node.data.lock().clear();
        }
        node.opens.fetch_add(1, Ordering::AcqRel);
        let vnode: Arc<dyn Vnode> = node;
        Ok(vnode)
    }

    fn close(&self, vnode: Arc<dyn Vnode>) {
        let Ok(stat) = vnode.stat() else {
            return;
        };
        if let Some(node) = self.nodes.lock().get(&stat.st_ino) {
            let _ = node
                .opens
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        }
    }

    fn lookup_dir(&self, path: &[u8]) -> FsResult<()> {
        if self.lookup(path)?.is_dir() {
            Ok(())
        } else {
            Err(Errno::ENOTDIR.into())
        }
    }
}
