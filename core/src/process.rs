//! Process context as seen by the file syscalls.
//!
//! Scheduling, address spaces and pid allocation live elsewhere; a process
//! here is its descriptor table, its current directory and the filesystem it
//! resolves paths in.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use fdk_fs::path;
use fdk_fs::{Console, Fd, FdTable, FileHandle, FsResult, OpenFlags, Vfs};
use fdk_lib::{klog_debug, klog_info};

pub type Pid = u32;

pub struct Process {
    pid: Pid,
    fd_table: FdTable,
    cwd: Mutex<Vec<u8>>,
    vfs: Arc<dyn Vfs>,
}

impl Process {
    /// Create a first process with console descriptors 0-2 and `/` as its
    /// current directory.
    pub fn spawn(pid: Pid, vfs: Arc<dyn Vfs>, console: &Console) -> FsResult<Self> {
        let fd_table = FdTable::new()?;
        console.bootstrap(&fd_table)?;
        klog_info!("process {}: spawned", pid);
        Ok(Self {
            pid,
            fd_table,
            cwd: Mutex::new(b"/".to_vec()),
            vfs,
        })
    }

    /// Create the child side of a fork. Open descriptors are shared with
    /// this process; the current directory is copied.
    pub fn fork(&self, child_pid: Pid) -> FsResult<Self> {
        let fd_table = self.fd_table.replicate()?;
        let cwd = self.cwd();
        klog_debug!(
            "process {}: forked child {} with {} descriptors",
            self.pid,
            child_pid,
            fd_table.open_count()
        );
        Ok(Self {
            pid: child_pid,
            fd_table,
            cwd: Mutex::new(cwd),
            vfs: Arc::clone(&self.vfs),
        })
    }

    /// Close every descriptor. Returns how many were open.
    pub fn exit(&self) -> usize {
        let closed = self.fd_table.close_all();
        klog_debug!("process {}: exit closed {} descriptors", self.pid, closed);
        closed
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn fd_table(&self) -> &FdTable {
        &self.fd_table
    }

    #[inline]
    pub fn vfs(&self) -> &Arc<dyn Vfs> {
        &self.vfs
    }

    pub fn cwd(&self) -> Vec<u8> {
        self.cwd.lock().clone()
    }

    /// Absolute, normalized form of `path` relative to the current directory.
    pub fn resolve(&self, path: &[u8]) -> FsResult<Vec<u8>> {
        let cwd = self.cwd.lock();
        path::resolve(&cwd, path)
    }

    /// Open `path` into the lowest free descriptor.
    pub fn open(&self, path: &[u8], flags: u32, mode: u32) -> FsResult<Fd> {
        let flags = OpenFlags::from_raw(flags)?;
        let slot = self.fd_table.allocate_slot()?;
        let path = self.resolve(path)?;
        let handle = FileHandle::open(&self.vfs, &path, flags, mode)?;
        Ok(slot.install(handle))
    }

    pub fn chdir(&self, path: &[u8]) -> FsResult<()> {
        let target = self.resolve(path)?;
        self.vfs.lookup_dir(&target)?;
        *self.cwd.lock() = target;
        Ok(())
    }
}
