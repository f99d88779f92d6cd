//! Console character device and per-process console bootstrap.
//!
//! There is one [`Console`] per kernel. It owns the device and hands every new
//! process fresh handles for descriptors 0, 1 and 2; nothing reaches the
//! device through a global.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use fdk_abi::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO, Stat};
use fdk_lib::klog_info;
use fdk_mm::Uio;

use crate::error::{FsError, FsResult};
use crate::fdtable::FdTable;
use crate::file::{AccessMode, FileHandle};
use crate::vnode::{Vnode, VnodeKind};

/// Device number reported in `st_rdev`.
pub const CONSOLE_RDEV: u32 = 0x0501;

/// Bytes moved per step of a console write.
const CONSOLE_CHUNK: usize = 256;

/// Receives console output as it is written.
pub type ConsoleSink = fn(&[u8]);

pub struct ConsoleDevice {
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
    sink: Mutex<Option<ConsoleSink>>,
}

impl ConsoleDevice {
    pub const fn new() -> Self {
        Self {
            input: Mutex::new(VecDeque::new()),
            output: Mutex::new(Vec::new()),
            sink: Mutex::new(None),
        }
    }

    pub fn set_sink(&self, sink: ConsoleSink) {
        *self.sink.lock() = Some(sink);
    }

    /// Queue bytes for readers, as a keyboard driver would.
    pub fn push_input(&self, bytes: &[u8]) {
        self.input.lock().extend(bytes.iter().copied());
    }

    /// Drain everything written so far.
    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut *self.output.lock())
    }
}

impl Default for ConsoleDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Vnode for ConsoleDevice {
    fn kind(&self) -> VnodeKind {
        VnodeKind::CharDevice
    }

    fn read(&self, uio: &mut Uio<'_>) -> FsResult<()> {
        let mut input = self.input.lock();
        let n = uio.resid().min(input.len());
        if n == 0 {
            return Ok(());
        }
        let pending: Vec<u8> = input.iter().take(n).copied().collect();
        uio.move_out(&pending)?;
        input.drain(..n);
        Ok(())
    }

    /// Moves the caller's bytes a chunk at a time. A fault after some chunks
    /// went through ends the write short; a fault on the first chunk is
    /// reported.
    fn write(&self, uio: &mut Uio<'_>) -> FsResult<()> {
        let mut chunk = [0u8; CONSOLE_CHUNK];
        while uio.resid() > 0 {
            let n = match uio.move_in(&mut chunk) {
                Ok(n) => n,
                Err(_) if uio.transferred() > 0 => break,
                Err(err) => return Err(err.into()),
            };
            if let Some(sink) = *self.sink.lock() {
                sink(&chunk[..n]);
            }
            self.output.lock().extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }

    fn stat(&self) -> FsResult<Stat> {
        Ok(Stat {
            st_mode: VnodeKind::CharDevice.type_bits() | 0o666,
            st_nlink: 1,
            st_rdev: CONSOLE_RDEV,
            ..Stat::default()
        })
    }

    fn try_seek(&self, _pos: u64) -> FsResult<()> {
        Err(FsError::NotSeekable)
    }
}

/// The kernel's console, shared by every process.
pub struct Console {
    device: Arc<ConsoleDevice>,
}

impl Console {
    pub fn new() -> Self {
        Self::with_device(Arc::new(ConsoleDevice::new()))
    }

    pub fn with_device(device: Arc<ConsoleDevice>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Arc<ConsoleDevice> {
        &self.device
    }

    /// Install console handles at descriptors 0 (read-only), 1 and 2
    /// (write-only). The three slots must be free.
    pub fn bootstrap(&self, table: &FdTable) -> FsResult<()> {
        let layout = [
            (STDIN_FILENO, AccessMode::ReadOnly),
            (STDOUT_FILENO, AccessMode::WriteOnly),
            (STDERR_FILENO, AccessMode::WriteOnly),
        ];
        let mut reserved = Vec::with_capacity(layout.len());
        for (fd, mode) in layout {
            reserved.push((table.reserve_at(fd as i32)?, mode));
        }
        for (slot, mode) in reserved {
            let vnode: Arc<dyn Vnode> = self.device.clone();
            slot.install(FileHandle::from_vnode(vnode, mode, b"con:"));
        }
        klog_info!("console: bootstrapped descriptors 0-2");
        Ok(())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
