//! Per-process descriptor table.
//!
//! A fixed-capacity array of slots indexed by descriptor number. An occupied
//! slot holds exactly one [`FileHandle`]; handles may be shared between slots
//! of the same table (dup) and between tables (fork).
//!
//! The table lock covers slot structure only. It is taken before any handle
//! lock and is never held across I/O: lookups clone the handle reference and
//! drop the table lock, and handles displaced from a slot are released after
//! the table lock is gone, since the last release calls into the filesystem.

use alloc::vec::Vec;
use core::mem;

use spin::Mutex;

use fdk_abi::{Errno, OPEN_MAX};
use fdk_lib::{klog_debug, klog_warn};

use crate::error::{FsError, FsResult};
use crate::file::FileHandle;

/// Descriptor number as passed across the syscall boundary.
pub type Fd = i32;

enum Slot {
    Empty,
    /// Claimed by an in-flight open; not visible to lookups.
    Reserved,
    Open(FileHandle),
}

impl Slot {
    fn handle(&self) -> Option<&FileHandle> {
        match self {
            Slot::Open(handle) => Some(handle),
            _ => None,
        }
    }
}

pub struct FdTable {
    slots: Mutex<Vec<Slot>>,
}

/// A claimed, not yet visible descriptor slot.
///
/// Consumed by [`SlotReservation::install`]; dropping it instead returns the
/// slot to the free pool.
#[must_use = "dropping a reservation frees the slot"]
pub struct SlotReservation<'a> {
    table: &'a FdTable,
    fd: usize,
}

impl SlotReservation<'_> {
    #[inline]
    pub fn fd(&self) -> Fd {
        self.fd as Fd
    }

    /// Publish `handle` in the reserved slot and return its descriptor.
    pub fn install(self, handle: FileHandle) -> Fd {
        let fd = self.fd;
        self.table.slots.lock()[fd] = Slot::Open(handle);
        mem::forget(self);
        fd as Fd
    }
}

impl Drop for SlotReservation<'_> {
    fn drop(&mut self) {
        let mut slots = self.table.slots.lock();
        if matches!(slots[self.fd], Slot::Reserved) {
            slots[self.fd] = Slot::Empty;
        }
    }
}

fn empty_slots(capacity: usize) -> FsResult<Vec<Slot>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| FsError::NoMemory)?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

impl FdTable {
    /// An empty table of [`OPEN_MAX`] slots.
    pub fn new() -> FsResult<Self> {
        Self::with_capacity(OPEN_MAX)
    }

    /// An empty table of `capacity` slots, `1..=OPEN_MAX`.
    pub fn with_capacity(capacity: usize) -> FsResult<Self> {
        if capacity == 0 || capacity > OPEN_MAX {
            return Err(FsError::InvalidArgument);
        }
        Ok(Self {
            slots: Mutex::new(empty_slots(capacity)?),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    /// Number of occupied slots.
    pub fn open_count(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.handle().is_some()).count()
    }

    pub fn is_open(&self, fd: Fd) -> bool {
        self.lookup(fd).is_ok()
    }

    fn index(slots: &[Slot], fd: Fd) -> FsResult<usize> {
        usize::try_from(fd)
            .ok()
            .filter(|&idx| idx < slots.len())
            .ok_or(FsError::BadDescriptor)
    }

    fn open_handle(slots: &[Slot], fd: Fd) -> FsResult<&FileHandle> {
        let idx = Self::index(slots, fd)?;
        slots[idx].handle().ok_or(FsError::BadDescriptor)
    }

    fn lowest_free(slots: &[Slot]) -> Option<usize> {
        slots.iter().position(|s| matches!(s, Slot::Empty))
    }

    /// Claim the lowest free slot.
    pub fn allocate_slot(&self) -> FsResult<SlotReservation<'_>> {
        let mut slots = self.slots.lock();
        let Some(fd) = Self::lowest_free(&slots) else {
            klog_warn!("fdtable: all {} descriptors in use", slots.len());
            return Err(FsError::TableFull);
        };
        slots[fd] = Slot::Reserved;
        Ok(SlotReservation { table: self, fd })
    }

    /// Claim a specific slot, which must be free.
    pub fn reserve_at(&self, fd: Fd) -> FsResult<SlotReservation<'_>> {
        let mut slots = self.slots.lock();
        let idx = Self::index(&slots, fd)?;
        if !matches!(slots[idx], Slot::Empty) {
            return Err(Errno::EEXIST.into());
        }
        slots[idx] = Slot::Reserved;
        Ok(SlotReservation {
            table: self,
            fd: idx,
        })
    }

    /// Install `handle` in the lowest free slot.
    pub fn insert(&self, handle: FileHandle) -> FsResult<Fd> {
        Ok(self.allocate_slot()?.install(handle))
    }

    /// A new reference to the handle open at `fd`.
    pub fn lookup(&self, fd: Fd) -> FsResult<FileHandle> {
        let slots = self.slots.lock();
        Ok(Self::open_handle(&slots, fd)?.acquire())
    }

    /// Free `fd` and drop its handle reference.
    pub fn close(&self, fd: Fd) -> FsResult<()> {
        let handle = {
            let mut slots = self.slots.lock();
            Self::open_handle(&slots, fd)?;
            match mem::replace(&mut slots[fd as usize], Slot::Empty) {
                Slot::Open(handle) => handle,
                _ => return Err(FsError::BadDescriptor),
            }
        };
        handle.release();
        Ok(())
    }

    /// Share the handle at `fd` through the lowest free slot.
    pub fn dup(&self, fd: Fd) -> FsResult<Fd> {
        let mut slots = self.slots.lock();
        let handle = Self::open_handle(&slots, fd)?.acquire();
        let Some(new_fd) = Self::lowest_free(&slots) else {
            drop(slots);
            handle.release();
            return Err(FsError::TableFull);
        };
        slots[new_fd] = Slot::Open(handle);
        Ok(new_fd as Fd)
    }

    /// Make `new_fd` share the handle at `old_fd`, closing whatever `new_fd`
    /// held. The replacement happens in one step under the table lock.
    pub fn dup2(&self, old_fd: Fd, new_fd: Fd) -> FsResult<Fd> {
        let displaced = {
            let mut slots = self.slots.lock();
            let handle = Self::open_handle(&slots, old_fd)?;
            let dest = Self::index(&slots, new_fd)?;
            if old_fd == new_fd {
                return Ok(new_fd);
            }
            if matches!(slots[dest], Slot::Reserved) {
                return Err(Errno::EAGAIN.into());
            }
            let shared = handle.acquire();
            mem::replace(&mut slots[dest], Slot::Open(shared))
        };
        if let Slot::Open(old) = displaced {
            old.release();
        }
        Ok(new_fd)
    }

    /// Build a child table for fork. Every open slot of the child references
    /// the same handle as the parent's slot at the same index; everything
    /// else starts empty. On failure the parent is untouched and no handle
    /// reference is left behind.
    pub fn replicate(&self) -> FsResult<FdTable> {
        let slots = self.slots.lock();
        let mut child = Vec::new();
        child
            .try_reserve_exact(slots.len())
            .map_err(|_| FsError::NoMemory)?;
        for slot in slots.iter() {
            child.push(match slot {
                Slot::Open(handle) => Slot::Open(handle.acquire()),
                _ => Slot::Empty,
            });
        }
        klog_debug!(
            "fdtable: replicated {} open descriptors",
            child.iter().filter(|s| s.handle().is_some()).count()
        );
        Ok(FdTable {
            slots: Mutex::new(child),
        })
    }

    /// Close every open slot. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let handles: Vec<FileHandle> = {
            let mut slots = self.slots.lock();
            slots
                .iter_mut()
                .filter_map(|slot| match mem::replace(slot, Slot::Empty) {
                    Slot::Open(handle) => Some(handle),
                    Slot::Reserved => {
                        *slot = Slot::Reserved;
                        None
                    }
                    Slot::Empty => None,
                })
                .collect()
        };
        let closed = handles.len();
        for handle in handles {
            handle.release();
        }
        closed
    }
}

impl Drop for FdTable {
    fn drop(&mut self) {
        self.close_all();
    }
}
