//! Heap-backed user address space.
//!
//! A single contiguous, page-granular mapping `[base, base + size)` whose
//! contents live in a kernel `Vec`. Any range that leaves the mapping is
//! reported as [`UserPtrError::NotMapped`] without touching the buffer. Used as
//! the address space of processes that have no page tables of their own and by
//! the unit tests of every crate that moves user data.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use spin::Mutex;

use crate::memory_layout_defs::PAGE_SIZE_4KB;
use crate::user_copy::UserMemory;
use crate::user_ptr::{UserPtrError, UserVirtAddr};

pub struct UserArena {
    base: u64,
    size: usize,
    bytes: Mutex<Vec<u8>>,
}

impl UserArena {
    /// Map `size` bytes (rounded up to whole pages) at the page-aligned `base`.
    pub fn new(base: u64, size: usize) -> Result<Self, UserPtrError> {
        if base & (PAGE_SIZE_4KB - 1) != 0 {
            return Err(UserPtrError::OutOfUserRange);
        }
        let page = PAGE_SIZE_4KB as usize;
        let size = size
            .checked_add(page - 1)
            .ok_or(UserPtrError::Overflow)?
            & !(page - 1);
        UserVirtAddr::try_new(base, size)?;
        Ok(Self {
            base,
            size,
            bytes: Mutex::new(vec![0u8; size]),
        })
    }

    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// One past the last mapped address.
    #[inline]
    pub fn end(&self) -> u64 {
        self.base + self.size as u64
    }

    fn range(&self, addr: u64, len: usize) -> Result<Range<usize>, UserPtrError> {
        let end = addr.checked_add(len as u64).ok_or(UserPtrError::Overflow)?;
        if addr < self.base || end > self.end() {
            return Err(UserPtrError::NotMapped);
        }
        let start = (addr - self.base) as usize;
        Ok(start..start + len)
    }

    /// Store bytes at a raw user address, as a loader would.
    pub fn poke(&self, addr: u64, src: &[u8]) -> Result<(), UserPtrError> {
        let range = self.range(addr, src.len())?;
        self.bytes.lock()[range].copy_from_slice(src);
        Ok(())
    }

    /// Fetch bytes from a raw user address.
    pub fn peek(&self, addr: u64, len: usize) -> Result<Vec<u8>, UserPtrError> {
        let range = self.range(addr, len)?;
        Ok(self.bytes.lock()[range].to_vec())
    }
}

impl UserMemory for UserArena {
    fn read_bytes(&self, src: UserVirtAddr, dst: &mut [u8]) -> Result<(), UserPtrError> {
        let range = self.range(src.as_u64(), dst.len())?;
        dst.copy_from_slice(&self.bytes.lock()[range]);
        Ok(())
    }

    fn write_bytes(&self, dst: UserVirtAddr, src: &[u8]) -> Result<(), UserPtrError> {
        self.poke(dst.as_u64(), src)
    }
}
