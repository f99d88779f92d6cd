//! User pointer validation types for safe kernel/userland boundary crossing.
//!
//! These types ensure user-provided addresses are range-checked before any
//! copy is attempted. Validation here is purely arithmetic; whether the pages
//! are actually mapped is decided by the [`UserMemory`](crate::UserMemory)
//! implementation at copy time.

use core::fmt;
use core::marker::PhantomData;

use crate::memory_layout_defs::{USER_SPACE_END_VA, USER_SPACE_START_VA};
use fdk_abi::addr::VirtAddr;

/// Error type for user pointer validation and copies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UserPtrError {
    /// Pointer is null (address == 0)
    Null = 1,
    /// Address is not canonical (bits 48-63 don't match bit 47)
    NonCanonical = 2,
    /// Address is outside user space range
    OutOfUserRange = 3,
    /// Address + length would overflow u64
    Overflow = 4,
    /// Page is not mapped or not user-accessible
    NotMapped = 5,
    /// Copy operation failed during actual memory transfer
    CopyFailed = 6,
    /// String had no terminator within the allowed length
    TooLong = 7,
}

impl fmt::Display for UserPtrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Null => "null user pointer",
            Self::NonCanonical => "non-canonical user address",
            Self::OutOfUserRange => "address outside user space",
            Self::Overflow => "user range wraps the address space",
            Self::NotMapped => "user page not mapped",
            Self::CopyFailed => "user copy failed",
            Self::TooLong => "user string not terminated within limit",
        };
        f.write_str(msg)
    }
}

/// A validated user-space virtual address.
///
/// This type guarantees at construction time that:
/// - Address is not null
/// - Address is canonical
/// - Address is within user space bounds
/// - If a length was specified, `address + length` doesn't overflow and stays
///   inside user space
///
/// This does NOT guarantee the memory is mapped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct UserVirtAddr(VirtAddr);

impl UserVirtAddr {
    /// Validate a user pointer with length check.
    ///
    /// # Errors
    ///
    /// - `addr == 0` → [`UserPtrError::Null`]
    /// - Address is not canonical → [`UserPtrError::NonCanonical`]
    /// - Address is outside user space → [`UserPtrError::OutOfUserRange`]
    /// - `addr + len` overflows or exceeds user space → [`UserPtrError::Overflow`]
    pub fn try_new(addr: u64, len: usize) -> Result<Self, UserPtrError> {
        if addr == 0 {
            return Err(UserPtrError::Null);
        }

        if !VirtAddr::is_canonical(addr) {
            return Err(UserPtrError::NonCanonical);
        }

        if !(USER_SPACE_START_VA..USER_SPACE_END_VA).contains(&addr) {
            return Err(UserPtrError::OutOfUserRange);
        }

        let end = addr.checked_add(len as u64).ok_or(UserPtrError::Overflow)?;
        if end > USER_SPACE_END_VA {
            return Err(UserPtrError::Overflow);
        }

        Ok(Self(VirtAddr(addr)))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0.as_u64()
    }

    /// Address `off` bytes further on, revalidated for `len` bytes.
    pub fn offset(self, off: usize, len: usize) -> Result<Self, UserPtrError> {
        let addr = self
            .0
            .checked_offset(off as u64)
            .ok_or(UserPtrError::Overflow)?;
        Self::try_new(addr.as_u64(), len)
    }
}

/// A typed user pointer; the address can hold at least `size_of::<T>()` bytes.
#[derive(Copy, Clone, Debug)]
pub struct UserPtr<T> {
    addr: UserVirtAddr,
    _marker: PhantomData<*const T>,
}

impl<T> UserPtr<T> {
    pub fn try_new(addr: u64) -> Result<Self, UserPtrError> {
        let validated = UserVirtAddr::try_new(addr, core::mem::size_of::<T>())?;
        Ok(Self {
            addr: validated,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub const fn addr(self) -> UserVirtAddr {
        self.addr
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.addr.as_u64()
    }
}

/// A validated user buffer/slice with element count.
#[derive(Copy, Clone, Debug)]
pub struct UserSlice<T> {
    base: UserVirtAddr,
    len: usize,
    _marker: PhantomData<*const T>,
}

impl<T> UserSlice<T> {
    pub fn try_new(addr: u64, count: usize) -> Result<Self, UserPtrError> {
        let byte_len = count
            .checked_mul(core::mem::size_of::<T>())
            .ok_or(UserPtrError::Overflow)?;
        let validated = UserVirtAddr::try_new(addr, byte_len)?;
        Ok(Self {
            base: validated,
            len: count,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub const fn base(&self) -> UserVirtAddr {
        self.base
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Convenience type for byte slices.
pub type UserBytes = UserSlice<u8>;
