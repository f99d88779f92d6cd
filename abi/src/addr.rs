//! Virtual address newtype shared by the kernel and userland.
//!
//! The type is a zero-cost `#[repr(transparent)]` wrapper; it carries no
//! guarantee that the address is mapped, only helpers to reason about it.

/// A virtual memory address.
///
/// On x86_64, virtual addresses must be "canonical" - bits 48-63 must be copies
/// of bit 47 (sign extension).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(pub u64);

impl VirtAddr {
    /// The null virtual address.
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns true if `addr` is canonical: bits 48-63 replicate bit 47.
    #[inline]
    pub const fn is_canonical(addr: u64) -> bool {
        let upper = addr >> 47;
        upper == 0 || upper == 0x1_FFFF
    }

    /// Add an offset, returning None on overflow.
    #[inline]
    pub const fn checked_offset(self, off: u64) -> Option<Self> {
        match self.0.checked_add(off) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// Align address down to the given alignment.
    #[inline]
    pub const fn align_down(self, align: u64) -> Self {
        debug_assert!(align.is_power_of_two(), "align must be power of two");
        Self(self.0 & !(align - 1))
    }
}
