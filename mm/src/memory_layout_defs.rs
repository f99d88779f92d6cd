/// Lowest user virtual address. The first page is never mapped so that small
/// integers passed as pointers are rejected outright.
pub const USER_SPACE_START_VA: u64 = 0x0000_0000_0000_1000;

/// One past the highest user virtual address (lower canonical half).
pub const USER_SPACE_END_VA: u64 = 0x0000_8000_0000_0000;

pub const PAGE_SIZE_4KB: u64 = 0x1000;
