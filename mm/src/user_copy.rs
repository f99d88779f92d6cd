use alloc::vec::Vec;

use crate::memory_layout_defs::PAGE_SIZE_4KB;
use crate::user_ptr::{UserBytes, UserPtr, UserPtrError, UserVirtAddr};

/// The address space a syscall's user pointers refer to.
///
/// Implementations decide whether each byte of a range is mapped and
/// user-accessible and perform the transfer. A range that is not entirely
/// accessible fails with [`UserPtrError::NotMapped`] before any byte moves.
pub trait UserMemory: Send + Sync {
    fn read_bytes(&self, src: UserVirtAddr, dst: &mut [u8]) -> Result<(), UserPtrError>;

    fn write_bytes(&self, dst: UserVirtAddr, src: &[u8]) -> Result<(), UserPtrError>;
}

/// Copy up to `dst.len()` bytes from a user buffer. Returns the bytes copied.
pub fn copy_bytes_from_user(
    space: &dyn UserMemory,
    src: UserBytes,
    dst: &mut [u8],
) -> Result<usize, UserPtrError> {
    let copy_len = src.len().min(dst.len());
    if copy_len == 0 {
        return Ok(0);
    }
    space.read_bytes(src.base(), &mut dst[..copy_len])?;
    Ok(copy_len)
}

/// Copy up to `dst.len()` bytes into a user buffer. Returns the bytes copied.
pub fn copy_bytes_to_user(
    space: &dyn UserMemory,
    dst: UserBytes,
    src: &[u8],
) -> Result<usize, UserPtrError> {
    let copy_len = src.len().min(dst.len());
    if copy_len == 0 {
        return Ok(0);
    }
    space.write_bytes(dst.base(), &src[..copy_len])?;
    Ok(copy_len)
}

/// Read one pointer-sized word from user memory.
pub fn copy_in_u64(space: &dyn UserMemory, src: UserPtr<u64>) -> Result<u64, UserPtrError> {
    let mut raw = [0u8; 8];
    space.read_bytes(src.addr(), &mut raw)?;
    Ok(u64::from_ne_bytes(raw))
}

/// Copy a NUL-terminated string in from user memory.
///
/// `max_len` counts the terminator, so at most `max_len - 1` bytes are
/// returned. The string is read a page at a time, never past the page holding
/// its terminator.
pub fn copy_in_string(
    space: &dyn UserMemory,
    addr: u64,
    max_len: usize,
) -> Result<Vec<u8>, UserPtrError> {
    let start = UserVirtAddr::try_new(addr, 0)?;
    if max_len == 0 {
        return Err(UserPtrError::TooLong);
    }

    let mut out = Vec::new();
    let mut chunk = [0u8; 256];
    let mut done = 0usize;

    while done < max_len {
        let cursor = start.as_u64() + done as u64;
        let to_page_end = (PAGE_SIZE_4KB - (cursor & (PAGE_SIZE_4KB - 1))) as usize;
        let want = chunk.len().min(to_page_end).min(max_len - done);
        let at = start.offset(done, want)?;
        space.read_bytes(at, &mut chunk[..want])?;

        if let Some(nul) = chunk[..want].iter().position(|&b| b == 0) {
            out.extend_from_slice(&chunk[..nul]);
            return Ok(out);
        }
        out.extend_from_slice(&chunk[..want]);
        done += want;
    }

    Err(UserPtrError::TooLong)
}
