//! Path normalization.
//!
//! Paths handed to a [`crate::vfs::Vfs`] are always absolute and normalized:
//! a single leading `/`, no empty, `.` or `..` components, no trailing `/`.

use alloc::vec::Vec;

use fdk_abi::{Errno, NAME_MAX, PATH_MAX};

use crate::error::{FsError, FsResult};

/// Iterate the non-empty components of a path.
pub fn components(path: &[u8]) -> impl Iterator<Item = &[u8]> {
    path.split(|&b| b == b'/').filter(|c| !c.is_empty())
}

/// Resolve `path` against the absolute directory `cwd`.
///
/// `..` at the root stays at the root.
pub fn resolve(cwd: &[u8], path: &[u8]) -> FsResult<Vec<u8>> {
    if path.is_empty() {
        return Err(Errno::ENOENT.into());
    }
    let mut parts: Vec<&[u8]> = Vec::new();
    let base: &[u8] = if path[0] == b'/' { b"" } else { cwd };
    for comp in components(base).chain(components(path)) {
        match comp {
            b"." => {}
            b".." => {
                parts.pop();
            }
            name if name.len() > NAME_MAX => return Err(Errno::ENAMETOOLONG.into()),
            name => parts.push(name),
        }
    }

    let mut out = Vec::new();
    let total = parts.iter().map(|p| p.len() + 1).sum::<usize>().max(1);
    if total >= PATH_MAX {
        return Err(Errno::ENAMETOOLONG.into());
    }
    out.try_reserve_exact(total).map_err(|_| FsError::NoMemory)?;
    if parts.is_empty() {
        out.push(b'/');
    }
    for part in parts {
        out.push(b'/');
        out.extend_from_slice(part);
    }
    Ok(out)
}

/// Split a normalized path into its parent directory and final component.
/// Returns `None` for the root.
pub fn split_last(path: &[u8]) -> Option<(&[u8], &[u8])> {
    let trimmed = path.strip_suffix(b"/").unwrap_or(path);
    let pos = trimmed.iter().rposition(|&b| b == b'/')?;
    let name = &trimmed[pos + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if pos == 0 { &b"/"[..] } else { &trimmed[..pos] };
    Some((parent, name))
}
