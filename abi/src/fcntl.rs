//! Open flags and seek whence values.

/// Open for reading only.
pub const O_RDONLY: u32 = 0;
/// Open for writing only.
pub const O_WRONLY: u32 = 1;
/// Open for reading and writing.
pub const O_RDWR: u32 = 2;
/// Mask selecting the access-mode bits.
pub const O_ACCMODE: u32 = 3;
/// Create the file if it does not exist.
pub const O_CREAT: u32 = 4;
/// With O_CREAT, fail if the file already exists.
pub const O_EXCL: u32 = 8;
/// Truncate the file to zero length on open.
pub const O_TRUNC: u32 = 16;
/// Every write goes to the current end of file.
pub const O_APPEND: u32 = 32;

/// Every flag bit the kernel understands.
pub const O_VALID_MASK: u32 = O_ACCMODE | O_CREAT | O_EXCL | O_TRUNC | O_APPEND;

/// Seek relative to the start of the file.
pub const SEEK_SET: u32 = 0;
/// Seek relative to the current offset.
pub const SEEK_CUR: u32 = 1;
/// Seek relative to the end of the file.
pub const SEEK_END: u32 = 2;
