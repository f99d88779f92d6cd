//! The `stat` record returned by fstat.

/// File type mask.
pub const S_IFMT: u32 = 0o170000;
/// Regular file.
pub const S_IFREG: u32 = 0o100000;
/// Directory.
pub const S_IFDIR: u32 = 0o040000;
/// Character device.
pub const S_IFCHR: u32 = 0o020000;

/// File metadata as seen by userland.
///
/// Fields are ordered so the record has no padding; `to_bytes` produces the
/// exact image copied out to user memory.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stat {
    /// Size in bytes
    pub st_size: i64,
    /// Type and permission bits
    pub st_mode: u32,
    /// Number of hard links
    pub st_nlink: u32,
    /// Number of 512-byte blocks allocated
    pub st_blocks: u64,
    /// Device containing the file
    pub st_dev: u32,
    /// Device number, for device files
    pub st_rdev: u32,
    /// Inode number
    pub st_ino: u64,
}

impl Stat {
    /// Size of the user-visible record in bytes.
    pub const SIZE: usize = 40;

    pub const fn file_type(&self) -> u32 {
        self.st_mode & S_IFMT
    }

    pub const fn is_dir(&self) -> bool {
        self.file_type() == S_IFDIR
    }

    pub const fn is_regular(&self) -> bool {
        self.file_type() == S_IFREG
    }

    pub const fn is_char_device(&self) -> bool {
        self.file_type() == S_IFCHR
    }

    /// Encode in native byte order, field by field.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..8].copy_from_slice(&self.st_size.to_ne_bytes());
        out[8..12].copy_from_slice(&self.st_mode.to_ne_bytes());
        out[12..16].copy_from_slice(&self.st_nlink.to_ne_bytes());
        out[16..24].copy_from_slice(&self.st_blocks.to_ne_bytes());
        out[24..28].copy_from_slice(&self.st_dev.to_ne_bytes());
        out[28..32].copy_from_slice(&self.st_rdev.to_ne_bytes());
        out[32..40].copy_from_slice(&self.st_ino.to_ne_bytes());
        out
    }

    /// Decode a record produced by `to_bytes`.
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let u32_at = |at: usize| u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let u64_at = |at: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[at..at + 8]);
            u64::from_ne_bytes(raw)
        };
        Self {
            st_size: u64_at(0) as i64,
            st_mode: u32_at(8),
            st_nlink: u32_at(12),
            st_blocks: u64_at(16),
            st_dev: u32_at(24),
            st_rdev: u32_at(28),
            st_ino: u64_at(32),
        }
    }
}
