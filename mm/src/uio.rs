//! Transfer descriptor for a single read or write crossing the user/kernel
//! boundary.
//!
//! A [`Uio`] names where the caller's bytes live (a user address space or a
//! kernel slice), which way they flow, how many remain, and the file offset the
//! transfer is positioned at. Underlying file objects consume it with
//! [`Uio::move_out`] (file data to the caller) or [`Uio::move_in`] (caller data
//! to the file); each move advances both the residual count and the offset.

use crate::user_copy::UserMemory;
use crate::user_ptr::{UserPtrError, UserVirtAddr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UioRw {
    /// Data flows from the file into the caller's buffer.
    Read,
    /// Data flows from the caller's buffer into the file.
    Write,
}

enum UioTarget<'a> {
    User {
        space: &'a dyn UserMemory,
        base: Option<UserVirtAddr>,
    },
    KernelRead(&'a mut [u8]),
    KernelWrite(&'a [u8]),
}

pub struct Uio<'a> {
    target: UioTarget<'a>,
    rw: UioRw,
    len: usize,
    resid: usize,
    offset: u64,
}

impl<'a> Uio<'a> {
    /// Describe a transfer against `len` bytes of user memory at `addr`.
    ///
    /// The whole range is validated up front; a zero-length transfer accepts
    /// any address since no byte will be touched.
    pub fn user(
        space: &'a dyn UserMemory,
        addr: u64,
        len: usize,
        rw: UioRw,
    ) -> Result<Self, UserPtrError> {
        let base = if len == 0 {
            None
        } else {
            Some(UserVirtAddr::try_new(addr, len)?)
        };
        Ok(Self {
            target: UioTarget::User { space, base },
            rw,
            len,
            resid: len,
            offset: 0,
        })
    }

    /// A read whose destination is a kernel buffer.
    pub fn kernel_read(buf: &'a mut [u8]) -> Self {
        let len = buf.len();
        Self {
            target: UioTarget::KernelRead(buf),
            rw: UioRw::Read,
            len,
            resid: len,
            offset: 0,
        }
    }

    /// A write whose source is a kernel buffer.
    pub fn kernel_write(buf: &'a [u8]) -> Self {
        let len = buf.len();
        Self {
            target: UioTarget::KernelWrite(buf),
            rw: UioRw::Write,
            len,
            resid: len,
            offset: 0,
        }
    }

    #[inline]
    pub fn rw(&self) -> UioRw {
        self.rw
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        matches!(self.target, UioTarget::User { .. })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn resid(&self) -> usize {
        self.resid
    }

    /// Bytes moved so far.
    #[inline]
    pub fn transferred(&self) -> usize {
        self.len - self.resid
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Move file data to the caller. Returns the number of bytes moved, which
    /// is `min(resid, src.len())`.
    pub fn move_out(&mut self, src: &[u8]) -> Result<usize, UserPtrError> {
        if self.rw != UioRw::Read {
            return Err(UserPtrError::CopyFailed);
        }
        let n = self.resid.min(src.len());
        if n == 0 {
            return Ok(0);
        }
        let done = self.transferred();
        match &mut self.target {
            UioTarget::User { space, base } => {
                let base = base.ok_or(UserPtrError::Null)?;
                space.write_bytes(base.offset(done, n)?, &src[..n])?;
            }
            UioTarget::KernelRead(buf) => buf[done..done + n].copy_from_slice(&src[..n]),
            UioTarget::KernelWrite(_) => return Err(UserPtrError::CopyFailed),
        }
        self.advance(n);
        Ok(n)
    }

    /// Move caller data into `dst`. Returns the number of bytes moved, which
    /// is `min(resid, dst.len())`.
    pub fn move_in(&mut self, dst: &mut [u8]) -> Result<usize, UserPtrError> {
        if self.rw != UioRw::Write {
            return Err(UserPtrError::CopyFailed);
        }
        let n = self.resid.min(dst.len());
        if n == 0 {
            return Ok(0);
        }
        let done = self.transferred();
        match &self.target {
            UioTarget::User { space, base } => {
                let base = base.ok_or(UserPtrError::Null)?;
                space.read_bytes(base.offset(done, n)?, &mut dst[..n])?;
            }
            UioTarget::KernelWrite(buf) => dst[..n].copy_from_slice(&buf[done..done + n]),
            UioTarget::KernelRead(_) => return Err(UserPtrError::CopyFailed),
        }
        self.advance(n);
        Ok(n)
    }

    fn advance(&mut self, n: usize) {
        self.resid -= n;
        self.offset = self.offset.saturating_add(n as u64);
    }
}
