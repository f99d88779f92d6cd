//! Moving an exec argument vector from the old image to the new stack.
//!
//! Arguments are first copied into kernel buffers sized from what was
//! actually validated, then laid out below the new stack top as
//!
//! ```text
//! stack_top -> argv[0] string, NUL, padding to 8
//!              argv[1] string ...
//!              (alignment to 16)
//! argv      -> argv[0] ptr, argv[1] ptr, ..., 0
//! sp        -> argv rounded down to 16
//! ```

use alloc::vec::Vec;

use fdk_abi::{ARG_MAX, EXEC_MAX_ARGS, VirtAddr};
use fdk_lib::klog_debug;
use fdk_mm::{UserMemory, UserPtr, UserPtrError, UserVirtAddr, copy_in_string, copy_in_u64};

use super::ExecError;

const PTR_SIZE: usize = core::mem::size_of::<u64>();

/// Copy in the NULL-terminated array of string pointers at `argv_ptr`.
///
/// At most `EXEC_MAX_ARGS` entries are accepted and the strings plus the
/// pointer array may use at most `ARG_MAX` bytes.
pub fn copy_in_argv(space: &dyn UserMemory, argv_ptr: u64) -> Result<Vec<Vec<u8>>, ExecError> {
    let ptrs = copy_in_pointers(space, argv_ptr)?;

    let mut budget = ARG_MAX
        .checked_sub((ptrs.len() + 1) * PTR_SIZE)
        .ok_or(ExecError::TooManyArgs)?;

    let mut args = Vec::new();
    args.try_reserve_exact(ptrs.len())
        .map_err(|_| ExecError::NoMem)?;

    for ptr in ptrs {
        let arg = copy_in_string(space, ptr, budget).map_err(|err| match err {
            UserPtrError::TooLong => ExecError::TooManyArgs,
            other => ExecError::Fault(other),
        })?;
        budget -= arg.len() + 1;
        args.push(arg);
    }
    Ok(args)
}

fn copy_in_pointers(space: &dyn UserMemory, argv_ptr: u64) -> Result<Vec<u64>, ExecError> {
    let mut ptrs = Vec::new();
    for index in 0..=EXEC_MAX_ARGS {
        let addr = argv_ptr
            .checked_add((index * PTR_SIZE) as u64)
            .ok_or(UserPtrError::Overflow)?;
        let ptr = copy_in_u64(space, UserPtr::try_new(addr)?)?;
        if ptr == 0 {
            return Ok(ptrs);
        }
        if index == EXEC_MAX_ARGS {
            break;
        }
        ptrs.try_reserve(1).map_err(|_| ExecError::NoMem)?;
        ptrs.push(ptr);
    }
    Err(ExecError::TooManyArgs)
}

/// The initial stack contents of a new program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgvImage {
    base: u64,
    bytes: Vec<u8>,
    argc: usize,
    argv: u64,
    stack_pointer: u64,
}

impl ArgvImage {
    /// Lay out `args` directly below `stack_top`.
    pub fn build(args: &[Vec<u8>], stack_top: u64) -> Result<Self, ExecError> {
        if args.len() > EXEC_MAX_ARGS {
            return Err(ExecError::TooManyArgs);
        }

        let mut sp = stack_top;
        let mut string_ptrs = Vec::new();
        string_ptrs
            .try_reserve_exact(args.len())
            .map_err(|_| ExecError::NoMem)?;
        for arg in args {
            sp = VirtAddr(sp.checked_sub(arg.len() as u64 + 1).ok_or(UserPtrError::Overflow)?)
                .align_down(8)
                .as_u64();
            string_ptrs.push(sp);
        }
        sp = VirtAddr(sp).align_down(16).as_u64();

        let table_size = ((args.len() + 1) * PTR_SIZE) as u64;
        let argv = sp.checked_sub(table_size).ok_or(UserPtrError::Overflow)?;
        let stack_pointer = VirtAddr(argv).align_down(16).as_u64();

        let len = usize::try_from(stack_top - argv).map_err(|_| ExecError::TooManyArgs)?;
        UserVirtAddr::try_new(argv, len)?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|_| ExecError::NoMem)?;
        bytes.resize(len, 0);

        for (arg, &at) in args.iter().zip(&string_ptrs) {
            let off = (at - argv) as usize;
            bytes[off..off + arg.len()].copy_from_slice(arg);
        }
        for (i, &ptr) in string_ptrs.iter().enumerate() {
            let off = i * PTR_SIZE;
            bytes[off..off + PTR_SIZE].copy_from_slice(&ptr.to_ne_bytes());
        }

        Ok(Self {
            base: argv,
            bytes,
            argc: args.len(),
            argv,
            stack_pointer,
        })
    }

    /// Write the image into the new address space.
    pub fn copy_out(&self, space: &dyn UserMemory) -> Result<(), ExecError> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        let dst = UserVirtAddr::try_new(self.base, self.bytes.len())?;
        space.write_bytes(dst, &self.bytes)?;
        Ok(())
    }

    #[inline]
    pub fn argc(&self) -> usize {
        self.argc
    }

    /// User address of the pointer array.
    #[inline]
    pub fn argv(&self) -> u64 {
        self.argv
    }

    #[inline]
    pub fn stack_pointer(&self) -> u64 {
        self.stack_pointer
    }

    /// Lowest address the image occupies.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Copy the arguments at `argv_ptr` in from `old` and lay them out below
/// `stack_top` in `new`.
pub fn stage_args(
    old: &dyn UserMemory,
    argv_ptr: u64,
    new: &dyn UserMemory,
    stack_top: u64,
) -> Result<ArgvImage, ExecError> {
    let args = copy_in_argv(old, argv_ptr)?;
    let image = ArgvImage::build(&args, stack_top)?;
    image.copy_out(new)?;
    klog_debug!(
        "exec: staged {} args ({} bytes) at sp {:#x}",
        image.argc(),
        image.bytes().len(),
        image.stack_pointer()
    );
    Ok(image)
}
