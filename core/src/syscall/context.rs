use fdk_mm::UserMemory;

use crate::process::Process;
use crate::syscall::common::SyscallReturn;
use fdk_abi::Errno;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallArgs {
    pub arg0: u64,
    pub arg1: u64,
    pub arg2: u64,
    pub arg3: u64,
    pub arg4: u64,
    pub arg5: u64,
}

impl SyscallArgs {
    pub const fn new(args: [u64; 6]) -> Self {
        Self {
            arg0: args[0],
            arg1: args[1],
            arg2: args[2],
            arg3: args[3],
            arg4: args[4],
            arg5: args[5],
        }
    }

    #[inline]
    pub fn arg1_u32(&self) -> u32 {
        self.arg1 as u32
    }
    #[inline]
    pub fn arg1_i64(&self) -> i64 {
        self.arg1 as i64
    }
    #[inline]
    pub fn arg1_usize(&self) -> usize {
        self.arg1 as usize
    }

    #[inline]
    pub fn arg2_u32(&self) -> u32 {
        self.arg2 as u32
    }
    #[inline]
    pub fn arg2_usize(&self) -> usize {
        self.arg2 as usize
    }
}

/// Everything a handler may touch: the calling process, its address space and
/// the raw argument registers.
pub struct SyscallContext<'a> {
    process: &'a Process,
    memory: &'a dyn UserMemory,
    args: SyscallArgs,
}

impl<'a> SyscallContext<'a> {
    pub fn new(process: &'a Process, memory: &'a dyn UserMemory, args: SyscallArgs) -> Self {
        Self {
            process,
            memory,
            args,
        }
    }

    #[inline]
    pub fn process(&self) -> &'a Process {
        self.process
    }

    #[inline]
    pub fn memory(&self) -> &'a dyn UserMemory {
        self.memory
    }

    #[inline]
    pub fn args(&self) -> &SyscallArgs {
        &self.args
    }

    #[inline]
    pub fn ok(&self, value: u64) -> SyscallReturn {
        SyscallReturn::ok(value)
    }

    #[inline]
    pub fn err(&self, errno: Errno) -> SyscallReturn {
        SyscallReturn::err(errno)
    }
}
