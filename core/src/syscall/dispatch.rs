use fdk_abi::Errno;
use fdk_lib::klog_info;

use crate::syscall::common::SyscallReturn;
use crate::syscall::context::SyscallContext;
use crate::syscall::handlers::syscall_lookup;

/// Route syscall `sysno` to its handler. Unknown numbers fail with `ENOSYS`.
pub fn syscall_dispatch(ctx: &SyscallContext<'_>, sysno: u64) -> SyscallReturn {
    let Some(handler) = syscall_lookup(sysno).and_then(|entry| entry.handler) else {
        klog_info!(
            "SYSCALL: Unknown syscall {} from pid {} -> ENOSYS",
            sysno,
            ctx.process().pid()
        );
        return ctx.err(Errno::ENOSYS);
    };
    handler(ctx)
}
