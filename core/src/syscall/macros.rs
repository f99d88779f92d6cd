/// Declarative macro for defining syscall handlers.
///
/// # Syntax
///
/// ```ignore
/// define_syscall!(handler_name(ctx, args) { body });
/// ```
///
/// The body sees `ctx: &SyscallContext` and `args: &SyscallArgs` under the
/// given names and evaluates to a `SyscallResult`, so `?` works on any error
/// that converts into `FsError`. The generated function has the
/// `SyscallHandler` signature and maps the result to a `SyscallReturn`.
#[macro_export]
macro_rules! define_syscall {
    ($name:ident($ctx:ident, $args:ident) $body:block) => {
        pub fn $name(
            ctx: &$crate::syscall::context::SyscallContext<'_>,
        ) -> $crate::syscall::common::SyscallReturn {
            #[allow(unused_variables)]
            fn body(
                $ctx: &$crate::syscall::context::SyscallContext<'_>,
                $args: &$crate::syscall::context::SyscallArgs,
            ) -> $crate::syscall::common::SyscallResult $body

            let ret = $crate::syscall::common::SyscallReturn::from_result(body(ctx, ctx.args()));
            #[cfg(feature = "syscall-trace")]
            $crate::syscall::common::trace_return(stringify!($name), ctx, &ret);
            ret
        }
    };
}

/// Fail with `EFAULT` when a user pointer argument is zero.
#[macro_export]
macro_rules! require_nonnull {
    ($addr:expr) => {
        if $addr == 0 {
            return Err(::fdk_fs::FsError::Fault(::fdk_mm::UserPtrError::Null));
        }
    };
}
