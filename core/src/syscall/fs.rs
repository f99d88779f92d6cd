//! File-descriptor syscall handlers.
//!
//! Each handler validates its descriptor before touching any user pointer, so
//! a bad descriptor reports `EBADF` even when the buffer is also bad.
//! Read, write and getdirentry check the access mode here as well as in
//! `FileHandle` so that `EBADF` is reported ahead of `EFAULT`.

use fdk_abi::{PATH_MAX, Stat};
use fdk_fs::FsError;
use fdk_mm::{Uio, UioRw, UserBytes, copy_bytes_to_user, copy_in_string};

use crate::syscall::common::fd_arg;

define_syscall!(syscall_open(ctx, args) {
    require_nonnull!(args.arg0);
    let path = copy_in_string(ctx.memory(), args.arg0, PATH_MAX)?;
    let fd = ctx.process().open(&path, args.arg1_u32(), args.arg2_u32())?;
    Ok(fd as u64)
});

define_syscall!(syscall_close(ctx, args) {
    ctx.process().fd_table().close(fd_arg(args.arg0))?;
    Ok(0)
});

define_syscall!(syscall_read(ctx, args) {
    let handle = ctx.process().fd_table().lookup(fd_arg(args.arg0))?;
    if !handle.mode().readable() {
        return Err(FsError::AccessMode);
    }
    let mut uio = Uio::user(ctx.memory(), args.arg1, args.arg2_usize(), UioRw::Read)?;
    let n = handle.read(&mut uio)?;
    Ok(n as u64)
});

define_syscall!(syscall_write(ctx, args) {
    let handle = ctx.process().fd_table().lookup(fd_arg(args.arg0))?;
    if !handle.mode().writable() {
        return Err(FsError::AccessMode);
    }
    let mut uio = Uio::user(ctx.memory(), args.arg1, args.arg2_usize(), UioRw::Write)?;
    let n = handle.write(&mut uio)?;
    Ok(n as u64)
});

define_syscall!(syscall_lseek(ctx, args) {
    let handle = ctx.process().fd_table().lookup(fd_arg(args.arg0))?;
    handle.seek(args.arg1_i64(), args.arg2_u32())
});

define_syscall!(syscall_dup(ctx, args) {
    let fd = ctx.process().fd_table().dup(fd_arg(args.arg0))?;
    Ok(fd as u64)
});

define_syscall!(syscall_dup2(ctx, args) {
    let fd = ctx
        .process()
        .fd_table()
        .dup2(fd_arg(args.arg0), fd_arg(args.arg1))?;
    Ok(fd as u64)
});

define_syscall!(syscall_fstat(ctx, args) {
    let handle = ctx.process().fd_table().lookup(fd_arg(args.arg0))?;
    require_nonnull!(args.arg1);
    let dst = UserBytes::try_new(args.arg1, Stat::SIZE)?;
    let stat = handle.stat()?;
    copy_bytes_to_user(ctx.memory(), dst, &stat.to_bytes())?;
    Ok(0)
});

define_syscall!(syscall_getdirentry(ctx, args) {
    let handle = ctx.process().fd_table().lookup(fd_arg(args.arg0))?;
    if !handle.mode().readable() {
        return Err(FsError::AccessMode);
    }
    let mut uio = Uio::user(ctx.memory(), args.arg1, args.arg2_usize(), UioRw::Read)?;
    let n = handle.getdirentry(&mut uio)?;
    Ok(n as u64)
});

define_syscall!(syscall_chdir(ctx, args) {
    require_nonnull!(args.arg0);
    let path = copy_in_string(ctx.memory(), args.arg0, PATH_MAX)?;
    ctx.process().chdir(&path)?;
    Ok(0)
});

define_syscall!(syscall_getcwd(ctx, args) {
    let cwd = ctx.process().cwd();
    let mut uio = Uio::user(ctx.memory(), args.arg0, args.arg1_usize(), UioRw::Read)?;
    let n = uio.move_out(&cwd)?;
    Ok(n as u64)
});
