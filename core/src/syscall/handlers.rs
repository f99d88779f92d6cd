use fdk_abi::{
    SYSCALL_CHDIR, SYSCALL_CLOSE, SYSCALL_DUP, SYSCALL_DUP2, SYSCALL_FSTAT, SYSCALL_GETCWD,
    SYSCALL_GETDIRENTRY, SYSCALL_LSEEK, SYSCALL_OPEN, SYSCALL_READ, SYSCALL_TABLE_SIZE,
    SYSCALL_WRITE,
};

use crate::syscall::common::{SyscallEntry, SyscallHandler};
use crate::syscall::fs::{
    syscall_chdir, syscall_close, syscall_dup, syscall_dup2, syscall_fstat, syscall_getcwd,
    syscall_getdirentry, syscall_lseek, syscall_open, syscall_read, syscall_write,
};

const fn entry(handler: SyscallHandler, name: &'static str) -> SyscallEntry {
    SyscallEntry {
        handler: Some(handler),
        name,
    }
}

static SYSCALL_TABLE: [SyscallEntry; SYSCALL_TABLE_SIZE] = {
    let mut table = [SyscallEntry::EMPTY; SYSCALL_TABLE_SIZE];
    table[SYSCALL_OPEN as usize] = entry(syscall_open, "open");
    table[SYSCALL_DUP as usize] = entry(syscall_dup, "dup");
    table[SYSCALL_DUP2 as usize] = entry(syscall_dup2, "dup2");
    table[SYSCALL_CLOSE as usize] = entry(syscall_close, "close");
    table[SYSCALL_READ as usize] = entry(syscall_read, "read");
    table[SYSCALL_GETDIRENTRY as usize] = entry(syscall_getdirentry, "getdirentry");
    table[SYSCALL_WRITE as usize] = entry(syscall_write, "write");
    table[SYSCALL_LSEEK as usize] = entry(syscall_lseek, "lseek");
    table[SYSCALL_FSTAT as usize] = entry(syscall_fstat, "fstat");
    table[SYSCALL_CHDIR as usize] = entry(syscall_chdir, "chdir");
    table[SYSCALL_GETCWD as usize] = entry(syscall_getcwd, "__getcwd");
    table
};

/// The table entry for `sysno`, if a handler is registered there.
pub fn syscall_lookup(sysno: u64) -> Option<&'static SyscallEntry> {
    let entry = SYSCALL_TABLE.get(usize::try_from(sysno).ok()?)?;
    entry.handler.map(|_| entry)
}

pub fn syscall_name(sysno: u64) -> Option<&'static str> {
    syscall_lookup(sysno).map(|entry| entry.name)
}
