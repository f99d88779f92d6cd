use alloc::sync::Arc;

use fdk_abi::{
    Errno, O_APPEND, O_CREAT, O_RDONLY, O_RDWR, O_WRONLY, OPEN_MAX, PATH_MAX, SEEK_CUR, SEEK_END,
    SEEK_SET, SYSCALL_CHDIR, SYSCALL_CLOSE, SYSCALL_DUP, SYSCALL_DUP2, SYSCALL_FSTAT,
    SYSCALL_GETCWD, SYSCALL_GETDIRENTRY, SYSCALL_LSEEK, SYSCALL_OPEN, SYSCALL_READ,
    SYSCALL_WRITE, Stat,
};
use fdk_fs::{Console, RamFs, Vfs};
use fdk_mm::UserArena;

use crate::process::Process;
use crate::syscall::handlers::syscall_name;
use crate::syscall::{SyscallArgs, SyscallContext, SyscallReturn, syscall_dispatch, syscall_lookup};

const ARENA_BASE: u64 = 0x40_0000;
const PATH_AT: u64 = ARENA_BASE;
const BUF_AT: u64 = ARENA_BASE + 0x2000;
const STAT_AT: u64 = ARENA_BASE + 0x4000;
const UNMAPPED: u64 = 0x7000_0000;

struct Harness {
    fs: Arc<RamFs>,
    console: Console,
    process: Process,
    arena: UserArena,
}

impl Harness {
    fn new() -> Self {
        let fs = Arc::new(RamFs::new());
        fs.mkdir(b"/etc").unwrap();
        fs.write_file(b"/etc/motd", b"hello, world\n").unwrap();
        let console = Console::new();
        let vfs: Arc<dyn Vfs> = fs.clone();
        let process = Process::spawn(1, vfs, &console).unwrap();
        let arena = UserArena::new(ARENA_BASE, 0x8000).unwrap();
        Self {
            fs,
            console,
            process,
            arena,
        }
    }

    fn call(&self, sysno: u64, args: [u64; 6]) -> SyscallReturn {
        let ctx = SyscallContext::new(&self.process, &self.arena, SyscallArgs::new(args));
        syscall_dispatch(&ctx, sysno)
    }

    fn put_path(&self, path: &[u8]) -> u64 {
        self.arena.poke(PATH_AT, path).unwrap();
        self.arena.poke(PATH_AT + path.len() as u64, &[0]).unwrap();
        PATH_AT
    }

    fn open(&self, path: &[u8], flags: u32) -> SyscallReturn {
        let at = self.put_path(path);
        self.call(SYSCALL_OPEN, [at, flags as u64, 0o644, 0, 0, 0])
    }

    fn read(&self, fd: i32, len: usize) -> SyscallReturn {
        self.call(SYSCALL_READ, [fd as u64, BUF_AT, len as u64, 0, 0, 0])
    }

    fn write(&self, fd: i32, data: &[u8]) -> SyscallReturn {
        self.arena.poke(BUF_AT, data).unwrap();
        self.call(SYSCALL_WRITE, [fd as u64, BUF_AT, data.len() as u64, 0, 0, 0])
    }

    fn lseek(&self, fd: i32, offset: i64, whence: u32) -> SyscallReturn {
        self.call(SYSCALL_LSEEK, [fd as u64, offset as u64, whence as u64, 0, 0, 0])
    }

    fn buf(&self, len: usize) -> alloc::vec::Vec<u8> {
        self.arena.peek(BUF_AT, len).unwrap()
    }
}

fn fail(errno: Errno) -> SyscallReturn {
    SyscallReturn::err(errno)
}

#[test]
fn table_registers_every_file_syscall() {
    for sysno in [
        SYSCALL_OPEN,
        SYSCALL_CLOSE,
        SYSCALL_READ,
        SYSCALL_WRITE,
        SYSCALL_LSEEK,
        SYSCALL_DUP,
        SYSCALL_DUP2,
        SYSCALL_FSTAT,
        SYSCALL_GETDIRENTRY,
        SYSCALL_CHDIR,
        SYSCALL_GETCWD,
    ] {
        assert!(syscall_lookup(sysno).is_some(), "syscall {} missing", sysno);
    }
    assert_eq!(syscall_lookup(SYSCALL_GETCWD).unwrap().name, "__getcwd");
    assert_eq!(syscall_name(SYSCALL_DUP2), Some("dup2"));
    assert_eq!(syscall_name(1), None);
}

#[test]
fn unknown_syscall_is_enosys() {
    let h = Harness::new();
    assert_eq!(h.call(0, [0; 6]), fail(Errno::ENOSYS));
    assert_eq!(h.call(127, [0; 6]), fail(Errno::ENOSYS));
    assert_eq!(h.call(u64::MAX, [0; 6]), fail(Errno::ENOSYS));
}

#[test]
fn open_read_close_round_trip() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDONLY);
    assert_eq!(fd, SyscallReturn::ok(3));

    assert_eq!(h.read(3, 5), SyscallReturn::ok(5));
    assert_eq!(h.buf(5), b"hello");
    assert_eq!(h.read(3, 64), SyscallReturn::ok(8));
    assert_eq!(h.buf(8), b", world\n");
    assert_eq!(h.read(3, 64), SyscallReturn::ok(0));

    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), 1);
    assert_eq!(h.call(SYSCALL_CLOSE, [3, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), 0);
    assert_eq!(h.call(SYSCALL_CLOSE, [3, 0, 0, 0, 0, 0]), fail(Errno::EBADF));
}

#[test]
fn bad_descriptors_are_ebadf() {
    let h = Harness::new();
    for fd in [-1i64, 3, OPEN_MAX as i64, i64::MAX, 1 << 40] {
        let fd = fd as u64;
        assert_eq!(h.call(SYSCALL_READ, [fd, BUF_AT, 4, 0, 0, 0]), fail(Errno::EBADF));
        assert_eq!(h.call(SYSCALL_WRITE, [fd, BUF_AT, 4, 0, 0, 0]), fail(Errno::EBADF));
        assert_eq!(h.call(SYSCALL_LSEEK, [fd, 0, 0, 0, 0, 0]), fail(Errno::EBADF));
        assert_eq!(h.call(SYSCALL_CLOSE, [fd, 0, 0, 0, 0, 0]), fail(Errno::EBADF));
        assert_eq!(h.call(SYSCALL_DUP, [fd, 0, 0, 0, 0, 0]), fail(Errno::EBADF));
    }
    // Descriptor validation comes before the buffer.
    assert_eq!(h.call(SYSCALL_READ, [9, 0, 4, 0, 0, 0]), fail(Errno::EBADF));
}

#[test]
fn write_on_read_only_descriptor_is_ebadf() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDONLY).retval as i32;
    assert_eq!(h.write(fd, b"x"), fail(Errno::EBADF));
    assert_eq!(h.lseek(fd, 0, SEEK_CUR), SyscallReturn::ok(0));
    assert_eq!(h.fs.read_file(b"/etc/motd").unwrap(), b"hello, world\n");

    // stdin is read-only, stdout write-only
    assert_eq!(h.write(0, b"x"), fail(Errno::EBADF));
    assert_eq!(h.read(1, 1), fail(Errno::EBADF));
}

#[test]
fn faulting_buffer_is_efault_and_keeps_offset() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDWR).retval as u64;
    assert_eq!(h.call(SYSCALL_READ, [fd, UNMAPPED, 4, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.call(SYSCALL_READ, [fd, 0, 4, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.call(SYSCALL_WRITE, [fd, UNMAPPED, 4, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.lseek(fd as i32, 0, SEEK_CUR), SyscallReturn::ok(0));

    // The buffer runs off the end of the mapping.
    let tail = h.arena.end() - 2;
    assert_eq!(h.call(SYSCALL_READ, [fd, tail, 4, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.lseek(fd as i32, 0, SEEK_CUR), SyscallReturn::ok(0));
    assert_eq!(h.read(fd as i32, 5), SyscallReturn::ok(5));
}

#[test]
fn zero_length_transfers_accept_any_buffer() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(h.call(SYSCALL_READ, [fd, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
}

#[test]
fn write_then_read_back_through_second_open() {
    let h = Harness::new();
    let w = h.open(b"/etc/new", O_WRONLY | O_CREAT).retval as i32;
    assert_eq!(h.write(w, b"abc"), SyscallReturn::ok(3));
    assert_eq!(h.write(w, b"def"), SyscallReturn::ok(3));

    let r = h.open(b"/etc/new", O_RDONLY).retval as i32;
    assert_ne!(r, w);
    assert_eq!(h.read(r, 16), SyscallReturn::ok(6));
    assert_eq!(h.buf(6), b"abcdef");
    // Independent opens keep independent offsets.
    assert_eq!(h.lseek(w, 0, SEEK_CUR), SyscallReturn::ok(6));
    assert_eq!(h.lseek(r, 0, SEEK_SET), SyscallReturn::ok(0));
}

#[test]
fn append_writes_land_at_end() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_WRONLY | O_APPEND).retval as i32;
    assert_eq!(h.write(fd, b"bye\n"), SyscallReturn::ok(4));
    assert_eq!(h.fs.read_file(b"/etc/motd").unwrap(), b"hello, world\nbye\n");
}

#[test]
fn open_path_errors() {
    let h = Harness::new();
    assert_eq!(h.call(SYSCALL_OPEN, [0, 0, 0, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.call(SYSCALL_OPEN, [UNMAPPED, 0, 0, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.open(b"/etc/missing", O_RDONLY), fail(Errno::ENOENT));
    assert_eq!(h.open(b"", O_RDONLY), fail(Errno::ENOENT));
    assert_eq!(h.open(b"/etc", O_WRONLY), fail(Errno::EISDIR));
    assert_eq!(h.open(b"/etc/motd", 3), fail(Errno::EINVAL));
    assert_eq!(h.open(b"/etc/motd", 0x400), fail(Errno::EINVAL));

    let long = alloc::vec![b'a'; PATH_MAX];
    h.arena.poke(PATH_AT, &long).unwrap();
    h.arena.poke(PATH_AT + PATH_MAX as u64, &[0]).unwrap();
    assert_eq!(h.call(SYSCALL_OPEN, [PATH_AT, 0, 0, 0, 0, 0]), fail(Errno::ENAMETOOLONG));

    assert_eq!(h.process.fd_table().open_count(), 3);
}

#[test]
fn exhausting_the_table_is_emfile() {
    let h = Harness::new();
    for expected in 3..OPEN_MAX {
        assert_eq!(h.open(b"/etc/motd", O_RDONLY), SyscallReturn::ok(expected as u64));
    }
    assert_eq!(h.open(b"/etc/motd", O_RDONLY), fail(Errno::EMFILE));
    assert_eq!(h.call(SYSCALL_DUP, [0, 0, 0, 0, 0, 0]), fail(Errno::EMFILE));
    assert_eq!(h.process.fd_table().open_count(), OPEN_MAX);
    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), OPEN_MAX - 3);

    assert_eq!(h.call(SYSCALL_CLOSE, [40, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.open(b"/etc/motd", O_RDONLY), SyscallReturn::ok(40));
}

#[test]
fn lseek_whence_and_range() {
    let h = Harness::new();
    h.fs.write_file(b"/etc/hundred", &[7u8; 100]).unwrap();
    let fd = h.open(b"/etc/hundred", O_RDONLY).retval as i32;

    assert_eq!(h.lseek(fd, -10, SEEK_END), SyscallReturn::ok(90));
    assert_eq!(h.lseek(fd, -200, SEEK_END), fail(Errno::EINVAL));
    assert_eq!(h.lseek(fd, 0, SEEK_CUR), SyscallReturn::ok(90));
    assert_eq!(h.lseek(fd, 5, SEEK_CUR), SyscallReturn::ok(95));
    assert_eq!(h.lseek(fd, 1000, SEEK_SET), SyscallReturn::ok(1000));
    assert_eq!(h.lseek(fd, -1, SEEK_SET), fail(Errno::EINVAL));
    assert_eq!(h.lseek(fd, 0, 7), fail(Errno::EINVAL));
    assert_eq!(h.lseek(fd, 0, SEEK_CUR), SyscallReturn::ok(1000));

    assert_eq!(h.lseek(1, 0, SEEK_SET), fail(Errno::ESPIPE));
}

#[test]
fn dup2_aliases_and_replaces() {
    let h = Harness::new();
    let a = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    let b = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), 2);

    assert_eq!(h.call(SYSCALL_DUP2, [a, b, 0, 0, 0, 0]), SyscallReturn::ok(b));
    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), 1);

    assert_eq!(h.read(b as i32, 6), SyscallReturn::ok(6));
    assert_eq!(h.lseek(a as i32, 0, SEEK_CUR), SyscallReturn::ok(6));

    // Self-duplicate leaves everything as it was.
    assert_eq!(h.call(SYSCALL_DUP2, [a, a, 0, 0, 0, 0]), SyscallReturn::ok(a));
    assert_eq!(h.lseek(a as i32, 0, SEEK_CUR), SyscallReturn::ok(6));
    assert_eq!(h.process.fd_table().lookup(a as i32).unwrap().refcount(), 3);

    assert_eq!(h.call(SYSCALL_DUP2, [a, 20, 0, 0, 0, 0]), SyscallReturn::ok(20));
    assert_eq!(h.call(SYSCALL_DUP2, [9, 20, 0, 0, 0, 0]), fail(Errno::EBADF));
    assert_eq!(h.call(SYSCALL_DUP2, [9, 9, 0, 0, 0, 0]), fail(Errno::EBADF));
    assert_eq!(
        h.call(SYSCALL_DUP2, [a, OPEN_MAX as u64, 0, 0, 0, 0]),
        fail(Errno::EBADF)
    );
    assert_eq!(h.call(SYSCALL_DUP2, [a, u64::MAX, 0, 0, 0, 0]), fail(Errno::EBADF));

    // Closing one alias leaves the others working.
    assert_eq!(h.call(SYSCALL_CLOSE, [a, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.read(20, 1), SyscallReturn::ok(1));
    assert_eq!(h.fs.open_count(b"/etc/motd").unwrap(), 1);
}

#[test]
fn dup_takes_lowest_free_slot() {
    let h = Harness::new();
    assert_eq!(h.call(SYSCALL_CLOSE, [0, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.call(SYSCALL_DUP, [2, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.write(0, b"via dup"), SyscallReturn::ok(7));
    assert_eq!(h.console.device().take_output(), b"via dup");
}

#[test]
fn fstat_copies_out_metadata() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(h.call(SYSCALL_FSTAT, [fd, STAT_AT, 0, 0, 0, 0]), SyscallReturn::ok(0));
    let raw: [u8; Stat::SIZE] = h.arena.peek(STAT_AT, Stat::SIZE).unwrap().try_into().unwrap();
    let st = Stat::from_bytes(&raw);
    assert!(st.is_regular());
    assert_eq!(st.st_size, 13);

    assert_eq!(h.call(SYSCALL_FSTAT, [1, STAT_AT, 0, 0, 0, 0]), SyscallReturn::ok(0));
    let raw: [u8; Stat::SIZE] = h.arena.peek(STAT_AT, Stat::SIZE).unwrap().try_into().unwrap();
    assert!(Stat::from_bytes(&raw).is_char_device());
}

#[test]
fn fstat_checks_descriptor_before_pointer() {
    let h = Harness::new();
    assert_eq!(h.call(SYSCALL_FSTAT, [9, 0, 0, 0, 0, 0]), fail(Errno::EBADF));
    assert_eq!(h.call(SYSCALL_FSTAT, [1, 0, 0, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.call(SYSCALL_FSTAT, [1, UNMAPPED, 0, 0, 0, 0]), fail(Errno::EFAULT));
}

#[test]
fn getdirentry_walks_names_in_order() {
    let h = Harness::new();
    h.fs.write_file(b"/etc/hosts", b"").unwrap();
    let fd = h.open(b"/etc", O_RDONLY).retval as u64;

    let mut names = alloc::vec::Vec::new();
    loop {
        let ret = h.call(SYSCALL_GETDIRENTRY, [fd, BUF_AT, 64, 0, 0, 0]);
        assert!(ret.is_ok());
        if ret.retval == 0 {
            break;
        }
        names.push(h.buf(ret.retval as usize));
    }
    assert_eq!(names, [b"hosts".to_vec(), b"motd".to_vec()]);

    let file = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(
        h.call(SYSCALL_GETDIRENTRY, [file, BUF_AT, 64, 0, 0, 0]),
        fail(Errno::ENOTDIR)
    );
    assert_eq!(h.call(SYSCALL_GETDIRENTRY, [9, BUF_AT, 64, 0, 0, 0]), fail(Errno::EBADF));
}

#[test]
fn chdir_and_getcwd() {
    let h = Harness::new();
    assert_eq!(h.call(SYSCALL_GETCWD, [BUF_AT, 64, 0, 0, 0, 0]), SyscallReturn::ok(1));
    assert_eq!(h.buf(1), b"/");

    let at = h.put_path(b"etc");
    assert_eq!(h.call(SYSCALL_CHDIR, [at, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));
    assert_eq!(h.call(SYSCALL_GETCWD, [BUF_AT, 64, 0, 0, 0, 0]), SyscallReturn::ok(4));
    assert_eq!(h.buf(4), b"/etc");
    assert_eq!(h.call(SYSCALL_GETCWD, [BUF_AT, 2, 0, 0, 0, 0]), SyscallReturn::ok(2));
    assert_eq!(h.call(SYSCALL_GETCWD, [UNMAPPED, 64, 0, 0, 0, 0]), fail(Errno::EFAULT));

    assert_eq!(h.open(b"motd", O_RDONLY), SyscallReturn::ok(3));

    let at = h.put_path(b"motd");
    assert_eq!(h.call(SYSCALL_CHDIR, [at, 0, 0, 0, 0, 0]), fail(Errno::ENOTDIR));
    assert_eq!(h.call(SYSCALL_CHDIR, [0, 0, 0, 0, 0, 0]), fail(Errno::EFAULT));
    assert_eq!(h.process.cwd(), b"/etc");
}

#[test]
fn forked_child_shares_console_offset() {
    let h = Harness::new();
    let fd = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(h.call(SYSCALL_CLOSE, [fd, 0, 0, 0, 0, 0]), SyscallReturn::ok(0));

    let child = h.process.fork(2).unwrap();
    assert!(child.fd_table().is_open(0));
    assert!(child.fd_table().is_open(2));
    assert!(!child.fd_table().is_open(3));
    assert_eq!(h.process.fd_table().lookup(1).unwrap().refcount(), 3);

    h.arena.poke(BUF_AT, b"child").unwrap();
    let ctx = SyscallContext::new(&child, &h.arena, SyscallArgs::new([1, BUF_AT, 5, 0, 0, 0]));
    assert_eq!(syscall_dispatch(&ctx, SYSCALL_WRITE), SyscallReturn::ok(5));
    assert_eq!(h.process.fd_table().lookup(1).unwrap().offset(), 5);
    assert_eq!(h.console.device().take_output(), b"child");

    drop(child);
    assert_eq!(h.process.fd_table().lookup(1).unwrap().refcount(), 2);
}

#[test]
fn console_read_drains_input() {
    let h = Harness::new();
    h.console.device().push_input(b"y\n");
    assert_eq!(h.read(0, 16), SyscallReturn::ok(2));
    assert_eq!(h.buf(2), b"y\n");
    assert_eq!(h.read(0, 16), SyscallReturn::ok(0));
}

#[test]
fn huge_console_write_is_short_not_fatal() {
    let h = Harness::new();
    let mapped = h.arena.end() - BUF_AT;
    let ret = h.call(SYSCALL_WRITE, [1, BUF_AT, 1u64 << 44, 0, 0, 0]);
    assert_eq!(ret, SyscallReturn::ok(mapped));
    assert_eq!(h.console.device().take_output().len() as u64, mapped);
    assert_eq!(h.process.fd_table().lookup(1).unwrap().offset(), mapped);

    let ret = h.call(SYSCALL_WRITE, [1, UNMAPPED, 1u64 << 44, 0, 0, 0]);
    assert_eq!(ret, fail(Errno::EFAULT));
    assert_eq!(h.process.fd_table().lookup(1).unwrap().offset(), mapped);
}

#[test]
fn access_mode_is_reported_before_bad_buffer() {
    let h = Harness::new();
    let ro = h.open(b"/etc/motd", O_RDONLY).retval as u64;
    assert_eq!(h.call(SYSCALL_WRITE, [ro, UNMAPPED, 4, 0, 0, 0]), fail(Errno::EBADF));
    assert_eq!(h.call(SYSCALL_WRITE, [ro, 0, 4, 0, 0, 0]), fail(Errno::EBADF));
    assert_eq!(h.call(SYSCALL_READ, [1, 0, 4, 0, 0, 0]), fail(Errno::EBADF));

    let target = h.open(b"/etc", O_RDONLY).retval as u64;
    assert_eq!(h.call(SYSCALL_DUP2, [1, target, 0, 0, 0, 0]), SyscallReturn::ok(target));
    assert_eq!(
        h.call(SYSCALL_GETDIRENTRY, [target, UNMAPPED, 64, 0, 0, 0]),
        fail(Errno::EBADF)
    );
}
