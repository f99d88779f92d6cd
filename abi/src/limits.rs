//! Compile-time limits shared by the kernel and userland.

/// Maximum number of open descriptors per process.
pub const OPEN_MAX: usize = 128;

/// Maximum path length including the terminating NUL.
pub const PATH_MAX: usize = 1024;

/// Maximum length of a single path component.
pub const NAME_MAX: usize = 255;

/// Maximum total bytes of exec arguments, strings and pointer array included.
pub const ARG_MAX: usize = 64 * 1024;

/// Maximum number of exec arguments.
pub const EXEC_MAX_ARGS: usize = 64;

/// Descriptor numbers bootstrapped for every new process.
pub const STDIN_FILENO: usize = 0;
pub const STDOUT_FILENO: usize = 1;
pub const STDERR_FILENO: usize = 2;
