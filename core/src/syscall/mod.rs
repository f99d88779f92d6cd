#[macro_use]
pub mod macros;
pub mod common;
pub mod context;
pub mod dispatch;
pub mod fs;
pub mod handlers;
#[cfg(test)]
mod tests;

pub use common::{SyscallEntry, SyscallHandler, SyscallResult, SyscallReturn};
pub use context::{SyscallArgs, SyscallContext};
pub use dispatch::syscall_dispatch;
pub use handlers::syscall_lookup;
