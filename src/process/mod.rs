//! Read handles on a foreign process
//!
//! Each platform backend exposes a `ProcessHandle` implementing
//! [`ReadMemory`](crate::memory::ReadMemory). Handles are opened by pid; how
//! the pid is found is the caller's concern.

#[cfg(windows)]
mod handle;
#[cfg(target_os = "linux")]
mod linux;

#[cfg(windows)]
pub use handle::{ProcessAccess, ProcessHandle};
#[cfg(target_os = "linux")]
pub use linux::ProcessHandle;

/// True when this build has a process backend
pub const fn is_supported() -> bool {
    cfg!(any(windows, target_os = "linux"))
}
