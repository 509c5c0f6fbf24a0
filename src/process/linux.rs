//! Linux backend over `process_vm_readv`

use crate::core::types::{Address, ProcessError, ProcessId, ReadFault, RemoteValue};
use crate::memory::ReadMemory;
use process_memory::{CopyAddress, Pid, TryIntoProcessHandle};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Read-only handle on a foreign process's address space.
///
/// Each read is a single remote iovec, which the kernel copies whole or not
/// at all, so this backend reports [`ReadFault::Unmapped`] rather than
/// [`ReadFault::Partial`] for ranges running into an unmapped page.
pub struct ProcessHandle {
    pid: ProcessId,
    inner: process_memory::ProcessHandle,
}

impl ProcessHandle {
    /// Open a process for reading memory
    pub fn open_for_read(pid: ProcessId) -> Result<Self, ProcessError> {
        fs::metadata(proc_dir(pid)).map_err(|source| ProcessError::Open { pid, source })?;

        let inner = (pid as Pid)
            .try_into_process_handle()
            .map_err(|source| ProcessError::Open { pid, source })?;
        Ok(ProcessHandle { pid, inner })
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Check whether the process still exists
    pub fn is_alive(&self) -> bool {
        proc_dir(self.pid).exists()
    }

    fn classify(&self, error: &io::Error, address: Address, requested: usize) -> ReadFault {
        match error.raw_os_error() {
            Some(libc::ESRCH) => ReadFault::HandleInvalid,
            Some(libc::EFAULT) => ReadFault::unmapped(address, requested),
            _ if !self.is_alive() => ReadFault::HandleInvalid,
            _ => ReadFault::unmapped(address, requested),
        }
    }
}

fn proc_dir(pid: ProcessId) -> PathBuf {
    PathBuf::from(format!("/proc/{}", pid))
}

impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> RemoteValue<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let requested = buffer.len();
        self.inner
            .copy_address(address.as_usize(), buffer)
            .map_err(|error| self.classify(&error, address, requested))
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={})", self.pid)
    }
}
