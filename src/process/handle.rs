//! Safe process handle wrapper with RAII semantics

use crate::core::types::{Address, ProcessError, ProcessId, ReadFault, RemoteValue};
use crate::memory::ReadMemory;
use crate::windows::bindings::kernel32::{self, ReadFailure};
use crate::windows::types::Handle;
use crate::windows::utils::ErrorCode;
use std::fmt;

/// Access rights for process handles
#[derive(Debug, Clone, Copy)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Limited query access, enough for the exit code
    pub const QUERY_LIMITED_INFORMATION: Self = Self { value: 0x1000 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        for right in rights {
            value |= right.value;
        }
        Self { value }
    }

    /// Get raw value
    pub fn value(&self) -> u32 {
        self.value
    }
}

/// Read-only handle on a foreign process, closed on drop
pub struct ProcessHandle {
    handle: Handle,
    pid: ProcessId,
}

impl ProcessHandle {
    /// Open a process with specified access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> Result<Self, ProcessError> {
        let raw_handle = kernel32::open_process(pid, access.value())
            .map_err(|source| ProcessError::Open { pid, source })?;
        Ok(ProcessHandle {
            handle: Handle::new(raw_handle),
            pid,
        })
    }

    /// Open a process for reading memory
    pub fn open_for_read(pid: ProcessId) -> Result<Self, ProcessError> {
        Self::open(
            pid,
            ProcessAccess::combine(&[
                ProcessAccess::QUERY_LIMITED_INFORMATION,
                ProcessAccess::VM_READ,
            ]),
        )
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Check if handle is valid
    pub fn is_valid(&self) -> bool {
        !self.handle.is_null()
    }

    /// Check whether the process is still running
    pub fn is_alive(&self) -> bool {
        self.is_valid() && unsafe { kernel32::is_still_active(self.handle.raw()) }
    }

    fn classify(&self, failure: ReadFailure, address: Address, requested: usize) -> ReadFault {
        if !self.is_alive() {
            return ReadFault::HandleInvalid;
        }
        match failure.code {
            ErrorCode::InvalidHandle => ReadFault::HandleInvalid,
            ErrorCode::PartialCopy if failure.copied > 0 => {
                ReadFault::partial(address, requested, failure.copied)
            }
            _ => ReadFault::unmapped(address, requested),
        }
    }
}

impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> RemoteValue<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        if !self.is_valid() {
            return Err(ReadFault::HandleInvalid);
        }

        let requested = buffer.len();
        match unsafe { kernel32::read_process_memory(self.handle.raw(), address.as_usize(), buffer) } {
            Ok(copied) if copied == requested => Ok(()),
            Ok(copied) => Err(ReadFault::partial(address, requested, copied)),
            Err(failure) => Err(self.classify(failure, address, requested)),
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessHandle(pid={}, valid={})",
            self.pid,
            self.is_valid()
        )
    }
}
