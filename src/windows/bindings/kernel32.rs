//! Kernel32.dll bindings for opening and reading a process

use crate::windows::utils::ErrorCode;
use std::io;
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::ReadProcessMemory;
use winapi::um::minwinbase::STILL_ACTIVE;
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess};
use winapi::um::winnt::HANDLE;

/// A failed `ReadProcessMemory` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadFailure {
    pub code: ErrorCode,
    /// Bytes copied before the failure
    pub copied: usize,
}

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: u32) -> io::Result<HANDLE> {
    unsafe {
        let handle = OpenProcess(desired_access, FALSE, pid);
        if handle.is_null() {
            Err(io::Error::last_os_error())
        } else {
            Ok(handle)
        }
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle
pub unsafe fn close_handle(handle: HANDLE) -> bool {
    if handle.is_null() {
        return true;
    }
    CloseHandle(handle) != FALSE
}

/// Safe wrapper for ReadProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ` access
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> Result<usize, ReadFailure> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        Err(ReadFailure {
            code: ErrorCode::last_error(),
            copied: bytes_read,
        })
    } else {
        Ok(bytes_read)
    }
}

/// True while the process behind `handle` has not exited
///
/// # Safety
/// The handle must be a valid process handle with query access
pub unsafe fn is_still_active(handle: HANDLE) -> bool {
    let mut code: DWORD = 0;
    GetExitCodeProcess(handle, &mut code) != FALSE && code == STILL_ACTIVE
}
