//! Owned HANDLE closed on drop

use crate::windows::bindings::kernel32;
use std::ptr;
use winapi::um::winnt::HANDLE;

/// Owned Windows HANDLE
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    pub fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Borrow the raw handle; it stays owned by `self`
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                kernel32::close_handle(self.handle);
            }
        }
    }
}

// HANDLEs are process-local values
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        let handle = Handle::null();
        assert!(handle.is_null());
        assert_eq!(handle.raw(), ptr::null_mut());
    }
}
