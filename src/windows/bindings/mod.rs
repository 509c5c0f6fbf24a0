//! Windows API bindings
//!
//! Low-level FFI bindings to Windows system libraries.

pub mod kernel32;
