//! Windows API layer for the process backend
//!
//! All unsafe FFI calls are contained within this module.

pub mod bindings;
pub mod types;
pub mod utils;
