//! Core type definitions for live-mirror
//!
//! Foreign addresses and the error types shared by every component.

mod address;
mod error;

pub use address::Address;
pub use error::{
    BreakCause, ChainBroken, ChainError, DecodeError, MeshError, NotConfigured,
    ParseAddressError, ProcessError, ReadFault, RemoteValue, TickError,
};

// Common type aliases
pub type ProcessId = u32;
pub type Offset = usize;

/// Update-step index maintained by the foreign process
pub type FrameCounter = u32;
