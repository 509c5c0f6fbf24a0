//! live-mirror: frame-synchronized snapshots of a foreign process's live state
//!
//! The crate reads another process's memory without its cooperation, detects
//! when the observed process has advanced to a new frame, follows pointer
//! chains to its actor table and copies the table into owned snapshots that
//! other threads can read while the next frame is being taken.

pub mod address;
pub mod config;
pub mod core;
pub mod engine;
pub mod game;
pub mod memory;
pub mod mesh;
pub mod process;
#[cfg(windows)]
pub mod windows;

// Re-export main types from core module
pub use core::types::{
    Address, ChainBroken, ChainError, FrameCounter, NotConfigured, ProcessId, ReadFault,
    RemoteValue, TickError,
};

pub use address::{AddressTable, Location};
pub use engine::{Engine, EngineSettings, EngineView, EntitySnapshot, Health, TickOutcome};
pub use memory::{MemoryReader, MockMemory, PointerWidth, ReadMemory};
pub use mesh::{CellMeshBuilder, MeshBuilder, SpatialMesh};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_module_accessible() {
        assert_eq!(core::VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_address_reexport() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.as_usize(), 0x1000);
        assert!(Address::null().is_null());
    }
}
