//! Core module containing fundamental types for live-mirror
//!
//! This module provides the foundational building blocks used throughout
//! the crate: foreign addresses, frame counters and the error taxonomy.

pub mod types;

pub use types::{Address, FrameCounter, ReadFault, RemoteValue, TickError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
