//! Read-only access to foreign process memory
//!
//! This module provides:
//! - The [`ReadMemory`] source trait implemented by process handles and mocks
//! - Typed reads of plain-old-data values through [`MemoryReader`]
//! - Data-described pointer chains ([`PointerChain`], [`FieldRef`])
//! - An in-memory [`MockMemory`] source with fault injection

pub mod chain;
pub mod mock;
mod reader;

pub use chain::{follow, FieldRef, PointerChain};
pub use mock::MockMemory;
pub use reader::MemoryReader;
pub(crate) use reader::c_string;

use crate::core::types::{Address, RemoteValue};
use serde::{Deserialize, Serialize};

/// A source of foreign memory bytes.
///
/// Implementations fill `buffer` completely or return a [`ReadFault`]
/// describing why they could not. They must never panic on bad addresses and
/// must not hold per-call OS resources past the call.
///
/// [`ReadFault`]: crate::core::types::ReadFault
pub trait ReadMemory {
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> RemoteValue<()>;
}

impl<M: ReadMemory + ?Sized> ReadMemory for &M {
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> RemoteValue<()> {
        (**self).read_bytes(address, buffer)
    }
}

/// Width of pointers stored in the foreign process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PointerWidth {
    #[default]
    Bits32,
    Bits64,
}

impl PointerWidth {
    /// Pointer size in bytes
    pub const fn size(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }

    /// Width of pointers in the current process
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") {
            PointerWidth::Bits64
        } else {
            PointerWidth::Bits32
        }
    }
}

impl TryFrom<u8> for PointerWidth {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(PointerWidth::Bits32),
            64 => Ok(PointerWidth::Bits64),
            other => Err(format!("unsupported pointer width: {other}")),
        }
    }
}

impl From<PointerWidth> for u8 {
    fn from(width: PointerWidth) -> u8 {
        match width {
            PointerWidth::Bits32 => 32,
            PointerWidth::Bits64 => 64,
        }
    }
}
