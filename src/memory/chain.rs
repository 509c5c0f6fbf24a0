//! Pointer chains described as data
//!
//! A chain starts at a base address and, for every step, reads a pointer at
//! `current + offset` and moves to it. A zero link is an expected transient
//! (the foreign structure is not built yet), so it breaks the chain without
//! being treated as corruption. Retrying is the caller's business.

use super::{MemoryReader, ReadMemory};
use crate::address::{AddressTable, Location};
use crate::core::types::{Address, BreakCause, ChainBroken, ChainError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Walks `steps` from `base`, returning the final dereferenced address
pub fn follow<M: ReadMemory + ?Sized>(
    reader: &MemoryReader<'_, M>,
    base: Address,
    steps: &[usize],
) -> Result<Address, ChainBroken> {
    let mut current = base;

    for (step, &offset) in steps.iter().enumerate() {
        let address = current + offset;
        let next = reader.read_pointer(address).map_err(|fault| {
            trace!(step, %address, %fault, "pointer chain link unreadable");
            ChainBroken {
                step,
                address,
                cause: BreakCause::Fault(fault),
            }
        })?;

        if next.is_null() {
            trace!(step, %address, "pointer chain link is null");
            return Err(ChainBroken {
                step,
                address,
                cause: BreakCause::NullPointer,
            });
        }

        current = next;
    }

    Ok(current)
}

/// A chain rooted at a named location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerChain {
    pub base: Location,
    #[serde(default)]
    pub steps: Vec<usize>,
}

impl PointerChain {
    pub fn new(base: Location, steps: &[usize]) -> Self {
        PointerChain {
            base,
            steps: steps.to_vec(),
        }
    }

    /// Resolves the base through `table` and follows the chain
    pub fn resolve<M: ReadMemory + ?Sized>(
        &self,
        reader: &MemoryReader<'_, M>,
        table: &AddressTable,
    ) -> Result<Address, ChainError> {
        let base = table.resolve(self.base)?;
        Ok(follow(reader, base, &self.steps)?)
    }
}

/// A field at a fixed offset inside the structure a chain leads to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub chain: PointerChain,
    #[serde(default)]
    pub offset: usize,
}

impl FieldRef {
    pub fn new(chain: PointerChain, offset: usize) -> Self {
        FieldRef { chain, offset }
    }

    /// Address of the field; the field itself is not read
    pub fn locate<M: ReadMemory + ?Sized>(
        &self,
        reader: &MemoryReader<'_, M>,
        table: &AddressTable,
    ) -> Result<Address, ChainError> {
        Ok(self.chain.resolve(reader, table)? + self.offset)
    }
}
