//! Cooldown-gated rebuilds of the spatial mesh
//!
//! The mesh is derived from a raw geometry block in the foreign process. It
//! changes rarely and is expensive to rebuild, so rebuilds are attempted on a
//! wall-clock cooldown rather than every frame.

mod builder;

pub use builder::{CellMeshBuilder, MeshBuilder, NavCell, SpatialMesh, CELL_WALKABLE};

use crate::address::{AddressTable, Location};
use crate::core::types::MeshError;
use crate::memory::{MemoryReader, PointerChain, ReadMemory};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

/// Where the raw geometry block lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySource {
    /// Chain to the geometry block header
    pub chain: PointerChain,
    /// Byte size field inside the header
    pub size_offset: usize,
    /// Data pointer field inside the header
    pub data_offset: usize,
}

impl Default for GeometrySource {
    fn default() -> Self {
        GeometrySource {
            chain: PointerChain::new(Location::SnoGroups, &[0x0, 0x18]),
            size_offset: 0x8,
            data_offset: 0xC,
        }
    }
}

/// Copies the raw geometry block, refusing blocks above `limit` bytes
pub fn read_geometry<M: ReadMemory + ?Sized>(
    reader: &MemoryReader<'_, M>,
    table: &AddressTable,
    source: &GeometrySource,
    limit: usize,
) -> Result<Vec<u8>, MeshError> {
    let header = source.chain.resolve(reader, table)?;
    let size = reader.read::<u32>(header + source.size_offset)? as usize;
    if size > limit {
        return Err(MeshError::Oversized { size, limit });
    }
    if size == 0 {
        return Ok(Vec::new());
    }

    let data = reader.read_pointer(header + source.data_offset)?;
    trace!(%data, size, "reading geometry block");
    Ok(reader.read_raw(data, size)?)
}

/// Decides when the next mesh rebuild may run.
///
/// Gating is on the last attempt, successful or not, so a failing rebuild is
/// retried only after a full cooldown.
#[derive(Debug, Clone)]
pub struct MeshScheduler {
    cooldown: Duration,
    last_attempt: Option<Instant>,
    last_success: Option<Instant>,
}

impl MeshScheduler {
    pub fn new(cooldown: Duration) -> Self {
        MeshScheduler {
            cooldown,
            last_attempt: None,
            last_success: None,
        }
    }

    pub fn should_rebuild(&self, now: Instant) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        }
    }

    /// Runs `rebuild` if the cooldown has elapsed; `None` when skipped
    pub fn maybe_rebuild<T, E>(
        &mut self,
        now: Instant,
        rebuild: impl FnOnce() -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        if !self.should_rebuild(now) {
            return None;
        }

        self.last_attempt = Some(now);
        let result = rebuild();
        if result.is_ok() {
            self.last_success = Some(now);
        }
        Some(result)
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    /// Forgets both timestamps so the next call rebuilds
    pub fn reset(&mut self) {
        self.last_attempt = None;
        self.last_success = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::PREFERRED_IMAGE_BASE;
    use crate::core::types::{Address, ReadFault};
    use crate::memory::{MockMemory, PointerWidth};

    const COOLDOWN: Duration = Duration::from_millis(3000);

    #[test]
    fn test_first_call_rebuilds() {
        let mut scheduler = MeshScheduler::new(COOLDOWN);
        let now = Instant::now();
        assert_eq!(scheduler.maybe_rebuild(now, || Ok::<_, ()>(1)), Some(Ok(1)));
        assert_eq!(scheduler.last_success(), Some(now));
    }

    #[test]
    fn test_cooldown_gates_rebuilds() {
        let mut scheduler = MeshScheduler::new(COOLDOWN);
        let start = Instant::now();
        scheduler.maybe_rebuild(start, || Ok::<_, ()>(()));

        assert!(scheduler
            .maybe_rebuild(start + Duration::from_millis(2999), || Ok::<_, ()>(()))
            .is_none());
        assert!(scheduler
            .maybe_rebuild(start + COOLDOWN, || Ok::<_, ()>(()))
            .is_some());
    }

    #[test]
    fn test_failure_waits_full_cooldown() {
        let mut scheduler = MeshScheduler::new(COOLDOWN);
        let start = Instant::now();
        scheduler.maybe_rebuild(start, || Ok::<_, ()>(()));

        let failed_at = start + COOLDOWN;
        assert_eq!(scheduler.maybe_rebuild(failed_at, || Err::<(), _>("boom")), Some(Err("boom")));
        assert_eq!(scheduler.last_attempt(), Some(failed_at));
        assert_eq!(scheduler.last_success(), Some(start));

        assert!(!scheduler.should_rebuild(failed_at + Duration::from_millis(100)));
        assert!(scheduler.should_rebuild(failed_at + COOLDOWN));
    }

    #[test]
    fn test_read_geometry() {
        let memory = MockMemory::new();
        let table = AddressTable::new("test", PREFERRED_IMAGE_BASE)
            .with(Location::SnoGroups, Address::new(0x100));
        memory.write(Address::new(0x100), 0x2000u32);
        memory.write(Address::new(0x2018), 0x3000u32);
        memory.write(Address::new(0x3008), 4u32);
        memory.write(Address::new(0x300C), 0x4000u32);
        memory.write_bytes(Address::new(0x4000), &[1, 2, 3, 4]);

        let reader = MemoryReader::new(&memory, PointerWidth::Bits32);
        let source = GeometrySource::default();
        assert_eq!(read_geometry(&reader, &table, &source, 16), Ok(vec![1, 2, 3, 4]));
        assert_eq!(
            read_geometry(&reader, &table, &source, 2),
            Err(MeshError::Oversized { size: 4, limit: 2 })
        );

        memory.write(Address::new(0x300C), 0x5000u32);
        assert_eq!(
            read_geometry(&reader, &table, &source, 16),
            Err(MeshError::Fault(ReadFault::unmapped(Address::new(0x5000), 4)))
        );
    }
}
