//! In-memory address space standing in for a foreign process
//!
//! Used by unit tests, integration tests and benchmarks. Bytes live in sparse
//! regions; reads outside them fault the way a real process would, and a few
//! knobs inject the failures the engine has to survive.

use super::ReadMemory;
use crate::core::types::{Address, ReadFault, RemoteValue};
use bytemuck::Pod;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct Space {
    /// Region start -> bytes; regions never overlap or touch
    regions: BTreeMap<usize, Vec<u8>>,
    faults: Vec<Range<usize>>,
}

impl Space {
    fn splice(&mut self, start: usize, len: usize, data: Option<&[u8]>) {
        let end = start.saturating_add(len);

        let touching: Vec<usize> = self
            .regions
            .range(..=end)
            .filter(|(region_start, bytes)| *region_start + bytes.len() >= start)
            .map(|(region_start, _)| *region_start)
            .collect();

        let mut merged_start = start;
        let mut merged_end = end;
        for region_start in &touching {
            let region_end = region_start + self.regions[region_start].len();
            merged_start = merged_start.min(*region_start);
            merged_end = merged_end.max(region_end);
        }

        let mut merged = vec![0u8; merged_end - merged_start];
        for region_start in touching {
            if let Some(bytes) = self.regions.remove(&region_start) {
                let at = region_start - merged_start;
                merged[at..at + bytes.len()].copy_from_slice(&bytes);
            }
        }
        if let Some(data) = data {
            let at = start - merged_start;
            merged[at..at + data.len()].copy_from_slice(data);
        }

        self.regions.insert(merged_start, merged);
    }

    fn faulted(&self, start: usize, end: usize) -> bool {
        self.faults
            .iter()
            .any(|fault| fault.start < end && start < fault.end)
    }
}

/// Sparse mock of a foreign address space.
///
/// All mutation goes through `&self`, so a test can keep writing while an
/// engine holds a shared borrow.
#[derive(Debug)]
pub struct MockMemory {
    space: RwLock<Space>,
    reads: Mutex<HashMap<Address, usize>>,
    total_reads: AtomicUsize,
    alive: AtomicBool,
}

impl Default for MockMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMemory {
    pub fn new() -> Self {
        MockMemory {
            space: RwLock::new(Space::default()),
            reads: Mutex::new(HashMap::new()),
            total_reads: AtomicUsize::new(0),
            alive: AtomicBool::new(true),
        }
    }

    /// Writes raw bytes, mapping the range if needed
    pub fn write_bytes(&self, address: Address, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.space
            .write()
            .splice(address.as_usize(), data.len(), Some(data));
    }

    /// Writes a plain-old-data value (or array of them) in native byte order
    pub fn write<T: Pod>(&self, address: Address, value: T) {
        self.write_bytes(address, bytemuck::bytes_of(&value));
    }

    /// Writes a slice of plain-old-data values back to back
    pub fn write_slice<T: Pod>(&self, address: Address, values: &[T]) {
        self.write_bytes(address, bytemuck::cast_slice(values));
    }

    /// Maps a zero-filled range, keeping any bytes already there
    pub fn map(&self, address: Address, len: usize) {
        if len == 0 {
            return;
        }
        self.space.write().splice(address.as_usize(), len, None);
    }

    /// Makes a range unreadable without discarding its contents
    pub fn unmap(&self, address: Address, len: usize) {
        let start = address.as_usize();
        self.space
            .write()
            .faults
            .push(start..start.saturating_add(len));
    }

    /// Makes every range unmapped through [`unmap`](Self::unmap) readable again
    pub fn clear_faults(&self) {
        self.space.write().faults.clear();
    }

    /// Simulates the foreign process exiting
    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn revive(&self) {
        self.alive.store(true, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Number of reads that started exactly at `address`
    pub fn reads_at(&self, address: Address) -> usize {
        self.reads.lock().get(&address).copied().unwrap_or(0)
    }

    /// Number of reads attempted since creation or the last reset
    pub fn total_reads(&self) -> usize {
        self.total_reads.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.reads.lock().clear();
        self.total_reads.store(0, Ordering::SeqCst);
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: Address, buffer: &mut [u8]) -> RemoteValue<()> {
        if !self.is_alive() {
            return Err(ReadFault::HandleInvalid);
        }
        if buffer.is_empty() {
            return Ok(());
        }

        self.total_reads.fetch_add(1, Ordering::SeqCst);
        *self.reads.lock().entry(address).or_insert(0) += 1;

        let len = buffer.len();
        let start = address.as_usize();
        let end = start.saturating_add(len);
        let space = self.space.read();

        if space.faulted(start, end) {
            return Err(ReadFault::unmapped(address, len));
        }

        let region = space
            .regions
            .range(..=start)
            .next_back()
            .filter(|(region_start, bytes)| start < *region_start + bytes.len());

        let Some((region_start, bytes)) = region else {
            return Err(ReadFault::unmapped(address, len));
        };

        let from = start - region_start;
        let available = (bytes.len() - from).min(len);
        buffer[..available].copy_from_slice(&bytes[from..from + available]);

        if available < len {
            return Err(ReadFault::partial(address, len, available));
        }
        Ok(())
    }
}
