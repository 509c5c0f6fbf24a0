//! Bounded copies of the foreign entity table
//!
//! The table header holds a signed element count (and optionally a declared
//! capacity) plus a pointer to the records. Records are either stored inline
//! at a fixed stride or reached through an array of record pointers.

use crate::core::types::{Address, FrameCounter, RemoteValue};
use crate::game::ActorCommonData;
use crate::memory::{MemoryReader, ReadMemory};
use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use std::slice;
use tracing::debug;

/// How records hang off the table's data pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStorage {
    /// Records stored back to back, `stride` bytes apart
    #[default]
    Contiguous,
    /// The data pointer leads to an array of record pointers
    Indirect,
}

/// Field offsets of a foreign table header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Declared capacity field, when the table has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_offset: Option<usize>,
    pub count_offset: usize,
    /// Offset of the pointer to the record storage
    pub data_offset: usize,
    /// Distance between inline records
    pub stride: usize,
    pub storage: TableStorage,
}

/// The actor container of the known build
impl Default for TableLayout {
    fn default() -> Self {
        TableLayout {
            capacity_offset: Some(0x100),
            count_offset: 0x108,
            data_offset: 0x148,
            stride: 0x180,
            storage: TableStorage::Contiguous,
        }
    }
}

/// Clamps a raw foreign element count into `0..=capacity`
pub fn clamp_count(raw: i32, capacity: usize) -> usize {
    usize::try_from(raw).map_or(0, |count| count.min(capacity))
}

/// Copies up to `capacity` records out of the table at `table`.
///
/// The result is built completely before it is returned; any failed read
/// fails the whole copy.
pub fn snapshot<T: Pod, M: ReadMemory + ?Sized>(
    reader: &MemoryReader<'_, M>,
    table: Address,
    layout: &TableLayout,
    capacity: usize,
) -> RemoteValue<Vec<T>> {
    let raw = reader.read::<i32>(table + layout.count_offset)?;

    let mut limit = capacity;
    if let Some(offset) = layout.capacity_offset {
        let declared = reader.read::<i32>(table + offset)?;
        limit = clamp_count(declared, limit);
    }

    let count = clamp_count(raw, limit);
    if i64::from(raw) != count as i64 {
        debug!(raw, count, limit, %table, "entity count clamped");
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let data = reader.read_pointer(table + layout.data_offset)?;
    match layout.storage {
        TableStorage::Contiguous => reader.read_strided(data, count, layout.stride),
        TableStorage::Indirect => reader
            .read_pointers(data, count)?
            .into_iter()
            .filter(|record| !record.is_null())
            .map(|record| reader.read::<T>(record))
            .collect(),
    }
}

/// An owned copy of the entity table taken at one frame
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot<T = ActorCommonData> {
    frame: Option<FrameCounter>,
    records: Vec<T>,
}

impl<T> Default for EntitySnapshot<T> {
    fn default() -> Self {
        EntitySnapshot {
            frame: None,
            records: Vec::new(),
        }
    }
}

impl<T> EntitySnapshot<T> {
    pub fn new(frame: FrameCounter, records: Vec<T>) -> Self {
        EntitySnapshot {
            frame: Some(frame),
            records,
        }
    }

    /// An empty snapshot that was never taken
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frame the snapshot was taken at
    pub fn frame(&self) -> Option<FrameCounter> {
        self.frame
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.records.iter()
    }
}

impl EntitySnapshot<ActorCommonData> {
    /// Records of occupied table slots
    pub fn live(&self) -> impl Iterator<Item = &ActorCommonData> + '_ {
        self.records.iter().filter(|record| record.is_live())
    }

    pub fn find(&self, id: u32) -> Option<&ActorCommonData> {
        self.live().find(|record| record.id == id)
    }
}

impl<'a, T> IntoIterator for &'a EntitySnapshot<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
