//! Per-actor record (ACD) of the foreign client

use crate::memory::c_string;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::fmt;

/// Id stored in unused actor table slots
pub const INVALID_ID: u32 = 0xFFFF_FFFF;

/// Actor common data as laid out by the foreign client.
///
/// Copied by value; every bit pattern is a valid record.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ActorCommonData {
    pub id: u32,
    pub name: [u8; 128],
    _unk_084: [u32; 5],
    pub actor_sno: u32,
    pub gb_type: i32,
    pub gb_id: i32,
    pub position: [f32; 3],
    pub radius: f32,
    pub world_sno: u32,
    pub scene_id: u32,
    pub owner_id: u32,
}

const _: () = assert!(std::mem::size_of::<ActorCommonData>() == 0xC0);

impl ActorCommonData {
    /// Size of one record in the foreign table
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds a record, mostly for tests and fixtures
    pub fn new(id: u32, name: &str, actor_sno: u32, position: [f32; 3]) -> Self {
        let mut record = Self::zeroed();
        record.id = id;
        record.actor_sno = actor_sno;
        record.position = position;
        let len = name.len().min(record.name.len() - 1);
        record.name[..len].copy_from_slice(&name.as_bytes()[..len]);
        record
    }

    /// Internal name, up to the first NUL
    pub fn name(&self) -> Cow<'_, str> {
        c_string(&self.name)
    }

    /// False for empty table slots
    pub fn is_live(&self) -> bool {
        self.id != INVALID_ID
    }
}

impl fmt::Debug for ActorCommonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCommonData")
            .field("id", &format_args!("0x{:08X}", self.id))
            .field("name", &self.name())
            .field("actor_sno", &self.actor_sno)
            .field("gb_type", &self.gb_type)
            .field("gb_id", &self.gb_id)
            .field("position", &self.position)
            .field("radius", &self.radius)
            .field("world_sno", &self.world_sno)
            .finish_non_exhaustive()
    }
}
