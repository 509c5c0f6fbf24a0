//! A mock image of the observed client laid out like the known build

#![allow(dead_code)]

use live_mirror::address::{AddressTable, Location};
use live_mirror::engine::{Engine, EngineSettings};
use live_mirror::game::{ActorCommonData, LocalDataHeader};
use live_mirror::memory::MockMemory;
use live_mirror::mesh::{CellMeshBuilder, NavCell, CELL_WALKABLE};
use live_mirror::Address;

pub const OBJECT_MANAGER: Address = Address::new(0x0800_0000);
pub const FRAME_COUNTER: Address = Address::new(0x0800_0038);
pub const ACD_MANAGER: Address = Address::new(0x0810_0000);
pub const CONTAINER: Address = Address::new(0x0820_0000);
pub const RECORDS: Address = Address::new(0x0900_0000);
pub const LEVEL_AREA: Address = Address::new(0x0A00_0000);
pub const SNO_GROUPS: Address = Address::new(0x0B00_0000);
pub const GEOMETRY_HEADER: Address = Address::new(0x0B10_0000);
pub const GEOMETRY_DATA: Address = Address::new(0x0B20_0000);

pub const STRIDE: usize = 0x180;
pub const LEVEL_AREA_SNO: u32 = 19947;
pub const LEVEL_AREA_NAME: &str = "New Tristram";
pub const ACT_ID: i32 = 1;
pub const APPLICATION_LOOP_COUNT: u32 = 48_213;

/// Mock client memory plus the address table the engine resolves against
pub struct GameImage {
    pub memory: MockMemory,
    pub table: AddressTable,
}

impl GameImage {
    /// An in-game client with an empty actor table and a one-cell mesh
    pub fn new() -> Self {
        let image = GameImage {
            memory: MockMemory::new(),
            table: AddressTable::known_build().clone(),
        };

        image.set_in_game(true);
        image.ptr(Location::ObjectManager, OBJECT_MANAGER);
        image.memory.write(OBJECT_MANAGER + 0x7D4, ACD_MANAGER.as_usize() as u32);
        image.memory.write(ACD_MANAGER, CONTAINER.as_usize() as u32);
        image.memory.write(CONTAINER + 0x100, 8192i32);
        image.memory.write(CONTAINER + 0x148, RECORDS.as_usize() as u32);
        image.set_frame(0);
        image.set_actors(&[]);

        image.ptr(Location::LevelArea, LEVEL_AREA);
        image.memory.write(LEVEL_AREA + 0x44, LEVEL_AREA_SNO);
        image.set_level_area_name(LEVEL_AREA_NAME);
        image.memory.write(image.at(Location::MapActId), ACT_ID);
        image
            .memory
            .write(image.at(Location::ApplicationLoopCount), APPLICATION_LOOP_COUNT);

        image.ptr(Location::SnoGroups, SNO_GROUPS);
        image.memory.write(SNO_GROUPS + 0x18, GEOMETRY_HEADER.as_usize() as u32);
        image.memory.write(GEOMETRY_HEADER + 0xC, GEOMETRY_DATA.as_usize() as u32);
        image.set_geometry(&[cell(0.0, 0.0, 10.0, 10.0)]);

        image
    }

    pub fn at(&self, location: Location) -> Address {
        self.table.resolve(location).unwrap()
    }

    fn ptr(&self, location: Location, target: Address) {
        self.memory.write(self.at(location), target.as_usize() as u32);
    }

    pub fn set_in_game(&self, in_game: bool) {
        let mut header = LocalDataHeader::in_game(71150, 19947, [100.0, 200.0, 0.0]);
        if !in_game {
            header.is_player_valid = 0;
        }
        self.memory.write(self.at(Location::LocalData), header);
    }

    pub fn set_frame(&self, frame: u32) {
        self.memory.write(FRAME_COUNTER, frame);
    }

    /// Rewrites the table contents and count
    pub fn set_actors(&self, actors: &[ActorCommonData]) {
        self.memory.write(CONTAINER + 0x108, actors.len() as i32);
        self.memory.map(RECORDS, actors.len().max(1) * STRIDE);
        for (index, actor) in actors.iter().enumerate() {
            self.memory.write(RECORDS + index * STRIDE, *actor);
        }
    }

    pub fn set_level_area_name(&self, name: &str) {
        let mut bytes = [0u8; 128];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        self.memory.write(self.at(Location::LevelAreaName), bytes);
    }

    pub fn set_geometry(&self, cells: &[NavCell]) {
        let raw: &[u8] = bytemuck::cast_slice(cells);
        self.memory.write(GEOMETRY_HEADER + 0x8, raw.len() as u32);
        self.memory.write_bytes(GEOMETRY_DATA, raw);
    }

    /// Zeroes the ACD manager's container link
    pub fn break_actor_chain(&self) {
        self.memory.write(ACD_MANAGER, 0u32);
    }

    pub fn repair_actor_chain(&self) {
        self.memory.write(ACD_MANAGER, CONTAINER.as_usize() as u32);
    }

    pub fn engine(&self) -> Engine<'_, MockMemory> {
        self.engine_with(EngineSettings::default())
    }

    pub fn engine_with(&self, settings: EngineSettings) -> Engine<'_, MockMemory> {
        Engine::new(&self.memory, &self.table, settings, CellMeshBuilder)
    }
}

pub fn actor(id: u32, name: &str) -> ActorCommonData {
    ActorCommonData::new(id, name, 1000 + id, [id as f32, 0.0, 0.0])
}

pub fn cell(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> NavCell {
    NavCell {
        min: [min_x, min_y, 0.0],
        max: [max_x, max_y, 0.0],
        flags: CELL_WALKABLE,
    }
}
