//! Local player data

use crate::core::types::FrameCounter;
use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// Fixed head of the foreign local-data block
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LocalDataHeader {
    pub is_start_up_game: u32,
    pub is_player_valid: u32,
    _unk_08: u32,
    pub world_sno: u32,
    pub area_sno: u32,
    pub scene_sno: u32,
    pub position: [f32; 3],
}

impl LocalDataHeader {
    /// In game iff the client finished starting a game and has a valid player
    pub fn is_in_game(&self) -> bool {
        self.is_start_up_game != 0 && self.is_player_valid != 0
    }

    /// Builds an in-game header, mostly for tests and fixtures
    pub fn in_game(world_sno: u32, area_sno: u32, position: [f32; 3]) -> Self {
        LocalDataHeader {
            is_start_up_game: 1,
            is_player_valid: 1,
            world_sno,
            area_sno,
            position,
            ..Self::zeroed()
        }
    }
}

/// Owned local data published alongside each entity snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocalData {
    /// Frame the data was read at; `None` before the first refresh
    pub frame: Option<FrameCounter>,
    pub in_game: bool,
    pub world_sno: u32,
    pub area_sno: u32,
    pub scene_sno: u32,
    pub position: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_area_sno: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_area_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_loop_count: Option<u32>,
}

impl LocalData {
    pub fn from_header(header: &LocalDataHeader, frame: FrameCounter) -> Self {
        LocalData {
            frame: Some(frame),
            in_game: header.is_in_game(),
            world_sno: header.world_sno,
            area_sno: header.area_sno,
            scene_sno: header.scene_sno,
            position: header.position,
            ..Self::default()
        }
    }
}
