//! Where things live inside the foreign client's structures
//!
//! Defaults describe the known build; every value can be overridden from the
//! `[layout]` section of the configuration file.

use crate::address::Location;
use crate::engine::snapshot::TableLayout;
use crate::memory::{FieldRef, PointerChain};
use crate::mesh::GeometrySource;
use serde::{Deserialize, Serialize};

/// Chains and offsets used by one engine tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectLayout {
    /// The foreign frame counter inside the object manager
    pub frame_counter: FieldRef,
    /// Head of the local-data block
    pub local_data: FieldRef,
    /// Chain to the actor table container
    pub actor_table: PointerChain,
    pub table: TableLayout,
    /// Current level-area sno id
    pub level_area: FieldRef,
    pub level_area_name: FieldRef,
    pub level_area_name_len: usize,
    pub act_id: FieldRef,
    /// Client main-loop iteration count
    pub application_loop_count: FieldRef,
    pub geometry: GeometrySource,
}

impl Default for ObjectLayout {
    fn default() -> Self {
        ObjectLayout {
            frame_counter: FieldRef::new(PointerChain::new(Location::ObjectManager, &[0x0]), 0x38),
            local_data: FieldRef::new(PointerChain::new(Location::LocalData, &[]), 0x0),
            actor_table: PointerChain::new(Location::ObjectManager, &[0x0, 0x7D4, 0x0]),
            table: TableLayout::default(),
            level_area: FieldRef::new(PointerChain::new(Location::LevelArea, &[0x0]), 0x44),
            level_area_name: FieldRef::new(PointerChain::new(Location::LevelAreaName, &[]), 0x0),
            level_area_name_len: 128,
            act_id: FieldRef::new(PointerChain::new(Location::MapActId, &[]), 0x0),
            application_loop_count: FieldRef::new(
                PointerChain::new(Location::ApplicationLoopCount, &[]),
                0x0,
            ),
            geometry: GeometrySource::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::TableStorage;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let layout: ObjectLayout = toml::from_str(
            r#"
            level_area_name_len = 64

            [table]
            stride = 256
            storage = "indirect"
            "#,
        )
        .unwrap();

        assert_eq!(layout.level_area_name_len, 64);
        assert_eq!(layout.table.stride, 256);
        assert_eq!(layout.table.storage, TableStorage::Indirect);
        assert_eq!(layout.table.count_offset, 0x108);
        assert_eq!(layout.frame_counter, ObjectLayout::default().frame_counter);
    }
}
