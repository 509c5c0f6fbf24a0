//! Decoding raw geometry into a spatial mesh

use crate::core::types::DecodeError;
use bytemuck::{Pod, Zeroable};
use std::mem;

/// Turns a raw geometry block into a mesh.
///
/// The engine calls this from its own thread between ticks; the result is
/// published wholesale, so builders never see partially-read input.
pub trait MeshBuilder {
    type Mesh: Default;

    fn build(&self, raw: &[u8]) -> Result<Self::Mesh, DecodeError>;
}

/// Cell may be walked on
pub const CELL_WALKABLE: u32 = 0x1;

/// One axis-aligned navigation cell, as packed in the geometry block
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct NavCell {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub flags: u32,
}

impl NavCell {
    pub const SIZE: usize = mem::size_of::<Self>();

    pub fn is_walkable(&self) -> bool {
        self.flags & CELL_WALKABLE != 0
    }

    /// True when `(x, y)` lies inside the cell's footprint, edges included
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }
}

const _: () = assert!(NavCell::SIZE == 28);

/// Navigation cells of the current world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialMesh {
    pub cells: Vec<NavCell>,
}

impl SpatialMesh {
    pub fn walkable(&self) -> impl Iterator<Item = &NavCell> + '_ {
        self.cells.iter().filter(|cell| cell.is_walkable())
    }

    /// First walkable cell covering `(x, y)`
    pub fn cell_at(&self, x: f32, y: f32) -> Option<&NavCell> {
        self.walkable().find(|cell| cell.contains(x, y))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Decodes a tightly packed array of [`NavCell`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeshBuilder;

impl MeshBuilder for CellMeshBuilder {
    type Mesh = SpatialMesh;

    fn build(&self, raw: &[u8]) -> Result<SpatialMesh, DecodeError> {
        if raw.len() % NavCell::SIZE != 0 {
            return Err(DecodeError::new(format!(
                "{} bytes is not a whole number of {}-byte cells",
                raw.len(),
                NavCell::SIZE
            )));
        }

        let cells = raw
            .chunks_exact(NavCell::SIZE)
            .map(bytemuck::pod_read_unaligned::<NavCell>)
            .collect();
        Ok(SpatialMesh { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(min: [f32; 2], max: [f32; 2], flags: u32) -> NavCell {
        NavCell {
            min: [min[0], min[1], 0.0],
            max: [max[0], max[1], 10.0],
            flags,
        }
    }

    #[test]
    fn test_build_and_query() {
        let cells = [
            cell([0.0, 0.0], [10.0, 10.0], 0),
            cell([0.0, 0.0], [10.0, 10.0], CELL_WALKABLE),
            cell([10.0, 0.0], [20.0, 10.0], CELL_WALKABLE),
        ];
        let mesh = CellMeshBuilder.build(bytemuck::cast_slice(&cells)).unwrap();

        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.walkable().count(), 2);
        assert_eq!(mesh.cell_at(5.0, 5.0), Some(&cells[1]));
        assert_eq!(mesh.cell_at(15.0, 5.0), Some(&cells[2]));
        assert_eq!(mesh.cell_at(25.0, 5.0), None);
    }

    #[test]
    fn test_empty_input_is_empty_mesh() {
        let mesh = CellMeshBuilder.build(&[]).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_truncated_input_rejected() {
        let error = CellMeshBuilder.build(&[0u8; 30]).unwrap_err();
        assert!(error.to_string().contains("30 bytes"));
    }
}
