//! Voxel texture contents.
//!
//! The kernel reads blocks from a two-channel 3D texture: channel 0 holds
//! the type id of solid blocks, channel 1 the type id of liquids. A texel
//! never has both channels set.

use ndshape::{RuntimeShape, Shape};
use terravox_core::{BlockError, FaceLookupTable};
use terravox_procedural::{BlockGrid, GridDims};

use crate::error::MeshResult;

/// Channel pair of one voxel: `[solid, liquid]`.
pub type Texel = [u32; 2];

/// Texel data for one chunk, x fastest, then y, then z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelTexels {
    dims: GridDims,
    texels: Vec<Texel>,
}

impl VoxelTexels {
    /// Builds texels from a block grid.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::UnknownBlockType`] for any non-air cell whose
    /// type id has no entry in `lookup`.
    pub fn from_grid(grid: &BlockGrid, lookup: &FaceLookupTable) -> MeshResult<Self> {
        let dims = grid.dims();
        let shape = texture_shape(dims);
        let mut texels = vec![[0, 0]; dims.volume()];

        for ([x, y, z], word) in grid.solid_cells() {
            let type_id = word.type_id();
            if !lookup.contains(type_id) {
                return Err(BlockError::UnknownBlockType(type_id).into());
            }
            let is_liquid = word.kind().is_some_and(|kind| kind.is_liquid());
            texels[shape.linearize([x, y, z]) as usize] = if is_liquid {
                [0, type_id]
            } else {
                [type_id, 0]
            };
        }

        Ok(Self { dims, texels })
    }

    /// Grid dimensions the texels cover.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Texel at a cell, `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn texel(&self, x: i32, y: i32, z: i32) -> Option<Texel> {
        if !self.dims.contains(x, y, z) {
            return None;
        }
        let index = texture_shape(self.dims).linearize([x as u32, y as u32, z as u32]);
        Some(self.texels[index as usize])
    }

    /// All texels in texture order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Texel] {
        &self.texels
    }

    /// Raw bytes for a texture upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Bytes per texture row along X.
    #[inline]
    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        self.dims.size * std::mem::size_of::<Texel>() as u32
    }
}

/// Texture order: x fastest, then y, then z.
fn texture_shape(dims: GridDims) -> RuntimeShape<u32, 3> {
    RuntimeShape::<u32, 3>::new([dims.size, dims.height, dims.size])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use terravox_core::{BlockCatalog, BlockKind, BlockWord};

    fn lookup() -> FaceLookupTable {
        BlockCatalog::standard().unwrap().build_face_lookup_table()
    }

    #[test]
    fn test_channels_split_liquids() {
        let mut grid = BlockGrid::new(GridDims::new(2, 8));
        grid.set(0, 0, 0, BlockWord::from_kind(BlockKind::Stone));
        grid.set(1, 2, 1, BlockWord::from_kind(BlockKind::Water));

        let texels = VoxelTexels::from_grid(&grid, &lookup()).unwrap();
        assert_eq!(texels.texel(0, 0, 0), Some([BlockKind::Stone.id(), 0]));
        assert_eq!(texels.texel(1, 2, 1), Some([0, BlockKind::Water.id()]));
        assert_eq!(texels.texel(1, 1, 1), Some([0, 0]));
        assert_eq!(texels.texel(2, 0, 0), None);
    }

    #[test]
    fn test_texture_order_is_x_fastest() {
        let mut grid = BlockGrid::new(GridDims::new(4, 16));
        grid.set(1, 0, 0, BlockWord::from_kind(BlockKind::Dirt));
        grid.set(0, 1, 0, BlockWord::from_kind(BlockKind::Sand));
        grid.set(0, 0, 1, BlockWord::from_kind(BlockKind::Wood));

        let texels = VoxelTexels::from_grid(&grid, &lookup()).unwrap();
        let slice = texels.as_slice();
        assert_eq!(slice[1][0], BlockKind::Dirt.id());
        assert_eq!(slice[4][0], BlockKind::Sand.id());
        assert_eq!(slice[4 * 16][0], BlockKind::Wood.id());
        assert_eq!(texels.as_bytes().len(), 4 * 16 * 4 * 8);
        assert_eq!(texels.bytes_per_row(), 32);
    }

    #[test]
    fn test_rotation_bits_are_dropped() {
        let mut grid = BlockGrid::new(GridDims::new(2, 8));
        let rotated = BlockWord::pack(BlockKind::Wood.id(), 3).unwrap();
        grid.set(0, 0, 0, rotated);

        let texels = VoxelTexels::from_grid(&grid, &lookup()).unwrap();
        assert_eq!(texels.texel(0, 0, 0), Some([BlockKind::Wood.id(), 0]));
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let mut grid = BlockGrid::new(GridDims::new(2, 8));
        grid.set(0, 0, 0, BlockWord::pack(500, 0).unwrap());

        let result = VoxelTexels::from_grid(&grid, &lookup());
        assert!(matches!(
            result,
            Err(MeshError::Block(BlockError::UnknownBlockType(500)))
        ));
    }
}
