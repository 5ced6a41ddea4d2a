//! # Terrain Generators
//!
//! The seam between chunks and the algorithms that fill them.

use serde::Deserialize;

use crate::chunk::Chunk;

/// Default sea level, in full-detail blocks.
pub const SEA_LEVEL: i32 = 13;

/// Fills chunks with blocks.
///
/// Implementations must be pure functions of their construction parameters
/// and the chunk's coordinate and tier: the same inputs always produce the
/// same grid.
pub trait TerrainGenerator {
    /// Writes the chunk's blocks into its freshly allocated grid.
    ///
    /// Blocks are written with [`Chunk::set_block_at`], which keeps the
    /// chunk's block count up to date.
    fn generate(&self, chunk: &mut Chunk);

    /// Surface height of a world column, in full-detail blocks.
    fn height(&self, x: i32, z: i32) -> i32;
}

/// Tunables for the overworld generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Water fills air at or below this height.
    pub sea_level: i32,
    /// Whether to place trees on full-detail chunks.
    pub decoration: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sea_level: SEA_LEVEL,
            decoration: false,
        }
    }
}
