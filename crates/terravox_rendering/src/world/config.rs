//! World configuration.

use serde::Deserialize;
use terravox_procedural::{GenerationConfig, DEFAULT_MAX_LOD_DISTANCE};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{BufferAllocation, DispatchConfig};

/// Default chunks per world side.
pub const WORLD_SIZE: u32 = 40;

/// Shape and tuning of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunks per side. Must be even so the grid centres on the origin.
    pub world_size: u32,
    /// Outermost LOD bound, in chunk widths.
    pub max_lod_distance: u32,
    /// Vertex buffer sizing.
    pub allocation: BufferAllocation,
    /// Per-pass dispatch scaling.
    pub dispatch: DispatchConfig,
    /// Generator tunables.
    pub generation: GenerationConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            max_lod_distance: DEFAULT_MAX_LOD_DISTANCE,
            allocation: BufferAllocation::default(),
            dispatch: DispatchConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidWorldSize`] for odd or zero sizes.
    pub fn validate(&self) -> MeshResult<()> {
        if self.world_size == 0 || self.world_size % 2 != 0 {
            return Err(MeshError::InvalidWorldSize(self.world_size));
        }
        Ok(())
    }

    /// Total chunk count.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.world_size as usize * self.world_size as usize
    }
}
