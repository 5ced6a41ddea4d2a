//! # Chunk System
//!
//! World data is organized into 16 x 64 x 16 column chunks. A chunk owns
//! its block grid at its current LOD and walks a fixed lifecycle:
//!
//! ```text
//! Empty --generate--> Loaded --mesh--> Meshed   (LOD 1..3)
//!                                  \-> Complete (LOD 0)
//! ```
//!
//! Regenerating (for example after a LOD change) always drops back to
//! `Loaded` with a freshly allocated grid.

use glam::Vec3;
use terravox_core::BlockWord;
use tracing::debug;

use crate::error::ChunkError;
use crate::generator::TerrainGenerator;
use crate::grid::{BlockGrid, GridDims};
use crate::lod::Lod;

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: u32 = 16;

/// Chunk height in blocks.
pub const CHUNK_HEIGHT: u32 = 64;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing a world-space position, by floor division.
    #[inline]
    #[must_use]
    pub fn containing(position: Vec3) -> Self {
        let width = CHUNK_SIZE as f32;
        Self {
            x: (position.x / width).floor() as i32,
            z: (position.z / width).floor() as i32,
        }
    }

    /// World X coordinate of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE as i32
    }

    /// World Z coordinate of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE as i32
    }

    /// Origin corner at ground level, in world units.
    #[inline]
    #[must_use]
    pub fn origin(self) -> Vec3 {
        Vec3::new(self.world_x() as f32, 0.0, self.world_z() as f32)
    }
}

/// Where a chunk is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// No block data yet.
    #[default]
    Empty,
    /// Block data generated, no mesh.
    Loaded,
    /// Meshed at a reduced LOD.
    Meshed,
    /// Meshed at full detail.
    Complete,
}

/// A chunk of world data.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    lod: Lod,
    grid: Option<BlockGrid>,
    block_count: u32,
    face_estimate: u32,
    state: ChunkState,
}

impl Chunk {
    /// Creates an empty full-detail chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self::with_lod(coord, Lod::Lod0)
    }

    /// Creates an empty chunk at a given tier.
    #[must_use]
    pub fn with_lod(coord: ChunkCoord, lod: Lod) -> Self {
        Self {
            coord,
            lod,
            grid: None,
            block_count: 0,
            face_estimate: 0,
            state: ChunkState::Empty,
        }
    }

    /// Grid coordinate.
    #[inline]
    #[must_use]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Current tier.
    #[inline]
    #[must_use]
    pub fn lod(&self) -> Lod {
        self.lod
    }

    /// Grid dimensions at the current tier.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        GridDims::BASE.for_lod(self.lod)
    }

    /// Block data, once generated.
    #[inline]
    #[must_use]
    pub fn grid(&self) -> Option<&BlockGrid> {
        self.grid.as_ref()
    }

    /// Non-air cells written since the last generation.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Upper estimate of exposed faces, used to size vertex buffers.
    #[inline]
    #[must_use]
    pub fn face_estimate(&self) -> u32 {
        self.face_estimate
    }

    /// Lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Whether block data has been generated.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state != ChunkState::Empty
    }

    /// Whether a mesh has been built for the current data.
    #[inline]
    #[must_use]
    pub fn is_meshed(&self) -> bool {
        matches!(self.state, ChunkState::Meshed | ChunkState::Complete)
    }

    /// Whether the chunk is meshed at full detail.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ChunkState::Complete
    }

    /// Distance from the chunk origin (at ground level) to the viewer.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, viewer: Vec3) -> f32 {
        self.coord.origin().distance(viewer)
    }

    /// Picks the tier for the viewer's position and returns the previous
    /// tier. Block data is left untouched; callers regenerate when the tier
    /// changed.
    pub fn set_lod(&mut self, viewer: Vec3, max_distance: u32) -> Lod {
        let previous = self.lod;
        self.lod = Lod::select(self.distance_to(viewer), max_distance);
        previous
    }

    /// Generates block data at the current tier.
    ///
    /// Allocates a fresh grid, resets the counters, lets `generator` fill
    /// the grid, then computes the face estimate.
    pub fn generate_chunk_data<G: TerrainGenerator + ?Sized>(&mut self, generator: &G) {
        self.grid = Some(BlockGrid::new(self.dims()));
        self.block_count = 0;
        self.face_estimate = 0;
        self.state = ChunkState::Empty;

        generator.generate(self);

        self.face_estimate = self.grid.as_ref().map_or(0, BlockGrid::face_estimate);
        self.state = ChunkState::Loaded;
        debug!(
            x = self.coord.x,
            z = self.coord.z,
            lod = self.lod.index(),
            blocks = self.block_count,
            faces = self.face_estimate,
            "chunk generated"
        );
    }

    /// Reads a block. Coordinates wrap modulo the current dimensions; a
    /// chunk without data reads as air.
    #[inline]
    #[must_use]
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> BlockWord {
        self.grid
            .as_ref()
            .map_or(BlockWord::AIR, |grid| grid.get(x, y, z))
    }

    /// Writes a block and returns the previous word. Coordinates wrap modulo
    /// the current dimensions. Returns `None` when no grid is allocated.
    pub fn set_block_at(&mut self, x: i32, y: i32, z: i32, word: BlockWord) -> Option<BlockWord> {
        let previous = self.grid.as_mut()?.set(x, y, z, word);
        match (previous.is_air(), word.is_air()) {
            (true, false) => self.block_count += 1,
            (false, true) => self.block_count -= 1,
            _ => {}
        }
        Some(previous)
    }

    /// Number of in-bounds, non-air axis neighbours. Never wraps.
    #[inline]
    #[must_use]
    pub fn count_neighbors(&self, x: i32, y: i32, z: i32) -> u32 {
        self.grid
            .as_ref()
            .map_or(0, |grid| grid.count_neighbors(x, y, z))
    }

    /// Records that a mesh was built from the current data.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::NotLoaded`] if no block data exists.
    pub fn mark_meshed(&mut self) -> Result<(), ChunkError> {
        if !self.is_loaded() {
            return Err(ChunkError::NotLoaded { coord: self.coord });
        }
        self.state = if self.lod.is_full_detail() {
            ChunkState::Complete
        } else {
            ChunkState::Meshed
        };
        Ok(())
    }
}
