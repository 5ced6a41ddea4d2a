//! # World
//!
//! A square grid of chunks, the generator that fills them and the backend
//! that meshes them. Everything runs synchronously on the calling thread.
//!
//! Viewer positions are in chunk-grid space, where chunk `(x, z)` has its
//! origin at `(x * 16, 0, z * 16)`. The draw transforms shift the grid so
//! its centre sits at the world origin.

mod config;
mod render_chunk;
mod stats;

use std::time::Instant;

use glam::{Mat4, Vec3};
use terravox_procedural::{ChunkCoord, OverworldGenerator, TerrainGenerator};
use tracing::{error, info};

use crate::error::MeshResult;
use crate::mesh::{ChunkMeshPipeline, MeshBackend};

pub use config::{WorldConfig, WORLD_SIZE};
pub use render_chunk::RenderChunk;
pub use stats::WorldStats;

/// The chunk grid.
pub struct World<B: MeshBackend, G: TerrainGenerator = OverworldGenerator> {
    config: WorldConfig,
    generator: G,
    backend: B,
    chunks: Vec<RenderChunk<B::Mesh>>,
    viewer: Option<Vec3>,
    viewer_cell: Option<ChunkCoord>,
    needs_lod_refresh: bool,
}

impl<B: MeshBackend, G: TerrainGenerator> World<B, G> {
    /// Creates a world of empty chunks.
    ///
    /// # Errors
    ///
    /// Rejects configurations that fail [`WorldConfig::validate`].
    pub fn new(config: WorldConfig, generator: G, backend: B) -> MeshResult<Self> {
        config.validate()?;
        let size = config.world_size as i32;
        let chunks = (0..size)
            .flat_map(|x| (0..size).map(move |z| RenderChunk::new(ChunkCoord::new(x, z))))
            .collect();

        Ok(Self {
            config,
            generator,
            backend,
            chunks,
            viewer: None,
            viewer_cell: None,
            needs_lod_refresh: false,
        })
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The terrain generator.
    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The meshing backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All chunks, `x` outer and `z` inner.
    pub fn chunks(&self) -> impl Iterator<Item = &RenderChunk<B::Mesh>> {
        self.chunks.iter()
    }

    /// The chunk at a grid coordinate.
    #[must_use]
    pub fn chunk(&self, x: u32, z: u32) -> Option<&RenderChunk<B::Mesh>> {
        let size = self.config.world_size;
        if x >= size || z >= size {
            return None;
        }
        self.chunks.get(x as usize * size as usize + z as usize)
    }

    /// Whether the viewer crossed into another chunk since the last LOD
    /// pass.
    #[must_use]
    pub fn needs_lod_refresh(&self) -> bool {
        self.needs_lod_refresh
    }

    /// Generates and meshes every chunk for a viewer position.
    ///
    /// # Errors
    ///
    /// The first catalog miss, allocation failure or capacity overrun
    /// aborts the pass.
    pub fn generate_world(&mut self, viewer: Vec3) -> MeshResult<WorldStats> {
        let started = Instant::now();
        let mut stats = WorldStats::default();
        let world_size = self.config.world_size;
        let allocation = self.config.allocation;

        for chunk in &mut self.chunks {
            chunk.set_lod(viewer, self.config.max_lod_distance);
            let mesh = chunk
                .rebuild(&self.generator, &self.backend, world_size, allocation)
                .map_err(|err| {
                    error!(%err, "world generation failed");
                    err
                })?;
            if let Some(mesh) = mesh {
                let data = chunk.chunk();
                stats.record_chunk(data.lod(), data.block_count(), data.face_estimate(), &mesh);
            }
        }

        self.settle_viewer(viewer);
        info!(
            chunks = stats.chunks_meshed,
            blocks = stats.blocks,
            vertices = stats.vertices(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "world generated"
        );
        Ok(stats)
    }

    /// Rebuilds only the chunks whose tier changed for the viewer position.
    /// Returns how many were rebuilt.
    ///
    /// # Errors
    ///
    /// As [`World::generate_world`].
    pub fn update_lods(&mut self, viewer: Vec3) -> MeshResult<usize> {
        let started = Instant::now();
        let world_size = self.config.world_size;
        let allocation = self.config.allocation;
        let mut rebuilt = 0;

        for chunk in &mut self.chunks {
            if !chunk.set_lod(viewer, self.config.max_lod_distance) {
                continue;
            }
            chunk
                .rebuild(&self.generator, &self.backend, world_size, allocation)
                .map_err(|err| {
                    error!(%err, "LOD update failed");
                    err
                })?;
            rebuilt += 1;
        }

        self.settle_viewer(viewer);
        info!(
            rebuilt,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LODs updated"
        );
        Ok(rebuilt)
    }

    /// Records the viewer's position. Flags a LOD refresh when the viewer
    /// entered another chunk cell; returns whether it did.
    pub fn observe_viewer(&mut self, position: Vec3) -> bool {
        let cell = ChunkCoord::containing(position);
        self.viewer = Some(position);
        if self.viewer_cell == Some(cell) {
            return false;
        }
        self.viewer_cell = Some(cell);
        self.needs_lod_refresh = true;
        true
    }

    /// Runs [`World::update_lods`] at the last observed position when a
    /// refresh is flagged. Returns the number of chunks rebuilt.
    ///
    /// # Errors
    ///
    /// As [`World::update_lods`].
    pub fn refresh_lods_if_needed(&mut self) -> MeshResult<usize> {
        match (self.needs_lod_refresh, self.viewer) {
            (true, Some(viewer)) => self.update_lods(viewer),
            _ => Ok(0),
        }
    }

    /// Meshed chunks with their model matrices.
    pub fn drawables(&self, model: Mat4) -> impl Iterator<Item = (Mat4, &B::Mesh)> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.chunk().is_meshed())
            .filter_map(move |chunk| chunk.mesh().map(|mesh| (mesh.transform(model), mesh)))
    }

    /// Totals over the current state of every chunk.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        for chunk in &self.chunks {
            let data = chunk.chunk();
            match chunk.mesh_stats() {
                Some(mesh) => {
                    stats.record_chunk(data.lod(), data.block_count(), data.face_estimate(), &mesh);
                }
                None if data.is_loaded() => {
                    stats.chunks_loaded += 1;
                    stats.blocks += u64::from(data.block_count());
                    stats.face_estimate += u64::from(data.face_estimate());
                }
                None => {}
            }
        }
        stats
    }

    fn settle_viewer(&mut self, viewer: Vec3) {
        self.viewer = Some(viewer);
        self.viewer_cell = Some(ChunkCoord::containing(viewer));
        self.needs_lod_refresh = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuMeshBackend;
    use crate::error::MeshError;
    use crate::mesh::DispatchConfig;
    use terravox_core::BlockCatalog;
    use terravox_procedural::{Lod, WorldSeed};

    fn small_world(size: u32) -> World<CpuMeshBackend> {
        let lookup = BlockCatalog::standard().unwrap().build_face_lookup_table();
        let backend = CpuMeshBackend::new(lookup, DispatchConfig::default());
        let generator = OverworldGenerator::new(WorldSeed::new(7)).unwrap();
        let config = WorldConfig {
            world_size: size,
            ..WorldConfig::default()
        };
        World::new(config, generator, backend).unwrap()
    }

    #[test]
    fn test_odd_world_rejected() {
        let lookup = BlockCatalog::standard().unwrap().build_face_lookup_table();
        let backend = CpuMeshBackend::new(lookup, DispatchConfig::default());
        let generator = OverworldGenerator::new(WorldSeed::new(7)).unwrap();
        let config = WorldConfig {
            world_size: 3,
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(config, generator, backend),
            Err(MeshError::InvalidWorldSize(3))
        ));
    }

    #[test]
    fn test_chunks_are_row_major() {
        let world = small_world(4);
        let coords: Vec<_> = world.chunks().map(|c| c.chunk().coord()).collect();
        assert_eq!(coords[0], ChunkCoord::new(0, 0));
        assert_eq!(coords[1], ChunkCoord::new(0, 1));
        assert_eq!(coords[4], ChunkCoord::new(1, 0));
        assert_eq!(world.chunk(3, 2).unwrap().chunk().coord(), ChunkCoord::new(3, 2));
        assert!(world.chunk(4, 0).is_none());
    }

    #[test]
    fn test_generate_world_meshes_everything() {
        let mut world = small_world(2);
        let stats = world.generate_world(Vec3::ZERO).unwrap();

        assert_eq!(stats.chunks_meshed, 4);
        assert_eq!(stats.draw_calls, 8);
        assert!(stats.opaque_vertices > 0);
        assert!(world.chunks().all(|c| c.chunk().is_complete()));
        assert_eq!(world.stats(), stats);
        assert_eq!(world.drawables(Mat4::IDENTITY).count(), 4);
        assert!(!world.needs_lod_refresh());
    }

    #[test]
    fn test_observe_viewer_flags_cell_changes() {
        let mut world = small_world(2);
        world.generate_world(Vec3::new(8.0, 0.0, 8.0)).unwrap();

        assert!(!world.observe_viewer(Vec3::new(15.0, 30.0, 1.0)));
        assert!(!world.needs_lod_refresh());
        assert!(world.observe_viewer(Vec3::new(16.0, 0.0, 1.0)));
        assert!(world.needs_lod_refresh());

        // Nothing in a 2x2 world changes tier this close
        assert_eq!(world.refresh_lods_if_needed().unwrap(), 0);
        assert!(!world.needs_lod_refresh());
        assert_eq!(world.refresh_lods_if_needed().unwrap(), 0);
    }

    #[test]
    fn test_update_lods_rebuilds_changed_chunks_only() {
        let mut world = small_world(2);
        world.generate_world(Vec3::ZERO).unwrap();

        // LOD 0 ends at 12 chunk widths (192 units): column x = 0 falls past it
        let viewer = Vec3::new(200.0, 0.0, 0.0);
        let rebuilt = world.update_lods(viewer).unwrap();
        assert_eq!(rebuilt, 2);
        assert_eq!(world.chunk(0, 0).unwrap().chunk().lod(), Lod::Lod1);
        assert_eq!(world.chunk(1, 0).unwrap().chunk().lod(), Lod::Lod0);
        assert_eq!(world.chunk(0, 0).unwrap().mesh().unwrap().descriptor().lod, Lod::Lod1);
        assert!(world.chunk(0, 0).unwrap().chunk().is_meshed());
        assert_eq!(world.update_lods(viewer).unwrap(), 0);
    }
}
