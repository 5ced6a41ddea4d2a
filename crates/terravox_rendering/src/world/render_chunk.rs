//! A chunk paired with its mesh.

use glam::Vec3;
use terravox_procedural::{Chunk, ChunkCoord, TerrainGenerator};
use tracing::warn;

use crate::error::MeshResult;
use crate::mesh::{BufferAllocation, ChunkMeshPipeline, MeshBackend, MeshDescriptor, MeshStats};

/// A chunk's block data and, once set up, its mesh.
#[derive(Debug)]
pub struct RenderChunk<M> {
    chunk: Chunk,
    mesh: Option<M>,
    mesh_stats: Option<MeshStats>,
}

impl<M: ChunkMeshPipeline> RenderChunk<M> {
    /// An empty chunk with no mesh.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            chunk: Chunk::new(coord),
            mesh: None,
            mesh_stats: None,
        }
    }

    /// Block data and lifecycle state.
    #[must_use]
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// The mesh, once set up.
    #[must_use]
    pub fn mesh(&self) -> Option<&M> {
        self.mesh.as_ref()
    }

    /// Stats of the last successful mesh of the current data.
    #[must_use]
    pub fn mesh_stats(&self) -> Option<MeshStats> {
        self.mesh_stats
    }

    /// Picks the tier for the viewer. Returns whether the chunk needs a
    /// rebuild: its tier changed or it was never generated.
    pub fn set_lod(&mut self, viewer: Vec3, max_distance: u32) -> bool {
        let previous = self.chunk.set_lod(viewer, max_distance);
        previous != self.chunk.lod() || !self.chunk.is_loaded()
    }

    /// Regenerates block data at the current tier. The old mesh stays
    /// drawable until [`RenderChunk::setup_mesh`] replaces it.
    pub fn generate_chunk_data<G: TerrainGenerator + ?Sized>(&mut self, generator: &G) {
        self.chunk.generate_chunk_data(generator);
        self.mesh_stats = None;
    }

    /// Creates a mesh at the chunk's tier and sizes its buffers from the
    /// face estimate. Returns `false` (after a warning) when the chunk has
    /// no block data yet.
    ///
    /// # Errors
    ///
    /// Propagates buffer allocation failures.
    pub fn setup_mesh<B>(
        &mut self,
        backend: &B,
        world_size: u32,
        allocation: BufferAllocation,
    ) -> MeshResult<bool>
    where
        B: MeshBackend<Mesh = M>,
    {
        let coord = self.chunk.coord();
        if !self.chunk.is_loaded() {
            warn!(x = coord.x, z = coord.z, "mesh setup skipped, chunk not loaded");
            return Ok(false);
        }

        let descriptor = MeshDescriptor::new(coord, self.chunk.lod(), world_size);
        let mut mesh = backend.create_mesh(descriptor);
        let estimate = self.chunk.face_estimate();
        mesh.initialize_opaque_buffer(allocation, estimate)?;
        mesh.initialize_transparent_buffer(allocation, estimate)?;
        self.mesh = Some(mesh);
        Ok(true)
    }

    /// Uploads the block data and runs both passes. Returns `None` (after a
    /// warning) when the chunk is not loaded or its mesh was not set up for
    /// the current tier.
    ///
    /// # Errors
    ///
    /// Catalog misses and capacity overruns.
    pub fn generate_mesh(&mut self) -> MeshResult<Option<MeshStats>> {
        let coord = self.chunk.coord();
        let lod = self.chunk.lod();
        let (Some(grid), Some(mesh)) = (self.chunk.grid(), self.mesh.as_mut()) else {
            warn!(x = coord.x, z = coord.z, "mesh generation skipped, chunk not set up");
            return Ok(None);
        };
        if mesh.descriptor().lod != lod || grid.dims() != self.chunk.dims() {
            warn!(x = coord.x, z = coord.z, "mesh generation skipped, mesh is for another tier");
            return Ok(None);
        }

        mesh.initialize_chunk_data_buffer(grid)?;
        let stats = mesh.generate_mesh()?;
        self.chunk.mark_meshed()?;
        self.mesh_stats = Some(stats);
        Ok(Some(stats))
    }

    /// `generate_chunk_data`, `setup_mesh` and `generate_mesh` in order.
    ///
    /// # Errors
    ///
    /// See [`RenderChunk::setup_mesh`] and [`RenderChunk::generate_mesh`].
    pub fn rebuild<G, B>(
        &mut self,
        generator: &G,
        backend: &B,
        world_size: u32,
        allocation: BufferAllocation,
    ) -> MeshResult<Option<MeshStats>>
    where
        G: TerrainGenerator + ?Sized,
        B: MeshBackend<Mesh = M>,
    {
        self.generate_chunk_data(generator);
        self.setup_mesh(backend, world_size, allocation)?;
        self.generate_mesh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{CpuChunkMesh, CpuMeshBackend};
    use crate::mesh::{DispatchConfig, MeshPass};
    use terravox_core::{BlockCatalog, BlockKind, BlockWord};
    use terravox_procedural::{ChunkState, Lod};

    struct Pillar;

    impl TerrainGenerator for Pillar {
        fn generate(&self, chunk: &mut Chunk) {
            for y in 0..4 {
                chunk.set_block_at(0, y, 0, BlockWord::from_kind(BlockKind::Stone));
            }
        }

        fn height(&self, _x: i32, _z: i32) -> i32 {
            4
        }
    }

    fn backend() -> CpuMeshBackend {
        let lookup = BlockCatalog::standard().unwrap().build_face_lookup_table();
        CpuMeshBackend::new(lookup, DispatchConfig::default())
    }

    #[test]
    fn test_out_of_order_steps_are_skipped() {
        let mut chunk: RenderChunk<CpuChunkMesh> = RenderChunk::new(ChunkCoord::new(0, 0));
        assert!(!chunk.setup_mesh(&backend(), 2, BufferAllocation::default()).unwrap());
        assert_eq!(chunk.generate_mesh().unwrap(), None);
        assert_eq!(chunk.chunk().state(), ChunkState::Empty);
    }

    #[test]
    fn test_rebuild_meshes_chunk() {
        let mut chunk = RenderChunk::new(ChunkCoord::new(0, 0));
        let stats = chunk
            .rebuild(&Pillar, &backend(), 2, BufferAllocation::default())
            .unwrap()
            .unwrap();

        assert_eq!(stats.opaque.faces(), 4 * 4 + 2);
        assert!(chunk.chunk().is_complete());
        assert_eq!(chunk.mesh().unwrap().vertices(MeshPass::Opaque).len(), 18 * 6);
    }

    #[test]
    fn test_stale_mesh_is_not_regenerated() {
        let backend = backend();
        let mut chunk = RenderChunk::new(ChunkCoord::new(0, 0));
        chunk.rebuild(&Pillar, &backend, 2, BufferAllocation::default()).unwrap();

        // Far viewer drops the tier; data is regenerated but the mesh is not set up again
        assert!(chunk.set_lod(Vec3::new(5000.0, 0.0, 0.0), 96));
        assert_eq!(chunk.chunk().lod(), Lod::Lod3);
        chunk.generate_chunk_data(&Pillar);
        assert_eq!(chunk.generate_mesh().unwrap(), None);
        assert_eq!(chunk.chunk().state(), ChunkState::Loaded);
    }

    #[test]
    fn test_set_lod_reports_first_generation() {
        let mut chunk: RenderChunk<CpuChunkMesh> = RenderChunk::new(ChunkCoord::new(0, 0));
        assert!(chunk.set_lod(Vec3::ZERO, 96));
        chunk.generate_chunk_data(&Pillar);
        assert!(!chunk.set_lod(Vec3::new(1.0, 0.0, 1.0), 96));
    }
}
