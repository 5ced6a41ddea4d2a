//! The meshing protocol every backend implements.

use glam::{Mat4, Vec3};
use terravox_procedural::{BlockGrid, ChunkCoord, GridDims, Lod, CHUNK_SIZE};

use crate::error::{MeshError, MeshResult};
use crate::mesh::capacity::BufferAllocation;
use crate::mesh::dispatch::MeshPass;

/// Identity of one chunk mesh: where it sits and at which tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshDescriptor {
    /// Chunk grid coordinate.
    pub coord: ChunkCoord,
    /// Tier the mesh is built at.
    pub lod: Lod,
    /// Chunks per world side; the grid is centred on the origin.
    pub world_size: u32,
}

impl MeshDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(coord: ChunkCoord, lod: Lod, world_size: u32) -> Self {
        Self {
            coord,
            lod,
            world_size,
        }
    }

    /// Grid dimensions at this tier.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        GridDims::BASE.for_lod(self.lod)
    }

    /// World units per cell.
    #[inline]
    #[must_use]
    pub fn voxel_scale(&self) -> f32 {
        self.lod.scale() as f32
    }

    /// Offset of the chunk from the world centre, in world units.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        let half = (self.world_size / 2) as i32;
        let width = CHUNK_SIZE as f32;
        Vec3::new(
            (self.coord.x - half) as f32 * width,
            0.0,
            (self.coord.z - half) as f32 * width,
        )
    }

    /// `model` followed by this chunk's world placement.
    #[must_use]
    pub fn transform(&self, model: Mat4) -> Mat4 {
        model * Mat4::from_translation(self.translation())
    }
}

/// Result of one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Vertices the kernel emitted (or tried to).
    pub vertex_count: u32,
    /// Vertices the pass buffer holds.
    pub capacity: u32,
}

impl PassStats {
    /// Whether the kernel wanted more room than it had.
    #[inline]
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.vertex_count > self.capacity
    }

    /// Visible faces.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> u32 {
        self.vertex_count / crate::mesh::VERTICES_PER_FACE
    }
}

/// Result of meshing one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Solid blocks.
    pub opaque: PassStats,
    /// Liquids.
    pub transparent: PassStats,
}

impl MeshStats {
    /// Stats of one pass.
    #[must_use]
    pub const fn pass(&self, pass: MeshPass) -> PassStats {
        match pass {
            MeshPass::Opaque => self.opaque,
            MeshPass::Transparent => self.transparent,
        }
    }

    /// Both passes' vertices.
    #[must_use]
    pub fn total_vertices(&self) -> u32 {
        self.opaque.vertex_count + self.transparent.vertex_count
    }

    /// Fails with [`MeshError::CapacityExceeded`] on the first pass whose
    /// emitted count exceeds its capacity.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn check_capacity(&self, coord: ChunkCoord) -> MeshResult<()> {
        for pass in MeshPass::ALL {
            let stats = self.pass(pass);
            if stats.overflowed() {
                return Err(MeshError::CapacityExceeded {
                    coord,
                    pass,
                    emitted: stats.vertex_count,
                    capacity: stats.capacity,
                });
            }
        }
        Ok(())
    }
}

/// One chunk's mesh on some backend.
///
/// Calls must follow `initialize_*_buffer`, then
/// [`initialize_chunk_data_buffer`](Self::initialize_chunk_data_buffer), then
/// [`generate_mesh`](Self::generate_mesh). Buffers are sized once per mesh;
/// the chunk data can be replaced and the mesh regenerated any number of
/// times.
pub trait ChunkMeshPipeline {
    /// Where and at which tier this mesh is built.
    fn descriptor(&self) -> &MeshDescriptor;

    /// Allocates the solid-block vertex buffer and its draw command.
    ///
    /// # Errors
    ///
    /// Backends may reject buffers beyond their limits.
    fn initialize_opaque_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()>;

    /// Allocates the liquid vertex buffer and its draw command.
    ///
    /// # Errors
    ///
    /// Backends may reject buffers beyond their limits.
    fn initialize_transparent_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()>;

    /// Uploads the chunk's blocks.
    ///
    /// # Errors
    ///
    /// Fails on block types missing from the face lookup table, or when the
    /// grid does not match the mesh's tier.
    fn initialize_chunk_data_buffer(&mut self, grid: &BlockGrid) -> MeshResult<()>;

    /// Runs the opaque pass then the transparent pass and checks both
    /// against their capacity.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotInitialized`] when called out of order,
    /// [`MeshError::CapacityExceeded`] on overrun (the draw commands are
    /// reset to zero vertices first).
    fn generate_mesh(&mut self) -> MeshResult<MeshStats>;

    /// Model matrix placing this chunk in the world.
    fn transform(&self, model: Mat4) -> Mat4 {
        self.descriptor().transform(model)
    }
}

/// Creates chunk meshes that share the backend's device and face lookup.
pub trait MeshBackend {
    /// Mesh type produced by this backend.
    type Mesh: ChunkMeshPipeline;

    /// Creates an empty mesh for one chunk.
    fn create_mesh(&self, descriptor: MeshDescriptor) -> Self::Mesh;
}

pub(crate) fn check_grid(descriptor: &MeshDescriptor, grid: &BlockGrid) -> MeshResult<()> {
    let expected = descriptor.dims();
    if grid.dims() != expected {
        return Err(MeshError::GridMismatch {
            expected,
            found: grid.dims(),
        });
    }
    Ok(())
}
