//! # CPU Meshing Backend
//!
//! Runs the meshing kernel's rules on the CPU over the same dispatch grid,
//! capacities and draw commands as the GPU backend. Invocations outside the
//! dispatch grid never run, so an under-sized dispatch leaves cells unmeshed
//! here exactly as it would on the GPU.

use std::sync::Arc;

use terravox_core::{Face, FaceLookupTable};
use terravox_procedural::BlockGrid;
use tracing::{debug, error};

use crate::error::{MeshError, MeshResult};
use crate::mesh::pipeline::check_grid;
use crate::mesh::{
    BufferAllocation, ChunkMeshPipeline, ChunkVertex, DispatchConfig, DrawIndirectCommand,
    MeshBackend, MeshDescriptor, MeshPass, MeshStats, PassStats, Texel, VoxelTexels,
    VERTICES_PER_FACE, WORKGROUP_SIZE,
};

/// Backend producing [`CpuChunkMesh`]es.
#[derive(Clone, Debug)]
pub struct CpuMeshBackend {
    lookup: Arc<FaceLookupTable>,
    dispatch: DispatchConfig,
}

impl CpuMeshBackend {
    /// Creates a backend around a sealed face lookup table.
    #[must_use]
    pub fn new(lookup: FaceLookupTable, dispatch: DispatchConfig) -> Self {
        Self {
            lookup: Arc::new(lookup),
            dispatch,
        }
    }

    /// The shared face lookup table.
    #[must_use]
    pub fn lookup(&self) -> &FaceLookupTable {
        &self.lookup
    }

    /// Dispatch scaling applied to new meshes.
    #[must_use]
    pub fn dispatch(&self) -> DispatchConfig {
        self.dispatch
    }
}

impl MeshBackend for CpuMeshBackend {
    type Mesh = CpuChunkMesh;

    fn create_mesh(&self, descriptor: MeshDescriptor) -> CpuChunkMesh {
        CpuChunkMesh {
            descriptor,
            lookup: Arc::clone(&self.lookup),
            dispatch: self.dispatch,
            opaque: None,
            transparent: None,
            texels: None,
        }
    }
}

/// Vertex storage and draw command of one pass.
#[derive(Clone, Debug)]
struct PassBuffer {
    capacity: u32,
    vertices: Vec<ChunkVertex>,
    command: DrawIndirectCommand,
}

impl PassBuffer {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            vertices: Vec::new(),
            command: DrawIndirectCommand::empty(),
        }
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.command = DrawIndirectCommand::empty();
    }

    /// Reserves a face's vertices and writes them if they fit.
    fn emit(&mut self, quad: [ChunkVertex; 6]) {
        let first = self.command.vertex_count;
        self.command.vertex_count = first.saturating_add(VERTICES_PER_FACE);
        if first.saturating_add(VERTICES_PER_FACE) <= self.capacity {
            self.vertices.extend_from_slice(&quad);
        }
    }

    fn stats(&self) -> PassStats {
        PassStats {
            vertex_count: self.command.vertex_count,
            capacity: self.capacity,
        }
    }
}

/// A chunk mesh built on the CPU.
#[derive(Clone, Debug)]
pub struct CpuChunkMesh {
    descriptor: MeshDescriptor,
    lookup: Arc<FaceLookupTable>,
    dispatch: DispatchConfig,
    opaque: Option<PassBuffer>,
    transparent: Option<PassBuffer>,
    texels: Option<VoxelTexels>,
}

impl CpuChunkMesh {
    /// Vertices written by a pass. Empty before the first mesh.
    #[must_use]
    pub fn vertices(&self, pass: MeshPass) -> &[ChunkVertex] {
        self.buffer(pass).map_or(&[], |buffer| &buffer.vertices)
    }

    /// Draw command of a pass, once its buffer exists.
    #[must_use]
    pub fn command(&self, pass: MeshPass) -> Option<DrawIndirectCommand> {
        self.buffer(pass).map(|buffer| buffer.command)
    }

    /// Vertex capacity of a pass, once its buffer exists.
    #[must_use]
    pub fn capacity(&self, pass: MeshPass) -> Option<u32> {
        self.buffer(pass).map(|buffer| buffer.capacity)
    }

    /// Uploaded voxel texels.
    #[must_use]
    pub fn texels(&self) -> Option<&VoxelTexels> {
        self.texels.as_ref()
    }

    fn buffer(&self, pass: MeshPass) -> Option<&PassBuffer> {
        match pass {
            MeshPass::Opaque => self.opaque.as_ref(),
            MeshPass::Transparent => self.transparent.as_ref(),
        }
    }
}

impl ChunkMeshPipeline for CpuChunkMesh {
    fn descriptor(&self) -> &MeshDescriptor {
        &self.descriptor
    }

    fn initialize_opaque_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()> {
        let capacity = allocation.vertex_capacity(face_estimate, self.descriptor.dims());
        self.opaque = Some(PassBuffer::new(capacity));
        Ok(())
    }

    fn initialize_transparent_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()> {
        let capacity = allocation.vertex_capacity(face_estimate, self.descriptor.dims());
        self.transparent = Some(PassBuffer::new(capacity));
        Ok(())
    }

    fn initialize_chunk_data_buffer(&mut self, grid: &BlockGrid) -> MeshResult<()> {
        check_grid(&self.descriptor, grid)?;
        self.texels = Some(VoxelTexels::from_grid(grid, &self.lookup)?);
        Ok(())
    }

    fn generate_mesh(&mut self) -> MeshResult<MeshStats> {
        let texels = self
            .texels
            .as_ref()
            .ok_or(MeshError::NotInitialized("chunk data buffer"))?;
        let opaque = self
            .opaque
            .as_mut()
            .ok_or(MeshError::NotInitialized("opaque buffer"))?;
        let transparent = self
            .transparent
            .as_mut()
            .ok_or(MeshError::NotInitialized("transparent buffer"))?;

        let scale = self.descriptor.voxel_scale();
        let passes = [
            (MeshPass::Opaque, &mut *opaque),
            (MeshPass::Transparent, &mut *transparent),
        ];
        for (pass, buffer) in passes {
            buffer.reset();
            let groups = self.dispatch.workgroups(pass, self.descriptor.lod);
            run_pass(texels, &self.lookup, pass, groups, scale, buffer)?;
        }

        let stats = MeshStats {
            opaque: opaque.stats(),
            transparent: transparent.stats(),
        };
        if let Err(err) = stats.check_capacity(self.descriptor.coord) {
            opaque.reset();
            transparent.reset();
            error!(%err, "mesh buffer overrun");
            return Err(err);
        }

        debug!(
            x = self.descriptor.coord.x,
            z = self.descriptor.coord.z,
            lod = self.descriptor.lod.index(),
            opaque = stats.opaque.vertex_count,
            transparent = stats.transparent.vertex_count,
            "chunk meshed"
        );
        Ok(stats)
    }
}

/// Runs one pass over every invocation of a `groups` dispatch.
fn run_pass(
    texels: &VoxelTexels,
    lookup: &FaceLookupTable,
    pass: MeshPass,
    groups: [u32; 3],
    scale: f32,
    buffer: &mut PassBuffer,
) -> MeshResult<()> {
    let extent = [
        groups[0] * WORKGROUP_SIZE[0],
        groups[1] * WORKGROUP_SIZE[1],
        groups[2] * WORKGROUP_SIZE[2],
    ];
    let channel = pass.index() as usize;

    for z in 0..extent[2] {
        for y in 0..extent[1] {
            for x in 0..extent[0] {
                let cell = [x as i32, y as i32, z as i32];
                let Some(texel) = texels.texel(cell[0], cell[1], cell[2]) else {
                    continue;
                };
                let type_id = texel[channel];
                if type_id == 0 {
                    continue;
                }

                for face in Face::ALL {
                    let [dx, dy, dz] = face.offset();
                    let neighbor = texels.texel(cell[0] + dx, cell[1] + dy, cell[2] + dz);
                    if !face_visible(pass, neighbor) {
                        continue;
                    }
                    let atlas_index = lookup.atlas_index(type_id, face)?;
                    buffer.emit(ChunkVertex::face_quad([x, y, z], face, atlas_index, scale));
                }
            }
        }
    }
    Ok(())
}

/// Whether a face is drawn given the texel across it (`None` past the
/// chunk edge).
#[inline]
fn face_visible(pass: MeshPass, neighbor: Option<Texel>) -> bool {
    match (pass, neighbor) {
        (_, None) => true,
        (MeshPass::Opaque, Some([solid, _])) => solid == 0,
        (MeshPass::Transparent, Some(texel)) => texel == [0, 0],
    }
}
