//! # Mesh Protocol
//!
//! Everything the GPU kernel and the CPU reference agree on: vertex layout,
//! indirect commands, buffer sizing, dispatch shape, voxel texels and the
//! pipeline traits.

pub mod capacity;
pub mod dispatch;
pub mod pipeline;
pub mod texels;
pub mod vertex;

pub use capacity::{BufferAllocation, DEFAULT_SAFETY_FACTOR};
pub use dispatch::{
    covers, groups_covering, DispatchConfig, DispatchScaling, MeshPass, WORKGROUP_SIZE,
};
pub use pipeline::{ChunkMeshPipeline, MeshBackend, MeshDescriptor, MeshStats, PassStats};
pub use texels::{Texel, VoxelTexels};
pub use vertex::{
    ChunkVertex, DrawIndirectCommand, CORNER_UVS, FACE_CORNERS, VERTEX_BYTES_PER_FACE,
    VERTICES_PER_FACE,
};
