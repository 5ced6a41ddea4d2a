//! # GPU Meshing Backend
//!
//! Chunks are meshed by a WGSL compute kernel in two passes (solid blocks,
//! then liquids). Each pass appends faces to its own vertex buffer and bumps
//! the vertex count of its own indirect draw command, so the renderer draws
//! without the vertices ever reaching the CPU. The only host wait is a
//! 32-byte readback of both commands for the capacity check.

pub mod chunk_mesh;
pub mod context;
pub mod kernel;

pub use chunk_mesh::{GpuChunkMesh, GpuMeshBackend};
pub use context::GpuContext;
pub use kernel::{MeshKernel, MeshParams};
