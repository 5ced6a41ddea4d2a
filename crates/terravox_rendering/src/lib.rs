//! # TERRAVOX Rendering
//!
//! Turns generated chunks into GPU-resident meshes and keeps a world of
//! them up to date as the viewer moves.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   BlockGrid   ┌──────────────────┐  indirect draw  ┌──────────┐
//! │ Chunk (data) │ ────────────> │ ChunkMeshPipeline│ ──────────────> │ renderer │
//! └──────────────┘               │  GPU  |  CPU     │                 └──────────┘
//!        ^                       └──────────────────┘
//!        │ set_lod / regenerate           ^
//! ┌──────────────┐                        │ create_mesh
//! │    World     │ ───────────────────────┘
//! └──────────────┘
//! ```
//!
//! Meshing runs two passes per chunk. Every visible face becomes six
//! unindexed vertices appended through an atomic counter that doubles as
//! the vertex count of an indirect draw command. Buffers are sized from
//! the chunk's face estimate before meshing, and the emitted count is
//! checked against the capacity afterwards; an overrun is an error, never
//! a silently truncated mesh.
//!
//! ## Example
//!
//! ```
//! use glam::Vec3;
//! use terravox_core::BlockCatalog;
//! use terravox_procedural::{OverworldGenerator, WorldSeed};
//! use terravox_rendering::{CpuMeshBackend, DispatchConfig, World, WorldConfig};
//!
//! let lookup = BlockCatalog::standard().unwrap().build_face_lookup_table();
//! let backend = CpuMeshBackend::new(lookup, DispatchConfig::default());
//! let generator = OverworldGenerator::new(WorldSeed::new(42)).unwrap();
//! let config = WorldConfig { world_size: 2, ..WorldConfig::default() };
//!
//! let mut world = World::new(config, generator, backend).unwrap();
//! let stats = world.generate_world(Vec3::ZERO).unwrap();
//! assert_eq!(stats.chunks_meshed, 4);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cpu;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod world;

pub use cpu::{CpuChunkMesh, CpuMeshBackend};
pub use error::{MeshError, MeshResult};
pub use gpu::{GpuChunkMesh, GpuContext, GpuMeshBackend};
pub use mesh::{
    BufferAllocation, ChunkMeshPipeline, ChunkVertex, DispatchConfig, DispatchScaling,
    DrawIndirectCommand, MeshBackend, MeshDescriptor, MeshPass, MeshStats, PassStats,
    VoxelTexels,
};
pub use world::{RenderChunk, World, WorldConfig, WorldStats, WORLD_SIZE};
