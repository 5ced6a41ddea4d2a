//! # Meshing Error Types

use terravox_core::BlockError;
use terravox_procedural::{ChunkCoord, ChunkError, GridDims, ProceduralError};
use thiserror::Error;

use crate::mesh::MeshPass;

/// Errors raised while meshing chunks or running the world.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Bad block word or catalog miss.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Chunk lifecycle violation.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Generator construction failed.
    #[error(transparent)]
    Procedural(#[from] ProceduralError),

    /// The kernel emitted more vertices than the pass buffer holds.
    #[error(
        "chunk ({}, {}) {} pass emitted {emitted} vertices into a buffer of {capacity}",
        .coord.x, .coord.z, .pass.label()
    )]
    CapacityExceeded {
        /// The chunk being meshed.
        coord: ChunkCoord,
        /// The overflowing pass.
        pass: MeshPass,
        /// Vertices the kernel tried to emit.
        emitted: u32,
        /// Vertices the buffer holds.
        capacity: u32,
    },

    /// A pipeline step ran before the step that allocates its input.
    #[error("{0} used before initialization")]
    NotInitialized(&'static str),

    /// Uploaded grid does not match the mesh's tier.
    #[error("grid is {}x{}x{}, mesh expects {}x{}x{}",
        .found.size, .found.height, .found.size,
        .expected.size, .expected.height, .expected.size)]
    GridMismatch {
        /// Dimensions of the mesh's tier.
        expected: GridDims,
        /// Dimensions of the uploaded grid.
        found: GridDims,
    },

    /// A buffer would exceed the device's storage binding limit.
    #[error("{bytes} byte buffer exceeds the device limit of {limit}")]
    BufferTooLarge {
        /// Requested size.
        bytes: u64,
        /// Device limit.
        limit: u64,
    },

    /// World size must be even and non-zero.
    #[error("world size {0} must be even and non-zero")]
    InvalidWorldSize(u32),

    /// No adapter can run the meshing kernel.
    #[error("no compatible GPU adapter")]
    NoAdapter,

    /// Device creation failed.
    #[error(transparent)]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// Mapping the readback buffer failed.
    #[error("mesh readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    /// The readback callback was dropped without reporting.
    #[error("mesh readback channel closed")]
    ReadbackLost,
}

/// Result type for meshing operations.
pub type MeshResult<T> = Result<T, MeshError>;
