//! # Procedural Error Types

use thiserror::Error;

use crate::chunk::ChunkCoord;

/// Errors raised while building generators or restoring grids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProceduralError {
    /// Spline control points are unusable.
    #[error("invalid spline: {0}")]
    InvalidSpline(&'static str),

    /// A grid snapshot has the wrong length for its dimensions.
    #[error("grid snapshot holds {actual} bytes, dimensions require {expected}")]
    SnapshotSize {
        /// Bytes required by the dimensions.
        expected: usize,
        /// Bytes provided.
        actual: usize,
    },
}

/// Result type for procedural operations.
pub type ProceduralResult<T> = Result<T, ProceduralError>;

/// Chunk lifecycle violations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    /// Meshing was requested before the chunk's blocks were generated.
    #[error("chunk ({}, {}) isn't loaded", .coord.x, .coord.z)]
    NotLoaded {
        /// The offending chunk.
        coord: ChunkCoord,
    },
}
