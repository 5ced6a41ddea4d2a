//! Vertex buffer sizing.
//!
//! Buffers are allocated before the kernel runs, so their size has to be
//! guessed from the chunk's face estimate. Either guess can be too small;
//! the pipeline checks the kernel's emitted count against the capacity after
//! every dispatch.

use serde::Deserialize;
use terravox_procedural::GridDims;

use crate::mesh::vertex::{ChunkVertex, VERTEX_BYTES_PER_FACE};

/// Multiplier applied to the face estimate by [`BufferAllocation::Smart`].
pub const DEFAULT_SAFETY_FACTOR: u32 = 12;

/// How vertex buffers are sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BufferAllocation {
    /// Room for every face of every cell: `volume * 6 * 192` bytes.
    Conservative,
    /// `face_estimate * 192 * safety_factor` bytes, at least one face.
    ///
    /// The estimate treats water as occluding, while the opaque pass still
    /// emits solid faces that border water. A stone/water/stone layering can
    /// therefore exceed the estimate itself; the safety factor absorbs this
    /// in practice and the capacity check catches the rest.
    Smart {
        /// Headroom over the estimate.
        #[serde(default = "default_safety_factor")]
        safety_factor: u32,
    },
}

fn default_safety_factor() -> u32 {
    DEFAULT_SAFETY_FACTOR
}

impl Default for BufferAllocation {
    fn default() -> Self {
        Self::Smart {
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

impl BufferAllocation {
    /// Vertex buffer size in bytes for a chunk of `dims` cells with
    /// `face_estimate` exposed faces. Never zero.
    #[must_use]
    pub fn vertex_buffer_bytes(self, face_estimate: u32, dims: GridDims) -> u64 {
        let faces = match self {
            Self::Conservative => dims.volume() as u64 * 6,
            Self::Smart { safety_factor } => {
                u64::from(face_estimate) * u64::from(safety_factor.max(1))
            }
        };
        faces.max(1) * VERTEX_BYTES_PER_FACE
    }

    /// Vertex capacity of a buffer sized by [`Self::vertex_buffer_bytes`].
    #[must_use]
    pub fn vertex_capacity(self, face_estimate: u32, dims: GridDims) -> u32 {
        let vertices = self.vertex_buffer_bytes(face_estimate, dims) / ChunkVertex::SIZE;
        u32::try_from(vertices).unwrap_or(u32::MAX)
    }
}
