//! # TERRAVOX Procedural Generation
//!
//! Deterministic world generation for chunked voxel terrain.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Chunked**: World is generated in fixed 16 x 64 x 16 chunks
//! 3. **Level of detail**: Distant chunks are generated at 1/2, 1/4 or 1/8
//!    resolution with the same footprint
//! 4. **Pluggable**: Chunks are filled through the `TerrainGenerator` trait
//!
//! ## Core Components
//!
//! - `SimplexNoise` / `NoiseField` / `DomainWarp`: 2D noise
//! - `MonotoneSpline`: PCHIP height remapping
//! - `BlockGrid`: flat arena of block words, `(x * height + y) * size + z`
//! - `Chunk`: one column of the world and its lifecycle
//! - `OverworldGenerator`: the default terrain
//!
//! ## Example
//!
//! ```rust
//! use terravox_procedural::{Chunk, ChunkCoord, OverworldGenerator, WorldSeed};
//!
//! let generator = OverworldGenerator::new(WorldSeed::new(12345)).unwrap();
//! let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
//! chunk.generate_chunk_data(&generator);
//!
//! assert!(chunk.is_loaded());
//! assert!(chunk.block_count() > 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod error;
pub mod generator;
pub mod grid;
pub mod lod;
pub mod noise;
pub mod overworld;
pub mod spline;

pub use chunk::{Chunk, ChunkCoord, ChunkState, CHUNK_HEIGHT, CHUNK_SIZE};
pub use error::{ChunkError, ProceduralError, ProceduralResult};
pub use generator::{GenerationConfig, TerrainGenerator, SEA_LEVEL};
pub use grid::{BlockGrid, GridDims};
pub use lod::{Lod, DEFAULT_MAX_LOD_DISTANCE, LOD_THRESHOLDS};
pub use noise::{DomainWarp, NoiseField, SimplexNoise, WorldSeed};
pub use overworld::{OverworldGenerator, SAMPLE_SCALE};
pub use spline::MonotoneSpline;
