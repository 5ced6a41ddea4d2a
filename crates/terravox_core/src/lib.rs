//! # TERRAVOX Core
//!
//! Block-level types shared by generation and meshing.
//!
//! ## Core Components
//!
//! - `BlockWord`: packed 32-bit cell, 24-bit type id plus 8-bit rotation
//! - `BlockKind`: the built-in block ids
//! - `BlockCatalog`: per-face atlas index registration
//! - `FaceLookupTable`: sealed flat table, `type_id * 6 + face`
//!
//! ## Example
//!
//! ```rust
//! use terravox_core::{BlockCatalog, BlockKind, BlockWord, Face};
//!
//! let table = BlockCatalog::standard().unwrap().build_face_lookup_table();
//! let grass = BlockWord::from_kind(BlockKind::Grass);
//! assert_eq!(table.atlas_index(grass.type_id(), Face::Top), Ok(0));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod catalog;
pub mod error;

pub use block::{BlockKind, BlockRotation, BlockWord, MAX_TYPE_ID};
pub use catalog::{BlockCatalog, Face, FaceLookupTable, FaceSpec, FaceTextures, FACE_COUNT};
pub use error::{BlockError, BlockResult};
