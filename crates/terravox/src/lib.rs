//! # TERRAVOX
//!
//! The main crate, integrating all units.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐     ┌──────────────────────┐
//! │  terravox_core   │────>│ terravox_procedural  │────>│ terravox_rendering   │
//! │                  │     │                      │     │                      │
//! │  • BlockWord     │     │  • Noise / spline    │     │  • ChunkMeshPipeline │
//! │  • BlockCatalog  │     │  • Chunk / LOD       │     │  • CPU + GPU backends│
//! │  • Face lookup   │     │  • Overworld         │     │  • World             │
//! └──────────────────┘     └──────────────────────┘     └──────────┬───────────┘
//!                                                                  │
//!                                    ┌─────────────────────────────┘
//!                                    v
//!                          ┌──────────────────────┐
//!                          │  terravox (this)     │
//!                          │  • config / logging  │
//!                          │  • terravox-bake     │
//!                          └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML application configuration
//! - `logging`: `tracing` subscriber setup
//! - `bake`: one-shot world generation

pub mod bake;
pub mod config;
pub mod logging;

// Re-export the units
pub use terravox_core as core;
pub use terravox_procedural as procedural;
pub use terravox_rendering as rendering;

pub use bake::bake;
pub use config::{AppConfig, Backend, ConfigError};
