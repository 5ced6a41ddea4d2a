//! One-shot world generation.

use terravox_core::BlockCatalog;
use terravox_procedural::{OverworldGenerator, WorldSeed};
use terravox_rendering::{
    CpuMeshBackend, GpuContext, GpuMeshBackend, MeshBackend, MeshResult, World, WorldStats,
};
use tracing::info;

use crate::config::{AppConfig, Backend};

/// Generates and meshes every chunk of the configured world.
///
/// # Errors
///
/// Fails when the catalog is invalid, no GPU adapter is available for the
/// `gpu` backend, or any chunk fails to mesh.
pub fn bake(config: &AppConfig) -> MeshResult<WorldStats> {
    let lookup = BlockCatalog::standard()?.build_face_lookup_table();
    let dispatch = config.world.dispatch;

    info!(
        seed = config.seed,
        backend = ?config.backend,
        world_size = config.world.world_size,
        "baking world"
    );

    match config.backend {
        Backend::Cpu => run(config, CpuMeshBackend::new(lookup, dispatch)),
        Backend::Gpu => {
            let context = GpuContext::headless()?;
            run(config, GpuMeshBackend::new(context, lookup, dispatch))
        }
    }
}

fn run<B: MeshBackend>(config: &AppConfig, backend: B) -> MeshResult<WorldStats> {
    let generator =
        OverworldGenerator::with_config(WorldSeed::new(config.seed), config.world.generation)?;
    let mut world = World::new(config.world, generator, backend)?;
    world.generate_world(config.viewer_position())
}
