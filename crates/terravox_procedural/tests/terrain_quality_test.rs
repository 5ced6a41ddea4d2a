//! # Terrain Quality Tests
//!
//! Verifies that the overworld reads as continents: oceans, lowlands and
//! highlands, a bedrock floor everywhere, and water only where the ground
//! is below sea level.

use terravox_core::BlockKind;
use terravox_procedural::{
    Chunk, ChunkCoord, GenerationConfig, Lod, OverworldGenerator, TerrainGenerator, WorldSeed,
    SEA_LEVEL,
};

fn overworld(seed: u64) -> OverworldGenerator {
    OverworldGenerator::new(WorldSeed::new(seed)).expect("built-in spline is valid")
}

/// Test: Verify terrain has both oceans and highlands.
#[test]
fn test_terrain_has_oceans_and_highlands() {
    let generator = overworld(42);

    let mut ocean = 0;
    let mut highland = 0;
    let mut total = 0;
    for z in (-6400..6400).step_by(64) {
        for x in (-6400..6400).step_by(64) {
            let height = generator.height(x, z);
            if height <= SEA_LEVEL {
                ocean += 1;
            }
            if height > 30 {
                highland += 1;
            }
            total += 1;
        }
    }

    println!("Ocean columns: {ocean} / {total}");
    println!("Highland columns: {highland} / {total}");
    assert!(ocean > 0, "No column below sea level");
    assert!(highland > 0, "No column above 30");
}

/// Test: Verify neighbouring columns rarely jump more than a few blocks.
#[test]
fn test_terrain_is_walkable() {
    let generator = overworld(42);

    let mut smooth = 0;
    let mut total = 0;
    for z in (-500..500).step_by(10) {
        for x in (-500..500).step_by(10) {
            let step = (generator.height(x, z) - generator.height(x + 1, z)).abs();
            if step <= 3 {
                smooth += 1;
            }
            total += 1;
        }
    }

    let smooth_percentage = f64::from(smooth) / f64::from(total) * 100.0;
    println!("Walkable steps: {smooth_percentage:.1}%");
    assert!(smooth_percentage > 50.0, "Terrain too jagged: {smooth_percentage:.1}%");
}

/// Test: Verify every generated chunk has a bedrock floor at every tier.
#[test]
fn test_bedrock_floor_at_every_lod() {
    let generator = overworld(7);

    for lod in Lod::ALL {
        for x in -2..2 {
            for z in -2..2 {
                let mut chunk = Chunk::with_lod(ChunkCoord::new(x, z), lod);
                chunk.generate_chunk_data(&generator);
                let size = chunk.dims().size as i32;
                for cx in 0..size {
                    for cz in 0..size {
                        assert_eq!(
                            chunk.get_block_at(cx, 0, cz).kind(),
                            Some(BlockKind::Bedrock),
                            "missing bedrock at ({cx}, 0, {cz}) of chunk ({x}, {z}) {lod:?}"
                        );
                    }
                }
            }
        }
    }
}

/// Test: Verify water never sits above sea level or inside the ground.
#[test]
fn test_water_only_fills_air_below_sea_level() {
    let generator = overworld(42);

    for x in -3..3 {
        for z in -3..3 {
            let coord = ChunkCoord::new(x, z);
            let mut chunk = Chunk::new(coord);
            chunk.generate_chunk_data(&generator);
            let grid = chunk.grid().expect("generated chunk has a grid");

            for ([cx, y, cz], word) in grid.solid_cells() {
                if word.kind() != Some(BlockKind::Water) {
                    continue;
                }
                let surface = generator.height(coord.world_x() + cx as i32, coord.world_z() + cz as i32);
                assert!(y as i32 <= SEA_LEVEL, "water above sea level at y={y}");
                assert!(y as i32 > surface, "water inside ground at y={y}, surface {surface}");
            }
        }
    }
}

/// Test: Verify coarse tiers follow the full-detail surface.
#[test]
fn test_lod_surfaces_track_full_detail() {
    let generator = overworld(42);
    let coord = ChunkCoord::new(4, -4);

    for lod in [Lod::Lod1, Lod::Lod2, Lod::Lod3] {
        let mut chunk = Chunk::with_lod(coord, lod);
        chunk.generate_chunk_data(&generator);
        let scale = lod.scale() as i32;
        let dims = chunk.dims();

        for x in 0..dims.size as i32 {
            for z in 0..dims.size as i32 {
                let height = generator.height(coord.world_x() + x * scale, coord.world_z() + z * scale);
                let top = height / scale;
                if top < dims.height as i32 {
                    let kind = chunk.get_block_at(x, top, z).kind();
                    assert!(
                        matches!(kind, Some(BlockKind::Grass | BlockKind::Sand)),
                        "surface cell at {lod:?} ({x}, {top}, {z}) is {kind:?}"
                    );
                }
            }
        }
    }
}

/// Test: Verify trees appear somewhere when decoration is on.
#[test]
fn test_decoration_places_trees() {
    let generator = OverworldGenerator::with_config(
        WorldSeed::new(42),
        GenerationConfig {
            decoration: true,
            ..GenerationConfig::default()
        },
    )
    .expect("built-in spline is valid");

    let mut wood = 0;
    let mut leaves = 0;
    for x in -12..12 {
        for z in -12..12 {
            let mut chunk = Chunk::new(ChunkCoord::new(x, z));
            chunk.generate_chunk_data(&generator);
            for (_, word) in chunk.grid().expect("generated chunk has a grid").solid_cells() {
                match word.kind() {
                    Some(BlockKind::Wood) => wood += 1,
                    Some(BlockKind::Leaves) => leaves += 1,
                    _ => {}
                }
            }
        }
    }

    println!("Placed {wood} wood and {leaves} leaves");
    assert!(wood > 0, "No trees in 24x24 chunks");
    assert!(wood >= leaves, "Canopy cells without trunks");
}
