//! Meshing properties over seeded random block layouts.
//!
//! Run with: cargo test --package terravox_rendering --test meshing_properties_test

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terravox_core::{BlockCatalog, BlockKind, BlockWord};
use terravox_procedural::{BlockGrid, ChunkCoord, GridDims, Lod};
use terravox_rendering::{
    BufferAllocation, ChunkMeshPipeline, CpuChunkMesh, CpuMeshBackend, DispatchConfig,
    DispatchScaling, MeshBackend, MeshDescriptor, MeshError, MeshPass, MeshResult, MeshStats,
};

const SOLIDS: [BlockKind; 7] = [
    BlockKind::Dirt,
    BlockKind::Grass,
    BlockKind::Stone,
    BlockKind::Bedrock,
    BlockKind::Sand,
    BlockKind::Wood,
    BlockKind::Leaves,
];

fn backend(dispatch: DispatchConfig) -> CpuMeshBackend {
    let lookup = BlockCatalog::standard()
        .expect("bundled catalog is valid")
        .build_face_lookup_table();
    CpuMeshBackend::new(lookup, dispatch)
}

fn random_grid(rng: &mut ChaCha8Rng, lod: Lod, density: f64, water: f64) -> BlockGrid {
    let dims = GridDims::BASE.for_lod(lod);
    let mut grid = BlockGrid::new(dims);
    for x in 0..dims.size as i32 {
        for y in 0..dims.height as i32 {
            for z in 0..dims.size as i32 {
                let roll: f64 = rng.gen();
                if roll < water {
                    grid.set(x, y, z, BlockWord::from_kind(BlockKind::Water));
                } else if roll < water + density {
                    let kind = SOLIDS[rng.gen_range(0..SOLIDS.len())];
                    grid.set(x, y, z, BlockWord::from_kind(kind));
                }
            }
        }
    }
    grid
}

fn mesh(
    backend: &CpuMeshBackend,
    lod: Lod,
    grid: &BlockGrid,
    allocation: BufferAllocation,
) -> (CpuChunkMesh, MeshResult<MeshStats>) {
    let mut mesh = backend.create_mesh(MeshDescriptor::new(ChunkCoord::new(0, 0), lod, 2));
    let estimate = grid.face_estimate();
    mesh.initialize_opaque_buffer(allocation, estimate).unwrap();
    mesh.initialize_transparent_buffer(allocation, estimate).unwrap();
    mesh.initialize_chunk_data_buffer(grid).unwrap();
    let stats = mesh.generate_mesh();
    (mesh, stats)
}

#[test]
fn emitted_faces_match_estimate_without_water() {
    let backend = backend(DispatchConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(0x7E44_A70C);

    for round in 0..24 {
        let lod = Lod::ALL[round % 4];
        let density = 0.1 + 0.8 * rng.gen::<f64>();
        let grid = random_grid(&mut rng, lod, density, 0.0);

        let (_, stats) = mesh(&backend, lod, &grid, BufferAllocation::Conservative);
        let stats = stats.unwrap();
        assert_eq!(
            stats.opaque.faces(),
            grid.face_estimate(),
            "round {round} at {lod:?}, density {density:.2}"
        );
        assert_eq!(stats.transparent.vertex_count, 0);
    }
}

#[test]
fn estimate_bounds_liquid_faces() {
    let backend = backend(DispatchConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for round in 0..16 {
        let lod = Lod::ALL[round % 4];
        let grid = random_grid(&mut rng, lod, 0.3, 0.3);
        let (_, stats) = mesh(&backend, lod, &grid, BufferAllocation::Conservative);
        let stats = stats.unwrap();

        // Liquid faces only show against air or the edge, which the
        // estimate counts as exposed too
        assert!(stats.transparent.faces() <= grid.face_estimate());
    }
}

#[test]
fn conservative_allocation_never_overflows() {
    let backend = backend(DispatchConfig::default());

    // Checkerboard: every solid cell exposes all six faces
    let dims = GridDims::BASE;
    let mut grid = BlockGrid::new(dims);
    for x in 0..dims.size as i32 {
        for y in 0..dims.height as i32 {
            for z in 0..dims.size as i32 {
                if (x + y + z) % 2 == 0 {
                    grid.set(x, y, z, BlockWord::from_kind(BlockKind::Stone));
                }
            }
        }
    }

    let (mesh, stats) = mesh(&backend, Lod::Lod0, &grid, BufferAllocation::Conservative);
    let stats = stats.unwrap();
    assert_eq!(stats.opaque.faces() as usize, dims.volume() / 2 * 6);
    assert_eq!(mesh.vertices(MeshPass::Opaque).len(), stats.opaque.vertex_count as usize);
}

#[test]
fn smart_allocation_overrun_is_detected() {
    let backend = backend(DispatchConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let grid = random_grid(&mut rng, Lod::Lod1, 0.4, 0.0);

    // An under-sized buffer: half the estimate
    let mut mesh = backend.create_mesh(MeshDescriptor::new(ChunkCoord::new(0, 0), Lod::Lod1, 2));
    let half = grid.face_estimate() / 2;
    let tight = BufferAllocation::Smart { safety_factor: 1 };
    mesh.initialize_opaque_buffer(tight, half).unwrap();
    mesh.initialize_transparent_buffer(tight, half).unwrap();
    mesh.initialize_chunk_data_buffer(&grid).unwrap();

    match mesh.generate_mesh() {
        Err(MeshError::CapacityExceeded { pass, emitted, capacity, .. }) => {
            assert_eq!(pass, MeshPass::Opaque);
            assert_eq!(emitted, grid.face_estimate() * 6);
            assert_eq!(capacity, half * 6);
        }
        other => panic!("expected an overrun, got {other:?}"),
    }
    assert_eq!(mesh.command(MeshPass::Opaque).unwrap().vertex_count, 0);
}

#[test]
fn every_scaling_meshes_the_same_faces() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for lod in Lod::ALL {
        let grid = random_grid(&mut rng, lod, 0.5, 0.1);
        let baseline = {
            let exact = DispatchConfig {
                opaque: DispatchScaling::Exact,
                transparent: DispatchScaling::Exact,
            };
            mesh(&backend(exact), lod, &grid, BufferAllocation::Conservative).1.unwrap()
        };

        for scaling in [DispatchScaling::LodScaled, DispatchScaling::Full] {
            let config = DispatchConfig {
                opaque: scaling,
                transparent: scaling,
            };
            let (_, stats) = mesh(&backend(config), lod, &grid, BufferAllocation::Conservative);
            assert_eq!(stats.unwrap(), baseline, "{scaling:?} at {lod:?}");
        }
    }
}

#[test]
fn vertices_stay_inside_chunk_footprint() {
    let backend = backend(DispatchConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(31);

    for lod in Lod::ALL {
        let grid = random_grid(&mut rng, lod, 0.5, 0.2);
        let (mesh, stats) = mesh(&backend, lod, &grid, BufferAllocation::Conservative);
        stats.unwrap();

        for pass in MeshPass::ALL {
            for vertex in mesh.vertices(pass) {
                let [x, y, z] = vertex.position;
                assert!((0.0..=16.0).contains(&x), "{lod:?} x {x}");
                assert!((0.0..=64.0).contains(&y), "{lod:?} y {y}");
                assert!((0.0..=16.0).contains(&z), "{lod:?} z {z}");
            }
        }
    }
}
