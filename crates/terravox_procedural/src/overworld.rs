//! # Overworld Generator
//!
//! Continental terrain: a domain-warped noise field, remapped through a
//! monotone spline into surface heights, then filled column by column.
//!
//! ## Column layout (scale `s = 2^lod`, surface `h`)
//!
//! | cell                 | block                                   |
//! |----------------------|-----------------------------------------|
//! | `y == 0`             | bedrock                                 |
//! | `y < (h - 5) / s`    | stone                                   |
//! | `y < h / s`          | dirt above sea level, sand below        |
//! | `y == h / s`         | grass above sea level, sand below       |
//! | `y <= sea / s`       | water (only cells left as air)          |
//!
//! Heights are sampled in a space scaled by [`SAMPLE_SCALE`] so the
//! continental field stays broad while the chunk grid stays small.

use terravox_core::{BlockKind, BlockWord};

use crate::chunk::Chunk;
use crate::error::ProceduralResult;
use crate::generator::{GenerationConfig, TerrainGenerator};
use crate::noise::{DomainWarp, NoiseField, WorldSeed};
use crate::spline::MonotoneSpline;

/// World columns are multiplied by this before sampling the height field.
pub const SAMPLE_SCALE: f64 = 8.0;

/// Continental field frequency.
const BASE_FREQUENCY: f64 = 0.005 * 0.25;

/// Domain warp displacement, in sample units.
const WARP_AMPLITUDE: f64 = 120.0;

/// Domain warp frequency.
const WARP_FREQUENCY: f64 = 0.01;

/// Normalised continentalness to surface height.
const CONTINENTAL_SPLINE: [(f64, f64); 6] = [
    (0.0, 5.0),
    (0.2, 5.0),
    (0.3, 15.0),
    (0.62, 30.0),
    (0.64, 50.0),
    (1.0, 60.0),
];

/// Thickness of the dirt/sand layer above stone.
const SOIL_DEPTH: i32 = 5;

/// Trees only grow on surfaces above this height.
const MIN_TREE_SURFACE: i32 = 15;

/// Placement noise must exceed this for a tree.
const TREE_PLACEMENT_THRESHOLD: f64 = 0.64;

/// Trunk cells below the canopy.
const TRUNK_HEIGHT: i32 = 4;

/// Slope probe distance, in sample units.
const SLOPE_PROBE: f64 = 16.0;

/// Noise stream ids for [`WorldSeed::derive`].
const CONTINENTAL_STREAM: u64 = 1;
const WARP_STREAM: u64 = 2;
const VEGETATION_STREAM: u64 = 3;
const PLACEMENT_STREAM: u64 = 4;

/// The default terrain generator.
#[derive(Clone)]
pub struct OverworldGenerator {
    seed: WorldSeed,
    config: GenerationConfig,
    continental: NoiseField,
    warp: DomainWarp,
    spline: MonotoneSpline,
    vegetation: NoiseField,
    placement: NoiseField,
}

impl OverworldGenerator {
    /// Creates a generator with default settings.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in height spline is invalid.
    pub fn new(seed: WorldSeed) -> ProceduralResult<Self> {
        Self::with_config(seed, GenerationConfig::default())
    }

    /// Creates a generator with explicit settings.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in height spline is invalid.
    pub fn with_config(seed: WorldSeed, config: GenerationConfig) -> ProceduralResult<Self> {
        Ok(Self {
            seed,
            config,
            continental: NoiseField::new(seed.derive(CONTINENTAL_STREAM), BASE_FREQUENCY),
            warp: DomainWarp::new(seed.derive(WARP_STREAM), WARP_AMPLITUDE, WARP_FREQUENCY),
            spline: MonotoneSpline::new(&CONTINENTAL_SPLINE)?,
            vegetation: NoiseField::new(seed.derive(VEGETATION_STREAM), BASE_FREQUENCY * 1.3),
            placement: NoiseField::new(seed.derive(PLACEMENT_STREAM), BASE_FREQUENCY * 80.0),
        })
    }

    /// The seed everything derives from.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Active settings.
    #[must_use]
    pub fn config(&self) -> GenerationConfig {
        self.config
    }

    /// Surface height at a point of sample space.
    fn continental_height(&self, sx: f64, sz: f64) -> f64 {
        let (wx, wz) = self.warp.warp(sx, sz);
        self.spline.evaluate(self.continental.sample_unit(wx, wz))
    }

    /// Block for cell `y` of a column with surface `height`, at scale `scale`.
    fn column_block(&self, y: i32, height: i32, scale: i32) -> Option<BlockKind> {
        let surface = height / scale;
        let sea = self.config.sea_level / scale;

        if y == 0 {
            Some(BlockKind::Bedrock)
        } else if y < (height - SOIL_DEPTH) / scale {
            Some(BlockKind::Stone)
        } else if y < surface {
            Some(if y > sea { BlockKind::Dirt } else { BlockKind::Sand })
        } else if y == surface {
            Some(if y > sea { BlockKind::Grass } else { BlockKind::Sand })
        } else if y <= sea {
            Some(BlockKind::Water)
        } else {
            None
        }
    }

    /// Whether a tree grows on the column at world `(x, z)` with the given
    /// surface height. All noise is read in sample space, like the heights.
    fn grows_tree(&self, x: i32, z: i32, surface: i32) -> bool {
        if surface <= MIN_TREE_SURFACE || surface <= self.config.sea_level {
            return false;
        }

        let (sx, sz) = (f64::from(x) * SAMPLE_SCALE, f64::from(z) * SAMPLE_SCALE);
        if self.vegetation.sample(sx, sz) <= 0.0
            || self.placement.sample(sx, sz) <= TREE_PLACEMENT_THRESHOLD
        {
            return false;
        }

        let slope_x = self.continental_height(sx + SLOPE_PROBE, sz)
            - self.continental_height(sx - SLOPE_PROBE, sz);
        let slope_z = self.continental_height(sx, sz + SLOPE_PROBE)
            - self.continental_height(sx, sz - SLOPE_PROBE);
        slope_x.abs() < 1.0 && slope_z.abs() < 1.0
    }

    /// Trunk and canopy above `(x, surface, z)`, written only into air.
    fn place_tree(chunk: &mut Chunk, x: i32, surface: i32, z: i32) {
        let ceiling = chunk.dims().height as i32;
        for offset in 1..=TRUNK_HEIGHT + 1 {
            let y = surface + offset;
            if y >= ceiling {
                break;
            }
            if !chunk.get_block_at(x, y, z).is_air() {
                continue;
            }
            let kind = if offset <= TRUNK_HEIGHT {
                BlockKind::Wood
            } else {
                BlockKind::Leaves
            };
            chunk.set_block_at(x, y, z, BlockWord::from_kind(kind));
        }
    }

    fn decorate(&self, chunk: &mut Chunk) {
        let size = chunk.dims().size as i32;
        let coord = chunk.coord();
        for x in 0..size {
            for z in 0..size {
                let (gx, gz) = (coord.world_x() + x, coord.world_z() + z);
                let surface = self.height(gx, gz);
                if self.grows_tree(gx, gz, surface) {
                    Self::place_tree(chunk, x, surface, z);
                }
            }
        }
    }
}

impl TerrainGenerator for OverworldGenerator {
    fn generate(&self, chunk: &mut Chunk) {
        let dims = chunk.dims();
        let scale = chunk.lod().scale() as i32;
        let coord = chunk.coord();

        for x in 0..dims.size as i32 {
            for z in 0..dims.size as i32 {
                let height = self.height(coord.world_x() + x * scale, coord.world_z() + z * scale);
                for y in 0..dims.height as i32 {
                    if let Some(kind) = self.column_block(y, height, scale) {
                        chunk.set_block_at(x, y, z, BlockWord::from_kind(kind));
                    }
                }
            }
        }

        if self.config.decoration && chunk.lod().is_full_detail() {
            self.decorate(chunk);
        }
    }

    fn height(&self, x: i32, z: i32) -> i32 {
        let sampled = self.continental_height(f64::from(x) * SAMPLE_SCALE, f64::from(z) * SAMPLE_SCALE);
        sampled as i32
    }
}
