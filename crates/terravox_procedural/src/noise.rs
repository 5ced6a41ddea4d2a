//! # Simplex Noise
//!
//! Deterministic 2D noise for terrain shaping.
//!
//! - [`SimplexNoise`]: raw simplex noise in `[-1, 1]`
//! - [`NoiseField`]: simplex noise sampled at a fixed frequency
//! - [`DomainWarp`]: large-amplitude coordinate displacement, used to break
//!   up the grid-aligned look of the continental field
//!
//! ## Reproducibility
//!
//! Given the same `WorldSeed`, every sampler here produces exactly the same
//! values on any platform. The permutation table is shuffled with ChaCha8,
//! which is specified bit-for-bit.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed a whole world is generated from.
///
/// Every noise stream is keyed by a [`derive`](Self::derive)d sub-seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Wraps a raw seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// The raw seed.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for one noise stream.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0 ^ purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

/// Gradient directions for 2D simplex noise.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// Seed-shuffled permutation, doubled so lookups never wrap.
#[derive(Clone)]
struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    fn new(seed: WorldSeed) -> Self {
        let mut base: [u8; 256] = std::array::from_fn(|i| i as u8);
        base.shuffle(&mut ChaCha8Rng::seed_from_u64(seed.value()));

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    #[inline]
    fn hash(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }
}

/// 2D simplex noise generator.
///
/// Produces smooth, continuous values in `[-1, 1]`.
#[derive(Clone)]
pub struct SimplexNoise {
    perm: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for the 2D simplex grid, `(sqrt(3) - 1) / 2`.
    const F2: f64 = 0.366_025_403_784_439;
    /// Unskewing factor, `(3 - sqrt(3)) / 6`.
    const G2: f64 = 0.211_324_865_405_187;

    /// Shuffles the permutation table for `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm: PermutationTable::new(seed),
        }
    }

    /// Noise value at `(x, y)`, in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Lower or upper triangle of the skewed cell
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let g0 = self.perm.hash(ii + self.perm.hash(jj) as usize);
        let g1 = self.perm.hash(ii + i1 + self.perm.hash(jj + j1) as usize);
        let g2 = self.perm.hash(ii + 1 + self.perm.hash(jj + 1) as usize);

        70.0 * (corner(x0, y0, g0) + corner(x1, y1, g1) + corner(x2, y2, g2))
    }
}

/// Contribution of one simplex corner.
#[inline]
fn corner(x: f64, y: f64, hash: u8) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let grad = GRADIENTS[(hash % 12) as usize];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
}

/// Floor for the ranges noise coordinates live in.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

/// Simplex noise sampled at a fixed frequency.
#[derive(Clone)]
pub struct NoiseField {
    noise: SimplexNoise,
    frequency: f64,
}

impl NoiseField {
    /// Creates a field from a seed and sampling frequency.
    #[must_use]
    pub fn new(seed: WorldSeed, frequency: f64) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            frequency,
        }
    }

    /// Sampling frequency.
    #[inline]
    #[must_use]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Samples the field, in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.noise.sample(x * self.frequency, y * self.frequency)
    }

    /// Samples the field remapped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn sample_unit(&self, x: f64, y: f64) -> f64 {
        ((self.sample(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Displaces sample coordinates by two independent noise streams.
#[derive(Clone)]
pub struct DomainWarp {
    offset_x: NoiseField,
    offset_y: NoiseField,
    amplitude: f64,
}

impl DomainWarp {
    /// Creates a warp with the given displacement amplitude and frequency.
    #[must_use]
    pub fn new(seed: WorldSeed, amplitude: f64, frequency: f64) -> Self {
        Self {
            offset_x: NoiseField::new(seed.derive(0x5741_5250_5f58), frequency),
            offset_y: NoiseField::new(seed.derive(0x5741_5250_5f59), frequency),
            amplitude,
        }
    }

    /// Maximum displacement along each axis.
    #[inline]
    #[must_use]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Returns the warped coordinates.
    #[inline]
    #[must_use]
    pub fn warp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x + self.amplitude * self.offset_x.sample(x, y),
            y + self.amplitude * self.offset_y.sample(x, y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = SimplexNoise::new(WorldSeed::new(12345));
        let b = a.clone();
        let c = SimplexNoise::new(WorldSeed::new(12345));

        for i in 0..100 {
            let (x, y) = (f64::from(i) * 0.1, f64::from(i) * 0.17);
            assert_eq!(a.sample(x, y), c.sample(x, y));
            assert_eq!(b.sample(x, y), c.sample(x, y));
        }
    }

    #[test]
    fn test_seeds_diverge() {
        let first = SimplexNoise::new(WorldSeed::new(1));
        let second = SimplexNoise::new(WorldSeed::new(2));

        let differs = (0..32).any(|i| {
            let x = f64::from(i) * 3.7 + 0.5;
            first.sample(x, x * 0.5) != second.sample(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_output_within_unit_range() {
        let simplex = SimplexNoise::new(WorldSeed::new(42));

        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.13 - 650.0;
            let v = simplex.sample(x, y);
            assert!((-1.0..=1.0).contains(&v), "{v} at ({x}, {y})");
        }
    }

    #[test]
    fn test_continuity() {
        let simplex = SimplexNoise::new(WorldSeed::new(42));
        let (x, y, delta) = (100.0, 100.0, 0.001);

        let v = simplex.sample(x, y);
        assert!((v - simplex.sample(x + delta, y)).abs() < 0.01);
        assert!((v - simplex.sample(x, y + delta)).abs() < 0.01);
    }

    #[test]
    fn test_derived_streams_are_stable_and_distinct() {
        let world = WorldSeed::new(42);
        assert_eq!(world.derive(1), world.derive(1));
        assert_ne!(world.derive(1), world.derive(2));
        assert_ne!(world.derive(1), world);
    }

    #[test]
    fn test_field_frequency_scales_coordinates() {
        let seed = WorldSeed::new(7);
        let field = NoiseField::new(seed, 0.25);
        let raw = SimplexNoise::new(seed);

        assert_eq!(field.sample(40.0, 12.0), raw.sample(10.0, 3.0));
        let unit = field.sample_unit(40.0, 12.0);
        assert!((0.0..=1.0).contains(&unit));
    }

    #[test]
    fn test_warp_is_bounded_by_amplitude() {
        let warp = DomainWarp::new(WorldSeed::new(9), 120.0, 0.01);

        for i in 0..500 {
            let x = f64::from(i) * 17.0;
            let y = f64::from(i) * -11.0;
            let (wx, wy) = warp.warp(x, y);
            assert!((wx - x).abs() <= warp.amplitude());
            assert!((wy - y).abs() <= warp.amplitude());
        }
    }
}
