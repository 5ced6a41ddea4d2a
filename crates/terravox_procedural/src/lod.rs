//! # Level of Detail
//!
//! Chunks far from the viewer are generated at reduced resolution. Each
//! tier halves the per-axis cell count while keeping the chunk's world
//! footprint, so one LOD-`n` cell covers `2^n` world units per axis.

use crate::chunk::CHUNK_SIZE;

/// Upper distance bounds, in chunk widths, of tiers 0, 1 and 2.
pub const LOD_THRESHOLDS: [u32; 3] = [12, 24, 48];

/// Default outermost bound, in chunk widths.
pub const DEFAULT_MAX_LOD_DISTANCE: u32 = 96;

/// Resolution tier of a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Lod {
    /// Full resolution, 16 x 64 x 16.
    #[default]
    Lod0 = 0,
    /// 8 x 32 x 8.
    Lod1 = 1,
    /// 4 x 16 x 4.
    Lod2 = 2,
    /// 2 x 8 x 2.
    Lod3 = 3,
}

impl Lod {
    /// All tiers, finest first.
    pub const ALL: [Self; 4] = [Self::Lod0, Self::Lod1, Self::Lod2, Self::Lod3];

    /// Tier number.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Tier for a tier number.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Lod0),
            1 => Some(Self::Lod1),
            2 => Some(Self::Lod2),
            3 => Some(Self::Lod3),
            _ => None,
        }
    }

    /// Right shift applied to the base dimensions.
    #[inline]
    #[must_use]
    pub const fn shift(self) -> u32 {
        self as u32
    }

    /// World units covered by one cell along each axis, `2^lod`.
    #[inline]
    #[must_use]
    pub const fn scale(self) -> u32 {
        1 << self.shift()
    }

    /// Whether this is the full-resolution tier.
    #[inline]
    #[must_use]
    pub const fn is_full_detail(self) -> bool {
        matches!(self, Self::Lod0)
    }

    /// Picks the tier for a chunk `distance` world units from the viewer.
    ///
    /// Bounds are `[12, 24, 48, max_distance]` chunk widths, compared with a
    /// strict `<`. Anything past the last bound falls back to the coarsest
    /// tier.
    #[must_use]
    pub fn select(distance: f32, max_distance: u32) -> Self {
        let bounds = [
            LOD_THRESHOLDS[0],
            LOD_THRESHOLDS[1],
            LOD_THRESHOLDS[2],
            max_distance,
        ];
        bounds
            .iter()
            .zip(Self::ALL)
            .find(|(bound, _)| distance < (**bound * CHUNK_SIZE) as f32)
            .map_or(Self::Lod3, |(_, lod)| lod)
    }
}
