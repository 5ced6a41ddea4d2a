//! Mesh passes and workgroup counts.

use serde::Deserialize;
use terravox_procedural::{GridDims, Lod};

/// Kernel workgroup size, one invocation per cell.
pub const WORKGROUP_SIZE: [u32; 3] = [4, 4, 4];

/// One of the two meshing passes over a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshPass {
    /// Solid blocks; faces shown only against air or the chunk edge.
    Opaque = 0,
    /// Liquids; faces shown against air or the chunk edge, hidden against
    /// any other block.
    Transparent = 1,
}

impl MeshPass {
    /// Both passes, in dispatch order.
    pub const ALL: [Self; 2] = [Self::Opaque, Self::Transparent];

    /// Value of the kernel's pass uniform.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Human-readable pass name for labels and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::Transparent => "transparent",
        }
    }
}

/// How a pass derives its workgroup count from the chunk's tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchScaling {
    /// Full-detail groups divided by `lod + 1`, per axis.
    #[default]
    LodScaled,
    /// Full-detail groups at every tier; extra invocations exit on the
    /// bounds check.
    Full,
    /// Exactly enough groups to cover the tier's grid.
    Exact,
}

impl DispatchScaling {
    /// Workgroup counts `[x, y, z]` for a chunk at `lod`.
    #[must_use]
    pub fn workgroups(self, lod: Lod) -> [u32; 3] {
        let base = groups_covering(GridDims::BASE);
        match self {
            Self::Full => base,
            Self::LodScaled => base.map(|groups| (groups / (lod.index() + 1)).max(1)),
            Self::Exact => groups_covering(GridDims::BASE.for_lod(lod)),
        }
    }
}

/// Per-pass dispatch scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Scaling of the opaque pass.
    pub opaque: DispatchScaling,
    /// Scaling of the transparent pass.
    pub transparent: DispatchScaling,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            opaque: DispatchScaling::LodScaled,
            transparent: DispatchScaling::Full,
        }
    }
}

impl DispatchConfig {
    /// Scaling of one pass.
    #[must_use]
    pub const fn scaling(self, pass: MeshPass) -> DispatchScaling {
        match pass {
            MeshPass::Opaque => self.opaque,
            MeshPass::Transparent => self.transparent,
        }
    }

    /// Workgroup counts of one pass at `lod`.
    #[must_use]
    pub fn workgroups(self, pass: MeshPass, lod: Lod) -> [u32; 3] {
        self.scaling(pass).workgroups(lod)
    }
}

/// Smallest workgroup grid whose invocations cover every cell of `dims`.
#[must_use]
pub fn groups_covering(dims: GridDims) -> [u32; 3] {
    [
        dims.size.div_ceil(WORKGROUP_SIZE[0]),
        dims.height.div_ceil(WORKGROUP_SIZE[1]),
        dims.size.div_ceil(WORKGROUP_SIZE[2]),
    ]
}

/// Whether `groups` workgroups launch an invocation for every cell of
/// `dims`.
#[must_use]
pub fn covers(groups: [u32; 3], dims: GridDims) -> bool {
    groups[0] * WORKGROUP_SIZE[0] >= dims.size
        && groups[1] * WORKGROUP_SIZE[1] >= dims.height
        && groups[2] * WORKGROUP_SIZE[2] >= dims.size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_groups() {
        assert_eq!(groups_covering(GridDims::BASE), [4, 16, 4]);
        assert_eq!(DispatchScaling::Full.workgroups(Lod::Lod3), [4, 16, 4]);
    }

    #[test]
    fn test_lod_scaled_groups() {
        assert_eq!(DispatchScaling::LodScaled.workgroups(Lod::Lod0), [4, 16, 4]);
        assert_eq!(DispatchScaling::LodScaled.workgroups(Lod::Lod1), [2, 8, 2]);
        assert_eq!(DispatchScaling::LodScaled.workgroups(Lod::Lod2), [1, 5, 1]);
        assert_eq!(DispatchScaling::LodScaled.workgroups(Lod::Lod3), [1, 4, 1]);
    }

    #[test]
    fn test_every_scaling_covers_every_tier() {
        for scaling in [DispatchScaling::LodScaled, DispatchScaling::Full, DispatchScaling::Exact] {
            for lod in Lod::ALL {
                let dims = GridDims::BASE.for_lod(lod);
                assert!(covers(scaling.workgroups(lod), dims), "{scaling:?} at {lod:?}");
            }
        }
    }

    #[test]
    fn test_exact_groups() {
        assert_eq!(DispatchScaling::Exact.workgroups(Lod::Lod2), [1, 4, 1]);
        assert_eq!(DispatchScaling::Exact.workgroups(Lod::Lod3), [1, 2, 1]);
    }

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.scaling(MeshPass::Opaque), DispatchScaling::LodScaled);
        assert_eq!(config.scaling(MeshPass::Transparent), DispatchScaling::Full);
        assert_eq!(config.workgroups(MeshPass::Transparent, Lod::Lod2), [4, 16, 4]);
    }

    #[test]
    fn test_under_dispatch_detected() {
        assert!(!covers([1, 4, 1], GridDims::BASE.for_lod(Lod::Lod1)));
    }
}
