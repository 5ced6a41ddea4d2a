//! # Block Word Codec
//!
//! Every cell of a chunk is a single 32-bit word:
//!
//! ```text
//! 31      24 23                      0
//! +---------+-------------------------+
//! | rotation|        type id          |
//! +---------+-------------------------+
//! ```
//!
//! The word is uploaded to the GPU as-is, so the layout is part of the
//! meshing protocol and must not change.

use bytemuck::{Pod, Zeroable};

use crate::error::{BlockError, BlockResult};

/// Largest type id that fits in the 24-bit type field.
pub const MAX_TYPE_ID: u32 = 0x00FF_FFFF;

/// Bit offset of the rotation field.
const ROTATION_SHIFT: u32 = 24;

/// Packed block cell: 24-bit type id in the low bits, 8-bit rotation on top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct BlockWord(u32);

impl BlockWord {
    /// The empty cell.
    pub const AIR: Self = Self(0);

    /// Packs a type id and rotation into a word.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::TypeIdOutOfRange`] if `type_id` does not fit
    /// in 24 bits.
    #[inline]
    pub const fn pack(type_id: u32, rotation: u8) -> BlockResult<Self> {
        if type_id > MAX_TYPE_ID {
            return Err(BlockError::TypeIdOutOfRange(type_id));
        }
        Ok(Self(((rotation as u32) << ROTATION_SHIFT) | type_id))
    }

    /// Word for a known block kind with no rotation.
    #[inline]
    #[must_use]
    pub const fn from_kind(kind: BlockKind) -> Self {
        Self(kind as u32)
    }

    /// Reinterprets a raw word.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw 32-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The 24-bit type id.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> u32 {
        self.0 & MAX_TYPE_ID
    }

    /// The 8-bit rotation.
    #[inline]
    #[must_use]
    pub const fn rotation(self) -> u8 {
        (self.0 >> ROTATION_SHIFT) as u8
    }

    /// Whether the cell is empty. Rotation bits are ignored.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.type_id() == BlockKind::Air as u32
    }

    /// The block kind, if the type id is one of the built-in kinds.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> Option<BlockKind> {
        BlockKind::from_id(self.type_id())
    }
}

impl From<BlockKind> for BlockWord {
    fn from(kind: BlockKind) -> Self {
        Self::from_kind(kind)
    }
}

/// Built-in block kinds with their stable type ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlockKind {
    /// Empty space.
    Air = 0,
    /// Dirt.
    Dirt = 1,
    /// Grass-topped dirt.
    Grass = 2,
    /// Stone.
    Stone = 3,
    /// Indestructible floor.
    Bedrock = 4,
    /// Sand.
    Sand = 5,
    /// Tree trunk.
    Wood = 6,
    /// Water, the only liquid. Meshed in the transparent pass.
    Water = 7,
    /// Tree canopy.
    Leaves = 8,
}

impl BlockKind {
    /// All kinds in id order.
    pub const ALL: [Self; 9] = [
        Self::Air,
        Self::Dirt,
        Self::Grass,
        Self::Stone,
        Self::Bedrock,
        Self::Sand,
        Self::Wood,
        Self::Water,
        Self::Leaves,
    ];

    /// The stable type id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Looks a kind up by type id.
    #[must_use]
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Air),
            1 => Some(Self::Dirt),
            2 => Some(Self::Grass),
            3 => Some(Self::Stone),
            4 => Some(Self::Bedrock),
            5 => Some(Self::Sand),
            6 => Some(Self::Wood),
            7 => Some(Self::Water),
            8 => Some(Self::Leaves),
            _ => None,
        }
    }

    /// Whether this kind is a liquid.
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water)
    }
}

/// Block orientation stored in the rotation field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockRotation {
    /// Unrotated.
    #[default]
    XY0 = 0,
    /// Quarter turn around X.
    X90 = 1,
    /// Half turn around X.
    X180 = 2,
    /// Quarter turn around Y.
    Y90 = 3,
    /// Half turn around Y.
    Y180 = 4,
}

impl From<BlockRotation> for u8 {
    fn from(rotation: BlockRotation) -> Self {
        rotation as u8
    }
}

impl TryFrom<u8> for BlockRotation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::XY0),
            1 => Ok(Self::X90),
            2 => Ok(Self::X180),
            3 => Ok(Self::Y90),
            4 => Ok(Self::Y180),
            other => Err(other),
        }
    }
}
