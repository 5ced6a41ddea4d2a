//! # Block Catalog
//!
//! Maps every block type to six texture-atlas indices, one per face.
//!
//! Registration happens once at startup through [`BlockCatalog`]. The
//! catalog is then sealed into a [`FaceLookupTable`]: a flat array of
//! `6 * N` entries indexed `type_id * 6 + face`, uploaded once to the GPU
//! and shared by every chunk mesh.
//!
//! ## Rules
//!
//! - Ids are registered in ascending, gap-free order.
//! - If the first registration is id 1, slot 0 (air) is reserved and left
//!   zeroed.
//! - Lookups of unregistered ids fail; they never read past the table.

use serde::Deserialize;

use crate::error::{BlockError, BlockResult};

/// Number of faces per block.
pub const FACE_COUNT: usize = 6;

/// Bundled catalog for the built-in block kinds.
const STANDARD_CATALOG: &str = include_str!("../assets/blocks.json");

/// Block face, in the fixed order used by the lookup table and the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Face {
    /// +Z
    Front = 0,
    /// -Z
    Back = 1,
    /// +X
    Right = 2,
    /// -X
    Left = 3,
    /// +Y
    Top = 4,
    /// -Y
    Bottom = 5,
}

impl Face {
    /// All faces in table order.
    pub const ALL: [Self; FACE_COUNT] = [
        Self::Front,
        Self::Back,
        Self::Right,
        Self::Left,
        Self::Top,
        Self::Bottom,
    ];

    /// Position of this face within a block's six table entries.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit offset to the neighbouring cell this face looks at.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> [i32; 3] {
        match self {
            Self::Front => [0, 0, 1],
            Self::Back => [0, 0, -1],
            Self::Right => [1, 0, 0],
            Self::Left => [-1, 0, 0],
            Self::Top => [0, 1, 0],
            Self::Bottom => [0, -1, 0],
        }
    }
}

/// Atlas indices for each face of a multi-face block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FaceTextures {
    /// +Z face.
    pub front: u32,
    /// -Z face.
    pub back: u32,
    /// +X face.
    pub right: u32,
    /// -X face.
    pub left: u32,
    /// +Y face.
    pub top: u32,
    /// -Y face.
    pub bottom: u32,
}

impl FaceTextures {
    /// Entries in table order.
    #[must_use]
    pub const fn to_array(self) -> [u32; FACE_COUNT] {
        [self.front, self.back, self.right, self.left, self.top, self.bottom]
    }
}

/// How a block textures its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSpec {
    /// Same atlas index on all six faces.
    Uniform(u32),
    /// One atlas index per face.
    PerFace(FaceTextures),
}

impl FaceSpec {
    /// Expands to six entries in table order.
    #[must_use]
    pub const fn entries(self) -> [u32; FACE_COUNT] {
        match self {
            Self::Uniform(index) => [index; FACE_COUNT],
            Self::PerFace(textures) => textures.to_array(),
        }
    }
}

/// One record of a JSON catalog document.
#[derive(Debug, Deserialize)]
struct BlockRecord {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    face: Option<u32>,
    #[serde(default)]
    faces: Option<FaceTextures>,
}

impl BlockRecord {
    fn spec(&self) -> BlockResult<FaceSpec> {
        match (self.face, self.faces) {
            (Some(index), None) => Ok(FaceSpec::Uniform(index)),
            (None, Some(textures)) => Ok(FaceSpec::PerFace(textures)),
            _ => Err(BlockError::InvalidFaceSpec { id: self.id }),
        }
    }
}

/// Registration phase of the block catalog.
///
/// ```rust
/// use terravox_core::{BlockCatalog, Face, FaceSpec};
///
/// let mut catalog = BlockCatalog::new();
/// catalog.register(1, FaceSpec::Uniform(2)).unwrap();
/// let table = catalog.build_face_lookup_table();
/// assert_eq!(table.atlas_index(1, Face::Top), Ok(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct BlockCatalog {
    /// Six entries per registered block, in registration order.
    entries: Vec<u32>,
    /// Optional display names, parallel to registration order.
    names: Vec<Option<String>>,
}

impl BlockCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog for the built-in block kinds.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled document is malformed.
    pub fn standard() -> BlockResult<Self> {
        Self::from_json(STANDARD_CATALOG)
    }

    /// Parses a JSON array of block records.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::MalformedCatalog`] on invalid JSON, and any
    /// registration error for records that break the id ordering or name
    /// both or neither face forms.
    pub fn from_json(document: &str) -> BlockResult<Self> {
        let records: Vec<BlockRecord> = serde_json::from_str(document)
            .map_err(|err| BlockError::MalformedCatalog(err.to_string()))?;

        let mut catalog = Self::new();
        for record in records {
            let spec = record.spec()?;
            catalog.register_named(record.id, record.name, spec)?;
        }
        Ok(catalog)
    }

    /// Registers a block's face textures.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::NonContiguousId`] if `type_id` is not the next
    /// expected id.
    pub fn register(&mut self, type_id: u32, spec: FaceSpec) -> BlockResult<&mut Self> {
        self.register_named(type_id, None, spec)
    }

    fn register_named(
        &mut self,
        type_id: u32,
        name: Option<String>,
        spec: FaceSpec,
    ) -> BlockResult<&mut Self> {
        let expected = self.next_id();
        let reserves_air = self.names.is_empty() && type_id == 1;
        if type_id != expected && !reserves_air {
            return Err(BlockError::NonContiguousId {
                expected,
                found: type_id,
            });
        }

        if reserves_air {
            self.entries.extend_from_slice(&[0; FACE_COUNT]);
            self.names.push(None);
        }
        self.entries.extend_from_slice(&spec.entries());
        self.names.push(name);
        Ok(self)
    }

    /// Id the next registration must use.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        u32::try_from(self.names.len()).unwrap_or(u32::MAX)
    }

    /// Display name of a registered block, if the record carried one.
    #[must_use]
    pub fn name(&self, type_id: u32) -> Option<&str> {
        self.names.get(type_id as usize)?.as_deref()
    }

    /// Seals the catalog into an immutable lookup table.
    ///
    /// Calling this more than once yields equal tables.
    #[must_use]
    pub fn build_face_lookup_table(&self) -> FaceLookupTable {
        FaceLookupTable {
            entries: self.entries.clone().into_boxed_slice(),
        }
    }
}

/// Sealed face lookup table, indexed `type_id * 6 + face`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceLookupTable {
    entries: Box<[u32]>,
}

impl FaceLookupTable {
    /// Atlas index for one face of a block type.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::UnknownBlockType`] for unregistered ids.
    #[inline]
    pub fn atlas_index(&self, type_id: u32, face: Face) -> BlockResult<u32> {
        if !self.contains(type_id) {
            return Err(BlockError::UnknownBlockType(type_id));
        }
        Ok(self.entries[type_id as usize * FACE_COUNT + face.index()])
    }

    /// Whether the table has entries for `type_id`.
    #[inline]
    #[must_use]
    pub fn contains(&self, type_id: u32) -> bool {
        (type_id as usize) < self.type_count()
    }

    /// Number of block types covered, including the reserved air slot.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.entries.len() / FACE_COUNT
    }

    /// The flat table.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    /// The flat table as bytes, for upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;

    #[test]
    fn test_uniform_entry_repeats_six_times() {
        let mut catalog = BlockCatalog::new();
        catalog.register(0, FaceSpec::Uniform(0)).unwrap();
        catalog.register(1, FaceSpec::Uniform(9)).unwrap();
        let table = catalog.build_face_lookup_table();

        assert_eq!(table.type_count(), 2);
        assert_eq!(&table.as_slice()[6..12], &[9; 6]);
    }

    #[test]
    fn test_per_face_entries_follow_face_order() {
        let textures = FaceTextures {
            front: 10,
            back: 11,
            right: 12,
            left: 13,
            top: 14,
            bottom: 15,
        };
        let mut catalog = BlockCatalog::new();
        catalog.register(1, FaceSpec::PerFace(textures)).unwrap();
        let table = catalog.build_face_lookup_table();

        for (offset, face) in Face::ALL.iter().enumerate() {
            assert_eq!(table.atlas_index(1, *face), Ok(10 + offset as u32));
        }
    }

    #[test]
    fn test_first_id_one_reserves_air() {
        let mut catalog = BlockCatalog::new();
        catalog.register(1, FaceSpec::Uniform(4)).unwrap();
        let table = catalog.build_face_lookup_table();

        assert!(table.contains(0));
        assert_eq!(table.atlas_index(0, Face::Front), Ok(0));
        assert_eq!(table.atlas_index(1, Face::Front), Ok(4));
    }

    #[test]
    fn test_non_contiguous_ids_rejected() {
        let mut catalog = BlockCatalog::new();
        catalog.register(1, FaceSpec::Uniform(1)).unwrap();
        let err = catalog.register(3, FaceSpec::Uniform(1)).unwrap_err();
        assert_eq!(err, BlockError::NonContiguousId { expected: 2, found: 3 });

        let mut catalog = BlockCatalog::new();
        assert!(catalog.register(2, FaceSpec::Uniform(1)).is_err());
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let table = BlockCatalog::standard().unwrap().build_face_lookup_table();
        assert_eq!(
            table.atlas_index(999, Face::Top),
            Err(BlockError::UnknownBlockType(999))
        );
    }

    #[test]
    fn test_build_twice_is_equal() {
        let catalog = BlockCatalog::standard().unwrap();
        assert_eq!(catalog.build_face_lookup_table(), catalog.build_face_lookup_table());
    }

    #[test]
    fn test_standard_catalog_covers_all_kinds() {
        let catalog = BlockCatalog::standard().unwrap();
        let table = catalog.build_face_lookup_table();

        for kind in BlockKind::ALL {
            assert!(table.contains(kind.id()), "missing {kind:?}");
        }
        assert_eq!(catalog.name(BlockKind::Grass.id()), Some("grass"));
        assert_eq!(table.as_bytes().len(), table.as_slice().len() * 4);
    }

    #[test]
    fn test_json_face_forms() {
        let document = r#"[
            { "id": 1, "name": "dirt", "face": 2 },
            { "id": 2, "faces": { "front": 3, "back": 3, "right": 3, "left": 3, "top": 0, "bottom": 2 } }
        ]"#;
        let table = BlockCatalog::from_json(document)
            .unwrap()
            .build_face_lookup_table();

        assert_eq!(table.atlas_index(1, Face::Left), Ok(2));
        assert_eq!(table.atlas_index(2, Face::Top), Ok(0));
        assert_eq!(table.atlas_index(2, Face::Bottom), Ok(2));
    }

    #[test]
    fn test_json_requires_exactly_one_face_form() {
        let neither = r#"[{ "id": 1 }]"#;
        assert_eq!(
            BlockCatalog::from_json(neither).unwrap_err(),
            BlockError::InvalidFaceSpec { id: 1 }
        );

        let both = r#"[{ "id": 1, "face": 1, "faces": { "front": 1, "back": 1, "right": 1, "left": 1, "top": 1, "bottom": 1 } }]"#;
        assert!(BlockCatalog::from_json(both).is_err());

        assert!(matches!(
            BlockCatalog::from_json("not json"),
            Err(BlockError::MalformedCatalog(_))
        ));
    }
}
