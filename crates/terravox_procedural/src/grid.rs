//! # Block Grid
//!
//! Flat arena of block words for one chunk at one LOD.
//!
//! Cells are laid out `(x * height + y) * size + z`, z fastest. A fresh grid
//! is allocated every time a chunk is (re)generated, so storage never
//! aliases between LOD tiers.

use ndshape::{RuntimeShape, Shape};
use terravox_core::BlockWord;

use crate::chunk::{CHUNK_HEIGHT, CHUNK_SIZE};
use crate::error::{ProceduralError, ProceduralResult};
use crate::lod::Lod;

/// Axis offsets of the six face neighbours.
const NEIGHBOR_OFFSETS: [[i32; 3]; 6] = [
    [0, 0, 1],
    [0, 0, -1],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
];

/// Horizontal size and height of a block grid, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    /// Cells along X and Z.
    pub size: u32,
    /// Cells along Y.
    pub height: u32,
}

impl GridDims {
    /// Full-resolution chunk dimensions.
    pub const BASE: Self = Self::new(CHUNK_SIZE, CHUNK_HEIGHT);

    /// Creates grid dimensions.
    #[inline]
    #[must_use]
    pub const fn new(size: u32, height: u32) -> Self {
        Self { size, height }
    }

    /// Dimensions at a reduced tier, each axis shifted right by the tier.
    #[inline]
    #[must_use]
    pub const fn for_lod(self, lod: Lod) -> Self {
        let size = self.size >> lod.shift();
        let height = self.height >> lod.shift();
        Self {
            size: if size == 0 { 1 } else { size },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Total cell count.
    #[inline]
    #[must_use]
    pub const fn volume(self) -> usize {
        self.size as usize * self.height as usize * self.size as usize
    }

    /// Whether a signed cell position lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(self, x: i32, y: i32, z: i32) -> bool {
        let inside = |v: i32, extent: u32| u32::try_from(v).is_ok_and(|v| v < extent);
        inside(x, self.size) && inside(y, self.height) && inside(z, self.size)
    }

    /// Linear arena index of an in-bounds cell.
    #[inline]
    #[must_use]
    pub fn index(self, x: u32, y: u32, z: u32) -> usize {
        self.arena_shape().linearize([z, y, x]) as usize
    }

    /// Cell position of a linear arena index.
    #[inline]
    #[must_use]
    pub fn position(self, index: usize) -> [u32; 3] {
        let [z, y, x] = self.arena_shape().delinearize(index as u32);
        [x, y, z]
    }

    /// Arena order: z fastest, then y, then x.
    fn arena_shape(self) -> RuntimeShape<u32, 3> {
        RuntimeShape::<u32, 3>::new([self.size, self.height, self.size])
    }

    /// Wraps signed coordinates into the grid.
    #[inline]
    fn wrap(self, x: i32, y: i32, z: i32) -> (u32, u32, u32) {
        let wrap_axis = |v: i32, extent: u32| v.rem_euclid(extent as i32) as u32;
        (
            wrap_axis(x, self.size),
            wrap_axis(y, self.height),
            wrap_axis(z, self.size),
        )
    }
}

/// Flat storage of one chunk's block words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    dims: GridDims,
    cells: Box<[BlockWord]>,
}

impl BlockGrid {
    /// Allocates an all-air grid.
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![BlockWord::AIR; dims.volume()].into_boxed_slice(),
        }
    }

    /// Grid dimensions.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// All cells in arena order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[BlockWord] {
        &self.cells
    }

    /// Reads a cell. Coordinates wrap modulo the grid dimensions.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockWord {
        let (x, y, z) = self.dims.wrap(x, y, z);
        self.cells[self.dims.index(x, y, z)]
    }

    /// Writes a cell and returns the previous word. Coordinates wrap modulo
    /// the grid dimensions.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, word: BlockWord) -> BlockWord {
        let (x, y, z) = self.dims.wrap(x, y, z);
        let index = self.dims.index(x, y, z);
        std::mem::replace(&mut self.cells[index], word)
    }

    /// Reads a cell without wrapping. `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, x: i32, y: i32, z: i32) -> Option<BlockWord> {
        if !self.dims.contains(x, y, z) {
            return None;
        }
        Some(self.cells[self.dims.index(x as u32, y as u32, z as u32)])
    }

    /// Number of the six axis neighbours that are in bounds and not air.
    #[must_use]
    pub fn count_neighbors(&self, x: i32, y: i32, z: i32) -> u32 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|[dx, dy, dz]| self.neighbor(x + dx, y + dy, z + dz))
            .filter(|word| !word.is_air())
            .count() as u32
    }

    /// Exposed-face estimate: `6 - count_neighbors` summed over non-air
    /// cells. Faces on the chunk boundary count as exposed. Water counts as
    /// a neighbour, so solid faces against water are not included.
    #[must_use]
    pub fn face_estimate(&self) -> u32 {
        self.solid_cells()
            .map(|([x, y, z], _)| 6 - self.count_neighbors(x as i32, y as i32, z as i32))
            .sum()
    }

    /// Number of non-air cells.
    #[must_use]
    pub fn block_count(&self) -> u32 {
        self.cells.iter().filter(|word| !word.is_air()).count() as u32
    }

    /// Non-air cells with their positions, in arena order.
    pub fn solid_cells(&self) -> impl Iterator<Item = ([u32; 3], BlockWord)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, word)| !word.is_air())
            .map(|(index, word)| (self.dims.position(index), *word))
    }

    /// Little-endian snapshot of the cells in arena order.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().flat_map(|word| word.raw().to_le_bytes()).collect()
    }

    /// Restores a grid from [`BlockGrid::to_bytes`] output.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::SnapshotSize`] if the byte count does not
    /// match `dims`.
    pub fn from_bytes(dims: GridDims, bytes: &[u8]) -> ProceduralResult<Self> {
        let expected = dims.volume() * std::mem::size_of::<u32>();
        if bytes.len() != expected {
            return Err(ProceduralError::SnapshotSize {
                expected,
                actual: bytes.len(),
            });
        }
        let cells = bytes
            .chunks_exact(4)
            .map(|raw| BlockWord::from_raw(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])))
            .collect();
        Ok(Self { dims, cells })
    }
}
