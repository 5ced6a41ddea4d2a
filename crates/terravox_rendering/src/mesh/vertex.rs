//! Vertex and indirect-draw layouts shared by the meshing kernel and the
//! renderer.

use bytemuck::{Pod, Zeroable};
use terravox_core::Face;

/// Vertices emitted per visible face (two triangles, unindexed).
pub const VERTICES_PER_FACE: u32 = 6;

/// Vertex buffer bytes consumed per visible face.
pub const VERTEX_BYTES_PER_FACE: u64 = VERTICES_PER_FACE as u64 * ChunkVertex::SIZE;

/// Unit-cube corners of each face, two counter-clockwise triangles as seen
/// from outside: bottom-left, bottom-right, top-right, bottom-left,
/// top-right, top-left.
pub const FACE_CORNERS: [[[f32; 3]; 6]; 6] = [
    // Front (+Z)
    [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
    // Back (-Z)
    [[1., 0., 0.], [0., 0., 0.], [0., 1., 0.], [1., 0., 0.], [0., 1., 0.], [1., 1., 0.]],
    // Right (+X)
    [[1., 0., 1.], [1., 0., 0.], [1., 1., 0.], [1., 0., 1.], [1., 1., 0.], [1., 1., 1.]],
    // Left (-X)
    [[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 0., 0.], [0., 1., 1.], [0., 1., 0.]],
    // Top (+Y)
    [[0., 1., 1.], [1., 1., 1.], [1., 1., 0.], [0., 1., 1.], [1., 1., 0.], [0., 1., 0.]],
    // Bottom (-Y)
    [[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 0.], [1., 0., 1.], [0., 0., 1.]],
];

/// Atlas-tile UVs of the six face vertices, in corner order.
pub const CORNER_UVS: [[f32; 2]; 6] = [[0., 1.], [1., 1.], [1., 0.], [0., 1.], [1., 0.], [0., 0.]];

/// One vertex of a chunk mesh. Written by the meshing kernel, read by the
/// renderer's vertex stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    /// Chunk-local position, in world units.
    pub position: [f32; 3],
    /// Texture atlas tile.
    pub atlas_index: u32,
    /// Coordinates within the atlas tile.
    pub uv: [f32; 2],
    /// Face the vertex belongs to, `Face as u32`.
    pub face: u32,
    /// Padding to 32 bytes.
    pub _pad: u32,
}

impl ChunkVertex {
    /// Size in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Vertex buffer layout for WGPU.
    pub const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Uint32,    // atlas_index
        2 => Float32x2, // uv
        3 => Uint32,    // face
    ];

    /// Vertex buffer layout descriptor.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    /// The six vertices of one face of the cell at `cell`, scaled so a cell
    /// spans `scale` world units.
    #[must_use]
    pub fn face_quad(cell: [u32; 3], face: Face, atlas_index: u32, scale: f32) -> [Self; 6] {
        let corners = &FACE_CORNERS[face.index()];
        std::array::from_fn(|i| {
            let corner = corners[i];
            Self {
                position: [
                    (cell[0] as f32 + corner[0]) * scale,
                    (cell[1] as f32 + corner[1]) * scale,
                    (cell[2] as f32 + corner[2]) * scale,
                ],
                atlas_index,
                uv: CORNER_UVS[i],
                face: face as u32,
                _pad: 0,
            }
        })
    }
}

/// Arguments of a non-indexed indirect draw. The meshing kernel owns
/// `vertex_count`; everything else is fixed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndirectCommand {
    /// Vertices to draw, bumped atomically by the kernel.
    pub vertex_count: u32,
    /// Always 1.
    pub instance_count: u32,
    /// Always 0.
    pub first_vertex: u32,
    /// Always 0.
    pub first_instance: u32,
}

impl DrawIndirectCommand {
    /// Size in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// A command that draws nothing yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            vertex_count: 0,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        }
    }
}

impl Default for DrawIndirectCommand {
    fn default() -> Self {
        Self::empty()
    }
}
