//! World statistics.

use std::ops::AddAssign;

use terravox_procedural::Lod;

use crate::mesh::{MeshStats, VERTICES_PER_FACE};

/// Totals over a world pass or the whole world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks with block data.
    pub chunks_loaded: u32,
    /// Chunks with a mesh.
    pub chunks_meshed: u32,
    /// Meshed chunks per tier.
    pub chunks_per_lod: [u32; 4],
    /// Non-air cells.
    pub blocks: u64,
    /// Sum of face estimates.
    pub face_estimate: u64,
    /// Solid-block vertices emitted.
    pub opaque_vertices: u64,
    /// Liquid vertices emitted.
    pub transparent_vertices: u64,
    /// Indirect draws issued per frame (two per meshed chunk).
    pub draw_calls: u32,
}

impl WorldStats {
    /// Adds one meshed chunk.
    pub fn record_chunk(&mut self, lod: Lod, blocks: u32, face_estimate: u32, mesh: &MeshStats) {
        self.chunks_loaded += 1;
        self.chunks_meshed += 1;
        self.chunks_per_lod[lod.index() as usize] += 1;
        self.blocks += u64::from(blocks);
        self.face_estimate += u64::from(face_estimate);
        self.opaque_vertices += u64::from(mesh.opaque.vertex_count);
        self.transparent_vertices += u64::from(mesh.transparent.vertex_count);
        self.draw_calls += 2;
    }

    /// All emitted vertices.
    #[must_use]
    pub fn vertices(&self) -> u64 {
        self.opaque_vertices + self.transparent_vertices
    }

    /// Visible faces across both passes.
    #[must_use]
    pub fn faces(&self) -> u64 {
        self.vertices() / u64::from(VERTICES_PER_FACE)
    }

    /// Share of estimated faces that were actually visible. An estimate that
    /// counts every exposed face gives at most 1.0 on water-free worlds.
    #[must_use]
    pub fn estimate_usage(&self) -> f64 {
        if self.face_estimate > 0 {
            self.faces() as f64 / self.face_estimate as f64
        } else {
            0.0
        }
    }
}

impl AddAssign for WorldStats {
    fn add_assign(&mut self, other: Self) {
        self.chunks_loaded += other.chunks_loaded;
        self.chunks_meshed += other.chunks_meshed;
        for (total, count) in self.chunks_per_lod.iter_mut().zip(other.chunks_per_lod) {
            *total += count;
        }
        self.blocks += other.blocks;
        self.face_estimate += other.face_estimate;
        self.opaque_vertices += other.opaque_vertices;
        self.transparent_vertices += other.transparent_vertices;
        self.draw_calls += other.draw_calls;
    }
}
