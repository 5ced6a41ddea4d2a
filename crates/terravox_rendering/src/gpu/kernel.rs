//! The compiled meshing kernel and its shared inputs.

use bytemuck::{Pod, Zeroable};
use terravox_core::{FaceLookupTable, FACE_COUNT};
use wgpu::util::DeviceExt;

use crate::mesh::MeshPass;

/// Per-pass kernel uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct MeshParams {
    /// [`MeshPass::index`].
    pub pass_index: u32,
    /// Tier of the chunk.
    pub lod: u32,
    /// Vertices the pass buffer holds.
    pub vertex_capacity: u32,
    /// World units per cell.
    pub voxel_scale: f32,
}

impl MeshParams {
    /// Size in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Uniform for one pass.
    #[must_use]
    pub fn new(pass: MeshPass, lod: u32, vertex_capacity: u32, voxel_scale: f32) -> Self {
        Self {
            pass_index: pass.index(),
            lod,
            vertex_capacity,
            voxel_scale,
        }
    }
}

/// Compute pipeline, bind group layout and face lookup buffer, created once
/// per backend and shared by all meshes.
#[derive(Debug)]
pub struct MeshKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    face_lookup: wgpu::Buffer,
}

impl MeshKernel {
    /// Compiles the kernel and uploads the face lookup table.
    #[must_use]
    pub fn new(device: &wgpu::Device, lookup: &FaceLookupTable) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Chunk Mesh Kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/chunk_mesh.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Chunk Mesh Bind Group Layout"),
            entries: &[
                // Voxel texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Uint,
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                // Face lookup
                storage_entry(1, true),
                // Pass parameters
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Vertices
                storage_entry(3, false),
                // Draw command
                storage_entry(4, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chunk Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Chunk Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        // Storage bindings may not be empty
        let empty = [0u32; FACE_COUNT];
        let contents = if lookup.as_slice().is_empty() {
            bytemuck::cast_slice(&empty)
        } else {
            lookup.as_bytes()
        };
        let face_lookup = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Face Lookup Table"),
            contents,
            usage: wgpu::BufferUsages::STORAGE,
        });

        Self {
            pipeline,
            bind_group_layout,
            face_lookup,
        }
    }

    /// The compute pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    /// Layout every mesh's bind groups follow.
    #[must_use]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// The shared face lookup buffer.
    #[must_use]
    pub fn face_lookup(&self) -> &wgpu::Buffer {
        &self.face_lookup
    }
}

impl Drop for MeshKernel {
    fn drop(&mut self) {
        self.face_lookup.destroy();
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout() {
        assert_eq!(MeshParams::SIZE, 16);
        let params = MeshParams::new(MeshPass::Transparent, 2, 600, 4.0);
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&params));
        assert_eq!(&words[..3], &[1, 2, 600]);
        assert_eq!(f32::from_bits(words[3]), 4.0);
    }
}
