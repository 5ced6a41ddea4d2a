//! GPU chunk meshes.

use std::sync::Arc;

use terravox_core::FaceLookupTable;
use terravox_procedural::BlockGrid;
use tracing::{debug, error};
use wgpu::util::DeviceExt;

use crate::error::{MeshError, MeshResult};
use crate::gpu::context::GpuContext;
use crate::gpu::kernel::{MeshKernel, MeshParams};
use crate::mesh::pipeline::check_grid;
use crate::mesh::{
    BufferAllocation, ChunkMeshPipeline, ChunkVertex, DispatchConfig, DrawIndirectCommand,
    MeshBackend, MeshDescriptor, MeshPass, MeshStats, PassStats, VoxelTexels,
};

/// Backend producing [`GpuChunkMesh`]es on one device.
#[derive(Clone, Debug)]
pub struct GpuMeshBackend {
    context: GpuContext,
    kernel: Arc<MeshKernel>,
    lookup: Arc<FaceLookupTable>,
    dispatch: DispatchConfig,
}

impl GpuMeshBackend {
    /// Compiles the kernel and uploads the face lookup table.
    #[must_use]
    pub fn new(context: GpuContext, lookup: FaceLookupTable, dispatch: DispatchConfig) -> Self {
        let kernel = Arc::new(MeshKernel::new(context.device(), &lookup));
        Self {
            context,
            kernel,
            lookup: Arc::new(lookup),
            dispatch,
        }
    }

    /// The device/queue pair.
    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// The shared face lookup table.
    #[must_use]
    pub fn lookup(&self) -> &FaceLookupTable {
        &self.lookup
    }
}

impl MeshBackend for GpuMeshBackend {
    type Mesh = GpuChunkMesh;

    fn create_mesh(&self, descriptor: MeshDescriptor) -> GpuChunkMesh {
        GpuChunkMesh::new(
            descriptor,
            self.context.clone(),
            Arc::clone(&self.kernel),
            Arc::clone(&self.lookup),
            self.dispatch,
        )
    }
}

/// Vertex buffer, draw command and uniform of one pass.
#[derive(Debug)]
struct PassBuffers {
    vertices: wgpu::Buffer,
    command: wgpu::Buffer,
    params: wgpu::Buffer,
    capacity: u32,
}

impl PassBuffers {
    fn destroy(&self) {
        self.vertices.destroy();
        self.command.destroy();
        self.params.destroy();
    }
}

/// A chunk mesh living on the GPU.
///
/// Vertices never leave the device: the renderer draws them with
/// [`GpuChunkMesh::draw_opaque`] and [`GpuChunkMesh::draw_transparent`]
/// through the indirect commands the kernel filled in.
#[derive(Debug)]
pub struct GpuChunkMesh {
    descriptor: MeshDescriptor,
    context: GpuContext,
    kernel: Arc<MeshKernel>,
    lookup: Arc<FaceLookupTable>,
    dispatch: DispatchConfig,
    opaque: Option<PassBuffers>,
    transparent: Option<PassBuffers>,
    voxels: Option<wgpu::Texture>,
    readback: wgpu::Buffer,
}

impl GpuChunkMesh {
    fn new(
        descriptor: MeshDescriptor,
        context: GpuContext,
        kernel: Arc<MeshKernel>,
        lookup: Arc<FaceLookupTable>,
        dispatch: DispatchConfig,
    ) -> Self {
        let readback = context.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Mesh Readback"),
            size: DrawIndirectCommand::SIZE * 2,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            descriptor,
            context,
            kernel,
            lookup,
            dispatch,
            opaque: None,
            transparent: None,
            voxels: None,
            readback,
        }
    }

    /// Draws the solid-block mesh. The caller binds the render pipeline and
    /// its uniforms.
    pub fn draw_opaque<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if let Some(buffers) = &self.opaque {
            Self::draw(buffers, pass);
        }
    }

    /// Draws the liquid mesh.
    pub fn draw_transparent<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if let Some(buffers) = &self.transparent {
            Self::draw(buffers, pass);
        }
    }

    fn draw<'a>(buffers: &'a PassBuffers, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, buffers.vertices.slice(..));
        pass.draw_indirect(&buffers.command, 0);
    }

    /// Vertex buffer of a pass, for renderers that bind it themselves.
    #[must_use]
    pub fn vertex_buffer(&self, pass: MeshPass) -> Option<&wgpu::Buffer> {
        self.buffers(pass).map(|buffers| &buffers.vertices)
    }

    /// Indirect command buffer of a pass.
    #[must_use]
    pub fn command_buffer(&self, pass: MeshPass) -> Option<&wgpu::Buffer> {
        self.buffers(pass).map(|buffers| &buffers.command)
    }

    fn buffers(&self, pass: MeshPass) -> Option<&PassBuffers> {
        match pass {
            MeshPass::Opaque => self.opaque.as_ref(),
            MeshPass::Transparent => self.transparent.as_ref(),
        }
    }

    fn create_pass_buffers(
        &self,
        pass: MeshPass,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<PassBuffers> {
        let device = self.context.device();
        let dims = self.descriptor.dims();
        let bytes = allocation.vertex_buffer_bytes(face_estimate, dims);
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        if bytes > limit {
            return Err(MeshError::BufferTooLarge { bytes, limit });
        }

        let vertices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(match pass {
                MeshPass::Opaque => "Opaque Vertex Buffer",
                MeshPass::Transparent => "Transparent Vertex Buffer",
            }),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let command = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chunk Draw Command"),
            contents: bytemuck::bytes_of(&DrawIndirectCommand::empty()),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let capacity = u32::try_from(bytes / ChunkVertex::SIZE).unwrap_or(u32::MAX);
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chunk Mesh Params"),
            contents: bytemuck::bytes_of(&MeshParams::new(
                pass,
                self.descriptor.lod.index(),
                capacity,
                self.descriptor.voxel_scale(),
            )),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        Ok(PassBuffers {
            vertices,
            command,
            params,
            capacity,
        })
    }

    fn bind_group(&self, view: &wgpu::TextureView, buffers: &PassBuffers) -> wgpu::BindGroup {
        self.context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Chunk Mesh Bind Group"),
                layout: self.kernel.bind_group_layout(),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: self.kernel.face_lookup().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.vertices.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffers.command.as_entire_binding(),
                    },
                ],
            })
    }

    /// Waits for the copied draw commands and returns them.
    fn read_commands(&self) -> MeshResult<[DrawIndirectCommand; 2]> {
        let slice = self.readback.slice(..);
        let (sender, receiver) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.context.device().poll(wgpu::Maintain::Wait);
        receiver.recv().map_err(|_| MeshError::ReadbackLost)??;

        let commands = {
            let data = slice.get_mapped_range();
            let size = DrawIndirectCommand::SIZE as usize;
            [
                bytemuck::pod_read_unaligned(&data[..size]),
                bytemuck::pod_read_unaligned(&data[size..size * 2]),
            ]
        };
        self.readback.unmap();
        Ok(commands)
    }

    /// Zeroes both draw commands so an overrun mesh draws nothing.
    fn reset_commands(&self) {
        let queue = self.context.queue();
        for buffers in [&self.opaque, &self.transparent].into_iter().flatten() {
            queue.write_buffer(
                &buffers.command,
                0,
                bytemuck::bytes_of(&DrawIndirectCommand::empty()),
            );
        }
        queue.submit(std::iter::empty());
    }
}

impl ChunkMeshPipeline for GpuChunkMesh {
    fn descriptor(&self) -> &MeshDescriptor {
        &self.descriptor
    }

    fn initialize_opaque_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()> {
        let buffers = self.create_pass_buffers(MeshPass::Opaque, allocation, face_estimate)?;
        if let Some(old) = self.opaque.replace(buffers) {
            old.destroy();
        }
        Ok(())
    }

    fn initialize_transparent_buffer(
        &mut self,
        allocation: BufferAllocation,
        face_estimate: u32,
    ) -> MeshResult<()> {
        let buffers = self.create_pass_buffers(MeshPass::Transparent, allocation, face_estimate)?;
        if let Some(old) = self.transparent.replace(buffers) {
            old.destroy();
        }
        Ok(())
    }

    fn initialize_chunk_data_buffer(&mut self, grid: &BlockGrid) -> MeshResult<()> {
        check_grid(&self.descriptor, grid)?;
        let texels = VoxelTexels::from_grid(grid, &self.lookup)?;
        let dims = texels.dims();
        let size = wgpu::Extent3d {
            width: dims.size,
            height: dims.height,
            depth_or_array_layers: dims.size,
        };

        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Chunk Voxels"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::Rg32Uint,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.context.queue().write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(texels.bytes_per_row()),
                rows_per_image: Some(dims.height),
            },
            size,
        );

        if let Some(old) = self.voxels.replace(texture) {
            old.destroy();
        }
        Ok(())
    }

    fn generate_mesh(&mut self) -> MeshResult<MeshStats> {
        let voxels = self
            .voxels
            .as_ref()
            .ok_or(MeshError::NotInitialized("chunk data buffer"))?;
        let opaque = self
            .opaque
            .as_ref()
            .ok_or(MeshError::NotInitialized("opaque buffer"))?;
        let transparent = self
            .transparent
            .as_ref()
            .ok_or(MeshError::NotInitialized("transparent buffer"))?;

        let device = self.context.device();
        let queue = self.context.queue();
        let empty = DrawIndirectCommand::empty();
        queue.write_buffer(&opaque.command, 0, bytemuck::bytes_of(&empty));
        queue.write_buffer(&transparent.command, 0, bytemuck::bytes_of(&empty));

        let view = voxels.create_view(&wgpu::TextureViewDescriptor::default());
        let passes = [(MeshPass::Opaque, opaque), (MeshPass::Transparent, transparent)];
        let bind_groups = passes.map(|(_, buffers)| self.bind_group(&view, buffers));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Chunk Mesh Encoder"),
        });
        for ((pass, _), bind_group) in passes.iter().zip(&bind_groups) {
            let [x, y, z] = self.dispatch.workgroups(*pass, self.descriptor.lod);
            let mut compute = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(pass.label()),
                timestamp_writes: None,
            });
            compute.set_pipeline(self.kernel.pipeline());
            compute.set_bind_group(0, bind_group, &[]);
            compute.dispatch_workgroups(x, y, z);
        }
        encoder.copy_buffer_to_buffer(
            &opaque.command,
            0,
            &self.readback,
            0,
            DrawIndirectCommand::SIZE,
        );
        encoder.copy_buffer_to_buffer(
            &transparent.command,
            0,
            &self.readback,
            DrawIndirectCommand::SIZE,
            DrawIndirectCommand::SIZE,
        );
        queue.submit(Some(encoder.finish()));

        let [opaque_command, transparent_command] = self.read_commands()?;
        let stats = MeshStats {
            opaque: PassStats {
                vertex_count: opaque_command.vertex_count,
                capacity: opaque.capacity,
            },
            transparent: PassStats {
                vertex_count: transparent_command.vertex_count,
                capacity: transparent.capacity,
            },
        };

        if let Err(err) = stats.check_capacity(self.descriptor.coord) {
            self.reset_commands();
            error!(%err, "mesh buffer overrun");
            return Err(err);
        }

        debug!(
            x = self.descriptor.coord.x,
            z = self.descriptor.coord.z,
            lod = self.descriptor.lod.index(),
            opaque = stats.opaque.vertex_count,
            transparent = stats.transparent.vertex_count,
            "chunk meshed"
        );
        Ok(stats)
    }
}

impl Drop for GpuChunkMesh {
    fn drop(&mut self) {
        for buffers in [&self.opaque, &self.transparent].into_iter().flatten() {
            buffers.destroy();
        }
        if let Some(voxels) = &self.voxels {
            voxels.destroy();
        }
        self.readback.destroy();
    }
}
