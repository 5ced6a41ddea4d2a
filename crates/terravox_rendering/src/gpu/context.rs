//! Device and queue shared by every GPU chunk mesh.

use std::sync::Arc;

use tracing::info;

use crate::error::{MeshError, MeshResult};

/// A device/queue pair. Cheap to clone.
#[derive(Clone, Debug)]
pub struct GpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Wraps a renderer's existing device and queue.
    #[must_use]
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Requests a device without a surface, blocking until it is ready.
    ///
    /// # Errors
    ///
    /// [`MeshError::NoAdapter`] when no adapter is available,
    /// [`MeshError::RequestDevice`] when the adapter refuses the device.
    pub fn headless() -> MeshResult<Self> {
        pollster::block_on(Self::request_headless())
    }

    /// Async form of [`GpuContext::headless`].
    ///
    /// # Errors
    ///
    /// See [`GpuContext::headless`].
    pub async fn request_headless() -> MeshResult<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(MeshError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "meshing adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("TERRAVOX Meshing Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await?;

        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    /// The device.
    #[must_use]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// The queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}
