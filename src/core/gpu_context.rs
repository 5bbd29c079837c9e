use std::sync::Arc;
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};

use crate::error::{ViewerError, ViewerResult};

/// Device and queue shared by the backend and its resources
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a GPU context compatible with a surface (for window rendering)
    pub async fn new_with_surface(instance: &Instance, surface: &Surface<'_>) -> ViewerResult<Self> {
        let adapter = Self::request_adapter(instance, surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Release the device's GPU memory. Resources created from it become invalid.
    pub fn destroy(&self) {
        self.device.destroy();
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> ViewerResult<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::device(format!("Failed to find appropriate adapter: {:?}", e)))
    }

    async fn request_device(adapter: &Adapter) -> ViewerResult<(Device, Queue)> {
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| ViewerError::device(format!("Failed to create device: {:?}", e)))
    }
}
