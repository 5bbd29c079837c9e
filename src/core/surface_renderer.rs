use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Sampler, Surface,
    SurfaceConfiguration, Texture, TextureView,
};
use winit::window::Window;

use super::backend::{GeometryHandle, MaterialHandle, RenderBackend, TextureHandle};
use super::gpu_context::GpuContext;
use super::window::WindowDimensions;
use crate::camera::Camera;
use crate::error::{ViewerError, ViewerResult};
use crate::loaders::{MaterialData, MeshData, PrimitiveGroup, TextureData};
use crate::scene::Scene;
use crate::types::{LightsUniform, MaterialUniform, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

struct GpuGeometry {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    groups: Vec<PrimitiveGroup>,
}

struct GpuMaterial {
    uniform: Buffer,
    bind_group: BindGroup,
}

struct GpuTexture {
    texture: Texture,
    view: TextureView,
}

/// Rasterizes the scene onto a window surface with wgpu.
///
/// Geometry is drawn in asset space (node transforms are baked in at load),
/// one draw call per primitive group, with ambient, hemisphere and
/// directional lighting. Shadow maps are not rendered.
pub struct WgpuBackend {
    gpu: GpuContext,
    surface: Option<Surface<'static>>,
    surface_config: SurfaceConfiguration,
    depth_view: TextureView,
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    lights_buffer: Buffer,
    frame_bind_group: BindGroup,
    material_layout: BindGroupLayout,
    sampler: Sampler,
    white_texture: GpuTexture,
    geometries: HashMap<GeometryHandle, GpuGeometry>,
    materials: HashMap<MaterialHandle, GpuMaterial>,
    textures: HashMap<TextureHandle, GpuTexture>,
    next_handle: u64,
}

impl WgpuBackend {
    /// Create the surface for `window` and a device that can present to it
    pub async fn new(window: Arc<Window>) -> ViewerResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window).map_err(ViewerError::surface)?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let caps = surface.get_capabilities(gpu.adapter());
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| ViewerError::surface("Surface reports no supported formats"))?;

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(gpu.device(), &surface_config);

        let device = gpu.device();
        let depth_view = Self::create_depth_view(device, surface_config.width, surface_config.height);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: std::mem::size_of::<crate::types::CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lights Uniform Buffer"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = Self::create_frame_layout(device);
        let material_layout = Self::create_material_layout(device);

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline = Self::create_pipeline(device, &frame_layout, &material_layout, format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white_texture = Self::upload_texture(
            &gpu,
            &TextureData {
                width: 1,
                height: 1,
                data: vec![255; 4],
            },
        )?;

        Ok(Self {
            gpu,
            surface: Some(surface),
            surface_config,
            depth_view,
            pipeline,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            material_layout,
            sampler,
            white_texture,
            geometries: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            next_handle: 0,
        })
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_frame_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_material_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    fn create_pipeline(
        device: &Device,
        frame_layout: &BindGroupLayout,
        material_layout: &BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[frame_layout, material_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Baked node transforms may mirror geometry, so draw both faces
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn upload_texture(gpu: &GpuContext, data: &TextureData) -> ViewerResult<GpuTexture> {
        let TextureData {
            width,
            height,
            data: pixels,
        } = data;
        let (width, height) = (*width, *height);

        if width == 0 || height == 0 {
            return Err(ViewerError::upload(format!(
                "Texture has zero size {}x{}",
                width, height
            )));
        }

        let expected_size = TextureData::rgba_len(width, height);
        if pixels.len() != expected_size {
            return Err(ViewerError::upload(format!(
                "Invalid texture buffer size: expected {} bytes, got {}",
                expected_size,
                pixels.len()
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Base Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            texture.as_image_copy(),
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture { texture, view })
    }
}

impl RenderBackend for WgpuBackend {
    fn upload_geometry(&mut self, mesh: &MeshData) -> ViewerResult<GeometryHandle> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(ViewerError::upload(format!(
                "Mesh {:?} has no triangles",
                mesh.name
            )));
        }

        let device = self.gpu.device();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let handle = GeometryHandle(self.next_id());
        self.geometries.insert(
            handle,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                groups: mesh.groups.clone(),
            },
        );
        Ok(handle)
    }

    fn create_texture(&mut self, texture: &TextureData) -> ViewerResult<TextureHandle> {
        let gpu_texture = Self::upload_texture(&self.gpu, texture)?;
        let handle = TextureHandle(self.next_id());
        self.textures.insert(handle, gpu_texture);
        Ok(handle)
    }

    fn create_material(
        &mut self,
        material: &MaterialData,
        texture: Option<TextureHandle>,
    ) -> ViewerResult<MaterialHandle> {
        let view = match texture {
            Some(handle) => {
                &self
                    .textures
                    .get(&handle)
                    .ok_or_else(|| ViewerError::upload(format!("Unknown texture {:?}", handle)))?
                    .view
            }
            None => &self.white_texture.view,
        };

        let device = self.gpu.device();
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::bytes_of(&MaterialUniform {
                base_color: material.base_color,
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: material.name.as_deref(),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let handle = MaterialHandle(self.next_id());
        self.materials
            .insert(handle, GpuMaterial { uniform, bind_group });
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        match self.geometries.remove(&handle) {
            Some(geometry) => {
                geometry.vertex_buffer.destroy();
                geometry.index_buffer.destroy();
            }
            None => log::warn!("Release of unknown geometry {:?}", handle),
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        match self.materials.remove(&handle) {
            Some(material) => material.uniform.destroy(),
            None => log::warn!("Release of unknown material {:?}", handle),
        }
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        match self.textures.remove(&handle) {
            Some(texture) => texture.texture.destroy(),
            None => log::warn!("Release of unknown texture {:?}", handle),
        }
    }

    fn dimensions(&self) -> WindowDimensions {
        WindowDimensions::new(self.surface_config.width, self.surface_config.height)
    }

    fn resize(&mut self, dimensions: WindowDimensions) {
        if dimensions.is_empty() {
            return;
        }
        let Some(surface) = &self.surface else {
            return;
        };

        self.surface_config.width = dimensions.width;
        self.surface_config.height = dimensions.height;
        surface.configure(self.gpu.device(), &self.surface_config);

        self.depth_view =
            Self::create_depth_view(self.gpu.device(), dimensions.width, dimensions.height);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> ViewerResult<()> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };

        let queue = self.gpu.queue();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera.to_uniform()));
        queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::bytes_of(&LightsUniform::from_lights(scene.lights())),
        );

        let surface_texture = match surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                surface.configure(self.gpu.device(), &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(ViewerError::surface(e)),
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for mesh in scene.meshes() {
                let Some(geometry) = self.geometries.get(&mesh.geometry) else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for (i, group) in geometry.groups.iter().enumerate() {
                    let material = mesh
                        .material
                        .for_group(i)
                        .and_then(|handle| self.materials.get(&handle));
                    let Some(material) = material else {
                        continue;
                    };
                    render_pass.set_bind_group(1, &material.bind_group, &[]);
                    render_pass.draw_indexed(group.start..group.start + group.count, 0, 0..1);
                }
            }
        }

        queue.submit(Some(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    fn dispose(&mut self) {
        if self.surface.is_none() {
            return;
        }

        let leaked = self.geometries.len() + self.materials.len() + self.textures.len();
        if leaked > 0 {
            log::warn!("Disposing backend with {} unreleased resources", leaked);
        }
        for (_, geometry) in self.geometries.drain() {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
        }
        for (_, material) in self.materials.drain() {
            material.uniform.destroy();
        }
        for (_, texture) in self.textures.drain() {
            texture.texture.destroy();
        }
        self.white_texture.texture.destroy();
        self.camera_buffer.destroy();
        self.lights_buffer.destroy();

        self.surface = None;
        self.gpu.destroy();
    }
}
