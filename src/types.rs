use crate::scene::Light;

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

/// Interleaved vertex as uploaded to the vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-material uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
}

/// All scene lights folded into one uniform.
/// Colours are pre-multiplied by intensity; directions point towards the light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub hemisphere_dir: [f32; 4],
    pub sun_color: [f32; 4],
    pub sun_dir: [f32; 4],
}

impl LightsUniform {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self {
            hemisphere_dir: [0.0, 1.0, 0.0, 0.0],
            sun_dir: [0.0, 1.0, 0.0, 0.0],
            ..Self::default()
        };

        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    let c = color * intensity;
                    uniform.ambient[0] += c.x;
                    uniform.ambient[1] += c.y;
                    uniform.ambient[2] += c.z;
                }
                Light::Hemisphere {
                    sky,
                    ground,
                    intensity,
                    position,
                } => {
                    uniform.sky = (sky * intensity).extend(0.0).to_array();
                    uniform.ground = (ground * intensity).extend(0.0).to_array();
                    uniform.hemisphere_dir = position
                        .try_normalize()
                        .unwrap_or(glam::Vec3::Y)
                        .extend(0.0)
                        .to_array();
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                    ..
                } => {
                    uniform.sun_color = (color * intensity).extend(0.0).to_array();
                    uniform.sun_dir = position
                        .try_normalize()
                        .unwrap_or(glam::Vec3::Y)
                        .extend(0.0)
                        .to_array();
                }
            }
        }

        uniform
    }
}
