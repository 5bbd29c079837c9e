use super::window::WindowDimensions;
use crate::camera::Camera;
use crate::error::ViewerResult;
use crate::loaders::{MaterialData, MeshData, TextureData};
use crate::scene::Scene;

/// Opaque GPU geometry (vertex + index buffers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryHandle(pub u64);

/// Opaque GPU material (uniforms + bind group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialHandle(pub u64);

/// Opaque GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u64);

/// The rendering engine behind the viewer.
///
/// Owns the render surface and every GPU resource it hands out. Handles
/// must be released explicitly; the backend never frees them on its own
/// until `dispose`.
pub trait RenderBackend {
    fn upload_geometry(&mut self, mesh: &MeshData) -> ViewerResult<GeometryHandle>;

    fn create_texture(&mut self, texture: &TextureData) -> ViewerResult<TextureHandle>;

    fn create_material(
        &mut self,
        material: &MaterialData,
        texture: Option<TextureHandle>,
    ) -> ViewerResult<MaterialHandle>;

    fn release_geometry(&mut self, handle: GeometryHandle);

    fn release_material(&mut self, handle: MaterialHandle);

    fn release_texture(&mut self, handle: TextureHandle);

    /// Current surface size
    fn dimensions(&self) -> WindowDimensions;

    /// Reconfigure the surface to exactly `dimensions`
    fn resize(&mut self, dimensions: WindowDimensions);

    /// Draw `scene` through `camera` and present
    fn render(&mut self, scene: &Scene, camera: &Camera) -> ViewerResult<()>;

    /// Tear down the surface and device. Called at most once.
    fn dispose(&mut self);
}
