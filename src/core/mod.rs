pub mod backend;
pub mod gpu_context;
pub mod input_adapter;
pub mod surface_renderer;
pub mod window;

pub use backend::{GeometryHandle, MaterialHandle, RenderBackend, TextureHandle};
pub use gpu_context::GpuContext;
pub use input_adapter::{translate, ViewerInput};
pub use surface_renderer::WgpuBackend;
pub use window::{Viewport, WindowDimensions};
