pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod loaders;
pub mod scene;
pub mod types;
pub mod viewer;
pub mod window;

pub use camera::{Camera, CameraSet, Projection};
pub use config::{LightingProfile, ViewerConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use error::{ViewerError, ViewerResult};
pub use frame::{FrameInfo, RenderLoop};
pub use scene::{Light, Scene};
pub use viewer::Viewer;
