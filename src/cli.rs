// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{LightingProfile, ViewerConfig};

pub const DEFAULT_ASSET: &str = "models/office.glb";

#[derive(Parser, Debug, Clone)]
#[command(name = "glb-viewer")]
#[command(about = "View a glTF binary asset and cycle through its cameras", long_about = None)]
pub struct Cli {
    /// Path to the .glb/.gltf asset
    #[arg(env = "GLB_VIEWER_ASSET", default_value = DEFAULT_ASSET)]
    pub asset: PathBuf,

    /// Only use the first embedded camera and ignore clicks
    #[arg(long = "single-camera", default_value = "false")]
    pub single_camera: bool,

    /// Lights placed in the scene at startup
    #[arg(long, value_enum, default_value_t = LightingProfile::Full)]
    pub lighting: LightingProfile,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

impl Cli {
    pub fn to_config(&self) -> ViewerConfig {
        ViewerConfig {
            enable_multi_camera: !self.single_camera,
            lighting: self.lighting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["glb-viewer"]).unwrap();
        if std::env::var_os("GLB_VIEWER_ASSET").is_none() {
            assert_eq!(cli.asset, PathBuf::from(DEFAULT_ASSET));
        }
        assert_eq!((cli.width, cli.height), (800, 600));
        assert_eq!(cli.to_config(), ViewerConfig::default());
    }

    #[test]
    fn test_single_camera_minimal_lighting() {
        let cli = Cli::try_parse_from([
            "glb-viewer",
            "scene.glb",
            "--single-camera",
            "--lighting",
            "minimal",
        ])
        .unwrap();

        assert_eq!(cli.asset, PathBuf::from("scene.glb"));
        assert_eq!(cli.to_config(), ViewerConfig::minimal());
    }

    #[test]
    fn test_rejects_unknown_lighting() {
        assert!(Cli::try_parse_from(["glb-viewer", "--lighting", "studio"]).is_err());
    }
}
