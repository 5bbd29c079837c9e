/// Which lights the viewer puts into the scene at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LightingProfile {
    /// Ambient fill plus one directional light
    Minimal,
    /// Ambient, hemisphere and a shadow-casting directional light
    #[default]
    Full,
}

/// Viewer behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Adopt every embedded camera and cycle through them on click.
    /// When false only the first embedded camera is used.
    pub enable_multi_camera: bool,
    pub lighting: LightingProfile,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enable_multi_camera: true,
            lighting: LightingProfile::Full,
        }
    }
}

impl ViewerConfig {
    /// Single camera, ambient + directional light
    pub fn minimal() -> Self {
        Self {
            enable_multi_camera: false,
            lighting: LightingProfile::Minimal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_full_multi_camera() {
        let config = ViewerConfig::default();
        assert!(config.enable_multi_camera);
        assert_eq!(config.lighting, LightingProfile::Full);
    }

    #[test]
    fn minimal_turns_everything_down() {
        let config = ViewerConfig::minimal();
        assert!(!config.enable_multi_camera);
        assert_eq!(config.lighting, LightingProfile::Minimal);
    }
}
