//! Error type shared by the viewer, the loader hand-off and the GPU backend.

/// Everything that can go wrong after the window is up.
///
/// None of these are fatal to the viewer: they are reported to the
/// diagnostic sink and the viewer keeps drawing whatever state it already had.
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error("failed to load asset {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("asset load for {path} was abandoned before completing")]
    LoadAbandoned { path: String },

    #[error("device error: {0}")]
    Device(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("render error: {0}")]
    Render(String),
}

impl ViewerError {
    /// Wrap a loader failure, keeping the whole `anyhow` context chain.
    pub fn load(path: impl Into<String>, err: &anyhow::Error) -> Self {
        ViewerError::Load {
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }

    pub fn device<T: ToString>(msg: T) -> Self {
        ViewerError::Device(msg.to_string())
    }

    pub fn surface<T: ToString>(msg: T) -> Self {
        ViewerError::Surface(msg.to_string())
    }

    pub fn upload<T: ToString>(msg: T) -> Self {
        ViewerError::Upload(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        ViewerError::Render(msg.to_string())
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_keeps_context_chain() {
        let err = anyhow::anyhow!("file not found").context("Failed to load glTF file");
        let viewer_err = ViewerError::load("models/office.glb", &err);

        let message = viewer_err.to_string();
        assert!(message.contains("models/office.glb"));
        assert!(message.contains("Failed to load glTF file"));
        assert!(message.contains("file not found"));
    }

    #[test]
    fn constructors_pick_the_right_variant() {
        assert!(matches!(ViewerError::device("x"), ViewerError::Device(_)));
        assert!(matches!(ViewerError::surface("x"), ViewerError::Surface(_)));
        assert!(matches!(ViewerError::upload("x"), ViewerError::Upload(_)));
        assert!(matches!(ViewerError::render("x"), ViewerError::Render(_)));
    }
}
