use std::sync::Arc;
use winit::window::Window;

use crate::core::{Viewport, WindowDimensions};

/// A winit window acting as the viewer's mount point
pub struct WinitViewport {
    window: Arc<Window>,
    surface_attached: bool,
}

impl WinitViewport {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            surface_attached: true,
        }
    }
}

impl Viewport for WinitViewport {
    fn dimensions(&self) -> WindowDimensions {
        let size = self.window.inner_size();
        WindowDimensions::new(size.width, size.height)
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn hosts_surface(&self) -> bool {
        self.surface_attached
    }

    fn detach_surface(&mut self) {
        self.surface_attached = false;
        self.window.set_visible(false);
    }
}
