/// Viewport dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero height yields 1.0 so a minimised window
    /// never produces a NaN projection.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The display region hosting the render surface
pub trait Viewport {
    /// Current viewport size in physical pixels
    fn dimensions(&self) -> WindowDimensions;

    /// Ask the host to schedule another frame
    fn request_redraw(&self);

    /// Whether the render surface is still attached to this viewport
    fn hosts_surface(&self) -> bool;

    /// Detach the render surface from the viewport
    fn detach_surface(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920, 1080);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(WindowDimensions::new(800, 600).aspect_ratio(), 800.0 / 600.0);
        assert_eq!(WindowDimensions::new(1920, 1080).aspect_ratio(), 1920.0 / 1080.0);
        assert_eq!(WindowDimensions::new(1, 1).aspect_ratio(), 1.0);
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        let dims = WindowDimensions::new(640, 0);
        assert_eq!(dims.aspect_ratio(), 1.0);
        assert!(dims.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(WindowDimensions::new(0, 0).is_empty());
        assert!(WindowDimensions::new(0, 480).is_empty());
        assert!(!WindowDimensions::new(640, 480).is_empty());
    }

    struct MockViewport {
        dims: WindowDimensions,
        attached: bool,
        redraws: Cell<usize>,
    }

    impl Viewport for MockViewport {
        fn dimensions(&self) -> WindowDimensions {
            self.dims
        }

        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }

        fn hosts_surface(&self) -> bool {
            self.attached
        }

        fn detach_surface(&mut self) {
            self.attached = false;
        }
    }

    #[test]
    fn test_viewport_detach() {
        let mut viewport = MockViewport {
            dims: WindowDimensions::new(800, 600),
            attached: true,
            redraws: Cell::new(0),
        };

        assert!(viewport.hosts_surface());
        viewport.detach_surface();
        assert!(!viewport.hosts_surface());
    }

    #[test]
    fn test_viewport_redraw() {
        let viewport = MockViewport {
            dims: WindowDimensions::new(800, 600),
            attached: true,
            redraws: Cell::new(0),
        };

        viewport.request_redraw();
        viewport.request_redraw();
        assert_eq!(viewport.redraws.get(), 2);
        assert_eq!(viewport.dimensions(), WindowDimensions::new(800, 600));
    }
}
