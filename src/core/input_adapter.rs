use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::window::WindowDimensions;

/// Viewer-level input, decoupled from winit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerInput {
    /// Viewport changed size (physical pixels)
    Resize(WindowDimensions),
    /// Primary-button click anywhere in the viewport
    Click,
    /// Close requested or Escape pressed
    Exit,
}

/// Map a winit window event to viewer input.
///
/// A click is reported on left-button release, matching DOM click semantics.
pub fn translate(event: &WindowEvent) -> Option<ViewerInput> {
    match event {
        WindowEvent::Resized(size) => Some(ViewerInput::Resize(WindowDimensions::new(
            size.width,
            size.height,
        ))),
        WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } => Some(ViewerInput::Click),
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(ViewerInput::Exit),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
            ..
        } => Some(ViewerInput::Exit),
        _ => None,
    }
}
