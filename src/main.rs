use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use glb_viewer::cli::Cli;
use glb_viewer::core::{translate, WgpuBackend};
use glb_viewer::window::WinitViewport;
use glb_viewer::{LogSink, Viewer, ViewerError};

struct App {
    cli: Cli,
    viewer: Option<Viewer<WgpuBackend, WinitViewport>>,
    startup_error: Option<ViewerError>,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            viewer: None,
            startup_error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.startup_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("GLB Viewer")
                .with_inner_size(winit::dpi::PhysicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, ViewerError::surface(format!("Failed to create window: {}", e)));
                return;
            }
        };

        let backend = match pollster::block_on(WgpuBackend::new(window.clone())) {
            Ok(backend) => backend,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        self.viewer = Some(Viewer::initialize(
            self.cli.to_config(),
            WinitViewport::new(window),
            backend,
            LogSink,
            self.cli.asset.clone(),
        ));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };

        match event {
            WindowEvent::RedrawRequested => {
                viewer.frame();
            }
            event => {
                if let Some(input) = translate(&event) {
                    viewer.handle_input(input);
                }
            }
        }

        if viewer.is_disposed() {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Dropping the viewer tears down the scene and GPU context
        self.viewer = None;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("Viewing {:?}", cli.asset);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    if let Some(error) = app.startup_error {
        return Err(error.into());
    }

    Ok(())
}
