//! The viewer: one scene, one camera set, one render surface.
//!
//! Everything here runs on the event-loop thread. The asset decode is the
//! only work done elsewhere and its result is collected at the top of a
//! frame, so a frame always sees a fully committed camera and scene.

use std::path::PathBuf;

use crate::camera::{Camera, CameraSet, FALLBACK_POSITION};
use crate::config::ViewerConfig;
use crate::core::{RenderBackend, ViewerInput, Viewport, WindowDimensions};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::ViewerError;
use crate::frame::{FrameInfo, RenderLoop};
use crate::loaders::{spawn_load, LoadOutcome, LoadedAsset, PendingLoad};
use crate::scene::{NodeId, ReleaseSummary, Scene, SceneNode};

#[derive(Debug, Clone, Copy)]
struct Subscriptions {
    resize: bool,
    click: bool,
}

impl Subscriptions {
    const NONE: Subscriptions = Subscriptions {
        resize: false,
        click: false,
    };
}

/// Handle to a running viewer. Dropping it disposes it.
pub struct Viewer<B: RenderBackend, V: Viewport, D: DiagnosticSink = LogSink> {
    config: ViewerConfig,
    backend: B,
    viewport: V,
    diagnostics: D,
    scene: Scene,
    cameras: CameraSet,
    asset: Option<NodeId>,
    pending: Option<PendingLoad>,
    render_loop: RenderLoop,
    subscriptions: Subscriptions,
    /// Last render failure reported, so a persistent one is not repeated
    last_render_error: Option<String>,
    disposed: bool,
}

impl<B: RenderBackend, V: Viewport, D: DiagnosticSink> Viewer<B, V, D> {
    /// Set up scene, default camera and lights, size the surface to the
    /// viewport and schedule the first frame. No asset is requested.
    pub fn new(config: ViewerConfig, viewport: V, mut backend: B, diagnostics: D) -> Self {
        let dimensions = viewport.dimensions();
        backend.resize(dimensions);

        let scene = Scene::with_lights(config.lighting);
        let cameras = CameraSet::new(Camera::fallback(dimensions));

        log::info!(
            "Viewer started at {}x{} ({:?} lighting, multi-camera {})",
            dimensions.width,
            dimensions.height,
            config.lighting,
            if config.enable_multi_camera { "on" } else { "off" }
        );

        viewport.request_redraw();

        Self {
            config,
            backend,
            viewport,
            diagnostics,
            scene,
            cameras,
            asset: None,
            pending: None,
            render_loop: RenderLoop::new(),
            subscriptions: Subscriptions {
                resize: true,
                click: config.enable_multi_camera,
            },
            last_render_error: None,
            disposed: false,
        }
    }

    /// `new` plus a background load of `asset_path`
    pub fn initialize(
        config: ViewerConfig,
        viewport: V,
        backend: B,
        diagnostics: D,
        asset_path: impl Into<PathBuf>,
    ) -> Self {
        let mut viewer = Self::new(config, viewport, backend, diagnostics);
        viewer.begin_load(spawn_load(asset_path));
        viewer
    }

    /// Track an in-flight load; its result is applied on a later frame
    pub fn begin_load(&mut self, pending: PendingLoad) {
        if self.disposed {
            log::debug!("Ignoring load of {:?} on a disposed viewer", pending.path());
            return;
        }
        log::info!("Loading asset {:?}", pending.path());
        self.pending = Some(pending);
    }

    /// Collect the pending load if it has finished. Returns true when a
    /// result was applied.
    pub fn poll_load(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let Some(outcome) = pending.poll() else {
            return false;
        };
        self.pending = None;
        self.complete_load(outcome);
        true
    }

    /// Apply a finished load. After `dispose` this does nothing.
    pub fn complete_load(&mut self, outcome: LoadOutcome) {
        if self.disposed {
            log::debug!("Asset load finished after dispose, discarding");
            return;
        }

        match outcome {
            Ok(asset) => self.adopt_asset(asset),
            Err(e) => self.report(e),
        }
    }

    fn adopt_asset(&mut self, asset: LoadedAsset) {
        if self.asset.is_some() {
            log::warn!("Asset already attached, ignoring second load");
            return;
        }

        let node = match SceneNode::instantiate(&asset, &mut self.backend) {
            Ok(node) => node,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        log::info!("Attached asset with {} meshes", node.mesh_count());
        self.asset = Some(self.scene.add(node));

        let mut cameras = asset.cameras;
        if !self.config.enable_multi_camera {
            cameras.truncate(1);
        }

        if self.cameras.adopt(cameras) {
            let dimensions = self.viewport.dimensions();
            let available = self.cameras.len();
            let active = self.cameras.active_mut();
            active.fit_viewport(dimensions);
            log::info!(
                "Using embedded camera {} ({} available)",
                active.name.as_deref().unwrap_or("0"),
                available
            );
        } else {
            self.cameras.active_mut().position = FALLBACK_POSITION;
            log::info!("Asset has no cameras, keeping default camera");
        }
    }

    /// One render-loop iteration: collect a finished load, draw once and
    /// reschedule. `None` once the loop has been cancelled.
    pub fn frame(&mut self) -> Option<FrameInfo> {
        let info = self.render_loop.next()?;

        self.poll_load();

        match self.backend.render(&self.scene, self.cameras.active()) {
            Ok(()) => self.last_render_error = None,
            Err(e) => {
                let message = e.to_string();
                if self.last_render_error.as_deref() != Some(message.as_str()) {
                    self.last_render_error = Some(message);
                    self.report(e);
                }
            }
        }

        self.viewport.request_redraw();
        Some(info)
    }

    /// Dispatch to the subscribed handler
    pub fn handle_input(&mut self, input: ViewerInput) {
        match input {
            ViewerInput::Resize(dimensions) if self.subscriptions.resize => {
                self.resize(dimensions)
            }
            ViewerInput::Click if self.subscriptions.click => {
                self.click();
            }
            ViewerInput::Exit => self.dispose(),
            _ => {}
        }
    }

    fn resize(&mut self, dimensions: WindowDimensions) {
        if dimensions.is_empty() {
            return;
        }
        self.cameras.active_mut().fit_viewport(dimensions);
        self.backend.resize(dimensions);
    }

    /// Advance to the next camera, wrapping. No-op with fewer than two.
    fn click(&mut self) -> bool {
        if !self.cameras.advance() {
            return false;
        }
        self.fit_active_camera();
        true
    }

    /// Switch to camera `index`. Out-of-range indices are refused.
    pub fn set_active_camera(&mut self, index: usize) -> bool {
        if self.disposed || !self.cameras.select(index) {
            return false;
        }
        self.fit_active_camera();
        true
    }

    fn fit_active_camera(&mut self) {
        let dimensions = self.viewport.dimensions();
        let index = self.cameras.active_index();
        let camera = self.cameras.active_mut();
        camera.fit_viewport(dimensions);
        log::info!("Switched to camera {} {:?}", index, camera.name);
    }

    /// Tear everything down. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.subscriptions = Subscriptions::NONE;
        self.render_loop.cancel();
        self.pending = None;

        let mut released = ReleaseSummary::default();
        if let Some(id) = self.asset.take() {
            if let Some(node) = self.scene.remove(id) {
                released = node.release(&mut self.backend);
            }
        }
        for node in self.scene.clear() {
            node.release(&mut self.backend);
        }

        self.backend.dispose();

        if self.viewport.hosts_surface() {
            self.viewport.detach_surface();
        }

        log::info!(
            "Viewer disposed after {} frames ({} geometries, {} materials, {} textures released)",
            self.render_loop.frame_number(),
            released.geometries,
            released.materials,
            released.textures
        );
    }

    fn report(&self, error: ViewerError) {
        self.diagnostics.report(Diagnostic::now(error));
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn cameras(&self) -> &[Camera] {
        self.cameras.as_slice()
    }

    pub fn active_camera(&self) -> &Camera {
        self.cameras.active()
    }

    pub fn active_index(&self) -> usize {
        self.cameras.active_index()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_subscriptions(&self) -> bool {
        self.subscriptions.resize || self.subscriptions.click
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }
}

impl<B: RenderBackend, V: Viewport, D: DiagnosticSink> Drop for Viewer<B, V, D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
