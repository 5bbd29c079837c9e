#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use glb_viewer::core::{
    GeometryHandle, MaterialHandle, RenderBackend, TextureHandle, Viewport, WindowDimensions,
};
use glb_viewer::loaders::{MaterialData, MeshData, TextureData};
use glb_viewer::{Camera, Diagnostic, DiagnosticSink, Scene, ViewerError, ViewerResult};

/// Counts every call and tracks live resources
#[derive(Default)]
pub struct MockBackend {
    next: u64,
    pub size: Option<WindowDimensions>,
    pub renders: usize,
    pub live: usize,
    pub disposed: usize,
    pub fail_render: bool,
}

impl MockBackend {
    fn handle(&mut self) -> u64 {
        self.next += 1;
        self.live += 1;
        self.next
    }
}

impl RenderBackend for MockBackend {
    fn upload_geometry(&mut self, _mesh: &MeshData) -> ViewerResult<GeometryHandle> {
        Ok(GeometryHandle(self.handle()))
    }

    fn create_texture(&mut self, _texture: &TextureData) -> ViewerResult<TextureHandle> {
        Ok(TextureHandle(self.handle()))
    }

    fn create_material(
        &mut self,
        _material: &MaterialData,
        _texture: Option<TextureHandle>,
    ) -> ViewerResult<MaterialHandle> {
        Ok(MaterialHandle(self.handle()))
    }

    fn release_geometry(&mut self, _handle: GeometryHandle) {
        self.live -= 1;
    }

    fn release_material(&mut self, _handle: MaterialHandle) {
        self.live -= 1;
    }

    fn release_texture(&mut self, _handle: TextureHandle) {
        self.live -= 1;
    }

    fn dimensions(&self) -> WindowDimensions {
        self.size.unwrap_or(WindowDimensions::new(0, 0))
    }

    fn resize(&mut self, dimensions: WindowDimensions) {
        self.size = Some(dimensions);
    }

    fn render(&mut self, _scene: &Scene, _camera: &Camera) -> ViewerResult<()> {
        self.renders += 1;
        if self.fail_render {
            return Err(ViewerError::render("mock failure"));
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed += 1;
    }
}

pub struct MockViewport {
    pub dims: Cell<WindowDimensions>,
    pub attached: bool,
    pub redraws: Cell<usize>,
}

impl MockViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dims: Cell::new(WindowDimensions::new(width, height)),
            attached: true,
            redraws: Cell::new(0),
        }
    }
}

impl Viewport for MockViewport {
    fn dimensions(&self) -> WindowDimensions {
        self.dims.get()
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

#[derive(Default)]
pub struct RecordingSink {
    pub records: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.records.borrow_mut().push(diagnostic);
    }
}

// ============================================================================
// GLB construction
// ============================================================================

/// Packs a glTF JSON document and binary payload into a `.glb` container
pub fn glb(json: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let mut json_bytes = serde_json::to_vec(json).unwrap();
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let bin_chunk_len = if bin.is_empty() { 0 } else { 8 + bin.len() };
    let total = 12 + 8 + json_bytes.len() + bin_chunk_len;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    out.extend_from_slice(&json_bytes);

    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
        out.extend_from_slice(&bin);
    }

    out
}

/// Binary payload for one triangle in the XY plane: three float3
/// positions followed by three u16 indices, padded to 44 bytes
pub fn triangle_bin() -> Vec<u8> {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin = Vec::new();
    for p in positions {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    bin
}

/// glTF document with one triangle mesh on node 0, plus the given camera
/// definitions and extra nodes appended after it
pub fn triangle_document(
    cameras: Vec<serde_json::Value>,
    extra_nodes: Vec<serde_json::Value>,
) -> serde_json::Value {
    let mut nodes = vec![serde_json::json!({ "name": "Desk", "mesh": 0 })];
    nodes.extend(extra_nodes);
    let scene_nodes: Vec<usize> = (0..nodes.len()).collect();

    let mut doc = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Office", "nodes": scene_nodes }],
        "nodes": nodes,
        "meshes": [{
            "name": "DeskMesh",
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1,
                "material": 0
            }]
        }],
        "materials": [{
            "name": "Oak",
            "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.25, 0.125, 1.0] }
        }],
        "buffers": [{ "byteLength": 44 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            },
            {
                "bufferView": 1,
                "componentType": 5123,
                "count": 3,
                "type": "SCALAR"
            }
        ]
    });

    if !cameras.is_empty() {
        doc["cameras"] = serde_json::Value::Array(cameras);
    }
    doc
}

pub fn perspective_camera(yfov: f32) -> serde_json::Value {
    serde_json::json!({
        "type": "perspective",
        "perspective": { "yfov": yfov, "znear": 0.1, "zfar": 100.0, "aspectRatio": 1.5 }
    })
}

pub fn camera_node(name: &str, camera: usize, translation: [f32; 3]) -> serde_json::Value {
    serde_json::json!({ "name": name, "camera": camera, "translation": translation })
}
