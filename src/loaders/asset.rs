use crate::camera::Camera;
use crate::types::Vertex;

/// Everything pulled out of one asset file, still on the CPU
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub root: AssetNode,
    /// Embedded cameras in glTF camera-index order, already placed in the world
    pub cameras: Vec<Camera>,
    pub materials: Vec<MaterialData>,
    pub textures: Vec<TextureData>,
}

impl LoadedAsset {
    /// An asset with an empty root, no cameras and nothing to upload
    pub fn empty() -> Self {
        Self {
            root: AssetNode::group(None),
            cameras: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}

/// One node of the asset hierarchy.
/// Mesh vertices are already transformed into asset space.
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: Option<String>,
    pub mesh: Option<MeshData>,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    pub fn group(name: Option<String>) -> Self {
        Self {
            name,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(name: Option<String>, mesh: MeshData) -> Self {
        Self {
            name,
            mesh: Some(mesh),
            children: Vec::new(),
        }
    }

    pub fn mesh_count(&self) -> usize {
        let own = usize::from(self.mesh.is_some());
        own + self.children.iter().map(AssetNode::mesh_count).sum::<usize>()
    }
}

/// Indexed triangle geometry for one glTF mesh.
/// Each primitive becomes a group drawn with its own material.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub groups: Vec<PrimitiveGroup>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A range of `indices` sharing one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveGroup {
    pub start: u32,
    pub count: u32,
    /// Index into `LoadedAsset::materials`; `None` uses the default material
    pub material: Option<usize>,
}

/// Base colour material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    /// Index into `LoadedAsset::textures`
    pub texture: Option<usize>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
        }
    }
}

/// Texture data loaded from glTF
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8
}

impl TextureData {
    /// Byte length of a tightly packed RGBA8 image
    pub fn rgba_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }
}
