use glam::Vec3;
use std::collections::{BTreeSet, HashMap};

use crate::config::LightingProfile;
use crate::core::{GeometryHandle, MaterialHandle, RenderBackend, TextureHandle};
use crate::error::ViewerResult;
use crate::loaders::{AssetNode, LoadedAsset, MaterialData};

/// Scene light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    /// Sky colour from above, ground colour from below; `position` sets "up"
    Hemisphere {
        sky: Vec3,
        ground: Vec3,
        intensity: f32,
        position: Vec3,
    },
    /// Parallel light shining from `position` towards the origin
    Directional {
        color: Vec3,
        intensity: f32,
        position: Vec3,
        cast_shadow: bool,
    },
}

impl Light {
    /// Startup lights for a profile
    pub fn for_profile(profile: LightingProfile) -> Vec<Light> {
        let ambient = Light::Ambient {
            color: rgb(0xffffff),
            intensity: 0.8,
        };
        let sun = Light::Directional {
            color: rgb(0xffffff),
            intensity: 1.0,
            position: Vec3::new(5.0, 10.0, 7.0),
            cast_shadow: true,
        };

        match profile {
            LightingProfile::Minimal => vec![ambient, sun],
            LightingProfile::Full => vec![
                ambient,
                Light::Hemisphere {
                    sky: rgb(0xffffff),
                    ground: rgb(0x444444),
                    intensity: 0.6,
                    position: Vec3::new(0.0, 20.0, 0.0),
                },
                sun,
            ],
        }
    }

    pub fn casts_shadow(&self) -> bool {
        matches!(self, Light::Directional { cast_shadow: true, .. })
    }
}

/// `0xRRGGBB` to linear-ish 0..1 components
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Identifies a direct child of the scene root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// A mesh's material: one for the whole geometry, or one per primitive group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialSlot {
    Single(MaterialHandle),
    List(Vec<MaterialHandle>),
}

impl MaterialSlot {
    /// Material used by primitive group `index`
    pub fn for_group(&self, index: usize) -> Option<MaterialHandle> {
        match self {
            MaterialSlot::Single(handle) => Some(*handle),
            MaterialSlot::List(handles) => handles.get(index).copied(),
        }
    }

    pub fn handles(&self) -> &[MaterialHandle] {
        match self {
            MaterialSlot::Single(handle) => std::slice::from_ref(handle),
            MaterialSlot::List(handles) => handles,
        }
    }
}

/// GPU-side mesh attached to a scene node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub material: MaterialSlot,
    /// Base colour textures of every group's material, deduplicated
    pub textures: Vec<TextureHandle>,
}

/// Handles released during teardown of a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub mesh: Option<Mesh>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Upload every mesh, material and texture of `asset` and mirror its
    /// hierarchy. On failure everything uploaded so far is released again.
    pub fn instantiate<B: RenderBackend + ?Sized>(
        asset: &LoadedAsset,
        backend: &mut B,
    ) -> ViewerResult<SceneNode> {
        let mut uploader = Uploader::new(asset);
        match uploader.node(&asset.root, backend) {
            Ok(node) => Ok(node),
            Err(e) => {
                uploader.release_all(backend);
                Err(e)
            }
        }
    }

    /// Depth-first, parents before children
    pub fn traverse<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| count += usize::from(node.mesh.is_some()));
        count
    }

    /// Release every GPU handle in this subtree. Handles shared between
    /// meshes are released once.
    pub fn release<B: RenderBackend + ?Sized>(self, backend: &mut B) -> ReleaseSummary {
        let mut geometries = BTreeSet::new();
        let mut materials = BTreeSet::new();
        let mut textures = BTreeSet::new();

        self.traverse(&mut |node| {
            if let Some(mesh) = &node.mesh {
                geometries.insert(mesh.geometry);
                materials.extend(mesh.material.handles().iter().copied());
                textures.extend(mesh.textures.iter().copied());
            }
        });

        for &handle in &geometries {
            backend.release_geometry(handle);
        }
        for &handle in &materials {
            backend.release_material(handle);
        }
        for &handle in &textures {
            backend.release_texture(handle);
        }

        ReleaseSummary {
            geometries: geometries.len(),
            materials: materials.len(),
            textures: textures.len(),
        }
    }
}

/// Creates GPU resources lazily so that only referenced materials and
/// textures are ever allocated
struct Uploader<'a> {
    asset: &'a LoadedAsset,
    geometries: Vec<GeometryHandle>,
    materials: HashMap<Option<usize>, (MaterialHandle, Option<TextureHandle>)>,
    textures: HashMap<usize, TextureHandle>,
}

impl<'a> Uploader<'a> {
    fn new(asset: &'a LoadedAsset) -> Self {
        Self {
            asset,
            geometries: Vec::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    fn node<B: RenderBackend + ?Sized>(
        &mut self,
        node: &AssetNode,
        backend: &mut B,
    ) -> ViewerResult<SceneNode> {
        let mesh = match &node.mesh {
            Some(data) => {
                let geometry = backend.upload_geometry(data)?;
                self.geometries.push(geometry);

                let mut slots = Vec::with_capacity(data.groups.len());
                for group in &data.groups {
                    slots.push(self.material(group.material, backend)?);
                }

                let mut textures: Vec<TextureHandle> =
                    slots.iter().filter_map(|(_, texture)| *texture).collect();
                textures.sort();
                textures.dedup();
                let mut handles: Vec<MaterialHandle> = slots.iter().map(|(m, _)| *m).collect();
                let material = if handles.len() == 1 {
                    MaterialSlot::Single(handles.remove(0))
                } else {
                    MaterialSlot::List(handles)
                };

                Some(Mesh {
                    geometry,
                    material,
                    textures,
                })
            }
            None => None,
        };

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.node(child, backend)?);
        }

        Ok(SceneNode {
            name: node.name.clone(),
            mesh,
            children,
        })
    }

    fn material<B: RenderBackend + ?Sized>(
        &mut self,
        index: Option<usize>,
        backend: &mut B,
    ) -> ViewerResult<(MaterialHandle, Option<TextureHandle>)> {
        if let Some(&cached) = self.materials.get(&index) {
            return Ok(cached);
        }

        let asset = self.asset;
        let default = MaterialData::default();
        let data = match index.and_then(|i| asset.materials.get(i)) {
            Some(data) => data,
            None => {
                if index.is_some() {
                    log::warn!("Material {:?} missing from asset, using default", index);
                }
                &default
            }
        };

        let texture = match data.texture {
            Some(t) => self.texture(t, backend)?,
            None => None,
        };

        let handle = backend.create_material(data, texture)?;
        self.materials.insert(index, (handle, texture));
        Ok((handle, texture))
    }

    fn texture<B: RenderBackend + ?Sized>(
        &mut self,
        index: usize,
        backend: &mut B,
    ) -> ViewerResult<Option<TextureHandle>> {
        if let Some(&cached) = self.textures.get(&index) {
            return Ok(Some(cached));
        }

        let asset = self.asset;
        let Some(data) = asset.textures.get(index) else {
            log::warn!("Texture {} missing from asset, drawing untextured", index);
            return Ok(None);
        };

        let handle = backend.create_texture(data)?;
        self.textures.insert(index, handle);
        Ok(Some(handle))
    }

    fn release_all<B: RenderBackend + ?Sized>(self, backend: &mut B) {
        for handle in self.geometries {
            backend.release_geometry(handle);
        }
        for (handle, _) in self.materials.into_values() {
            backend.release_material(handle);
        }
        for handle in self.textures.into_values() {
            backend.release_texture(handle);
        }
    }
}

/// The scene root: lights plus top-level node subtrees
#[derive(Debug, Default)]
pub struct Scene {
    lights: Vec<Light>,
    children: Vec<(NodeId, SceneNode)>,
    next_id: u64,
}

impl Scene {
    pub fn with_lights(profile: LightingProfile) -> Self {
        Self {
            lights: Light::for_profile(profile),
            ..Self::default()
        }
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.children.push((id, node));
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let position = self.children.iter().position(|(child, _)| *child == id)?;
        Some(self.children.remove(position).1)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> impl Iterator<Item = &SceneNode> {
        self.children.iter().map(|(_, node)| node)
    }

    /// Every mesh in the scene, depth-first
    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        for child in self.children() {
            child.traverse(&mut |node| meshes.extend(node.mesh.as_ref()));
        }
        meshes
    }

    /// Drop lights and detach every child, handing the subtrees back for release
    pub fn clear(&mut self) -> Vec<SceneNode> {
        self.lights.clear();
        self.children.drain(..).map(|(_, node)| node).collect()
    }
}
