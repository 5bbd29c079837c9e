use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::path::Path;

use super::asset::{AssetNode, LoadedAsset, MaterialData, MeshData, PrimitiveGroup, TextureData};
use crate::camera::{Camera, Projection};
use crate::types::Vertex;

/// Loads a `.glb` / `.gltf` file from disk
pub fn load_asset(path: impl AsRef<Path>) -> Result<LoadedAsset> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    build_asset(&document, &buffers, &images)
}

/// Loads an asset from an in-memory `.glb` or embedded `.gltf`
pub fn load_asset_from_slice(bytes: &[u8]) -> Result<LoadedAsset> {
    let (document, buffers, images) =
        gltf::import_slice(bytes).context("Failed to parse glTF data")?;

    build_asset(&document, &buffers, &images)
}

fn build_asset(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<LoadedAsset> {
    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes, {} materials, {} images, {} cameras",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len(),
        document.cameras().count()
    );

    let materials = document.materials().map(|m| read_material(&m)).collect();
    let textures = images.iter().enumerate().map(|(i, img)| read_texture(i, img)).collect();

    let scene = document.default_scene().or_else(|| document.scenes().next());

    let mut root = AssetNode::group(scene.as_ref().and_then(|s| s.name()).map(str::to_string));
    let mut camera_placements = HashMap::new();

    if let Some(scene) = &scene {
        for node in scene.nodes() {
            root.children.push(process_node(
                &node,
                buffers,
                &Mat4::IDENTITY,
                &mut camera_placements,
            )?);
        }
    } else {
        log::warn!("glTF file contains no scenes");
    }

    let cameras = document
        .cameras()
        .map(|camera| {
            let placement = camera_placements.remove(&camera.index());
            read_camera(&camera, placement)
        })
        .collect::<Vec<_>>();

    log::info!(
        "Loaded {} meshes, {} cameras",
        root.mesh_count(),
        cameras.len()
    );

    Ok(LoadedAsset {
        root,
        cameras,
        materials,
        textures,
    })
}

/// World transform and node name of the first node carrying a camera
struct CameraPlacement {
    world: Mat4,
    node_name: Option<String>,
}

/// Recursively processes glTF nodes, baking world transforms into vertices
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    camera_placements: &mut HashMap<usize, CameraPlacement>,
) -> Result<AssetNode> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    let mut asset_node = AssetNode::group(node.name().map(str::to_string));

    if let Some(mesh) = node.mesh() {
        asset_node.mesh = read_mesh(&mesh, buffers, &global_transform)?;
    }

    if let Some(camera) = node.camera() {
        camera_placements
            .entry(camera.index())
            .or_insert_with(|| CameraPlacement {
                world: global_transform,
                node_name: node.name().map(str::to_string),
            });
    }

    for child in node.children() {
        asset_node.children.push(process_node(
            &child,
            buffers,
            &global_transform,
            camera_placements,
        )?);
    }

    Ok(asset_node)
}

/// Merges every triangle primitive of a mesh into one indexed buffer.
/// Returns `None` when nothing drawable is left.
fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
) -> Result<Option<MeshData>> {
    let normal_matrix = transform.inverse().transpose();
    let mut data = MeshData {
        name: mesh.name().map(str::to_string),
        ..MeshData::default()
    };

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| {
                    normal_matrix
                        .transform_vector3(Vec3::from_array(n))
                        .normalize_or_zero()
                })
                .collect(),
            None => vec![Vec3::ZERO; positions.len()],
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        if normals.len() != positions.len() || uvs.len() != positions.len() {
            bail!(
                "Mesh {:?} has mismatched attribute counts ({} positions, {} normals, {} uvs)",
                mesh.name(),
                positions.len(),
                normals.len(),
                uvs.len()
            );
        }

        let local_indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        if let Some(&bad) = local_indices.iter().find(|&&i| i as usize >= positions.len()) {
            bail!("Mesh {:?} index {} out of range", mesh.name(), bad);
        }

        let base = data.vertices.len() as u32;
        let start = data.indices.len() as u32;
        let triangle_len = local_indices.len() - local_indices.len() % 3;
        if triangle_len == 0 {
            continue;
        }

        let missing_normals = reader.read_normals().is_none();
        let mut vertices: Vec<Vertex> = positions
            .iter()
            .zip(&normals)
            .zip(&uvs)
            .map(|((p, n), uv)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
            })
            .collect();

        if missing_normals {
            compute_flat_normals(&mut vertices, &local_indices[..triangle_len]);
        }

        data.vertices.extend(vertices);
        data.indices
            .extend(local_indices[..triangle_len].iter().map(|i| base + i));
        data.groups.push(PrimitiveGroup {
            start,
            count: triangle_len as u32,
            material: primitive.material().index(),
        });
    }

    if data.groups.is_empty() {
        return Ok(None);
    }

    Ok(Some(data))
}

/// Accumulates face normals into vertices for primitives that ship without any
fn compute_flat_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from_array(vertices[a].position);
        let pb = Vec3::from_array(vertices[b].position);
        let pc = Vec3::from_array(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = normal.normalize_or_zero().to_array();
    }
}

fn read_material(material: &gltf::Material) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();

    MaterialData {
        name: material.name().map(str::to_string),
        base_color: pbr.base_color_factor(),
        texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
    }
}

fn read_texture(index: usize, image: &gltf::image::Data) -> TextureData {
    use gltf::image::Format;

    log::debug!(
        "Loading texture {}: {}x{} ({:?})",
        index,
        image.width,
        image.height,
        image.format
    );

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        other => {
            log::warn!("Unsupported texture format {:?}, using white", other);
            vec![255; TextureData::rgba_len(image.width, image.height)]
        }
    };

    TextureData {
        width: image.width,
        height: image.height,
        data,
    }
}

fn read_camera(camera: &gltf::Camera, placement: Option<CameraPlacement>) -> Camera {
    let projection = match camera.projection() {
        gltf::camera::Projection::Perspective(p) => Projection::Perspective {
            fov_y_degrees: p.yfov().to_degrees(),
            near: p.znear(),
            far: p.zfar(),
        },
        gltf::camera::Projection::Orthographic(o) => Projection::Orthographic {
            xmag: o.xmag(),
            ymag: o.ymag(),
            near: o.znear(),
            far: o.zfar(),
        },
    };

    let (world, node_name) = match placement {
        Some(p) => (p.world, p.node_name),
        None => {
            log::warn!(
                "Camera {} ({:?}) is not referenced by any node, placing at origin",
                camera.index(),
                camera.name()
            );
            (Mat4::IDENTITY, None)
        }
    };

    let aspect = match camera.projection() {
        gltf::camera::Projection::Perspective(p) => p.aspect_ratio().unwrap_or(1.0),
        gltf::camera::Projection::Orthographic(_) => 1.0,
    };

    let mut result = Camera::new(projection, aspect).with_world_transform(world);
    result.name = node_name.or_else(|| camera.name().map(str::to_string));
    result
}
