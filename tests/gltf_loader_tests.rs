mod common;

use common::{camera_node, glb, perspective_camera, triangle_bin, triangle_document};
use glam::Vec3;
use glb_viewer::loaders::load_asset_from_slice;
use glb_viewer::Projection;

fn load(doc: &serde_json::Value) -> glb_viewer::loaders::LoadedAsset {
    load_asset_from_slice(&glb(doc, &triangle_bin())).expect("asset should load")
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_triangle_mesh_is_loaded() {
    let asset = load(&triangle_document(vec![], vec![]));

    assert_eq!(asset.mesh_count(), 1);
    assert_eq!(asset.root.name.as_deref(), Some("Office"));

    let desk = &asset.root.children[0];
    assert_eq!(desk.name.as_deref(), Some("Desk"));

    let mesh = desk.mesh.as_ref().unwrap();
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.groups.len(), 1);
    assert_eq!(mesh.groups[0].material, Some(0));
}

#[test]
fn test_missing_normals_are_generated() {
    let asset = load(&triangle_document(vec![], vec![]));
    let mesh = asset.root.children[0].mesh.as_ref().unwrap();

    for vertex in &mesh.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
    }
}

#[test]
fn test_node_transform_is_baked_into_vertices() {
    let mut doc = triangle_document(vec![], vec![]);
    doc["nodes"][0]["translation"] = serde_json::json!([0.0, 0.0, -5.0]);

    let asset = load(&doc);
    let mesh = asset.root.children[0].mesh.as_ref().unwrap();

    assert_eq!(mesh.vertices[1].position, [1.0, 0.0, -5.0]);
}

#[test]
fn test_non_triangle_primitives_are_skipped() {
    let mut doc = triangle_document(vec![], vec![]);
    doc["meshes"][0]["primitives"][0]["mode"] = serde_json::json!(1);

    let asset = load(&doc);

    assert_eq!(asset.mesh_count(), 0);
    assert!(asset.root.children[0].mesh.is_none());
}

#[test]
fn test_material_base_color() {
    let asset = load(&triangle_document(vec![], vec![]));

    assert_eq!(asset.materials.len(), 1);
    assert_eq!(asset.materials[0].name.as_deref(), Some("Oak"));
    assert_eq!(asset.materials[0].base_color, [0.5, 0.25, 0.125, 1.0]);
    assert_eq!(asset.materials[0].texture, None);
    assert!(asset.textures.is_empty());
}

// ============================================================================
// Cameras
// ============================================================================

#[test]
fn test_no_cameras() {
    let asset = load(&triangle_document(vec![], vec![]));
    assert!(asset.cameras.is_empty());
}

#[test]
fn test_cameras_follow_camera_index_order() {
    // Node order is the reverse of camera order
    let doc = triangle_document(
        vec![perspective_camera(0.8), perspective_camera(1.2)],
        vec![
            camera_node("Overhead", 1, [0.0, 10.0, 0.0]),
            camera_node("Door", 0, [1.0, 2.0, 3.0]),
        ],
    );

    let asset = load(&doc);

    assert_eq!(asset.cameras.len(), 2);
    assert_eq!(asset.cameras[0].name.as_deref(), Some("Door"));
    assert_eq!(asset.cameras[0].position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(asset.cameras[1].name.as_deref(), Some("Overhead"));
    assert_eq!(asset.cameras[1].position, Vec3::new(0.0, 10.0, 0.0));
}

#[test]
fn test_perspective_parameters() {
    let doc = triangle_document(
        vec![perspective_camera(0.8)],
        vec![camera_node("Door", 0, [0.0, 0.0, 0.0])],
    );

    let camera = &load(&doc).cameras[0];

    assert!((camera.aspect() - 1.5).abs() < 1e-6);
    match camera.projection() {
        Projection::Perspective {
            fov_y_degrees,
            near,
            far,
        } => {
            assert!((fov_y_degrees - 0.8f32.to_degrees()).abs() < 1e-4);
            assert_eq!(near, 0.1);
            assert_eq!(far, Some(100.0));
        }
        other => panic!("expected perspective, got {:?}", other),
    }
}

#[test]
fn test_orthographic_camera() {
    let ortho = serde_json::json!({
        "type": "orthographic",
        "orthographic": { "xmag": 2.0, "ymag": 1.5, "znear": 0.5, "zfar": 50.0 }
    });
    let doc = triangle_document(vec![ortho], vec![camera_node("Plan", 0, [0.0, 0.0, 0.0])]);

    let camera = &load(&doc).cameras[0];

    assert_eq!(
        camera.projection(),
        Projection::Orthographic {
            xmag: 2.0,
            ymag: 1.5,
            near: 0.5,
            far: 50.0
        }
    );
}

#[test]
fn test_camera_without_node_sits_at_origin() {
    let mut camera = perspective_camera(0.8);
    camera["name"] = serde_json::json!("Spare");

    let asset = load(&triangle_document(vec![camera], vec![]));

    assert_eq!(asset.cameras.len(), 1);
    assert_eq!(asset.cameras[0].position, Vec3::ZERO);
    assert_eq!(asset.cameras[0].name.as_deref(), Some("Spare"));
}

#[test]
fn test_camera_under_transformed_parent() {
    let mut doc = triangle_document(
        vec![perspective_camera(0.8)],
        vec![serde_json::json!({ "name": "Rig", "translation": [10.0, 0.0, 0.0], "children": [2] })],
    );
    doc["nodes"]
        .as_array_mut()
        .unwrap()
        .push(camera_node("Lens", 0, [0.0, 1.0, 0.0]));
    // Only the rig is a scene root
    doc["scenes"][0]["nodes"] = serde_json::json!([0, 1]);

    let asset = load(&doc);

    assert_eq!(asset.cameras[0].name.as_deref(), Some("Lens"));
    assert!((asset.cameras[0].position - Vec3::new(10.0, 1.0, 0.0)).length() < 1e-5);
}
