use glam::{Mat4, Quat, Vec3};

use crate::core::WindowDimensions;
use crate::types::CameraUniform;

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Where the synthesized camera sits when the asset brings no cameras
pub const FALLBACK_POSITION: Vec3 = Vec3::new(0.0, 2.0, 5.0);

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `far: None` is an infinite far plane
    Perspective {
        fov_y_degrees: f32,
        near: f32,
        far: Option<f32>,
    },
    /// Half extents, as stored in glTF. Aspect is ignored.
    Orthographic {
        xmag: f32,
        ymag: f32,
        near: f32,
        far: f32,
    },
}

/// A camera with its world placement and a cached projection matrix.
///
/// Changing `aspect` or `projection` does not touch the cached matrix until
/// `update_projection` is called.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: Option<String>,
    pub position: Vec3,
    pub rotation: Quat,
    aspect: f32,
    projection: Projection,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(projection: Projection, aspect: f32) -> Self {
        let mut camera = Self {
            name: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            aspect,
            projection,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Projection::Perspective {
                fov_y_degrees,
                near,
                far: Some(far),
            },
            aspect,
        )
    }

    /// The viewer's own camera: 75° fov, 0.1..1000, at the fallback offset
    pub fn fallback(viewport: WindowDimensions) -> Self {
        let mut camera = Self::perspective(
            DEFAULT_FOV_DEGREES,
            viewport.aspect_ratio(),
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        camera.position = FALLBACK_POSITION;
        camera
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Place the camera from a world transform. Scale is discarded.
    pub fn with_world_transform(mut self, world: Mat4) -> Self {
        let (_scale, rotation, translation) = world.to_scale_rotation_translation();
        self.position = translation;
        self.rotation = rotation;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Set aspect from the viewport and rebuild the projection matrix
    pub fn fit_viewport(&mut self, viewport: WindowDimensions) {
        self.set_aspect(viewport.aspect_ratio());
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fov_y_degrees,
                near,
                far: Some(far),
            } => Mat4::perspective_rh(fov_y_degrees.to_radians(), self.aspect, near, far),
            Projection::Perspective {
                fov_y_degrees,
                near,
                far: None,
            } => Mat4::perspective_infinite_rh(fov_y_degrees.to_radians(), self.aspect, near),
            Projection::Orthographic {
                xmag,
                ymag,
                near,
                far,
            } => Mat4::orthographic_rh(-xmag, xmag, -ymag, ymag, near, far),
        };
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Cameras look down their local -Z
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            position: self.position.to_array(),
            _pad: 0.0,
        }
    }
}

/// Ordered cameras plus the index of the one currently drawn through.
///
/// Never empty: it starts with a single camera and adoption refuses an
/// empty list.
#[derive(Debug, Clone)]
pub struct CameraSet {
    cameras: Vec<Camera>,
    active: usize,
}

impl CameraSet {
    pub fn new(default: Camera) -> Self {
        Self {
            cameras: vec![default],
            active: 0,
        }
    }

    /// Replace the whole set, activating index 0.
    /// Returns false and keeps the current set when `cameras` is empty.
    pub fn adopt(&mut self, cameras: Vec<Camera>) -> bool {
        if cameras.is_empty() {
            return false;
        }
        self.cameras = cameras;
        self.active = 0;
        true
    }

    /// Step to the next camera, wrapping. No-op with fewer than two cameras.
    pub fn advance(&mut self) -> bool {
        if self.cameras.len() < 2 {
            return false;
        }
        self.active = (self.active + 1) % self.cameras.len();
        true
    }

    /// Activate `index`; out-of-range indices leave the set untouched
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.cameras.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn active(&self) -> &Camera {
        &self.cameras[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn as_slice(&self) -> &[Camera] {
        &self.cameras
    }
}
