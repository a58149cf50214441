/// Camera models and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::sequencer::FrameParams;

pub const NEAR_PLANE: f32 = 0.05;
pub const FAR_PLANE: f32 = 10.0;
/// The panorama is projected square; the host stretches it to the viewport.
pub const ASPECT: f32 = 1.0;
pub const LOOK_AT_FOV_DEGREES: f32 = 90.0;
pub const MIN_FOV_DEGREES: f32 = 1.0;
pub const MAX_FOV_DEGREES: f32 = 179.0;

/// How the panorama cube is oriented in front of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraModel {
    /// Shared pitch/yaw orientation; field of view skewed by pointer X.
    #[default]
    OrthographicSkew,
    /// View transform built from a rotating look direction, fixed field of view.
    LookAt,
}

impl CameraModel {
    /// Face rotations are defined in view space for the look-at camera, which flips
    /// their signs.
    pub fn mirrors_faces(self) -> bool {
        matches!(self, CameraModel::LookAt)
    }

    /// Vertical field of view in radians.
    pub fn field_of_view(self, params: &FrameParams) -> f32 {
        match self {
            CameraModel::OrthographicSkew => {
                let min = MIN_FOV_DEGREES.to_radians();
                let max = MAX_FOV_DEGREES.to_radians();
                if params.width <= 0.0 || !params.mouse_x.is_finite() {
                    return std::f32::consts::FRAC_PI_2;
                }
                let fov = (params.mouse_x / params.width) * std::f32::consts::PI;
                fov.clamp(min, max)
            }
            CameraModel::LookAt => LOOK_AT_FOV_DEGREES.to_radians(),
        }
    }

    /// Create the projection matrix for this frame
    pub fn projection_matrix(self, params: &FrameParams) -> Matrix4<f32> {
        Matrix4::new_perspective(ASPECT, self.field_of_view(params), NEAR_PLANE, FAR_PLANE)
    }
}

/// Look direction for an angle in degrees: `(-sin 2a, 0, cos 2a)`.
pub fn look_direction(angle_degrees: f32) -> Vector3<f32> {
    let doubled = 2.0 * angle_degrees.to_radians();
    Vector3::new(-doubled.sin(), 0.0, doubled.cos())
}

/// View matrix of a viewer at the origin looking along `look_direction(angle_degrees)`.
pub fn look_at_view(angle_degrees: f32) -> Matrix4<f32> {
    let eye = Point3::origin();
    let target = eye + look_direction(angle_degrees);
    Matrix4::look_at_rh(&eye, &target, &Vector3::y())
}
