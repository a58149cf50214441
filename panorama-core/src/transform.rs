/// Transform matrices and the owned transform stack used to place panorama faces
use nalgebra::{Matrix4, Vector3};

use crate::error::{PanoramaError, Result};

/// Coordinate axis a rotation is taken about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation of `degrees` about `axis`.
    ///
    /// Degrees are converted to radians here and nowhere else. A zero angle returns the
    /// exact identity.
    pub fn rotation_degrees(axis: Axis, degrees: f32) -> Matrix4<f32> {
        if degrees == 0.0 {
            return Matrix4::identity();
        }
        Matrix4::new_rotation(axis.unit() * degrees.to_radians())
    }

    /// Rotation about the axis formed by the enabled flags, the fixed-function way.
    /// No flags set, or a zero angle, gives the identity.
    pub fn rotation_about_flags(degrees: f32, about_x: bool, about_y: bool, about_z: bool) -> Matrix4<f32> {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };
        let axis = Vector3::new(flag(about_x), flag(about_y), flag(about_z));
        if degrees == 0.0 || axis == Vector3::zeros() {
            return Matrix4::identity();
        }
        Matrix4::new_rotation(axis.normalize() * degrees.to_radians())
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}

/// Stack of composed transforms. The top is the current composed transform.
///
/// An empty stack behaves as if its top were the identity. Every caller is expected to
/// leave the stack at the depth it found it.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    frames: Vec<Matrix4<f32>>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Current composed transform, identity when empty.
    pub fn top(&self) -> Matrix4<f32> {
        self.frames.last().copied().unwrap_or_else(Matrix4::identity)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duplicate the current top.
    pub fn push(&mut self) {
        let top = self.top();
        self.frames.push(top);
    }

    /// Push `top * m`, so `m` acts in the local frame of the current top.
    pub fn push_composed(&mut self, m: &Matrix4<f32>) {
        let composed = self.top() * m;
        self.frames.push(composed);
    }

    pub fn pop(&mut self) -> Result<Matrix4<f32>> {
        self.frames.pop().ok_or(PanoramaError::StackUnderflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_zero_rotation_is_exact_identity() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            assert_eq!(Transform::rotation_degrees(axis, 0.0), Matrix4::identity());
        }
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let m = Transform::rotation_degrees(Axis::Y, 90.0);
        let p = m.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_about_flags() {
        assert_eq!(Transform::rotation_about_flags(45.0, false, false, false), Matrix4::identity());
        let flags = Transform::rotation_about_flags(-20.0, false, false, true);
        let axis = Transform::rotation_degrees(Axis::Z, -20.0);
        assert!((flags - axis).norm() < 1e-6);
    }

    #[test]
    fn test_empty_stack_top_is_identity() {
        let stack = TransformStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.top(), Matrix4::identity());
    }

    #[test]
    fn test_push_duplicates_top() {
        let mut stack = TransformStack::new();
        stack.push_composed(&Transform::translation_matrix(1.0, 2.0, 3.0));
        stack.push();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top(), Transform::translation_matrix(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_push_composed_applies_in_local_frame() {
        let mut stack = TransformStack::new();
        stack.push_composed(&Transform::translation_matrix(0.0, 0.0, 5.0));
        stack.push_composed(&Transform::scale_matrix(2.0, 2.0, 2.0));

        // Scale first, then translate.
        let p = stack.top().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(2.0, 0.0, 5.0)).norm() < 1e-6);
    }

    #[test]
    fn test_pop_restores_previous_top() {
        let mut stack = TransformStack::new();
        stack.push_composed(&Transform::rotation_degrees(Axis::X, 30.0));
        let before = stack.top();
        stack.push_composed(&Transform::rotation_degrees(Axis::Y, 45.0));
        stack.pop().unwrap();
        assert_eq!(stack.top(), before);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.pop(), Err(PanoramaError::StackUnderflow));
    }
}
