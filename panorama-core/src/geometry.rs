/// Panorama geometry: vertices, quads, the per-face rotation table and the builder
use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::config::Animation;
use crate::error::{PanoramaError, Result};
use crate::projection::{look_at_view, CameraModel};
use crate::transform::{Axis, Transform, TransformStack};

pub const FACE_COUNT: usize = 6;

/// Two triangles covering a quad, wound the same way as seen from inside the cube.
pub const QUAD_INDICES: [u32; 6] = [2, 1, 0, 3, 1, 2];

/// UV paired with each corner, in corner order.
pub const QUAD_UVS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];

pub const OPAQUE_WHITE: [u8; 4] = [255, 255, 255, 255];

/// A textured vertex as handed to the draw backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub uv: Point2<f32>,
    pub color: [u8; 4],
}

impl Vertex {
    pub fn new(position: Point3<f32>, u: f32, v: f32) -> Self {
        Self {
            position,
            uv: Point2::new(u, v),
            color: OPAQUE_WHITE,
        }
    }
}

/// Four vertices drawn with `QUAD_INDICES`
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub vertices: [Vertex; 4],
}

impl Quad {
    /// Pair four corners with the standard UVs.
    pub fn from_corners(corners: [Point3<f32>; 4]) -> Self {
        let vertices = std::array::from_fn(|i| {
            let (u, v) = QUAD_UVS[i];
            Vertex::new(corners[i], u, v)
        });
        Self { vertices }
    }

    /// Screen-space rectangle at z = 0 sampling the sub-rectangle `uv` = (u, v, width, height).
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32, uv: [f32; 4]) -> Self {
        let [u, v, uw, vh] = uv;
        Self {
            vertices: [
                Vertex::new(Point3::new(x, y, 0.0), u, v),
                Vertex::new(Point3::new(x + width, y, 0.0), u + uw, v),
                Vertex::new(Point3::new(x, y + height, 0.0), u, v + vh),
                Vertex::new(Point3::new(x + width, y + height, 0.0), u + uw, v + vh),
            ],
        }
    }

    pub fn indices(&self) -> &'static [u32; 6] {
        &QUAD_INDICES
    }

    pub fn triangles(&self) -> [[Vertex; 3]; 2] {
        let idx = |i: usize| self.vertices[QUAD_INDICES[i] as usize];
        [[idx(0), idx(1), idx(2)], [idx(3), idx(4), idx(5)]]
    }

    /// Unnormalized normal of each triangle (right-hand rule over index order)
    pub fn triangle_normals(&self) -> [Vector3<f32>; 2] {
        self.triangles().map(|[a, b, c]| {
            let edge1 = b.position - a.position;
            let edge2 = c.position - a.position;
            edge1.cross(&edge2)
        })
    }

    pub fn center(&self) -> Point3<f32> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        Point3::from(sum / 4.0)
    }
}

/// Rotation that carries the front face onto another face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRotation {
    pub axis: Axis,
    pub degrees: f32,
}

/// Face k -> rotation, world-space signs.
pub const FACE_ROTATIONS: [FaceRotation; FACE_COUNT] = [
    FaceRotation { axis: Axis::Y, degrees: 0.0 },
    FaceRotation { axis: Axis::Y, degrees: 90.0 },
    FaceRotation { axis: Axis::Y, degrees: 180.0 },
    FaceRotation { axis: Axis::Y, degrees: -90.0 },
    FaceRotation { axis: Axis::X, degrees: 90.0 },
    FaceRotation { axis: Axis::X, degrees: -90.0 },
];

/// One of the six cube faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face(usize);

impl Face {
    pub fn new(index: usize) -> Result<Self> {
        if index < FACE_COUNT {
            Ok(Self(index))
        } else {
            Err(PanoramaError::InvalidFace(index))
        }
    }

    pub fn all() -> impl Iterator<Item = Face> {
        (0..FACE_COUNT).map(Face)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn rotation(self, mirrored: bool) -> FaceRotation {
        let rotation = FACE_ROTATIONS[self.0];
        if mirrored {
            FaceRotation {
                degrees: -rotation.degrees,
                ..rotation
            }
        } else {
            rotation
        }
    }

    pub fn rotation_matrix(self, mirrored: bool) -> Matrix4<f32> {
        let rotation = self.rotation(mirrored);
        Transform::rotation_degrees(rotation.axis, rotation.degrees)
    }
}

impl TryFrom<usize> for Face {
    type Error = PanoramaError;

    fn try_from(index: usize) -> Result<Self> {
        Face::new(index)
    }
}

/// Canonical front face: the square of half-extent `s` in the plane z = +s.
pub fn front_corners(s: f32) -> [Point3<f32>; 4] {
    [
        Point3::new(-s, -s, s),
        Point3::new(s, -s, s),
        Point3::new(-s, s, s),
        Point3::new(s, s, s),
    ]
}

/// Builds one textured quad per face from the current transform stack
#[derive(Debug, Clone)]
pub struct PanoramaGeometryBuilder {
    camera: CameraModel,
    animation: Animation,
    cube_size: f32,
}

impl PanoramaGeometryBuilder {
    pub fn new(camera: CameraModel, animation: Animation, cube_size: f32) -> Self {
        Self {
            camera,
            animation,
            cube_size,
        }
    }

    pub fn camera(&self) -> CameraModel {
        self.camera
    }

    /// Whole-cube orientation at `time` (timer plus partial ticks).
    pub fn orientation(&self, time: f32) -> Matrix4<f32> {
        match self.camera {
            CameraModel::OrthographicSkew => {
                let pitch = Transform::rotation_degrees(Axis::X, self.animation.pitch_degrees(time));
                let yaw = Transform::rotation_degrees(Axis::Y, self.animation.yaw_degrees(time));
                pitch * yaw
            }
            CameraModel::LookAt => look_at_view(self.animation.look_degrees(time)),
        }
    }

    /// Push the frame orientation. Pair with `end_frame`.
    pub fn begin_frame(&self, stack: &mut TransformStack, time: f32) {
        stack.push_composed(&self.orientation(time));
    }

    pub fn end_frame(&self, stack: &mut TransformStack) -> Result<()> {
        stack.pop().map(|_| ())
    }

    /// Quad for face `index` under the current stack top. Leaves the stack depth unchanged.
    pub fn build_face(&self, stack: &mut TransformStack, index: usize) -> Result<Quad> {
        let face = Face::new(index)?;
        stack.push_composed(&face.rotation_matrix(self.camera.mirrors_faces()));
        let top = stack.top();
        let corners = front_corners(self.cube_size).map(|corner| top.transform_point(&corner));
        stack.pop()?;
        Ok(Quad::from_corners(corners))
    }

    /// All six faces for one frame, orientation included.
    pub fn build_frame(&self, stack: &mut TransformStack, time: f32) -> Result<Vec<Quad>> {
        self.begin_frame(stack, time);
        let quads = Face::all()
            .map(|face| self.build_face(stack, face.index()))
            .collect::<Result<Vec<_>>>();
        self.end_frame(stack)?;
        quads
    }
}
