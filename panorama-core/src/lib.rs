/// Panorama Core Library - Shared geometry and frame sequencing for the menu panorama
///
/// This library provides the stateless core of the rotating six-faced background cube:
/// the transform stack, per-face geometry generation, camera models, and the per-frame
/// sequencer that feeds an immediate-style draw backend.

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod sequencer;
pub mod transform;

// Re-export commonly used types
pub use backend::{DrawBackend, MenuHost};
pub use config::{Animation, OverlayTextures, PanoramaConfig, TextureSet};
pub use error::{PanoramaError, Result};
pub use geometry::{Face, PanoramaGeometryBuilder, Quad, Vertex, FACE_COUNT, QUAD_INDICES};
pub use projection::CameraModel;
pub use sequencer::{Diagnostics, FrameParams, FrameReport, FrameSequencer, PanoramaState};
pub use transform::{Axis, Transform, TransformStack};
