//! Panorama configuration: face textures, overlay textures, animation rates, cube size.

use crate::error::{PanoramaError, Result};
use crate::geometry::FACE_COUNT;
use crate::projection::CameraModel;

/// Pitch sine amplitude in degrees.
pub const PITCH_AMPLITUDE_DEGREES: f32 = 25.0;
/// Constant pitch added to the sine wave, in degrees.
pub const PITCH_OFFSET_DEGREES: f32 = 20.0;
/// Time units divisor inside the pitch sine.
pub const PITCH_PERIOD: f32 = 400.0;
/// Base yaw rate in degrees per time unit.
pub const YAW_RATE_DEGREES: f32 = 0.1;
/// Extra factor the orthographic-skew panorama applies to the yaw rate.
/// Kept as observed; the look-at panorama runs without it.
pub const ORTHOGRAPHIC_YAW_MULTIPLIER: f32 = 100.0;
pub const LOOK_AT_YAW_MULTIPLIER: f32 = 1.0;

pub const DEFAULT_CUBE_SIZE: f32 = 2.0;

/// Animation parameters. All angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub pitch_amplitude: f32,
    pub pitch_offset: f32,
    pub pitch_period: f32,
    pub yaw_rate: f32,
    pub yaw_rate_multiplier: f32,
}

impl Animation {
    /// Defaults for the given camera model; only the yaw multiplier differs.
    pub fn for_camera(camera: CameraModel) -> Self {
        let yaw_rate_multiplier = match camera {
            CameraModel::OrthographicSkew => ORTHOGRAPHIC_YAW_MULTIPLIER,
            CameraModel::LookAt => LOOK_AT_YAW_MULTIPLIER,
        };
        Self {
            pitch_amplitude: PITCH_AMPLITUDE_DEGREES,
            pitch_offset: PITCH_OFFSET_DEGREES,
            pitch_period: PITCH_PERIOD,
            yaw_rate: YAW_RATE_DEGREES,
            yaw_rate_multiplier,
        }
    }

    /// Pitch about X at time `t`.
    pub fn pitch_degrees(&self, t: f32) -> f32 {
        (t / self.pitch_period).sin() * self.pitch_amplitude + self.pitch_offset
    }

    /// Yaw about Y at time `t`. The cube turns clockwise seen from above.
    pub fn yaw_degrees(&self, t: f32) -> f32 {
        -(t * self.yaw_rate * self.yaw_rate_multiplier)
    }

    /// Look-direction angle for the look-at camera, in degrees.
    pub fn look_degrees(&self, t: f32) -> f32 {
        t * self.yaw_rate * self.yaw_rate_multiplier
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::for_camera(CameraModel::default())
    }
}

/// Exactly six face textures, indexed by face.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSet<T> {
    faces: [T; FACE_COUNT],
}

impl<T> TextureSet<T> {
    pub fn new(handles: Vec<T>) -> Result<Self> {
        let count = handles.len();
        let faces: [T; FACE_COUNT] = handles.try_into().map_err(|_| {
            PanoramaError::configuration(format!(
                "expected {} face textures, got {}",
                FACE_COUNT, count
            ))
        })?;
        Ok(Self { faces })
    }

    pub fn get(&self, face: usize) -> Option<&T> {
        self.faces.get(face)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.faces.iter()
    }
}

/// Textures for the 2D overlays drawn above the panorama.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayTextures<T> {
    /// Title art sheet; both halves of the title come from it.
    pub title: T,
    /// Edition logo drawn under the title.
    pub edition: T,
}

/// Full panorama configuration.
#[derive(Debug, Clone)]
pub struct PanoramaConfig<T> {
    pub faces: TextureSet<T>,
    pub overlays: OverlayTextures<T>,
    pub camera: CameraModel,
    pub animation: Animation,
    /// Half-extent of the cube in world units.
    pub cube_size: f32,
}

impl<T> PanoramaConfig<T> {
    pub fn new(faces: TextureSet<T>, overlays: OverlayTextures<T>, camera: CameraModel) -> Self {
        Self {
            faces,
            overlays,
            camera,
            animation: Animation::for_camera(camera),
            cube_size: DEFAULT_CUBE_SIZE,
        }
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_cube_size(mut self, cube_size: f32) -> Self {
        self.cube_size = cube_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cube_size.is_finite() || self.cube_size <= 0.0 {
            return Err(PanoramaError::configuration(format!(
                "cube_size must be finite and > 0, got {}",
                self.cube_size
            )));
        }
        let animation = &self.animation;
        if !animation.pitch_period.is_finite() || animation.pitch_period == 0.0 {
            return Err(PanoramaError::configuration(format!(
                "pitch_period must be finite and non-zero, got {}",
                animation.pitch_period
            )));
        }
        Ok(())
    }
}
