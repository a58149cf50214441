//! Trait for immediate-style draw backends. The frame sequencer only ever appends calls
//! to a backend and never reads state back from it.

use crate::geometry::Vertex;
use crate::sequencer::FrameParams;

/// Immediate-style draw backend owned by the host.
pub trait DrawBackend {
    /// Opaque texture handle from the host's resource system.
    type Texture;

    /// Return the active transform to identity.
    fn reset_active_transform(&mut self);

    fn draw(&mut self, texture: &Self::Texture, indices: &[u32; 6], vertices: &[Vertex; 4]);

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);

    /// Bump the logical layer so later draws land above earlier ones.
    fn increment_z_layer(&mut self);

    fn translate(&mut self, x: f32, y: f32, z: f32);

    fn rotate(&mut self, angle_degrees: f32, about_x: bool, about_y: bool, about_z: bool);

    fn scale(&mut self, sx: f32, sy: f32, sz: f32);
}

/// Host side of the menu: text and anything else drawn after the panorama overlays.
pub trait MenuHost<B: DrawBackend> {
    /// Width of the current splash text in GUI pixels.
    fn splash_text_width(&self) -> f32;

    /// Draw the splash text at the origin of the backend's active transform.
    fn draw_splash_text(&mut self, backend: &mut B);

    /// Branding, copyright line, buttons.
    fn draw_remaining_ui(&mut self, backend: &mut B, params: &FrameParams);
}
