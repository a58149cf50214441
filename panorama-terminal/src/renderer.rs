/// ASCII rasterizer acting as the panorama's draw backend
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point2, Point3, Vector4};
use panorama_core::{DrawBackend, Transform, Vertex};
use std::io::Write;

/// GUI pixels covered by one terminal cell
pub const CELL_WIDTH: f32 = 4.0;
pub const CELL_HEIGHT: f32 = 8.0;

/// Smallest clip-space w kept by near-plane clipping
const NEAR_W: f32 = 1e-3;

/// Checker squares per face edge; odd squares use the shade character
const CHECKER_SQUARES: f32 = 4.0;
const CHECKER_SHADE: char = '.';

/// A face texture in the terminal: one character and a colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub color: Color,
}

impl Glyph {
    pub const fn new(ch: char, color: Color) -> Self {
        Self { ch, color }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    clip: Vector4<f32>,
    uv: Point2<f32>,
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    uv: Point2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fill {
    Checker,
    Solid,
}

/// ASCII renderer that rasterizes submitted quads into a character buffer
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    projection: Matrix4<f32>,
    active_transform: Matrix4<f32>,
    z_layer: u32,
    color_mask: [bool; 4],
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            projection: Matrix4::identity(),
            active_transform: Matrix4::identity(),
            z_layer: 0,
            color_mask: [true; 4],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            projection: self.projection,
            ..Self::new(width, height)
        };
    }

    /// Start a new frame: empty buffers, base layer, full colour mask.
    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
        self.active_transform = Matrix4::identity();
        self.z_layer = 0;
        self.color_mask = [true; 4];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn z_layer(&self) -> u32 {
        self.z_layer
    }

    pub fn active_transform(&self) -> Matrix4<f32> {
        self.active_transform
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Write `text` starting at GUI position (x, y) under the active transform.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            let p = self
                .active_transform
                .transform_point(&Point3::new(x + i as f32 * CELL_WIDTH, y, 0.0));
            let (cx, cy) = ((p.x / CELL_WIDTH).floor(), (p.y / CELL_HEIGHT).floor());
            if cx < 0.0 || cy < 0.0 {
                continue;
            }
            let (cx, cy) = (cx as usize, cy as usize);
            if cx < self.width && cy < self.height {
                let idx = cy * self.width + cx;
                self.char_buffer[idx] = ch;
                self.color_buffer[idx] = color;
            }
        }
    }

    fn draw_panorama_triangle(&mut self, glyph: Glyph, triangle: [Vertex; 3]) {
        let polygon = clip_near(&triangle.map(|vertex| ClipVertex {
            clip: self.projection * vertex.position.to_homogeneous(),
            uv: vertex.uv,
        }));
        if polygon.len() < 3 {
            return; // Entirely behind the viewer
        }

        let screen: Vec<ScreenVertex> = polygon
            .iter()
            .map(|v| ScreenVertex {
                x: (v.clip.x / v.clip.w + 1.0) * 0.5 * self.width as f32,
                y: (1.0 - v.clip.y / v.clip.w) * 0.5 * self.height as f32,
                depth: v.clip.z / v.clip.w,
                uv: v.uv,
            })
            .collect();

        for i in 1..screen.len() - 1 {
            self.rasterize_triangle(&[screen[0], screen[i], screen[i + 1]], glyph, Fill::Checker);
        }
    }

    fn draw_overlay_triangle(&mut self, glyph: Glyph, triangle: [Vertex; 3]) {
        let screen = triangle.map(|vertex| {
            let p = self.active_transform.transform_point(&vertex.position);
            ScreenVertex {
                x: p.x / CELL_WIDTH,
                y: p.y / CELL_HEIGHT,
                depth: 0.0,
                uv: vertex.uv,
            }
        });
        self.rasterize_triangle(&screen, glyph, Fill::Solid);
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenVertex; 3], glyph: Glyph, fill: Fill) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                let character = match fill {
                    Fill::Solid => glyph.ch,
                    Fill::Checker => {
                        let u = w0 * v0.uv.x + w1 * v1.uv.x + w2 * v2.uv.x;
                        let v = w0 * v0.uv.y + w1 * v1.uv.y + w2 * v2.uv.y;
                        let square = (u * CHECKER_SQUARES).floor() as i32 + (v * CHECKER_SQUARES).floor() as i32;
                        if square.rem_euclid(2) == 0 {
                            glyph.ch
                        } else {
                            CHECKER_SHADE
                        }
                    }
                };

                match fill {
                    Fill::Checker => {
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                        if depth >= self.depth_buffer[idx] {
                            continue;
                        }
                        self.depth_buffer[idx] = depth;
                    }
                    // Later layers always land on top
                    Fill::Solid => self.depth_buffer[idx] = f32::NEG_INFINITY,
                }
                self.char_buffer[idx] = character;
                self.color_buffer[idx] = glyph.color;
            }
        }
    }

    /// Write the buffer to the terminal
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl DrawBackend for AsciiRenderer {
    type Texture = Glyph;

    fn reset_active_transform(&mut self) {
        self.active_transform = Matrix4::identity();
    }

    fn draw(&mut self, texture: &Glyph, indices: &[u32; 6], vertices: &[Vertex; 4]) {
        if !self.color_mask[..3].iter().any(|&channel| channel) {
            return;
        }
        for tri in indices.chunks_exact(3) {
            let triangle = [
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ];
            if self.z_layer == 0 {
                self.draw_panorama_triangle(*texture, triangle);
            } else {
                self.draw_overlay_triangle(*texture, triangle);
            }
        }
    }

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.color_mask = [r, g, b, a];
    }

    fn increment_z_layer(&mut self) {
        self.z_layer += 1;
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.active_transform *= Transform::translation_matrix(x, y, z);
    }

    fn rotate(&mut self, angle_degrees: f32, about_x: bool, about_y: bool, about_z: bool) {
        self.active_transform *= Transform::rotation_about_flags(angle_degrees, about_x, about_y, about_z);
    }

    fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.active_transform *= Transform::scale_matrix(sx, sy, sz);
    }
}

/// Sutherland-Hodgman against the w = NEAR_W plane in clip space
fn clip_near(input: &[ClipVertex]) -> Vec<ClipVertex> {
    let mut output = Vec::with_capacity(input.len() + 1);
    for (i, &a) in input.iter().enumerate() {
        let b = input[(i + 1) % input.len()];
        let a_inside = a.clip.w >= NEAR_W;
        let b_inside = b.clip.w >= NEAR_W;
        if a_inside {
            output.push(a);
        }
        if a_inside != b_inside {
            let t = (NEAR_W - a.clip.w) / (b.clip.w - a.clip.w);
            output.push(ClipVertex {
                clip: a.clip.lerp(&b.clip, t),
                uv: a.uv + (b.uv - a.uv) * t,
            });
        }
    }
    output
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
