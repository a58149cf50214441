/// Per-frame orchestration: timer, panorama pass, overlay pass
use nalgebra::Matrix4;

use crate::backend::{DrawBackend, MenuHost};
use crate::config::{OverlayTextures, PanoramaConfig, TextureSet};
use crate::error::{PanoramaError, Result};
use crate::geometry::{PanoramaGeometryBuilder, Quad, FACE_COUNT};
use crate::projection::CameraModel;
use crate::transform::TransformStack;

/// Title art starts this many GUI pixels left of the viewport center.
const TITLE_OFFSET_X: f32 = 137.0;
const TITLE_Y: f32 = 30.0;
const TITLE_HALF_WIDTH: f32 = 155.0;
const TITLE_HEIGHT: f32 = 44.0;
const TITLE_UV_LEFT: [f32; 4] = [0.0, 0.0, 0.605_468_75, 0.171_875];
const TITLE_UV_RIGHT: [f32; 4] = [0.0, 45.0 / 256.0, 0.605_468_75, 0.171_875];

const EDITION_OFFSET_X: f32 = 88.0;
const EDITION_Y: f32 = 67.0;
const EDITION_WIDTH: f32 = 98.0;
const EDITION_HEIGHT: f32 = 14.0;
const EDITION_UV: [f32; 4] = [0.0, 0.0, 98.0 / 128.0, 14.0 / 16.0];

const SPLASH_OFFSET_X: f32 = 90.0;
const SPLASH_Y: f32 = 70.0;
const SPLASH_TILT_DEGREES: f32 = -20.0;

/// Per-call input from the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameParams {
    /// Pointer position in GUI pixels.
    pub mouse_x: f32,
    pub mouse_y: f32,
    /// Sub-tick interpolation factor, nominally in [0, 1).
    pub partial_ticks: f32,
    /// Viewport size in GUI pixels.
    pub width: f32,
    pub height: f32,
    /// Host wall clock in milliseconds, drives the splash pulse.
    pub system_time_ms: u64,
}

/// Accumulated panorama timer, one per menu screen
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanoramaState {
    timer: f32,
}

impl PanoramaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Add `partial_ticks` to the timer. Negative or non-finite values are rejected so
    /// the timer never decreases.
    pub fn advance(&mut self, partial_ticks: f32) -> bool {
        if partial_ticks.is_finite() && partial_ticks >= 0.0 {
            self.timer += partial_ticks;
            true
        } else {
            false
        }
    }
}

/// Running failure counters across frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub failed_faces: u64,
    pub aborted_passes: u64,
}

/// What happened in one frame's panorama pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub faces_drawn: usize,
    pub faces_failed: usize,
    /// The pass stopped early on a stack underflow.
    pub aborted: bool,
}

/// Splash text scale: a 1 Hz pulse, fitted to the text width.
pub fn splash_scale(system_time_ms: u64, text_width: f32) -> f32 {
    let phase = (system_time_ms % 1000) as f32 / 1000.0 * std::f32::consts::TAU;
    let pulse = 1.8 - (phase.sin() * 0.1).abs();
    pulse * 100.0 / (text_width.max(0.0) + 32.0)
}

/// Drives the panorama and its overlays, one call per rendered frame
pub struct FrameSequencer<T> {
    faces: TextureSet<T>,
    overlays: OverlayTextures<T>,
    builder: PanoramaGeometryBuilder,
    stack: TransformStack,
    state: PanoramaState,
    diagnostics: Diagnostics,
}

impl<T> FrameSequencer<T> {
    pub fn new(config: PanoramaConfig<T>) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Panorama sequencer ready: camera {:?}, cube size {}, yaw multiplier {}",
            config.camera,
            config.cube_size,
            config.animation.yaw_rate_multiplier
        );
        Ok(Self {
            faces: config.faces,
            overlays: config.overlays,
            builder: PanoramaGeometryBuilder::new(config.camera, config.animation, config.cube_size),
            stack: TransformStack::new(),
            state: PanoramaState::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    pub fn state(&self) -> &PanoramaState {
        &self.state
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn camera(&self) -> CameraModel {
        self.builder.camera()
    }

    /// Projection the backend should apply to panorama vertices this frame.
    pub fn projection(&self, params: &FrameParams) -> Matrix4<f32> {
        self.builder.camera().projection_matrix(params)
    }

    /// Render one frame: advance the timer, draw six faces, then the overlays.
    pub fn render_frame<B, H>(&mut self, backend: &mut B, host: &mut H, params: &FrameParams) -> FrameReport
    where
        B: DrawBackend<Texture = T>,
        H: MenuHost<B>,
    {
        let partial_ticks = if self.state.advance(params.partial_ticks) {
            params.partial_ticks
        } else {
            log::warn!("Ignoring invalid partial ticks {}", params.partial_ticks);
            0.0
        };
        let time = self.state.timer + partial_ticks;

        let report = self.draw_panorama(backend, 0..FACE_COUNT, time);
        self.draw_overlays(backend, params);
        self.draw_splash(backend, host, params);
        host.draw_remaining_ui(backend, params);

        log::debug!(
            "Panorama frame at t={:.3}: {} faces drawn, {} failed{}",
            time,
            report.faces_drawn,
            report.faces_failed,
            if report.aborted { ", pass aborted" } else { "" }
        );
        report
    }

    fn draw_panorama<B>(&mut self, backend: &mut B, faces: impl IntoIterator<Item = usize>, time: f32) -> FrameReport
    where
        B: DrawBackend<Texture = T>,
    {
        let mut report = FrameReport::default();
        self.builder.begin_frame(&mut self.stack, time);

        for index in faces {
            let built = self.builder.build_face(&mut self.stack, index).and_then(|quad| {
                self.faces
                    .get(index)
                    .map(|texture| (texture, quad))
                    .ok_or(PanoramaError::InvalidFace(index))
            });
            match built {
                Ok((texture, quad)) => {
                    backend.reset_active_transform();
                    backend.draw(texture, quad.indices(), &quad.vertices);
                    report.faces_drawn += 1;
                }
                Err(PanoramaError::StackUnderflow) => {
                    log::error!("Transform stack underflow on face {}, skipping rest of panorama", index);
                    report.aborted = true;
                    break;
                }
                Err(err) => {
                    log::error!("Failed to build panorama face {}: {}", index, err);
                    self.diagnostics.failed_faces += 1;
                    report.faces_failed += 1;
                }
            }
            // Keep alpha untouched for everything drawn over the panorama.
            backend.set_color_mask(true, true, true, false);
        }

        if report.aborted {
            self.abort_pass(&mut report);
        } else {
            self.end_panorama(&mut report);
        }
        report
    }

    fn end_panorama(&mut self, report: &mut FrameReport) {
        if let Err(err) = self.builder.end_frame(&mut self.stack) {
            log::error!("Failed to close panorama pass: {}", err);
            self.abort_pass(report);
        }
    }

    fn abort_pass(&mut self, report: &mut FrameReport) {
        report.aborted = true;
        self.diagnostics.aborted_passes += 1;
        // Stack contents are unknown after an underflow; start the next frame clean.
        self.stack = TransformStack::new();
    }

    fn draw_overlays<B>(&self, backend: &mut B, params: &FrameParams)
    where
        B: DrawBackend<Texture = T>,
    {
        let title_x = params.width / 2.0 - TITLE_OFFSET_X;

        backend.increment_z_layer();
        let title = &self.overlays.title;
        draw_quad(backend, title, &Quad::rectangle(title_x, TITLE_Y, TITLE_HALF_WIDTH, TITLE_HEIGHT, TITLE_UV_LEFT));
        draw_quad(
            backend,
            title,
            &Quad::rectangle(title_x + TITLE_HALF_WIDTH, TITLE_Y, TITLE_HALF_WIDTH, TITLE_HEIGHT, TITLE_UV_RIGHT),
        );

        backend.increment_z_layer();
        draw_quad(
            backend,
            &self.overlays.edition,
            &Quad::rectangle(title_x + EDITION_OFFSET_X, EDITION_Y, EDITION_WIDTH, EDITION_HEIGHT, EDITION_UV),
        );
    }

    fn draw_splash<B, H>(&self, backend: &mut B, host: &mut H, params: &FrameParams)
    where
        B: DrawBackend<Texture = T>,
        H: MenuHost<B>,
    {
        let scale = splash_scale(params.system_time_ms, host.splash_text_width());
        backend.translate(params.width / 2.0 + SPLASH_OFFSET_X, SPLASH_Y, 0.0);
        backend.rotate(SPLASH_TILT_DEGREES, false, false, true);
        backend.scale(scale, scale, 1.0);
        host.draw_splash_text(backend);
        backend.reset_active_transform();
    }
}

fn draw_quad<B: DrawBackend>(backend: &mut B, texture: &B::Texture, quad: &Quad) {
    backend.draw(texture, quad.indices(), &quad.vertices);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Animation;
    use crate::geometry::Vertex;
    use crate::transform::Transform;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reset,
        Draw(u32),
        ColorMask([bool; 4]),
        ZLayer,
        Translate,
        Rotate,
        Scale,
        Splash,
        RemainingUi,
    }

    const TITLE: u32 = 100;
    const EDITION: u32 = 101;

    struct RecordingBackend {
        calls: Vec<Call>,
        draws: Vec<(u32, [Vertex; 4])>,
        active: Matrix4<f32>,
        z_layer: u32,
        splash_transform: Option<Matrix4<f32>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                draws: Vec::new(),
                active: Matrix4::identity(),
                z_layer: 0,
                splash_transform: None,
            }
        }
    }

    impl DrawBackend for RecordingBackend {
        type Texture = u32;

        fn reset_active_transform(&mut self) {
            self.active = Matrix4::identity();
            self.calls.push(Call::Reset);
        }

        fn draw(&mut self, texture: &u32, indices: &[u32; 6], vertices: &[Vertex; 4]) {
            assert_eq!(indices, &[2, 1, 0, 3, 1, 2]);
            self.calls.push(Call::Draw(*texture));
            self.draws.push((*texture, *vertices));
        }

        fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
            self.calls.push(Call::ColorMask([r, g, b, a]));
        }

        fn increment_z_layer(&mut self) {
            self.z_layer += 1;
            self.calls.push(Call::ZLayer);
        }

        fn translate(&mut self, x: f32, y: f32, z: f32) {
            self.active *= Transform::translation_matrix(x, y, z);
            self.calls.push(Call::Translate);
        }

        fn rotate(&mut self, angle_degrees: f32, about_x: bool, about_y: bool, about_z: bool) {
            self.active *= Transform::rotation_about_flags(angle_degrees, about_x, about_y, about_z);
            self.calls.push(Call::Rotate);
        }

        fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
            self.active *= Transform::scale_matrix(sx, sy, sz);
            self.calls.push(Call::Scale);
        }
    }

    struct RecordingHost {
        splash_width: f32,
    }

    impl MenuHost<RecordingBackend> for RecordingHost {
        fn splash_text_width(&self) -> f32 {
            self.splash_width
        }

        fn draw_splash_text(&mut self, backend: &mut RecordingBackend) {
            backend.splash_transform = Some(backend.active);
            backend.calls.push(Call::Splash);
        }

        fn draw_remaining_ui(&mut self, backend: &mut RecordingBackend, _params: &FrameParams) {
            backend.calls.push(Call::RemainingUi);
        }
    }

    fn config(camera: CameraModel) -> PanoramaConfig<u32> {
        let faces = TextureSet::new(vec![0, 1, 2, 3, 4, 5]).unwrap();
        let overlays = OverlayTextures {
            title: TITLE,
            edition: EDITION,
        };
        PanoramaConfig::new(faces, overlays, camera)
    }

    fn params(partial_ticks: f32) -> FrameParams {
        FrameParams {
            mouse_x: 200.0,
            mouse_y: 100.0,
            partial_ticks,
            width: 854.0,
            height: 480.0,
            system_time_ms: 250,
        }
    }

    fn render(sequencer: &mut FrameSequencer<u32>, partial_ticks: f32) -> (RecordingBackend, FrameReport) {
        let mut backend = RecordingBackend::new();
        let mut host = RecordingHost { splash_width: 68.0 };
        let report = sequencer.render_frame(&mut backend, &mut host, &params(partial_ticks));
        (backend, report)
    }

    #[test]
    fn test_rejects_bad_config() {
        let result = FrameSequencer::new(config(CameraModel::OrthographicSkew).with_cube_size(-1.0));
        assert!(matches!(result, Err(PanoramaError::Configuration { .. })));
    }

    #[test]
    fn test_frame_call_order() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let (backend, report) = render(&mut sequencer, 0.5);

        let mut expected = Vec::new();
        for face in 0..6 {
            expected.push(Call::Reset);
            expected.push(Call::Draw(face));
            expected.push(Call::ColorMask([true, true, true, false]));
        }
        expected.extend([
            Call::ZLayer,
            Call::Draw(TITLE),
            Call::Draw(TITLE),
            Call::ZLayer,
            Call::Draw(EDITION),
            Call::Translate,
            Call::Rotate,
            Call::Scale,
            Call::Splash,
            Call::Reset,
            Call::RemainingUi,
        ]);
        assert_eq!(backend.calls, expected);
        assert_eq!(backend.z_layer, 2);
        assert_eq!(
            report,
            FrameReport {
                faces_drawn: 6,
                faces_failed: 0,
                aborted: false
            }
        );
    }

    #[test]
    fn test_overlay_placement() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::LookAt)).unwrap();
        let (backend, _) = render(&mut sequencer, 0.0);

        let title_x = 854.0 / 2.0 - 137.0;
        let (texture, left) = &backend.draws[6];
        assert_eq!(*texture, TITLE);
        assert_eq!(left[0].position.x, title_x);
        assert_eq!(left[0].position.y, 30.0);
        let (_, right) = &backend.draws[7];
        assert_eq!(right[0].position.x, title_x + 155.0);
        assert!((right[0].uv.y - 45.0 / 256.0).abs() < 1e-6);
        let (texture, edition) = &backend.draws[8];
        assert_eq!(*texture, EDITION);
        assert_eq!(edition[3].position.x, title_x + 88.0 + 98.0);
    }

    #[test]
    fn test_splash_transform_and_reset() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let (backend, _) = render(&mut sequencer, 0.25);

        let scale = splash_scale(250, 68.0);
        let expected = Transform::translation_matrix(854.0 / 2.0 + 90.0, 70.0, 0.0)
            * Transform::rotation_about_flags(-20.0, false, false, true)
            * Transform::scale_matrix(scale, scale, 1.0);
        let splash = backend.splash_transform.unwrap();
        assert!((splash - expected).norm() < 1e-4);
        assert_eq!(backend.active, Matrix4::identity());
    }

    #[test]
    fn test_splash_scale_pulse() {
        // Quarter second is the peak of the sine, pulse at its smallest.
        assert!((splash_scale(250, 68.0) - 1.7).abs() < 1e-5);
        assert!((splash_scale(1000, 68.0) - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut backend = RecordingBackend::new();
        backend.translate(3.0, 4.0, 5.0);
        backend.rotate(33.0, true, false, true);
        backend.scale(2.0, 2.0, 2.0);
        backend.reset_active_transform();
        assert_eq!(backend.active, Matrix4::identity());
        backend.reset_active_transform();
        assert_eq!(backend.active, Matrix4::identity());
    }

    #[test]
    fn test_stack_balanced_across_frames() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::LookAt)).unwrap();
        for _ in 0..5 {
            render(&mut sequencer, 0.7);
            assert_eq!(sequencer.stack.depth(), 0);
        }
        assert_eq!(sequencer.diagnostics(), Diagnostics::default());
    }

    #[test]
    fn test_timer_accumulates_exactly() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        for _ in 0..100 {
            render(&mut sequencer, 1.0);
        }
        assert!((sequencer.state().timer() - 100.0).abs() <= 1e-4);
    }

    #[test]
    fn test_timer_is_monotonic() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let mut last = sequencer.state().timer();
        for partial_ticks in [0.0, 0.3, 0.99, -0.5, f32::NAN, 0.1, 0.0] {
            render(&mut sequencer, partial_ticks);
            let timer = sequencer.state().timer();
            assert!(timer >= last);
            last = timer;
        }
        assert!((last - 1.39).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_face_is_counted_and_skipped() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let mut backend = RecordingBackend::new();
        let report = sequencer.draw_panorama(&mut backend, [0, 9, 1], 0.0);

        assert_eq!(report.faces_drawn, 2);
        assert_eq!(report.faces_failed, 1);
        assert!(!report.aborted);
        assert_eq!(sequencer.diagnostics().failed_faces, 1);
        assert_eq!(sequencer.stack.depth(), 0);
        let drawn: Vec<u32> = backend.draws.iter().map(|(texture, _)| *texture).collect();
        assert_eq!(drawn, vec![0, 1]);
    }

    #[test]
    fn test_underflow_aborts_pass() {
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let mut report = FrameReport::default();
        sequencer.end_panorama(&mut report);

        assert!(report.aborted);
        assert_eq!(sequencer.diagnostics().aborted_passes, 1);

        // The next frame still renders all faces and overlays.
        let (backend, report) = render(&mut sequencer, 0.5);
        assert_eq!(report.faces_drawn, 6);
        assert!(backend.calls.contains(&Call::Draw(EDITION)));
    }

    #[test]
    fn test_face_geometry_matches_builder() {
        let animation = Animation::for_camera(CameraModel::OrthographicSkew);
        let mut sequencer = FrameSequencer::new(config(CameraModel::OrthographicSkew)).unwrap();
        let (backend, _) = render(&mut sequencer, 0.5);

        // timer advanced to 0.5, geometry sampled at timer + partial ticks
        let builder = PanoramaGeometryBuilder::new(CameraModel::OrthographicSkew, animation, 2.0);
        let mut stack = TransformStack::new();
        let quads = builder.build_frame(&mut stack, 1.0).unwrap();
        for (quad, (_, vertices)) in quads.iter().zip(&backend.draws) {
            assert_eq!(&quad.vertices, vertices);
        }
    }
}
