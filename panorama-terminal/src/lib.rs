/// Terminal front end for the menu panorama
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use panorama_core::{
    CameraModel, FrameParams, FrameSequencer, MenuHost, OverlayTextures, PanoramaConfig, TextureSet,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::{AsciiRenderer, Glyph, CELL_HEIGHT, CELL_WIDTH};

/// Length of one simulation tick; partial ticks are the fraction elapsed within it.
const TICK: Duration = Duration::from_millis(50);

const COPYRIGHT: &str = "Copyright CADeng Contributors";

/// One glyph per cube face, in face order
pub fn face_glyphs() -> Vec<Glyph> {
    vec![
        Glyph::new('#', Color::Cyan),
        Glyph::new('%', Color::Blue),
        Glyph::new('@', Color::Magenta),
        Glyph::new('*', Color::Green),
        Glyph::new('+', Color::White),
        Glyph::new('=', Color::DarkYellow),
    ]
}

/// Default terminal configuration for a camera model
pub fn default_config(camera: CameraModel) -> panorama_core::Result<PanoramaConfig<Glyph>> {
    let faces = TextureSet::new(face_glyphs())?;
    let overlays = OverlayTextures {
        title: Glyph::new('M', Color::Yellow),
        edition: Glyph::new('e', Color::Grey),
    };
    Ok(PanoramaConfig::new(faces, overlays, camera))
}

/// Splash, branding and copyright text drawn by the host
pub struct TerminalMenu {
    pub splash: String,
    pub branding: Vec<String>,
}

impl Default for TerminalMenu {
    fn default() -> Self {
        Self {
            splash: "Also try tw3d!".to_string(),
            branding: vec![
                format!("panorama-terminal {}", env!("CARGO_PKG_VERSION")),
                "q to quit, move the mouse to change the field of view".to_string(),
            ],
        }
    }
}

impl MenuHost<AsciiRenderer> for TerminalMenu {
    fn splash_text_width(&self) -> f32 {
        self.splash.chars().count() as f32 * CELL_WIDTH
    }

    fn draw_splash_text(&mut self, backend: &mut AsciiRenderer) {
        // Centered on the transform origin, one row above it
        let x = -self.splash_text_width() / 2.0;
        backend.draw_text(&self.splash, x, -CELL_HEIGHT, Color::Yellow);
    }

    fn draw_remaining_ui(&mut self, backend: &mut AsciiRenderer, params: &FrameParams) {
        for (line, brand) in self.branding.iter().rev().enumerate() {
            let y = params.height - CELL_HEIGHT * (line as f32 + 1.0);
            backend.draw_text(brand, 0.0, y, Color::White);
        }
        let x = params.width - COPYRIGHT.len() as f32 * CELL_WIDTH;
        backend.draw_text(COPYRIGHT, x, params.height - CELL_HEIGHT, Color::White);
    }
}

/// Main application struct for the terminal panorama
pub struct TerminalApp {
    sequencer: FrameSequencer<Glyph>,
    renderer: AsciiRenderer,
    menu: TerminalMenu,
    running: bool,
    mouse: (f32, f32),
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: PanoramaConfig<Glyph>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let sequencer = FrameSequencer::new(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        Ok(Self {
            sequencer,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            menu: TerminalMenu::default(),
            running: true,
            mouse: (width as f32 * CELL_WIDTH / 2.0, 0.0),
            started: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => {
                if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.running = false;
                }
            }
            Event::Mouse(MouseEvent { column, row, .. }) => {
                self.mouse = (column as f32 * CELL_WIDTH, row as f32 * CELL_HEIGHT);
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
        Ok(())
    }

    fn frame_params(&self) -> FrameParams {
        let elapsed = self.started.elapsed();
        let partial_ticks = (elapsed.as_millis() % TICK.as_millis()) as f32 / TICK.as_millis() as f32;
        FrameParams {
            mouse_x: self.mouse.0,
            mouse_y: self.mouse.1,
            partial_ticks,
            width: self.renderer.width() as f32 * CELL_WIDTH,
            height: self.renderer.height() as f32 * CELL_HEIGHT,
            system_time_ms: elapsed.as_millis() as u64,
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let params = self.frame_params();

        self.renderer.clear();
        self.renderer.set_projection(self.sequencer.projection(&params));
        self.sequencer.render_frame(&mut self.renderer, &mut self.menu, &params);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.present(&mut stdout)?;

        // Status line
        let diagnostics = self.sequencer.diagnostics();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Panorama | FPS: {:.1} | {:?} | t={:.1} | failed faces: {} | Q=Quit",
                self.fps,
                self.sequencer.camera(),
                self.sequencer.state().timer(),
                diagnostics.failed_faces
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
