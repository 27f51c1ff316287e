//! Anteprima interattiva nel terminale con sorgenti sintetiche
//!
//! Mouse: trascina per spostare, bordi e angoli per ridimensionare, rotella
//! per lo zoom. Frecce per spostare il livello selezionato.
//! Tasti: t visibilità, f/b primo piano/sfondo, u/d su/giù, x rimuovi,
//! n nuova regione dello schermo, c cambia camera, s seleziona il successivo,
//! q esci. I log vanno su stderr (`2>overlay.log`), livello da `RUST_LOG`.

use image::{Rgb, RgbImage};
use layer_overlay::config::{
    SessionConfig, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, TICK_INTERVAL,
};
use layer_overlay::input::{InputEvent, InputManager};
use layer_overlay::renderer::TerminalPreview;
use layer_overlay::windows::{capturable_processes, TitleFilter, WindowInfo, WindowSnapshot};
use layer_overlay::{
    CameraSource, CursorShape, RegionSelection, RegionSelector, ScreenRect, ScreenSource,
    Session, SessionError, SourceError, TickTimer,
};
use std::collections::HashMap;
use std::io::{self, stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PREVIEW_TITLE: &str = "Layer Overlay";
/// Title prefix a region picker overlay would carry
const SELECTOR_TITLE_PREFIX: &str = "Select capture area in:";
/// Canvas pixels per terminal cell
const CELL_WIDTH: u32 = 8;
const CELL_HEIGHT: u32 = 16;
const CAMERA_DEVICES: u32 = 2;

/// Gradient that scrolls a little every frame
struct SyntheticCamera {
    frame: u32,
}

impl CameraSource for SyntheticCamera {
    fn capture(&mut self, device: u32) -> Result<RgbImage, SourceError> {
        if device >= CAMERA_DEVICES {
            return Err(SourceError::Disconnected(device));
        }
        self.frame = self.frame.wrapping_add(1);
        let (w, h) = (DEFAULT_CAMERA_WIDTH / 4, DEFAULT_CAMERA_HEIGHT / 4);
        let phase = self.frame;
        Ok(RgbImage::from_fn(w, h, |x, y| {
            let wave = (x.wrapping_add(y).wrapping_add(phase.wrapping_mul(3)) % 256) as u8;
            if device == 0 {
                Rgb([wave, (y * 255 / h) as u8, 160])
            } else {
                Rgb([200, wave, (x * 255 / w) as u8])
            }
        }))
    }

    fn release(&mut self) {
        info!("synthetic camera released");
    }
}

/// Checkerboard tinted by where the region sits on the desktop
struct SyntheticScreen;

impl ScreenSource for SyntheticScreen {
    fn capture(&mut self, region: &ScreenRect) -> Result<RgbImage, SourceError> {
        if region.is_empty() {
            return Err(SourceError::Unavailable("empty region".into()));
        }
        let tint = (region.left.unsigned_abs() % 200) as u8 + 55;
        Ok(RgbImage::from_fn(region.width, region.height, |x, y| {
            if (x / 16 + y / 16) % 2 == 0 {
                Rgb([tint, 40, 255 - tint])
            } else {
                Rgb([230, 230, 230])
            }
        }))
    }
}

/// Picks a different quarter of the window each time
struct CyclingSelector {
    picks: u32,
}

impl RegionSelector for CyclingSelector {
    fn select_region(&mut self, window: &WindowInfo) -> Option<RegionSelection> {
        let quarter = self.picks % 4;
        self.picks += 1;
        let (w, h) = (window.rect.width / 2, window.rect.height / 2);
        let local = ScreenRect::new(
            (quarter % 2 * w) as i32,
            (quarter / 2 * h) as i32,
            w,
            h,
        );
        RegionSelection::from_local(window.clone(), local)
    }
}

fn desktop_snapshot() -> (Vec<WindowSnapshot>, HashMap<u32, String>) {
    let window = |handle, title: &str, pid, rect| WindowSnapshot {
        window: WindowInfo {
            handle,
            title: title.to_string(),
            pid,
            rect,
        },
        visible: true,
        minimized: false,
    };
    let snapshot = vec![
        window(1, "Layer Overlay", 10, ScreenRect::new(0, 0, 1280, 720)),
        window(2, "notes.md - Editor", 20, ScreenRect::new(100, 80, 1200, 800)),
        window(3, "Terminal", 30, ScreenRect::new(640, 200, 900, 600)),
        window(4, "", 40, ScreenRect::new(300, 300, 640, 480)),
        window(5, "Tooltip", 30, ScreenRect::new(10, 10, 120, 20)),
    ];
    let names = [(10, "overlay-preview"), (20, "editor"), (30, "Terminal")]
        .into_iter()
        .map(|(pid, name)| (pid, name.to_string()))
        .collect();
    (snapshot, names)
}

struct App {
    session: Session<SyntheticCamera, SyntheticScreen>,
    preview: TerminalPreview,
    selector: CyclingSelector,
    region_picks: usize,
    camera_device: Option<u32>,
    cursor: CursorShape,
}

impl App {
    fn new(cols: u16, rows: u16) -> Self {
        let preview_rows = rows.saturating_sub(1).max(1);
        let config = SessionConfig {
            canvas_width: (cols as u32 * CELL_WIDTH) as i32,
            canvas_height: (preview_rows as u32 * CELL_HEIGHT) as i32,
            ..SessionConfig::default()
        };
        let mut session = Session::new(SyntheticCamera { frame: 0 }, SyntheticScreen, config);
        let camera_device = match session.select_camera(Some(0)) {
            Ok(()) => Some(0),
            Err(err) => {
                warn!(%err, "camera not started");
                None
            }
        };
        Self {
            session,
            preview: TerminalPreview::new(cols, preview_rows),
            selector: CyclingSelector { picks: 0 },
            region_picks: 0,
            camera_device,
            cursor: CursorShape::Arrow,
        }
    }

    fn to_canvas(&self, col: u16, row: u16) -> (i32, i32) {
        let (w, h) = self.session.canvas_size();
        self.preview
            .cell_to_canvas(col, row, w.max(0) as u32, h.max(0) as u32)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let preview_rows = rows.saturating_sub(1).max(1);
        self.preview.resize(cols, preview_rows);
        self.session.set_canvas_size(
            (cols as u32 * CELL_WIDTH) as i32,
            (preview_rows as u32 * CELL_HEIGHT) as i32,
        );
    }

    fn add_region(&mut self) -> Result<(), SessionError> {
        let (snapshot, names) = desktop_snapshot();
        let filter = TitleFilter::with_defaults(PREVIEW_TITLE, SELECTOR_TITLE_PREFIX);
        let processes = capturable_processes(snapshot, &names, &filter);
        if processes.is_empty() {
            warn!("no capturable windows");
            return Ok(());
        }
        let process = &processes[self.region_picks % processes.len()];
        self.region_picks += 1;
        let window = process
            .auto_selected_window()
            .or_else(|| process.windows.first());
        let selection = window.and_then(|w| self.selector.select_region(w));
        self.session.add_region_layer(selection)?;
        Ok(())
    }

    fn cycle_camera(&mut self) -> Result<(), SessionError> {
        let next = match self.camera_device {
            None => Some(0),
            Some(device) if device + 1 < CAMERA_DEVICES => Some(device + 1),
            Some(_) => None,
        };
        let result = self.session.select_camera(next);
        self.camera_device = if result.is_ok() { next } else { None };
        result
    }

    fn select_next(&mut self) -> Result<(), SessionError> {
        let order = self.session.store().order().to_vec();
        let Some(current) = self.session.store().selected() else {
            return Ok(());
        };
        let index = order.iter().position(|id| *id == current).unwrap_or(0);
        let next = order[(index + order.len() - 1) % order.len()];
        self.session.select(next)
    }

    /// Returns `false` when the user asked to quit.
    fn handle(&mut self, event: InputEvent) -> bool {
        let result = match event {
            InputEvent::Quit => return false,
            InputEvent::Press { col, row } => {
                let (x, y) = self.to_canvas(col, row);
                self.cursor = self.session.on_press(x, y);
                Ok(())
            }
            InputEvent::Move { col, row } => {
                let (x, y) = self.to_canvas(col, row);
                self.cursor = self.session.on_move(x, y);
                Ok(())
            }
            InputEvent::Release => {
                self.cursor = self.session.on_release();
                Ok(())
            }
            InputEvent::FocusLost => {
                self.cursor = self.session.on_focus_lost();
                Ok(())
            }
            InputEvent::Wheel { col, row, ticks } => {
                let (x, y) = self.to_canvas(col, row);
                self.session.on_wheel(x, y, ticks as f64);
                Ok(())
            }
            InputEvent::Key(key) => {
                self.session.on_key(key);
                Ok(())
            }
            InputEvent::Resize { cols, rows } => {
                self.resize(cols, rows);
                Ok(())
            }
            InputEvent::Char('t') => self.session.toggle_visibility().map(|_| ()),
            InputEvent::Char('f') => self.session.move_to_front().map(|_| ()),
            InputEvent::Char('b') => self.session.move_to_back().map(|_| ()),
            InputEvent::Char('u') => self.session.move_up(),
            InputEvent::Char('d') => self.session.move_down(),
            InputEvent::Char('x') => self.session.remove_selected(),
            InputEvent::Char('n') => self.add_region(),
            InputEvent::Char('c') => self.cycle_camera(),
            InputEvent::Char('s') => self.select_next(),
            InputEvent::Char(_) => Ok(()),
        };
        if let Err(err) = result {
            info!(%err, "command not applied");
        }
        true
    }

    fn status(&self, ticks: u64) -> String {
        let selected = self
            .session
            .store()
            .selected_layer()
            .map(|layer| format!("{} {}x{}", layer.name(), layer.width(), layer.height()))
            .unwrap_or_else(|| "nessun livello".to_string());
        let camera = self
            .camera_device
            .map_or("off".to_string(), |device| device.to_string());
        format!(
            " {} livelli | sel: {} | camera: {} | {:?} | tick {}",
            self.session.store().len(),
            selected,
            camera,
            self.cursor,
            ticks
        )
    }
}

fn run() -> io::Result<()> {
    let mut input = InputManager::new()?;
    let (cols, rows) = input.terminal_size();
    let mut app = App::new(cols, rows);
    let mut timer = TickTimer::new(TICK_INTERVAL);
    let mut out = stdout();

    loop {
        while let Some(event) = input.poll_event(timer.time_until_next_tick())? {
            if !app.handle(event) {
                return Ok(());
            }
            if timer.is_due() {
                break;
            }
        }
        if !timer.is_due() {
            continue;
        }
        let canvas = app.session.tick();
        app.preview.draw(&mut out, &canvas)?;
        app.preview.draw_status(&mut out, &app.status(timer.get_tick_count()))?;
        timer.mark_tick();
    }
}

fn main() -> io::Result<()> {
    // Livello da `RUST_LOG`, predefinito `info`
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    info!("overlay preview starting");
    let result = run();
    info!("overlay preview stopped");
    result
}
