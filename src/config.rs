//! Fixed tuning constants and per-session settings

use image::Rgb;
use std::time::Duration;

/// Smallest display width or height a layer can have
pub const MIN_LAYER_SIZE: u32 = 10;
/// Largest display width or height a layer can have
pub const MAX_LAYER_SIZE: u32 = 4000;
/// Half-thickness of the resize hit zones around a layer's border
pub const RESIZE_HANDLE_SIZE: i32 = 10;
/// Arrow-key nudge distance in canvas pixels
pub const MOVE_STEP: i32 = 5;

/// Canvas size used when the display surface reports a non-positive size
pub const DEFAULT_CANVAS_WIDTH: u32 = 1280;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 720;

/// Frame size requested from a camera when it is opened
pub const DEFAULT_CAMERA_WIDTH: u32 = 1280;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 720;

/// Period of the acquisition + composition loop
pub const TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Scale change per wheel detent
pub const ZOOM_STEP: f64 = 0.1;

/// Side of a freshly created camera layer
pub const DEFAULT_CAMERA_LAYER_SIZE: u32 = 200;
/// Share of the canvas width given to a new screen-region layer
pub const REGION_LAYER_WIDTH_FRACTION: f64 = 0.5;
/// Windows narrower or shorter than this are not offered for capture
pub const MIN_CAPTURABLE_WINDOW_SIZE: u32 = 50;

pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Clamp a display dimension into `[MIN_LAYER_SIZE, MAX_LAYER_SIZE]`.
pub fn clamp_layer_size(value: i64) -> u32 {
    value.clamp(MIN_LAYER_SIZE as i64, MAX_LAYER_SIZE as i64) as u32
}

/// Settings a [`Session`](crate::session::Session) is created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub canvas_width: i32,
    pub canvas_height: i32,
    /// Flip camera frames left-to-right so the preview behaves like a mirror
    pub mirror_camera: bool,
    pub background: Rgb<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH as i32,
            canvas_height: DEFAULT_CANVAS_HEIGHT as i32,
            mirror_camera: true,
            background: BACKGROUND,
        }
    }
}
