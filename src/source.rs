//! Capture collaborators: camera frames, screen regions and ROI selection
//!
//! The core never talks to devices itself. A session is handed
//! implementations of these traits and treats every failure as "no image
//! this tick".

use crate::layer::ScreenRect;
use crate::windows::WindowInfo;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("camera {0} is busy")]
    DeviceBusy(u32),

    #[error("camera {0} is disconnected")]
    Disconnected(u32),
}

/// Live camera frames by device index
pub trait CameraSource {
    /// Grab the next frame from `device`, opening it if needed.
    fn capture(&mut self, device: u32) -> Result<RgbImage, SourceError>;

    /// Let go of the currently opened device, if any.
    fn release(&mut self) {}
}

/// Snapshots of a rectangle of the desktop
pub trait ScreenSource {
    fn capture(&mut self, region: &ScreenRect) -> Result<RgbImage, SourceError>;
}

/// Outcome of an interactive region selection over a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSelection {
    /// Selected rectangle in global screen coordinates
    pub region: ScreenRect,
    pub window: WindowInfo,
}

impl RegionSelection {
    /// Convert a rectangle picked inside `window` into global coordinates.
    ///
    /// An empty rectangle means the user backed out: `None`.
    pub fn from_local(window: WindowInfo, local: ScreenRect) -> Option<Self> {
        if local.is_empty() {
            return None;
        }
        let region = ScreenRect::new(
            window.rect.left + local.left,
            window.rect.top + local.top,
            local.width,
            local.height,
        );
        Some(Self { region, window })
    }
}

/// Runs the on-screen ROI picker over a window; `None` when cancelled
pub trait RegionSelector {
    fn select_region(&mut self, window: &WindowInfo) -> Option<RegionSelection>;
}

impl<T: CameraSource + ?Sized> CameraSource for Box<T> {
    fn capture(&mut self, device: u32) -> Result<RgbImage, SourceError> {
        (**self).capture(device)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<T: ScreenSource + ?Sized> ScreenSource for Box<T> {
    fn capture(&mut self, region: &ScreenRect) -> Result<RgbImage, SourceError> {
        (**self).capture(region)
    }
}
