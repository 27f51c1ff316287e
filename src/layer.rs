//! Layer entity: one visual source with its canvas geometry

use crate::config::clamp_layer_size;
use crate::interaction::ResizeHandle;
use crate::Rect;
use image::RgbImage;
use std::fmt;

/// Opaque layer identifier, handed out by the store and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Rectangle in global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub top: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self { top, left, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or 1.0 for a degenerate rectangle
    pub fn aspect_ratio(&self) -> f64 {
        aspect_of(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    ScreenRegion,
}

/// What a capture collaborator should grab for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// Camera device index; `None` while no device is bound
    Camera(Option<u32>),
    ScreenRegion(ScreenRect),
}

impl SourceDescriptor {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::Camera(_) => SourceKind::Camera,
            SourceDescriptor::ScreenRegion(_) => SourceKind::ScreenRegion,
        }
    }
}

pub(crate) fn aspect_of(width: u32, height: u32) -> f64 {
    if height > 0 {
        width as f64 / height as f64
    } else {
        1.0
    }
}

/// Description of a layer not yet inserted in a store
#[derive(Debug, Clone)]
pub struct NewLayer {
    pub name: String,
    pub source: SourceDescriptor,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
}

impl NewLayer {
    pub fn camera(name: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            source: SourceDescriptor::Camera(None),
            x,
            y,
            width,
            height,
            visible: true,
        }
    }

    pub fn screen_region(
        name: impl Into<String>,
        region: ScreenRect,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            source: SourceDescriptor::ScreenRegion(region),
            x,
            y,
            width,
            height,
            visible: true,
        }
    }
}

/// One entry of the render stack
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    source: SourceDescriptor,
    /// Most recent capture, replaced wholesale every tick
    pub raw_image: Option<RgbImage>,
    pub x: i32,
    pub y: i32,
    width: u32,
    height: u32,
    pub aspect_ratio: f64,
    pub visible: bool,
    pub(crate) dragging: bool,
    pub(crate) resize_handle: Option<ResizeHandle>,
}

impl Layer {
    pub(crate) fn from_new(id: LayerId, new: NewLayer) -> Self {
        let mut aspect_ratio = aspect_of(new.width, new.height);
        if let SourceDescriptor::ScreenRegion(region) = &new.source {
            aspect_ratio = region.aspect_ratio();
        }
        Self {
            id,
            name: new.name,
            source: new.source,
            raw_image: None,
            x: new.x,
            y: new.y,
            width: clamp_layer_size(new.width as i64),
            height: clamp_layer_size(new.height as i64),
            aspect_ratio,
            visible: new.visible,
            dragging: false,
            resize_handle: None,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn source(&self) -> &SourceDescriptor {
        &self.source
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Device bound to a camera layer, if any
    pub fn camera_device(&self) -> Option<u32> {
        match self.source {
            SourceDescriptor::Camera(device) => device,
            SourceDescriptor::ScreenRegion(_) => None,
        }
    }

    /// Rebind a camera layer; no effect on screen-region layers.
    pub fn bind_camera(&mut self, device: Option<u32>) {
        if let SourceDescriptor::Camera(current) = &mut self.source {
            *current = device;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the display size, clamping each side into the allowed range.
    pub fn set_size(&mut self, width: i64, height: i64) {
        self.width = clamp_layer_size(width);
        self.height = clamp_layer_size(height);
    }

    /// Canvas footprint `[x, x+width) x [y, y+height)`
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn active_resize_handle(&self) -> Option<ResizeHandle> {
        self.resize_handle
    }

    /// Whether the layer takes part in hit-testing and composition
    pub fn is_interactive(&self) -> bool {
        self.visible && self.raw_image.is_some() && self.width > 0 && self.height > 0
    }

    pub(crate) fn clear_gesture_flags(&mut self) {
        self.dragging = false;
        self.resize_handle = None;
    }
}
