//! Live session: capture refresh, composition and layer management
//!
//! A [`Session`] owns the layer stack, the gesture controller, the
//! compositor and the two capture collaborators. Everything happens on the
//! caller's thread: events are forwarded between ticks and each tick reads
//! whatever layer state was last committed.

use crate::compositor::{Canvas, Compositor};
use crate::config::{
    clamp_layer_size, SessionConfig, DEFAULT_CAMERA_LAYER_SIZE, DEFAULT_CANVAS_HEIGHT,
    DEFAULT_CANVAS_WIDTH, MIN_LAYER_SIZE, REGION_LAYER_WIDTH_FRACTION,
};
use crate::interaction::{CursorShape, InteractionController, NudgeKey};
use crate::layer::{aspect_of, LayerId, NewLayer, SourceDescriptor};
use crate::source::{CameraSource, RegionSelection, ScreenSource, SourceError};
use crate::store::{LayerStore, StoreError};
use image::imageops;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("region selection cancelled")]
    SelectionCancelled,

    #[error("no layer selected")]
    NoLayerSelected,
}

pub struct Session<C, S> {
    store: LayerStore,
    controller: InteractionController,
    compositor: Compositor,
    camera: C,
    screen: S,
    config: SessionConfig,
    canvas_width: i32,
    canvas_height: i32,
    /// Layer that receives camera frames
    camera_layer: Option<LayerId>,
    /// Device currently opened on the camera collaborator
    active_device: Option<u32>,
}

impl<C: CameraSource, S: ScreenSource> Session<C, S> {
    /// Start a session with the default, unbound Camera layer.
    pub fn new(camera: C, screen: S, config: SessionConfig) -> Self {
        let mut session = Self {
            store: LayerStore::new(),
            controller: InteractionController::new(),
            compositor: Compositor::new(config.background),
            camera,
            screen,
            config,
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            camera_layer: None,
            active_device: None,
        };
        let id = session.add_camera_layer();
        info!(%id, "default camera layer ready, no device bound");
        session
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn camera_layer(&self) -> Option<LayerId> {
        self.camera_layer
    }

    pub fn active_device(&self) -> Option<u32> {
        self.active_device
    }

    pub fn canvas_size(&self) -> (i32, i32) {
        (self.canvas_width, self.canvas_height)
    }

    /// The display surface changed size; the next tick composes at it.
    pub fn set_canvas_size(&mut self, width: i32, height: i32) {
        debug!(width, height, "canvas resized");
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Refresh every layer's raw image, then compose the canvas.
    pub fn tick(&mut self) -> Canvas {
        self.refresh_sources();
        self.compose()
    }

    /// Compose from the images already held, without capturing.
    pub fn compose(&self) -> Canvas {
        self.compositor
            .compose(self.canvas_width, self.canvas_height, self.store.iter())
    }

    /// Ask the collaborators for this tick's images.
    ///
    /// Failures are never propagated: the layer simply has no image until a
    /// later capture succeeds.
    pub fn refresh_sources(&mut self) {
        let bound = self.camera_layer.zip(self.active_device);
        let mirror = self.config.mirror_camera;
        for layer in self.store.iter_mut() {
            if !layer.visible {
                layer.raw_image = None;
                continue;
            }
            layer.raw_image = match *layer.source() {
                SourceDescriptor::Camera(_) => match bound {
                    Some((id, device)) if id == layer.id() => {
                        match self.camera.capture(device) {
                            Ok(frame) if mirror => Some(imageops::flip_horizontal(&frame)),
                            Ok(frame) => Some(frame),
                            Err(err) => {
                                debug!(id = %layer.id(), %err, "camera frame unavailable");
                                None
                            }
                        }
                    }
                    _ => None,
                },
                SourceDescriptor::ScreenRegion(region) => match self.screen.capture(&region) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        debug!(id = %layer.id(), %err, "screen region unavailable");
                        None
                    }
                },
            };
        }
    }

    /// Bind the camera layer to `device`, or unbind it with `None`.
    ///
    /// Without a camera layer, selecting a device creates one. The first
    /// frame fixes the layer's aspect ratio and display height; if it cannot
    /// be grabbed the layer is left unbound and the error is returned.
    pub fn select_camera(&mut self, device: Option<u32>) -> Result<(), SessionError> {
        let mut target = self.camera_layer.filter(|id| self.store.contains(*id));
        if device.is_some() && target.is_none() {
            let id = self.add_camera_layer();
            info!(%id, "camera layer created for device selection");
            target = Some(id);
        }

        if let Some(previous) = self.active_device.take() {
            self.camera.release();
            debug!(device = previous, "previous camera released");
        }

        let Some(id) = target else {
            debug!("no camera layer to bind");
            return Ok(());
        };
        let Some(layer) = self.store.find_by_id_mut(id) else {
            return Err(StoreError::NotFound(id).into());
        };

        let Some(device) = device else {
            layer.raw_image = None;
            layer.bind_camera(None);
            info!(%id, "camera unbound");
            return Ok(());
        };

        match self.camera.capture(device) {
            Ok(frame) => {
                layer.aspect_ratio = aspect_of(frame.width(), frame.height());
                layer.bind_camera(Some(device));
                let width = layer.width().max(MIN_LAYER_SIZE) as i64;
                let height = (width as f64 / layer.aspect_ratio) as i64;
                layer.set_size(width, height);
                info!(
                    %id,
                    device,
                    frame_w = frame.width(),
                    frame_h = frame.height(),
                    w = layer.width(),
                    h = layer.height(),
                    "camera bound"
                );
                layer.raw_image = Some(if self.config.mirror_camera {
                    imageops::flip_horizontal(&frame)
                } else {
                    frame
                });
                self.active_device = Some(device);
                Ok(())
            }
            Err(err) => {
                warn!(%id, device, %err, "camera returned no frame, layer left unbound");
                self.camera.release();
                layer.raw_image = None;
                layer.bind_camera(None);
                Err(err.into())
            }
        }
    }

    /// Turn a finished region selection into a new front ScreenRegion layer.
    pub fn add_region_layer(
        &mut self,
        selection: Option<RegionSelection>,
    ) -> Result<LayerId, SessionError> {
        let Some(selection) = selection else {
            info!("region selection cancelled");
            return Err(SessionError::SelectionCancelled);
        };

        let region = selection.region;
        let aspect = region.aspect_ratio();
        let (canvas_w, canvas_h) = self.placement_canvas();
        let width = clamp_layer_size((canvas_w as f64 * REGION_LAYER_WIDTH_FRACTION) as i64);
        let height = clamp_layer_size((width as f64 / aspect) as i64);
        let (x, y) = centered(canvas_w, canvas_h, width, height);

        let name = format!("Screen: {}", selection.window.display_title());
        let id = self
            .store
            .add(NewLayer::screen_region(name, region, x, y, width, height));
        info!(
            %id,
            left = region.left,
            top = region.top,
            region_w = region.width,
            region_h = region.height,
            "screen region layer created"
        );
        Ok(id)
    }

    /// Remove a layer, dropping the camera binding if it held it.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<(), SessionError> {
        if self.controller.gesture().layer() == Some(id) {
            self.controller.on_release(&mut self.store);
        }
        self.store.remove(id)?;
        if self.camera_layer == Some(id) {
            self.camera_layer = None;
            if let Some(device) = self.active_device.take() {
                self.camera.release();
                info!(device, "camera released with its layer");
            }
        }
        Ok(())
    }

    pub fn remove_selected(&mut self) -> Result<(), SessionError> {
        let id = self.selected_id()?;
        self.remove_layer(id)
    }

    pub fn select(&mut self, id: LayerId) -> Result<(), SessionError> {
        Ok(self.store.select(id)?)
    }

    /// Flip visibility of the selected layer and report the new state.
    pub fn toggle_visibility(&mut self) -> Result<bool, SessionError> {
        let id = self.selected_id()?;
        Ok(self.store.toggle_visibility(id)?)
    }

    pub fn move_up(&mut self) -> Result<(), SessionError> {
        let id = self.selected_id()?;
        Ok(self.store.move_up(id)?)
    }

    pub fn move_down(&mut self) -> Result<(), SessionError> {
        let id = self.selected_id()?;
        Ok(self.store.move_down(id)?)
    }

    pub fn move_to_front(&mut self) -> Result<bool, SessionError> {
        let id = self.selected_id()?;
        Ok(self.store.move_to_front(id)?)
    }

    pub fn move_to_back(&mut self) -> Result<bool, SessionError> {
        let id = self.selected_id()?;
        Ok(self.store.move_to_back(id)?)
    }

    pub fn on_press(&mut self, px: i32, py: i32) -> CursorShape {
        self.controller.on_press(&mut self.store, px, py)
    }

    pub fn on_move(&mut self, px: i32, py: i32) -> CursorShape {
        self.controller.on_move(&mut self.store, px, py)
    }

    pub fn on_release(&mut self) -> CursorShape {
        self.controller.on_release(&mut self.store)
    }

    pub fn on_focus_lost(&mut self) -> CursorShape {
        self.controller.on_focus_lost(&mut self.store)
    }

    pub fn on_wheel(&mut self, px: i32, py: i32, ticks: f64) -> bool {
        self.controller.on_wheel(&mut self.store, px, py, ticks)
    }

    pub fn on_key(&mut self, key: NudgeKey) -> bool {
        self.controller.on_key(&mut self.store, key)
    }

    fn selected_id(&self) -> Result<LayerId, SessionError> {
        self.store.selected().ok_or(SessionError::NoLayerSelected)
    }

    fn add_camera_layer(&mut self) -> LayerId {
        let size = DEFAULT_CAMERA_LAYER_SIZE;
        let (canvas_w, canvas_h) = self.placement_canvas();
        let (x, y) = centered(canvas_w, canvas_h, size, size);
        let id = self.store.add(NewLayer::camera("Camera", x, y, size, size));
        self.camera_layer = Some(id);
        id
    }

    /// Canvas used to place new layers, the defaults if it is degenerate
    fn placement_canvas(&self) -> (i32, i32) {
        if self.canvas_width > 0 && self.canvas_height > 0 {
            (self.canvas_width, self.canvas_height)
        } else {
            (DEFAULT_CANVAS_WIDTH as i32, DEFAULT_CANVAS_HEIGHT as i32)
        }
    }
}

/// Top-left that centers a `width x height` box, flooring odd halves.
fn centered(canvas_w: i32, canvas_h: i32, width: u32, height: u32) -> (i32, i32) {
    let x = (canvas_w as i64 - width as i64).div_euclid(2);
    let y = (canvas_h as i64 - height as i64).div_euclid(2);
    (x as i32, y as i32)
}
