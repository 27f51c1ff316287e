//! Pointer, wheel and keyboard interaction with the layer stack
//!
//! The controller turns raw canvas-space events into geometry changes on the
//! layers of a [`LayerStore`]: dragging a layer's body, resizing it from one
//! of eight handles with the aspect ratio locked, zooming around the cursor
//! and nudging the selected layer with the arrow keys. Only one gesture is
//! active at a time.

use crate::config::{clamp_layer_size, MOVE_STEP, RESIZE_HANDLE_SIZE, ZOOM_STEP};
use crate::layer::{Layer, LayerId};
use crate::store::LayerStore;
use crate::Rect;
use tracing::{debug, trace};

/// One of the eight resize hit zones of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl ResizeHandle {
    /// Corners first: they win over edges where zones overlap.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::Left,
        ResizeHandle::Right,
        ResizeHandle::Top,
        ResizeHandle::Bottom,
    ];

    pub fn has_left(self) -> bool {
        matches!(self, ResizeHandle::Left | ResizeHandle::TopLeft | ResizeHandle::BottomLeft)
    }

    pub fn has_right(self) -> bool {
        matches!(self, ResizeHandle::Right | ResizeHandle::TopRight | ResizeHandle::BottomRight)
    }

    pub fn has_top(self) -> bool {
        matches!(self, ResizeHandle::Top | ResizeHandle::TopLeft | ResizeHandle::TopRight)
    }

    pub fn has_bottom(self) -> bool {
        matches!(self, ResizeHandle::Bottom | ResizeHandle::BottomLeft | ResizeHandle::BottomRight)
    }

    /// Width drives the aspect lock for side edges and corners, height for top/bottom.
    pub fn width_is_primary(self) -> bool {
        self.has_left() || self.has_right()
    }

    pub fn cursor(self) -> CursorShape {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => CursorShape::ResizeDiagonal,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => CursorShape::ResizeAntiDiagonal,
            ResizeHandle::Left | ResizeHandle::Right => CursorShape::ResizeHorizontal,
            ResizeHandle::Top | ResizeHandle::Bottom => CursorShape::ResizeVertical,
        }
    }

    /// Whether `(px, py)` falls in this handle's zone around `bounds`.
    ///
    /// Corners are squares of side `2 * size` centered on the corner; edges
    /// are bands of thickness `2 * size` that stop where the corner squares
    /// begin. All bounds are inclusive.
    pub fn zone_contains(self, bounds: Rect, size: i32, px: i32, py: i32) -> bool {
        let (x, y) = (bounds.x as i64, bounds.y as i64);
        let (w, h) = (bounds.width as i64, bounds.height as i64);
        let (px, py, s) = (px as i64, py as i64, size as i64);
        let near = |value: i64, edge: i64| edge - s <= value && value <= edge + s;
        let between = |value: i64, from: i64, to: i64| from + s <= value && value <= to - s;
        match self {
            ResizeHandle::TopLeft => near(px, x) && near(py, y),
            ResizeHandle::TopRight => near(px, x + w) && near(py, y),
            ResizeHandle::BottomLeft => near(px, x) && near(py, y + h),
            ResizeHandle::BottomRight => near(px, x + w) && near(py, y + h),
            ResizeHandle::Left => near(px, x) && between(py, y, y + h),
            ResizeHandle::Right => near(px, x + w) && between(py, y, y + h),
            ResizeHandle::Top => near(py, y) && between(px, x, x + w),
            ResizeHandle::Bottom => near(py, y + h) && between(px, x, x + w),
        }
    }
}

/// First handle whose zone contains the point, corners checked before edges
pub fn handle_at(bounds: Rect, size: i32, px: i32, py: i32) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .into_iter()
        .find(|handle| handle.zone_contains(bounds, size, px, py))
}

/// Pointer shape the display surface should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    /// Top-left / bottom-right diagonal
    ResizeDiagonal,
    /// Top-right / bottom-left diagonal
    ResizeAntiDiagonal,
    ResizeHorizontal,
    ResizeVertical,
    /// Hovering a layer that can be dragged
    Grab,
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    None,
    Dragging {
        id: LayerId,
        /// Pointer position relative to the layer origin at press time
        offset_x: i64,
        offset_y: i64,
    },
    Resizing {
        id: LayerId,
        handle: ResizeHandle,
    },
}

impl Gesture {
    pub fn layer(&self) -> Option<LayerId> {
        match *self {
            Gesture::None => None,
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(ResizeHandle),
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: LayerId,
    pub target: HitTarget,
}

impl Hit {
    pub fn cursor(&self) -> CursorShape {
        match self.target {
            HitTarget::Handle(handle) => handle.cursor(),
            HitTarget::Body => CursorShape::Grab,
        }
    }
}

/// Arrow keys that nudge the selected layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeKey {
    Left,
    Right,
    Up,
    Down,
}

/// Topmost-first hit test over visible layers that currently have an image.
///
/// For each layer the handles are tried before the body, so a layer's
/// border zone wins over the body of any layer beneath it.
pub fn hit_test(store: &LayerStore, handle_size: i32, px: i32, py: i32) -> Option<Hit> {
    store
        .iter_top_down()
        .filter(|layer| layer.is_interactive())
        .find_map(|layer| {
            let bounds = layer.bounds();
            if let Some(handle) = handle_at(bounds, handle_size, px, py) {
                Some(Hit { id: layer.id(), target: HitTarget::Handle(handle) })
            } else if bounds.contains_point(px, py) {
                Some(Hit { id: layer.id(), target: HitTarget::Body })
            } else {
                None
            }
        })
}

/// Resize `layer` from `handle` by a pointer delta, keeping its aspect ratio.
pub fn apply_resize(layer: &mut Layer, handle: ResizeHandle, dx: i64, dy: i64) {
    let (orig_x, orig_y) = (layer.x as i64, layer.y as i64);
    let (orig_w, orig_h) = (layer.width() as i64, layer.height() as i64);
    let (dx, dy) = (
        dx.clamp(-(u32::MAX as i64), u32::MAX as i64),
        dy.clamp(-(u32::MAX as i64), u32::MAX as i64),
    );

    let (mut width, mut height) = (orig_w, orig_h);
    let (mut x, mut y) = (orig_x, orig_y);
    if handle.has_right() {
        width = orig_w + dx;
    }
    if handle.has_bottom() {
        height = orig_h + dy;
    }
    if handle.has_left() {
        width = orig_w - dx;
        x = orig_x + dx;
    }
    if handle.has_top() {
        height = orig_h - dy;
        y = orig_y + dy;
    }

    let aspect = layer.aspect_ratio;
    if aspect > 0.0 {
        if handle.width_is_primary() {
            height = (width as f64 / aspect) as i64;
        } else {
            width = (height as f64 * aspect) as i64;
        }
    }

    let width = clamp_layer_size(width) as i64;
    let height = clamp_layer_size(height) as i64;

    // Keep the opposite edge fixed.
    if handle.has_left() {
        x = orig_x + (orig_w - width);
    }
    if handle.has_top() {
        y = orig_y + (orig_h - height);
    }

    layer.x = saturate_i32(x);
    layer.y = saturate_i32(y);
    layer.set_size(width, height);
}

/// Scale `layer` by `ticks` wheel detents, keeping the point under the cursor fixed.
pub fn apply_zoom(layer: &mut Layer, px: i32, py: i32, ticks: f64) {
    let factor = 1.0 + ticks * ZOOM_STEP;
    let (old_w, old_h) = (layer.width() as f64, layer.height() as f64);
    let aspect = layer.aspect_ratio;

    let mut width = clamp_layer_size((old_w * factor).round() as i64);
    let height = if aspect > 0.0 {
        let implied = (width as f64 / aspect).round() as i64;
        let height = clamp_layer_size(implied);
        if height as i64 != implied {
            // Height hit a bound: let it drive the width instead.
            width = clamp_layer_size((height as f64 * aspect).round() as i64);
        }
        height
    } else {
        clamp_layer_size((old_h * factor).round() as i64)
    };

    let rel_x = if old_w > 0.0 { (px as f64 - layer.x as f64) / old_w } else { 0.5 };
    let rel_y = if old_h > 0.0 { (py as f64 - layer.y as f64) / old_h } else { 0.5 };

    layer.set_size(width as i64, height as i64);
    // Truncated toward zero, like the pixel origin of a drag.
    layer.x = saturate_i32((px as f64 - rel_x * width as f64) as i64);
    layer.y = saturate_i32((py as f64 - rel_y * height as f64) as i64);
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Gesture state machine driven by the display surface's events
#[derive(Debug, Clone)]
pub struct InteractionController {
    gesture: Gesture,
    last_pointer: Option<(i32, i32)>,
    handle_size: i32,
    move_step: i32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::None,
            last_pointer: None,
            handle_size: RESIZE_HANDLE_SIZE,
            move_step: MOVE_STEP,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn last_pointer(&self) -> Option<(i32, i32)> {
        self.last_pointer
    }

    pub fn hit_test(&self, store: &LayerStore, px: i32, py: i32) -> Option<Hit> {
        hit_test(store, self.handle_size, px, py)
    }

    /// Cursor to show when hovering with no gesture in progress
    pub fn hover_cursor(&self, store: &LayerStore, px: i32, py: i32) -> CursorShape {
        self.hit_test(store, px, py)
            .map_or(CursorShape::Arrow, |hit| hit.cursor())
    }

    /// Start a resize or drag on the topmost layer under the pointer.
    pub fn on_press(&mut self, store: &mut LayerStore, px: i32, py: i32) -> CursorShape {
        self.end_gesture(store);
        self.last_pointer = Some((px, py));

        let Some(hit) = self.hit_test(store, px, py) else {
            return CursorShape::Arrow;
        };
        let Some(layer) = store.find_by_id_mut(hit.id) else {
            return CursorShape::Arrow;
        };

        match hit.target {
            HitTarget::Handle(handle) => {
                layer.resize_handle = Some(handle);
                self.gesture = Gesture::Resizing { id: hit.id, handle };
                debug!(id = %hit.id, ?handle, "resize started");
                handle.cursor()
            }
            HitTarget::Body => {
                layer.dragging = true;
                self.gesture = Gesture::Dragging {
                    id: hit.id,
                    offset_x: px as i64 - layer.x as i64,
                    offset_y: py as i64 - layer.y as i64,
                };
                debug!(id = %hit.id, "drag started");
                CursorShape::Grabbing
            }
        }
    }

    /// Continue the active gesture, or report hover feedback when idle.
    pub fn on_move(&mut self, store: &mut LayerStore, px: i32, py: i32) -> CursorShape {
        let (last_x, last_y) = self.last_pointer.unwrap_or((px, py));
        self.last_pointer = Some((px, py));

        match self.gesture {
            Gesture::None => self.hover_cursor(store, px, py),
            Gesture::Dragging { id, offset_x, offset_y } => match store.find_by_id_mut(id) {
                Some(layer) => {
                    layer.x = saturate_i32(px as i64 - offset_x);
                    layer.y = saturate_i32(py as i64 - offset_y);
                    trace!(%id, x = layer.x, y = layer.y, "drag");
                    CursorShape::Grabbing
                }
                None => {
                    self.gesture = Gesture::None;
                    CursorShape::Arrow
                }
            },
            Gesture::Resizing { id, handle } => match store.find_by_id_mut(id) {
                Some(layer) => {
                    let dx = px as i64 - last_x as i64;
                    let dy = py as i64 - last_y as i64;
                    apply_resize(layer, handle, dx, dy);
                    trace!(%id, w = layer.width(), h = layer.height(), "resize");
                    handle.cursor()
                }
                None => {
                    self.gesture = Gesture::None;
                    CursorShape::Arrow
                }
            },
        }
    }

    /// End any gesture. Geometry computed so far is kept.
    pub fn on_release(&mut self, store: &mut LayerStore) -> CursorShape {
        self.end_gesture(store);
        self.last_pointer = None;
        CursorShape::Arrow
    }

    /// Losing pointer focus abandons the gesture like a release.
    pub fn on_focus_lost(&mut self, store: &mut LayerStore) -> CursorShape {
        self.on_release(store)
    }

    /// Zoom the topmost interactive layer under the pointer. `false` if none.
    pub fn on_wheel(&mut self, store: &mut LayerStore, px: i32, py: i32, ticks: f64) -> bool {
        let target = store
            .iter_top_down()
            .find(|layer| layer.is_interactive() && layer.bounds().contains_point(px, py))
            .map(|layer| layer.id());
        let Some(layer) = target.and_then(|id| store.find_by_id_mut(id)) else {
            return false;
        };
        apply_zoom(layer, px, py, ticks);
        debug!(id = %layer.id(), ticks, w = layer.width(), h = layer.height(), "zoom");
        true
    }

    /// Nudge the selected layer. `false` when nothing is selected.
    pub fn on_key(&mut self, store: &mut LayerStore, key: NudgeKey) -> bool {
        let step = self.move_step;
        let Some(layer) = store.selected_layer_mut() else {
            return false;
        };
        match key {
            NudgeKey::Left => layer.x = layer.x.saturating_sub(step),
            NudgeKey::Right => layer.x = layer.x.saturating_add(step),
            NudgeKey::Up => layer.y = layer.y.saturating_sub(step),
            NudgeKey::Down => layer.y = layer.y.saturating_add(step),
        }
        true
    }

    fn end_gesture(&mut self, store: &mut LayerStore) {
        if let Some(id) = self.gesture.layer() {
            if let Some(layer) = store.find_by_id_mut(id) {
                layer.clear_gesture_flags();
            }
            debug!(%id, "gesture ended");
        }
        self.gesture = Gesture::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_LAYER_SIZE, MIN_LAYER_SIZE};
    use crate::layer::NewLayer;
    use image::RgbImage;

    fn live_layer(store: &mut LayerStore, x: i32, y: i32, w: u32, h: u32) -> LayerId {
        let id = store.add(NewLayer::camera("live", x, y, w, h));
        store.find_by_id_mut(id).unwrap().raw_image = Some(RgbImage::new(4, 4));
        id
    }

    fn geometry(store: &LayerStore, id: LayerId) -> (i32, i32, u32, u32) {
        let layer = store.find_by_id(id).unwrap();
        (layer.x, layer.y, layer.width(), layer.height())
    }

    #[test]
    fn test_drag_preserves_offset() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 150);
        let mut controller = InteractionController::new();

        assert_eq!(controller.on_press(&mut store, 120, 120), CursorShape::Grabbing);
        assert!(store.find_by_id(id).unwrap().is_dragging());
        controller.on_move(&mut store, 140, 150);
        assert_eq!(geometry(&store, id), (120, 130, 200, 150));

        controller.on_release(&mut store);
        assert!(!store.find_by_id(id).unwrap().is_dragging());
        assert_eq!(controller.gesture(), Gesture::None);
        assert_eq!(controller.last_pointer(), None);
    }

    #[test]
    fn test_drag_can_leave_canvas() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 10, 10, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 50, 50);
        controller.on_move(&mut store, -500, -400);
        assert_eq!(geometry(&store, id), (-540, -440, 100, 100));
    }

    #[test]
    fn test_press_on_empty_space() {
        let mut store = LayerStore::new();
        live_layer(&mut store, 100, 100, 50, 50);
        let mut controller = InteractionController::new();
        assert_eq!(controller.on_press(&mut store, 5, 5), CursorShape::Arrow);
        assert_eq!(controller.gesture(), Gesture::None);
    }

    #[test]
    fn test_topmost_layer_wins() {
        let mut store = LayerStore::new();
        let back = live_layer(&mut store, 0, 0, 200, 200);
        let front = live_layer(&mut store, 50, 50, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 100, 100);
        assert_eq!(controller.gesture().layer(), Some(front));

        store.move_to_front(back).unwrap();
        controller.on_release(&mut store);
        controller.on_press(&mut store, 100, 100);
        assert_eq!(controller.gesture().layer(), Some(back));
    }

    #[test]
    fn test_invisible_or_imageless_layers_are_ignored() {
        let mut store = LayerStore::new();
        let under = live_layer(&mut store, 0, 0, 200, 200);
        let hidden = live_layer(&mut store, 50, 50, 100, 100);
        store.set_visible(hidden, false).unwrap();
        store.add(NewLayer::camera("blank", 50, 50, 100, 100));

        let controller = InteractionController::new();
        let hit = controller.hit_test(&store, 100, 100).unwrap();
        assert_eq!(hit, Hit { id: under, target: HitTarget::Body });
    }

    #[test]
    fn test_handle_zones() {
        let bounds = Rect::new(100, 100, 200, 100);
        assert_eq!(handle_at(bounds, 10, 100, 100), Some(ResizeHandle::TopLeft));
        assert_eq!(handle_at(bounds, 10, 91, 109), Some(ResizeHandle::TopLeft));
        assert_eq!(handle_at(bounds, 10, 305, 95), Some(ResizeHandle::TopRight));
        assert_eq!(handle_at(bounds, 10, 100, 200), Some(ResizeHandle::BottomLeft));
        assert_eq!(handle_at(bounds, 10, 310, 210), Some(ResizeHandle::BottomRight));
        assert_eq!(handle_at(bounds, 10, 95, 150), Some(ResizeHandle::Left));
        assert_eq!(handle_at(bounds, 10, 300, 150), Some(ResizeHandle::Right));
        assert_eq!(handle_at(bounds, 10, 200, 105), Some(ResizeHandle::Top));
        assert_eq!(handle_at(bounds, 10, 200, 192), Some(ResizeHandle::Bottom));
        assert_eq!(handle_at(bounds, 10, 200, 150), None);
        assert_eq!(handle_at(bounds, 10, 200, 211), None);
    }

    #[test]
    fn test_corner_beats_edge_on_shared_boundary() {
        let bounds = Rect::new(0, 0, 100, 100);
        // y = 10 is inside both the top-left square and the left band.
        assert_eq!(handle_at(bounds, 10, 0, 10), Some(ResizeHandle::TopLeft));
        assert_eq!(handle_at(bounds, 10, 0, 11), Some(ResizeHandle::Left));
    }

    #[test]
    fn test_right_edge_resize_keeps_aspect() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 100);
        let mut controller = InteractionController::new();
        assert_eq!(controller.on_press(&mut store, 300, 150), CursorShape::ResizeHorizontal);
        controller.on_move(&mut store, 340, 170);
        assert_eq!(geometry(&store, id), (100, 100, 240, 120));
    }

    #[test]
    fn test_left_edge_resize_keeps_right_edge() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 100, 150);
        controller.on_move(&mut store, 140, 150);
        let (x, _, w, h) = geometry(&store, id);
        assert_eq!((w, h), (160, 80));
        assert_eq!(x + w as i32, 300);
    }

    #[test]
    fn test_top_edge_resize_is_height_primary() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 100);
        let mut controller = InteractionController::new();
        assert_eq!(controller.on_press(&mut store, 200, 100), CursorShape::ResizeVertical);
        controller.on_move(&mut store, 200, 80);
        let (_, y, w, h) = geometry(&store, id);
        assert_eq!((w, h), (240, 120));
        assert_eq!(y + h as i32, 200);
    }

    #[test]
    fn test_top_left_corner_is_width_primary() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 100);
        let mut controller = InteractionController::new();
        assert_eq!(controller.on_press(&mut store, 100, 100), CursorShape::ResizeDiagonal);
        controller.on_move(&mut store, 60, 95);
        let (x, y, w, h) = geometry(&store, id);
        assert_eq!((w, h), (240, 120));
        assert_eq!((x + w as i32, y + h as i32), (300, 200));
    }

    #[test]
    fn test_resize_deltas_accumulate_between_moves() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 100, 100);
        controller.on_move(&mut store, 110, 100);
        controller.on_move(&mut store, 130, 100);
        assert_eq!(geometry(&store, id), (0, 0, 130, 130));
    }

    #[test]
    fn test_resize_always_clamped() {
        for delta in [-100_000, -5_000, -150, -1, 0, 1, 150, 5_000, 100_000] {
            for handle in ResizeHandle::ALL {
                let mut store = LayerStore::new();
                let id = live_layer(&mut store, 0, 0, 160, 90);
                let layer = store.find_by_id_mut(id).unwrap();
                apply_resize(layer, handle, delta, delta);
                let (_, _, w, h) = geometry(&store, id);
                assert!((MIN_LAYER_SIZE..=MAX_LAYER_SIZE).contains(&w), "{handle:?} {delta}: w={w}");
                assert!((MIN_LAYER_SIZE..=MAX_LAYER_SIZE).contains(&h), "{handle:?} {delta}: h={h}");
            }
        }
    }

    #[test]
    fn test_resize_aspect_lock_within_rounding() {
        for handle in ResizeHandle::ALL {
            for delta in [-37, -12, 7, 23, 61] {
                let mut store = LayerStore::new();
                let id = live_layer(&mut store, 0, 0, 160, 90);
                let aspect = store.find_by_id(id).unwrap().aspect_ratio;
                apply_resize(store.find_by_id_mut(id).unwrap(), handle, delta, delta);
                let (_, _, w, h) = geometry(&store, id);
                if handle.width_is_primary() {
                    assert!((w as f64 / aspect - h as f64).abs() < 1.0, "{handle:?} {delta}");
                } else {
                    assert!((h as f64 * aspect - w as f64).abs() < 1.0, "{handle:?} {delta}");
                }
            }
        }
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_point() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 50, 50, 100, 100);
        let mut controller = InteractionController::new();
        assert!(controller.on_wheel(&mut store, 100, 100, 1.0));
        assert_eq!(geometry(&store, id), (45, 45, 110, 110));
    }

    #[test]
    fn test_wheel_zoom_out_from_corner_point() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 200, 100);
        let mut controller = InteractionController::new();
        assert!(controller.on_wheel(&mut store, 0, 0, -2.0));
        assert_eq!(geometry(&store, id), (0, 0, 160, 80));
    }

    #[test]
    fn test_wheel_zoom_reconciles_with_height_bound() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 40, 10);
        // Aspect 4: width 36 implies height 9, which clamps to 10, so width follows.
        apply_zoom(store.find_by_id_mut(id).unwrap(), 0, 0, -1.0);
        assert_eq!(geometry(&store, id), (0, 0, 40, 10));
    }

    #[test]
    fn test_wheel_zoom_clamped() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 3000, 3000);
        let mut controller = InteractionController::new();
        for _ in 0..10 {
            controller.on_wheel(&mut store, 10, 10, 5.0);
        }
        let (_, _, w, h) = geometry(&store, id);
        assert_eq!((w, h), (MAX_LAYER_SIZE, MAX_LAYER_SIZE));

        let layer = store.find_by_id_mut(id).unwrap();
        apply_zoom(layer, 10, 10, -50.0);
        assert_eq!((layer.width(), layer.height()), (MIN_LAYER_SIZE, MIN_LAYER_SIZE));
    }

    #[test]
    fn test_wheel_zoom_origin_truncates() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 100, 100);
        let mut controller = InteractionController::new();
        // 7 - 0.07 * 110 = -0.7, which truncates to 0.
        assert!(controller.on_wheel(&mut store, 7, 7, 1.0));
        assert_eq!(geometry(&store, id), (0, 0, 110, 110));

        let id = live_layer(&mut store, 10, 20, 100, 100);
        assert!(controller.on_wheel(&mut store, 43, 61, 1.0));
        // 43 - 0.33 * 110 = 6.7 and 61 - 0.41 * 110 = 15.9
        assert_eq!(geometry(&store, id), (6, 15, 110, 110));
    }

    #[test]
    fn test_wheel_outside_layers_is_ignored() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 50, 50, 100, 100);
        let mut controller = InteractionController::new();
        assert!(!controller.on_wheel(&mut store, 400, 400, 1.0));
        assert_eq!(geometry(&store, id), (50, 50, 100, 100));
    }

    #[test]
    fn test_key_nudge_selected_layer() {
        let mut store = LayerStore::new();
        let first = live_layer(&mut store, 0, 0, 50, 50);
        let second = live_layer(&mut store, 100, 100, 50, 50);
        let mut controller = InteractionController::new();

        assert!(controller.on_key(&mut store, NudgeKey::Right));
        assert!(controller.on_key(&mut store, NudgeKey::Up));
        assert_eq!(geometry(&store, second), (105, 95, 50, 50));

        store.select(first).unwrap();
        assert!(controller.on_key(&mut store, NudgeKey::Left));
        assert!(controller.on_key(&mut store, NudgeKey::Down));
        assert_eq!(geometry(&store, first), (-5, 5, 50, 50));
    }

    #[test]
    fn test_extreme_pointer_coordinates_saturate() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 100, 100);
        let mut controller = InteractionController::new();

        assert_eq!(controller.on_press(&mut store, 100, 50), CursorShape::ResizeHorizontal);
        controller.on_move(&mut store, -2_000_000_000, 50);
        controller.on_move(&mut store, 2_000_000_000, 50);
        controller.on_move(&mut store, i32::MIN, i32::MAX);
        let (x, y, w, h) = geometry(&store, id);
        assert_eq!((x, y), (0, 0));
        assert!((MIN_LAYER_SIZE..=MAX_LAYER_SIZE).contains(&w));
        assert!((MIN_LAYER_SIZE..=MAX_LAYER_SIZE).contains(&h));
        controller.on_release(&mut store);

        let id = live_layer(&mut store, 500, 500, 200, 200);
        assert_eq!(controller.on_press(&mut store, 600, 600), CursorShape::Grabbing);
        controller.on_move(&mut store, i32::MIN, i32::MIN);
        assert_eq!(geometry(&store, id), (i32::MIN, i32::MIN, 200, 200));
        controller.on_move(&mut store, i32::MAX, i32::MAX);
        assert_eq!(geometry(&store, id), (i32::MAX - 100, i32::MAX - 100, 200, 200));
        controller.on_release(&mut store);

        store.find_by_id_mut(id).unwrap().x = i32::MAX;
        assert!(controller.on_key(&mut store, NudgeKey::Right));
        assert_eq!(geometry(&store, id).0, i32::MAX);
        store.find_by_id_mut(id).unwrap().y = i32::MIN;
        assert!(controller.on_key(&mut store, NudgeKey::Up));
        assert_eq!(geometry(&store, id).1, i32::MIN);
    }

    #[test]
    fn test_key_without_selection_not_consumed() {
        let mut store = LayerStore::new();
        let mut controller = InteractionController::new();
        assert!(!controller.on_key(&mut store, NudgeKey::Left));
    }

    #[test]
    fn test_hover_feedback_does_not_mutate() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 100, 100, 200, 100);
        let mut controller = InteractionController::new();
        assert_eq!(controller.on_move(&mut store, 300, 200), CursorShape::ResizeDiagonal);
        assert_eq!(controller.on_move(&mut store, 200, 150), CursorShape::Grab);
        assert_eq!(controller.on_move(&mut store, 10, 10), CursorShape::Arrow);
        assert_eq!(controller.on_move(&mut store, 300, 100), CursorShape::ResizeAntiDiagonal);
        assert_eq!(geometry(&store, id), (100, 100, 200, 100));
    }

    #[test]
    fn test_new_press_clears_previous_flags() {
        let mut store = LayerStore::new();
        let a = live_layer(&mut store, 0, 0, 100, 100);
        let b = live_layer(&mut store, 300, 300, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 50, 50);
        assert!(store.find_by_id(a).unwrap().is_dragging());

        controller.on_press(&mut store, 400, 400);
        assert!(!store.find_by_id(a).unwrap().is_dragging());
        assert_eq!(store.find_by_id(b).unwrap().active_resize_handle(), Some(ResizeHandle::BottomRight));
    }

    #[test]
    fn test_layer_removed_mid_gesture() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 50, 50);
        store.remove(id).unwrap();
        assert_eq!(controller.on_move(&mut store, 60, 60), CursorShape::Arrow);
        assert_eq!(controller.gesture(), Gesture::None);
    }

    #[test]
    fn test_focus_lost_ends_resize() {
        let mut store = LayerStore::new();
        let id = live_layer(&mut store, 0, 0, 100, 100);
        let mut controller = InteractionController::new();
        controller.on_press(&mut store, 100, 50);
        controller.on_move(&mut store, 120, 50);
        controller.on_focus_lost(&mut store);
        assert_eq!(store.find_by_id(id).unwrap().active_resize_handle(), None);
        // Geometry from the abandoned gesture stands.
        assert_eq!(geometry(&store, id), (0, 0, 120, 120));
    }
}
