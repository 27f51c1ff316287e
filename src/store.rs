//! Ordered layer stack: identity, z-order and selection

use crate::layer::{Layer, LayerId, NewLayer};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Reasons a store operation left the stack untouched
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("layer not found: {0}")]
    NotFound(LayerId),

    #[error("{0} is already at the top")]
    AlreadyAtTop(LayerId),

    #[error("{0} is already at the bottom")]
    AlreadyAtBottom(LayerId),
}

/// Arena of layers keyed by id plus the back-to-front render order.
///
/// Index 0 of the order is the bottom (drawn first), the last index is the
/// front. Selection always names an existing layer, or nothing when the
/// store is empty.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: HashMap<LayerId, Layer>,
    order: Vec<LayerId>,
    selected: Option<LayerId>,
    next_id: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front of the z-order and select it.
    pub fn add(&mut self, new: NewLayer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        let layer = Layer::from_new(id, new);
        info!(%id, name = layer.name(), kind = ?layer.kind(), "layer added");
        self.layers.insert(id, layer);
        self.order.push(id);
        self.selected = Some(id);
        id
    }

    pub fn remove(&mut self, id: LayerId) -> Result<Layer, StoreError> {
        let layer = self.layers.remove(&id).ok_or(StoreError::NotFound(id))?;
        self.order.retain(|other| *other != id);
        self.reconcile_selection();
        info!(%id, name = layer.name(), "layer removed");
        Ok(layer)
    }

    pub fn move_up(&mut self, id: LayerId) -> Result<(), StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        if index + 1 >= self.order.len() {
            return Err(StoreError::AlreadyAtTop(id));
        }
        self.order.swap(index, index + 1);
        debug!(%id, from = index, to = index + 1, "layer moved up");
        self.reconcile_selection();
        Ok(())
    }

    pub fn move_down(&mut self, id: LayerId) -> Result<(), StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        if index == 0 {
            return Err(StoreError::AlreadyAtBottom(id));
        }
        self.order.swap(index, index - 1);
        debug!(%id, from = index, to = index - 1, "layer moved down");
        self.reconcile_selection();
        Ok(())
    }

    /// Relocate to the front. `Ok(false)` when it was already there.
    pub fn move_to_front(&mut self, id: LayerId) -> Result<bool, StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        if index + 1 == self.order.len() {
            return Ok(false);
        }
        let id = self.order.remove(index);
        self.order.push(id);
        debug!(%id, from = index, "layer moved to front");
        self.reconcile_selection();
        Ok(true)
    }

    /// Relocate to the back. `Ok(false)` when it was already there.
    pub fn move_to_back(&mut self, id: LayerId) -> Result<bool, StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        if index == 0 {
            return Ok(false);
        }
        let id = self.order.remove(index);
        self.order.insert(0, id);
        debug!(%id, from = index, "layer moved to back");
        self.reconcile_selection();
        Ok(true)
    }

    pub fn can_move_up(&self, id: LayerId) -> bool {
        matches!(self.position(id), Some(index) if index + 1 < self.order.len())
    }

    pub fn can_move_down(&self, id: LayerId) -> bool {
        matches!(self.position(id), Some(index) if index > 0)
    }

    pub fn find_by_id(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn find_by_id_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Z-order index of a layer (0 = back)
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids back to front
    pub fn order(&self) -> &[LayerId] {
        &self.order
    }

    /// Layers back to front (render order)
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + '_ {
        self.order.iter().filter_map(move |id| self.layers.get(id))
    }

    /// Layers front to back (hit-test order)
    pub fn iter_top_down(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.iter().rev()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> + '_ {
        self.layers.values_mut()
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn select(&mut self, id: LayerId) -> Result<(), StoreError> {
        if !self.contains(id) {
            return Err(StoreError::NotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layers.get(&id))
    }

    pub fn selected_layer_mut(&mut self) -> Option<&mut Layer> {
        match self.selected {
            Some(id) => self.layers.get_mut(&id),
            None => None,
        }
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> Result<(), StoreError> {
        let layer = self.layers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        layer.visible = visible;
        info!(%id, name = layer.name(), visible, "layer visibility changed");
        Ok(())
    }

    /// Flip visibility and return the new value.
    pub fn toggle_visibility(&mut self, id: LayerId) -> Result<bool, StoreError> {
        let visible = !self.find_by_id(id).ok_or(StoreError::NotFound(id))?.visible;
        self.set_visible(id, visible)?;
        Ok(visible)
    }

    pub fn rename(&mut self, id: LayerId, name: impl Into<String>) -> Result<(), StoreError> {
        let layer = self.layers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        layer.set_name(name.into());
        Ok(())
    }

    /// Front-to-back list entries with a visibility marker, as a layer picker shows them
    pub fn labels(&self) -> Vec<(LayerId, String)> {
        self.iter_top_down()
            .map(|layer| {
                let marker = if layer.visible { "✅" } else { "❌" };
                (layer.id(), format!("{} {}", marker, layer.name()))
            })
            .collect()
    }

    /// Keep the selection by id, else fall back to the front-most layer.
    fn reconcile_selection(&mut self) {
        match self.selected {
            Some(id) if self.layers.contains_key(&id) => {}
            _ => self.selected = self.order.last().copied(),
        }
    }
}
