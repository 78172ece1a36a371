//! Ordered layer collection with an active-layer pointer
//!
//! Index 0 is the bottom of the paint order; the last layer is drawn on top.

use tracing::{debug, info};

use crate::layer::Layer;
use crate::mapper;
use crate::surface::PixelSurface;
use crate::types::{LayerId, Vec2};

#[derive(Debug, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    next_id: u64,
    /// Monotonic counter used for default names
    layer_counter: u32,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order
    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    /// Build a layer with a fresh id and the next "Layer N" name
    pub fn create_layer(&mut self, source: PixelSurface) -> Layer {
        self.next_id += 1;
        self.layer_counter += 1;
        Layer::new(
            LayerId(self.next_id),
            format!("Layer {}", self.layer_counter),
            source,
        )
    }

    /// Append as the new topmost layer and make it active
    pub fn add(&mut self, layer: Layer) -> LayerId {
        let id = layer.id();
        self.next_id = self.next_id.max(id.0);
        info!("Added {} '{}' ({}x{})", id, layer.name, layer.width(), layer.height());
        self.layers.push(layer);
        self.active = Some(id);
        id
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    #[inline]
    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.get_mut(id)
    }

    /// Point the active marker at `id`. Unknown ids clear it.
    pub fn set_active(&mut self, id: Option<LayerId>) {
        self.active = id.filter(|id| self.get(*id).is_some());
        debug!("Active layer: {:?}", self.active);
    }

    /// Positional splice: remove at `from`, insert at `to`.
    ///
    /// Out-of-range indices are ignored.
    pub fn move_index(&mut self, from: usize, to: usize) {
        if from == to || from >= self.layers.len() || to >= self.layers.len() {
            return;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        debug!("Moved layer {} -> {}", from, to);
    }

    /// Remove a layer. If it was active, the new topmost layer becomes active.
    pub fn delete(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.index_of(id)?;
        let removed = self.layers.remove(index);
        if self.active == Some(id) {
            self.active = self.layers.last().map(Layer::id);
        }
        info!("Deleted {} '{}'", id, removed.name);
        Some(removed)
    }

    /// Show or hide a layer. Not recorded in history.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Topmost visible layer under a world point
    pub fn pick_topmost(&self, world: Vec2) -> Option<LayerId> {
        mapper::pick_topmost(&self.layers, world).map(Layer::id)
    }
}
