//! Layer stack operations and export for the editor

use tracing::{debug, info};

use crate::flatten::flatten;
use crate::surface::{PixelRect, PixelSurface};
use crate::types::LayerId;
use crate::validation::{validate_dimensions, SurfaceError};

use super::Editor;

impl Editor {
    /// Create a layer from decoded pixels, centered in the viewport and
    /// fitted to it. The new layer becomes active.
    ///
    /// Fails for a source without pixels.
    pub fn add_layer(&mut self, source: PixelSurface) -> Result<LayerId, SurfaceError> {
        validate_dimensions(source.width, source.height)?;
        let mut layer = self.stack.create_layer(source);
        layer.fit_to_viewport(
            self.display.width_f32(),
            self.display.height_f32(),
            self.config.import_fit_fraction,
        );
        let id = self.stack.add(layer);
        self.source_cache.invalidate_except(Some(id));
        self.request_render();
        Ok(id)
    }

    /// Make `id` the active layer. Drops any source snapshot of other layers.
    pub fn set_active_layer(&mut self, id: Option<LayerId>) {
        if self.stack.active_id() != id {
            self.finish_gestures();
            self.commit_opacity_edit();
        }
        self.stack.set_active(id);
        self.source_cache.invalidate_except(self.stack.active_id());
        self.request_render();
    }

    /// Remove a layer. History entries that name it become no-ops.
    ///
    /// A stroke on the layer is dropped without being recorded.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        if self.stroke.as_ref().is_some_and(|s| s.layer_id() == id) {
            debug!("Stroke on {} aborted by delete", id);
            self.stroke = None;
            self.stroke_pointer = None;
        }
        if self.stack.delete(id).is_none() {
            return false;
        }
        self.source_cache.invalidate_except(self.stack.active_id());
        self.request_render();
        true
    }

    /// Reorder: remove at `from`, insert at `to` (0 = bottom)
    pub fn move_layer(&mut self, from: usize, to: usize) {
        self.stack.move_index(from, to);
        self.request_render();
    }

    /// Show or hide a layer. Not an undoable edit.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        let changed = self.stack.set_visible(id, visible);
        if changed {
            self.request_render();
        }
        changed
    }

    /// Small preview of a layer for layer-list UIs
    pub fn layer_thumbnail(&mut self, id: LayerId) -> Option<PixelSurface> {
        let size = self.config.thumbnail_size;
        self.stack.get_mut(id).map(|layer| layer.thumbnail(size))
    }

    /// Longest side imported images are downscaled to
    pub fn import_max_dim(&self) -> u32 {
        self.display.import_max_dim()
    }

    /// Composite all visible layers at the viewport's physical size
    pub fn flatten(&mut self) -> PixelSurface {
        let (w, h) = self.display.physical_size();
        flatten(&mut self.stack, w, h, self.display.pixel_ratio())
    }

    /// Flatten, then crop to `crop` (physical pixels) when given
    pub fn export(&mut self, crop: Option<PixelRect>) -> PixelSurface {
        self.finish_gestures();
        let full = self.flatten();
        let Some(rect) = crop else {
            return full;
        };
        let clamped = full.clamp_rect(rect);
        if clamped.is_empty() {
            debug!("Export crop {:?} outside the canvas, exporting full frame", rect);
            return full;
        }
        info!("Export crop {}x{} at ({}, {})", clamped.width, clamped.height, clamped.x, clamped.y);
        full.crop(clamped)
    }
}
