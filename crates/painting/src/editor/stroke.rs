//! Brush strokes for the editor

use tracing::{debug, trace};

use crate::brush::{apply_dab, dab_step, interpolate, Dab};
use crate::magic::apply_magic_dab;
use crate::mapper::world_to_layer_pixel;
use crate::stroke::StrokeCapture;
use crate::types::Vec2;

use super::Editor;

impl Editor {
    /// Begin a brush stroke on the active layer with the first dab at
    /// `world`. Returns false when there is no active layer or the tool is
    /// not a brush.
    pub fn begin_stroke(&mut self, world: Vec2) -> bool {
        let Some(mode) = self.tool.brush_mode() else {
            return false;
        };
        let Some(layer_id) = self.stack.active_id() else {
            debug!("begin_stroke: no active layer");
            return false;
        };
        if self.stroke.is_some() {
            self.end_stroke();
        }

        debug!("Stroke {:?} started on {}", mode, layer_id);
        self.stroke = Some(StrokeCapture::new(layer_id, mode));
        self.apply_brush_at(world);
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.set_last_center(world);
        }
        self.request_render();
        true
    }

    /// Continue the stroke to `world`, filling the segment with dabs
    pub fn stroke_to(&mut self, world: Vec2) {
        let Some(stroke) = self.stroke.as_ref() else {
            trace!("stroke_to: no active stroke, ignoring");
            return;
        };
        let Some(layer) = self.stack.get(stroke.layer_id()) else {
            return;
        };
        let from = stroke.last_center().unwrap_or(world);

        // Spacing is in layer pixels, so measure the segment there too
        let scale = layer.transform.scale.abs().max(crate::constants::SCALE_EPSILON);
        let radius = self.brush.pixel_radius(scale);
        let len = from.distance(world) / scale;

        for center in interpolate(from, world, len, dab_step(radius)) {
            self.apply_brush_at(center);
        }
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.set_last_center(world);
        }
        self.request_render();
    }

    /// Finish the stroke and record its mask action
    pub fn end_stroke(&mut self) -> bool {
        let Some(stroke) = self.stroke.take() else {
            return false;
        };
        self.stroke_pointer = None;
        let Some(layer) = self.stack.get(stroke.layer_id()) else {
            debug!("Stroke target {} is gone, nothing recorded", stroke.layer_id());
            return false;
        };
        match stroke.finish(layer.mask()) {
            Some(action) => {
                self.record(action);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Apply one dab centered at `world` to the stroke's layer
    fn apply_brush_at(&mut self, world: Vec2) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let Some(layer) = self.stack.get_mut(stroke.layer_id()) else {
            return;
        };

        let geom = layer.geometry();
        let dab = Dab {
            center: world_to_layer_pixel(&geom, world),
            radius: self.brush.pixel_radius(geom.transform.scale.abs()),
            hardness: self.brush.hardness,
            strength: self.brush.strength,
            mode: stroke.mode(),
        };
        if dab.radius <= 0.0 || !dab.touches(geom.width, geom.height) {
            return;
        }

        // Snapshot before the mask changes
        stroke.capture(layer.mask(), dab.bounds(geom.width, geom.height));

        if self.brush.magic_enabled {
            let source = self.source_cache.ensure(layer);
            apply_magic_dab(
                layer.mask_mut(),
                source,
                &dab,
                self.brush.magic_tolerance,
                self.config.max_magic_radius,
            );
        } else {
            apply_dab(layer.mask_mut(), &dab);
        }
    }
}
