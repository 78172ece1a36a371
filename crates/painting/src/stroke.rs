//! Stroke capture - bounded before/after snapshots for one brush gesture
//!
//! Before each dab touches the mask, the capture grows its "before" patch
//! to cover the dab rectangle. Only pixels not already held are read, so a
//! stroke costs memory proportional to the area it touched rather than the
//! whole layer.

use tracing::{debug, trace};

use crate::history::HistoryAction;
use crate::surface::{PixelPatch, PixelRect, PixelSurface};
use crate::types::{BrushMode, LayerId, Vec2};

/// State of one in-progress brush gesture
#[derive(Debug, Clone)]
pub struct StrokeCapture {
    layer_id: LayerId,
    mode: BrushMode,
    /// Previous dab center in world space, for interpolation
    last_center: Option<Vec2>,
    /// Original mask pixels over the union of every touched rectangle
    before: Option<PixelPatch>,
}

impl StrokeCapture {
    pub fn new(layer_id: LayerId, mode: BrushMode) -> Self {
        Self {
            layer_id,
            mode,
            last_center: None,
            before: None,
        }
    }

    #[inline]
    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    #[inline]
    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    #[inline]
    pub fn last_center(&self) -> Option<Vec2> {
        self.last_center
    }

    #[inline]
    pub fn set_last_center(&mut self, center: Vec2) {
        self.last_center = Some(center);
    }

    /// Union of all rectangles captured so far
    pub fn bbox(&self) -> Option<PixelRect> {
        self.before.as_ref().map(PixelPatch::rect)
    }

    /// Snapshot the pixels of `rect` that are not yet held.
    ///
    /// Must run before the dab covering `rect` is applied to `mask`.
    pub fn capture(&mut self, mask: &PixelSurface, rect: PixelRect) {
        let rect = mask.clamp_rect(rect);
        if rect.is_empty() {
            return;
        }

        let Some(old) = self.before.take() else {
            trace!("StrokeCapture: initial {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);
            self.before = Some(mask.read_rect(rect));
            return;
        };

        let held = old.rect();
        if held.contains_rect(&rect) {
            self.before = Some(old);
            return;
        }

        let grown = held.union(&rect);
        let mut patch = PixelPatch::blank(grown);
        patch.blit(&old);

        // Top and bottom stripes span the full width, side stripes only the held rows
        let stripes = [
            PixelRect::new(grown.x, grown.y, grown.width, held.y - grown.y),
            PixelRect::new(grown.x, held.bottom(), grown.width, grown.bottom() - held.bottom()),
            PixelRect::new(grown.x, held.y, held.x - grown.x, held.height),
            PixelRect::new(held.right(), held.y, grown.right() - held.right(), held.height),
        ];
        for stripe in stripes.iter().filter(|s| !s.is_empty()) {
            patch.blit(&mask.read_rect(*stripe));
        }

        trace!(
            "StrokeCapture: grew {}x{} -> {}x{}",
            held.width, held.height, grown.width, grown.height
        );
        self.before = Some(patch);
    }

    /// End the gesture. Returns a mask action when anything was captured.
    pub fn finish(self, mask: &PixelSurface) -> Option<HistoryAction> {
        let before = self.before?;
        let after = mask.read_rect(before.rect());
        debug!(
            "StrokeCapture: finished {:?} on {} ({}x{})",
            self.mode,
            self.layer_id,
            before.rect().width,
            before.rect().height
        );
        Some(HistoryAction::Mask {
            layer: self.layer_id,
            before,
            after,
        })
    }
}
