//! Layer model: source pixels, alpha mask and the cached composite

use crate::surface::{PixelPatch, PixelSurface};
use crate::types::{Flip, LayerGeometry, LayerId, LayerTransform};

/// Mask value for a fully shown pixel
pub const MASK_OPAQUE: [u8; 4] = [255, 255, 255, 255];

/// One imported image with its own transform and erase mask.
///
/// The composite is derived from `source` and `mask` and is rebuilt lazily
/// by [`Layer::composite`] after any mask mutation.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub transform: LayerTransform,
    pub flip: Flip,
    opacity: f32,
    pub visible: bool,
    source: PixelSurface,
    mask: PixelSurface,
    composite: PixelSurface,
    composite_dirty: bool,
}

impl Layer {
    /// Create a layer around decoded pixels. The mask starts fully opaque.
    pub fn new(id: LayerId, name: impl Into<String>, source: PixelSurface) -> Self {
        let (width, height) = (source.width, source.height);
        Self {
            id,
            name: name.into(),
            transform: LayerTransform::default(),
            flip: Flip::default(),
            opacity: 1.0,
            visible: true,
            mask: PixelSurface::filled(width, height, MASK_OPAQUE),
            composite: PixelSurface::new(width, height),
            composite_dirty: true,
            source,
        }
    }

    /// Center the layer in a viewport and pick a scale so it covers at most
    /// `fraction` of either viewport side, never enlarging past 1:1.
    pub fn fit_to_viewport(&mut self, view_width: f32, view_height: f32, fraction: f32) {
        let w = self.width().max(1) as f32;
        let h = self.height().max(1) as f32;
        let scale = ((view_width * fraction) / w)
            .min((view_height * fraction) / h)
            .min(1.0);
        self.transform = LayerTransform {
            x: view_width * 0.5,
            y: view_height * 0.5,
            scale: scale.max(f32::MIN_POSITIVE),
            rot: 0.0,
        };
    }

    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.source.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.source.height
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Snapshot of the data needed for coordinate mapping
    #[inline]
    pub fn geometry(&self) -> LayerGeometry {
        LayerGeometry {
            transform: self.transform,
            flip: self.flip,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Original imported pixels
    #[inline]
    pub fn source(&self) -> &PixelSurface {
        &self.source
    }

    #[inline]
    pub fn mask(&self) -> &PixelSurface {
        &self.mask
    }

    /// Mutable mask access. Invalidates the composite.
    #[inline]
    pub fn mask_mut(&mut self) -> &mut PixelSurface {
        self.composite_dirty = true;
        &mut self.mask
    }

    /// Write a captured mask patch back. Invalidates the composite.
    pub fn write_mask_patch(&mut self, patch: &PixelPatch) {
        self.mask_mut().write_patch(patch);
    }

    #[inline]
    pub fn is_composite_dirty(&self) -> bool {
        self.composite_dirty
    }

    /// Source pixels with their alpha multiplied by the mask alpha.
    ///
    /// Recomputed only when the mask changed since the last call.
    pub fn composite(&mut self) -> &PixelSurface {
        if self.composite_dirty {
            let src = self.source.pixels();
            let mask = self.mask.pixels();
            for ((out, s), m) in self.composite.pixels_mut().iter_mut().zip(src).zip(mask) {
                let alpha = (s[3] as u32 * m[3] as u32 + 127) / 255;
                *out = [s[0], s[1], s[2], alpha as u8];
            }
            self.composite_dirty = false;
        }
        &self.composite
    }

    /// Downscaled preview of the composite with flips applied
    pub fn thumbnail(&mut self, max_side: u32) -> PixelSurface {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return PixelSurface::new(0, 0);
        }
        let s = (max_side as f32 / w.max(h) as f32).min(1.0);
        let tw = ((w as f32 * s).floor() as u32).max(1);
        let th = ((h as f32 * s).floor() as u32).max(1);
        let flip = self.flip;
        let composite = self.composite();

        let mut thumb = PixelSurface::new(tw, th);
        for ty in 0..th {
            for tx in 0..tw {
                let fx = if flip.horizontal { tw - 1 - tx } else { tx };
                let fy = if flip.vertical { th - 1 - ty } else { ty };
                let sx = ((fx as f32 + 0.5) * w as f32 / tw as f32) as u32;
                let sy = ((fy as f32 + 0.5) * h as f32 / th as f32) as u32;
                if let Some(p) = composite.get_pixel(sx.min(w - 1), sy.min(h - 1)) {
                    thumb.set_pixel(tx, ty, p);
                }
            }
        }
        thumb
    }
}
