//! Magic brush: contiguous color-similar region selection
//!
//! A magic dab samples a reference color from the layer's original pixels,
//! then flood-fills (8-connected) from the dab center. A pixel joins the
//! fill only if it lies inside the dab circle and its RGB distance from the
//! reference is within tolerance. Rejected pixels are never expanded, so the
//! fill stops at color edges instead of selecting every similar pixel.

use tracing::{debug, trace};

use crate::brush::{apply_dab, blend_alpha, coverage, Dab};
use crate::layer::Layer;
use crate::surface::{PixelRect, PixelSurface};
use crate::types::{LayerId, Vec2};

/// Largest possible squared RGB distance (255² · 3)
pub const MAX_COLOR_DISTANCE_SQ: f32 = 195_075.0;

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// RGB snapshot of one layer's source pixels.
///
/// Only one snapshot is held at a time. It is rebuilt whenever a different
/// layer asks for it.
#[derive(Debug, Default)]
pub struct SourceCache {
    layer_id: Option<LayerId>,
    width: u32,
    height: u32,
    rgb: Vec<[u8; 3]>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer the snapshot currently belongs to
    pub fn layer_id(&self) -> Option<LayerId> {
        self.layer_id
    }

    /// Make sure the snapshot holds `layer`'s pixels
    pub fn ensure(&mut self, layer: &Layer) -> SourceView<'_> {
        if self.layer_id != Some(layer.id()) {
            let source = layer.source();
            self.rgb = source.pixels().iter().map(|p| [p[0], p[1], p[2]]).collect();
            self.width = source.width;
            self.height = source.height;
            self.layer_id = Some(layer.id());
            debug!("SourceCache: snapshot {} ({}x{})", layer.id(), self.width, self.height);
        }
        SourceView {
            width: self.width,
            height: self.height,
            rgb: &self.rgb,
        }
    }

    /// Drop the snapshot unless it belongs to `keep`
    pub fn invalidate_except(&mut self, keep: Option<LayerId>) {
        if self.layer_id.is_some() && self.layer_id != keep {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.layer_id = None;
        self.width = 0;
        self.height = 0;
        self.rgb = Vec::new();
    }
}

/// Borrowed RGB pixels of a cached source
#[derive(Debug, Clone, Copy)]
pub struct SourceView<'a> {
    pub width: u32,
    pub height: u32,
    rgb: &'a [[u8; 3]],
}

impl SourceView<'_> {
    #[inline]
    fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.rgb[y as usize * self.width as usize + x as usize]
    }

    /// Average RGB over the 3x3 neighborhood around `(x, y)`, clipped to the surface
    pub fn sample_reference(&self, x: u32, y: u32) -> [f32; 3] {
        let mut sum = [0.0f32; 3];
        let mut count = 0.0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let sx = x as i64 + dx;
                let sy = y as i64 + dy;
                if sx < 0 || sy < 0 || sx >= self.width as i64 || sy >= self.height as i64 {
                    continue;
                }
                let p = self.get(sx as u32, sy as u32);
                for c in 0..3 {
                    sum[c] += p[c] as f32;
                }
                count += 1.0;
            }
        }
        if count == 0.0 {
            return sum;
        }
        sum.map(|s| s / count)
    }
}

#[inline]
fn color_distance_sq(a: [u8; 3], reference: [f32; 3]) -> f32 {
    let dr = a[0] as f32 - reference[0];
    let dg = a[1] as f32 - reference[1];
    let db = a[2] as f32 - reference[2];
    dr * dr + dg * dg + db * db
}

/// Squared-distance threshold for a tolerance in 0-100
#[inline]
pub fn tolerance_threshold(tolerance: f32) -> f32 {
    let tol = (tolerance / 100.0).clamp(0.0, 1.0);
    MAX_COLOR_DISTANCE_SQ * tol * tol
}

/// Apply a magic dab.
///
/// Falls back to the standard dab when the radius exceeds `max_radius`.
/// Returns the dab rectangle, or None when the dab misses the surface.
pub fn apply_magic_dab(
    mask: &mut PixelSurface,
    source: SourceView<'_>,
    dab: &Dab,
    tolerance: f32,
    max_radius: f32,
) -> Option<PixelRect> {
    if dab.radius > max_radius {
        trace!("apply_magic_dab: r={:.1} over ceiling, standard dab", dab.radius);
        return apply_dab(mask, dab);
    }
    if dab.radius <= 0.0 || dab.strength <= 0.0 || !dab.touches(mask.width, mask.height) {
        return None;
    }

    let (w, h) = (mask.width, mask.height);
    let rect = dab.bounds(w, h);
    if rect.is_empty() {
        return None;
    }

    // A center past the edge starts the fill from the nearest edge pixel
    let start_x = (dab.center.x.floor().max(0.0) as u32).min(w - 1);
    let start_y = (dab.center.y.floor().max(0.0) as u32).min(h - 1);

    let reference = source.sample_reference(start_x, start_y);
    let threshold = tolerance_threshold(tolerance);
    let r_sq = dab.radius * dab.radius;

    let rw = rect.width as usize;
    let local = |x: u32, y: u32| (y - rect.y) as usize * rw + (x - rect.x) as usize;
    let mut visited = vec![false; rect.area()];
    let mut stack = vec![(start_x, start_y)];
    visited[local(start_x, start_y)] = true;
    let mut filled = 0usize;

    let pixels = mask.pixels_mut();
    while let Some((x, y)) = stack.pop() {
        let d_sq = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance_squared(dab.center);
        if d_sq > r_sq {
            continue;
        }
        if color_distance_sq(source.get(x, y), reference) > threshold {
            continue;
        }

        let c = coverage(d_sq.sqrt() / dab.radius, dab.hardness);
        if c > 0.0 {
            let pixel = &mut pixels[y as usize * w as usize + x as usize];
            *pixel = [255, 255, 255, blend_alpha(pixel[3], dab.mode, dab.strength, c)];
        }
        filled += 1;

        for (dx, dy) in NEIGHBORS {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < rect.x as i64
                || ny < rect.y as i64
                || nx >= rect.right() as i64
                || ny >= rect.bottom() as i64
            {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let idx = local(nx, ny);
            if !visited[idx] {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    trace!("apply_magic_dab: filled {} px in {}x{}", filled, rect.width, rect.height);
    Some(rect)
}
