//! Brush engine: falloff stamp, mask blending and dab interpolation
//!
//! Brush size is given in screen pixels so the brush looks the same at every
//! camera zoom. It is converted to layer pixels with the layer's own scale,
//! so a layer enlarged on screen receives a proportionally smaller stamp.

use layering_config::BrushDefaults;
use tracing::debug;

use crate::constants::{DAB_MARGIN, DAB_SPACING, SCALE_EPSILON};
use crate::surface::{PixelRect, PixelSurface};
use crate::types::{BrushMode, Vec2};

/// Current brush parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BrushSettings {
    /// Diameter in screen pixels
    pub size: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    /// Peak effect per dab 0.0-1.0
    pub strength: f32,
    /// Restrict dabs to contiguous, color-similar source pixels
    pub magic_enabled: bool,
    /// Magic tolerance 0-100
    pub magic_tolerance: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from(&BrushDefaults::default())
    }
}

impl From<&BrushDefaults> for BrushSettings {
    fn from(defaults: &BrushDefaults) -> Self {
        Self::new(
            defaults.size,
            defaults.hardness,
            defaults.strength,
            false,
            defaults.magic_tolerance,
        )
    }
}

impl BrushSettings {
    /// Create brush settings, clamping every parameter to its range
    pub fn new(size: f32, hardness: f32, strength: f32, magic_enabled: bool, magic_tolerance: f32) -> Self {
        Self {
            size: size.max(0.0),
            hardness: hardness.clamp(0.0, 1.0),
            strength: strength.clamp(0.0, 1.0),
            magic_enabled,
            magic_tolerance: magic_tolerance.clamp(0.0, 100.0),
        }
    }

    /// Radius in layer pixels for a layer drawn at `layer_scale`
    #[inline]
    pub fn pixel_radius(&self, layer_scale: f32) -> f32 {
        (self.size * 0.5) / layer_scale.max(SCALE_EPSILON)
    }
}

/// Output from the brush for a single dab, in layer pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dab {
    /// Center in fractional layer pixels
    pub center: Vec2,
    /// Radius in layer pixels
    pub radius: f32,
    pub hardness: f32,
    pub strength: f32,
    pub mode: BrushMode,
}

impl Dab {
    /// Whether the dab's circle can touch a `width` x `height` surface
    pub fn touches(&self, width: u32, height: u32) -> bool {
        let r = self.radius;
        !(self.center.x < -r
            || self.center.y < -r
            || self.center.x > width as f32 + r
            || self.center.y > height as f32 + r)
    }

    /// Integer bounds (center ± radius ± margin) clamped to the surface
    pub fn bounds(&self, width: u32, height: u32) -> PixelRect {
        let reach = self.radius + DAB_MARGIN;
        PixelRect::from_edges_clamped(
            (self.center.x - reach).floor() as i64,
            (self.center.y - reach).floor() as i64,
            (self.center.x + reach).ceil() as i64,
            (self.center.y + reach).ceil() as i64,
            width,
            height,
        )
    }
}

/// Radial coverage for a pixel.
///
/// `t` is distance / radius. Coverage is 1 inside `hardness`, falls linearly
/// to 0 at the rim and is 0 outside.
#[inline]
pub fn coverage(t: f32, hardness: f32) -> f32 {
    if t > 1.0 {
        return 0.0;
    }
    let hardness = hardness.clamp(0.0, 1.0);
    if hardness >= 0.9999 || t <= hardness {
        1.0
    } else {
        (1.0 - (t - hardness) / (1.0 - hardness).max(SCALE_EPSILON)).clamp(0.0, 1.0)
    }
}

/// Blend one mask alpha value.
///
/// Restore: `a' = s*c + a*(1 - s*c)`; erase: `a' = a*(1 - s*c)`.
#[inline]
pub fn blend_alpha(old: u8, mode: BrushMode, strength: f32, coverage: f32) -> u8 {
    let effect = (strength * coverage).clamp(0.0, 1.0);
    let a = old as f32 / 255.0;
    let out = match mode {
        BrushMode::Erase => a * (1.0 - effect),
        BrushMode::Restore => effect + a * (1.0 - effect),
    };
    (out.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Apply a standard dab to a mask surface.
///
/// Returns the rectangle of pixels visited, or None when the dab misses the
/// surface entirely.
pub fn apply_dab(mask: &mut PixelSurface, dab: &Dab) -> Option<PixelRect> {
    if dab.radius <= 0.0 || dab.strength <= 0.0 || !dab.touches(mask.width, mask.height) {
        return None;
    }

    let rect = dab.bounds(mask.width, mask.height);
    if rect.is_empty() {
        return None;
    }

    let r = dab.radius;
    let width = mask.width as usize;
    let pixels = mask.pixels_mut();
    for py in rect.y..rect.bottom() {
        for px in rect.x..rect.right() {
            let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(dab.center);
            let c = coverage(d / r, dab.hardness);
            if c <= 0.0 {
                continue;
            }
            let pixel = &mut pixels[py as usize * width + px as usize];
            *pixel = [255, 255, 255, blend_alpha(pixel[3], dab.mode, dab.strength, c)];
        }
    }

    debug!(
        "apply_dab: center=({:.1}, {:.1}) r={:.1} mode={:?} -> {}x{} at ({}, {})",
        dab.center.x, dab.center.y, r, dab.mode, rect.width, rect.height, rect.x, rect.y
    );
    Some(rect)
}

/// Spacing between interpolated dabs, in layer pixels
#[inline]
pub fn dab_step(radius: f32) -> f32 {
    (radius * DAB_SPACING).max(1.0)
}

/// Evenly spaced points from `from` (exclusive) to `to` (inclusive).
///
/// `len` is the segment length measured in the space `step` is expressed in,
/// so world-space endpoints can be spaced by a layer-pixel step.
pub fn interpolate(from: Vec2, to: Vec2, len: f32, step: f32) -> impl Iterator<Item = Vec2> {
    let n = ((len / step.max(SCALE_EPSILON)).ceil() as usize).max(1);
    (1..=n).map(move |i| from.lerp(to, i as f32 / n as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_mask(w: u32, h: u32) -> PixelSurface {
        PixelSurface::filled(w, h, [255, 255, 255, 255])
    }

    fn dab(x: f32, y: f32, radius: f32, mode: BrushMode) -> Dab {
        Dab {
            center: Vec2::new(x, y),
            radius,
            hardness: 1.0,
            strength: 1.0,
            mode,
        }
    }

    #[test]
    fn test_brush_settings_default() {
        let settings = BrushSettings::default();
        assert_eq!(settings.size, 60.0);
        assert!(!settings.magic_enabled);
        assert_eq!(settings.magic_tolerance, 25.0);
    }

    #[test]
    fn test_brush_settings_clamped() {
        let settings = BrushSettings::new(-3.0, 2.0, -1.0, true, 250.0);
        assert_eq!(settings.size, 0.0);
        assert_eq!(settings.hardness, 1.0);
        assert_eq!(settings.strength, 0.0);
        assert_eq!(settings.magic_tolerance, 100.0);
    }

    #[test]
    fn test_pixel_radius_scales_with_layer() {
        let settings = BrushSettings::new(40.0, 1.0, 1.0, false, 0.0);
        assert!((settings.pixel_radius(1.0) - 20.0).abs() < 1e-6);
        assert!((settings.pixel_radius(2.0) - 10.0).abs() < 1e-6);
        assert!(settings.pixel_radius(0.0).is_finite());
    }

    #[test]
    fn test_coverage() {
        // Hard brush
        assert_eq!(coverage(0.0, 1.0), 1.0);
        assert_eq!(coverage(0.99, 1.0), 1.0);
        assert_eq!(coverage(1.01, 1.0), 0.0);

        // Soft brush
        assert_eq!(coverage(0.0, 0.0), 1.0);
        assert!((coverage(0.5, 0.0) - 0.5).abs() < 1e-6);
        assert_eq!(coverage(1.0, 0.0), 0.0);

        // Medium brush
        assert_eq!(coverage(0.4, 0.5), 1.0);
        assert!((coverage(0.75, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_blend_alpha_modes() {
        assert_eq!(blend_alpha(255, BrushMode::Erase, 1.0, 1.0), 0);
        assert_eq!(blend_alpha(0, BrushMode::Restore, 1.0, 1.0), 255);
        assert_eq!(blend_alpha(255, BrushMode::Erase, 0.5, 1.0), 128);
        assert_eq!(blend_alpha(0, BrushMode::Restore, 0.5, 1.0), 128);
        assert_eq!(blend_alpha(200, BrushMode::Erase, 1.0, 0.0), 200);
    }

    #[test]
    fn test_single_erase_dab() {
        let mut mask = opaque_mask(100, 100);
        let rect = apply_dab(&mut mask, &dab(50.0, 50.0, 20.0, BrushMode::Erase));
        assert!(rect.is_some());
        assert_eq!(mask.alpha(50, 50), 0);
        assert_eq!(mask.alpha(50, 95), 255);
    }

    #[test]
    fn test_erase_then_restore_returns_alpha() {
        let mut mask = opaque_mask(64, 64);
        apply_dab(&mut mask, &dab(32.0, 32.0, 10.0, BrushMode::Erase));
        assert_eq!(mask.alpha(32, 32), 0);
        apply_dab(&mut mask, &dab(32.0, 32.0, 10.0, BrushMode::Restore));
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(mask.alpha(x, y), 255, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_dab_outside_surface() {
        let mut mask = opaque_mask(32, 32);
        assert!(apply_dab(&mut mask, &dab(-50.0, 10.0, 5.0, BrushMode::Erase)).is_none());
        assert!(apply_dab(&mut mask, &dab(10.0, 90.0, 5.0, BrushMode::Erase)).is_none());
    }

    #[test]
    fn test_dab_bounds_margin_and_clamp() {
        let d = dab(10.0, 10.0, 5.0, BrushMode::Erase);
        assert_eq!(d.bounds(100, 100), PixelRect::new(3, 3, 14, 14));
        assert_eq!(d.bounds(12, 12), PixelRect::new(3, 3, 9, 9));
    }

    #[test]
    fn test_interpolate_counts() {
        let pts: Vec<_> = interpolate(Vec2::ZERO, Vec2::new(10.0, 0.0), 10.0, 2.5).collect();
        assert_eq!(pts.len(), 4);
        assert!((pts[3] - Vec2::new(10.0, 0.0)).length() < 1e-6);

        // Zero-length segments still produce the end dab
        let pts: Vec<_> = interpolate(Vec2::ONE, Vec2::ONE, 0.0, 1.0).collect();
        assert_eq!(pts, vec![Vec2::ONE]);
    }

    #[test]
    fn test_dab_step_floor() {
        assert_eq!(dab_step(1.0), 1.0);
        assert!((dab_step(20.0) - 7.0).abs() < 1e-6);
    }
}
