//! Flatten the layer stack into a single RGBA surface
//!
//! Layers are composited bottom to top with straight-alpha "over", each
//! scaled by its opacity. Output pixels are in physical units: the world is
//! sampled at `(pixel + 0.5) / pixel_ratio`, which matches drawing the world
//! at identity camera onto a device-pixel canvas.

use tracing::{debug, info};

use crate::mapper::{contains_pixel, layer_corners, world_to_layer_pixel};
use crate::stack::LayerStack;
use crate::surface::PixelSurface;
use crate::types::Vec2;

/// Straight-alpha "over" of `src` (with extra alpha `opacity`) onto `dst`.
///
/// Both are RGBA in 0.0-1.0.
#[inline]
fn blend_over(dst: &mut [f32; 4], src: [u8; 4], opacity: f32) {
    let sa = (src[3] as f32 / 255.0) * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3];
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let s = src[c] as f32 / 255.0;
        dst[c] = (s * sa + dst[c] * da * (1.0 - sa)) / out_a;
    }
    dst[3] = out_a;
}

/// Composite every visible layer into an `out_width` by `out_height`
/// surface of device pixels, `pixel_ratio` device pixels per world unit.
pub fn flatten(stack: &mut LayerStack, out_width: u32, out_height: u32, pixel_ratio: f32) -> PixelSurface {
    let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
    let out_w = out_width.max(1);
    let out_h = out_height.max(1);
    let mut acc = vec![[0.0f32; 4]; out_w as usize * out_h as usize];

    let mut drawn = 0usize;
    for layer in stack.iter_mut() {
        if !layer.visible || layer.opacity() <= 0.0 {
            continue;
        }
        let geom = layer.geometry();
        let opacity = layer.opacity();

        // Restrict the scan to the layer's device-space bounding box
        let corners = layer_corners(&geom).map(|c| c * ratio);
        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |m, c| m.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |m, c| m.max(*c));
        let x0 = (min.x.floor().max(0.0) as u32).min(out_w);
        let y0 = (min.y.floor().max(0.0) as u32).min(out_h);
        let x1 = (max.x.ceil().max(0.0) as u32).min(out_w);
        let y1 = (max.y.ceil().max(0.0) as u32).min(out_h);
        if x0 >= x1 || y0 >= y1 {
            continue;
        }

        let composite = layer.composite();
        for py in y0..y1 {
            for px in x0..x1 {
                let world = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) / ratio;
                let uv = world_to_layer_pixel(&geom, world);
                if !contains_pixel(&geom, uv) {
                    continue;
                }
                let Some(src) = composite.get_pixel(uv.x as u32, uv.y as u32) else {
                    continue;
                };
                blend_over(&mut acc[py as usize * out_w as usize + px as usize], src, opacity);
            }
        }
        drawn += 1;
        debug!("flatten: drew {} over ({}, {})..({}, {})", geom.width, x0, y0, x1, y1);
    }

    let mut out = PixelSurface::new(out_w, out_h);
    for (dst, src) in out.pixels_mut().iter_mut().zip(acc) {
        *dst = src.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
    info!("Flattened {} layer(s) into {}x{}", drawn, out_w, out_h);
    out
}
