//! Coordinate conversion between screen, world and layer pixel space
//!
//! The forward paint transform of a layer is: translate to `(x, y)`, rotate
//! by `rot`, scale by `(scale * flipX, scale * flipY)`, draw centered.
//! [`world_to_layer_pixel`] is its exact inverse.

use crate::camera::Camera;
use crate::constants::INVERSE_SCALE_EPSILON;
use crate::layer::Layer;
use crate::types::{LayerGeometry, Vec2};

/// Screen point to world point under `camera`
#[inline]
pub fn screen_to_world(camera: &Camera, p: Vec2) -> Vec2 {
    camera.screen_to_world(p)
}

#[inline]
fn signed_scale(geom: &LayerGeometry) -> Vec2 {
    let s = geom.transform.scale;
    Vec2::new(s * geom.flip.sign_x(), s * geom.flip.sign_y())
}

/// World point to fractional layer pixel coordinates `(u, v)`
pub fn world_to_layer_pixel(geom: &LayerGeometry, p: Vec2) -> Vec2 {
    let d = p - geom.transform.position();
    let rotated = Vec2::from_angle(-geom.transform.rot).rotate(d);

    let s = signed_scale(geom);
    let sx = if s.x.abs() < INVERSE_SCALE_EPSILON { 1.0 } else { s.x };
    let sy = if s.y.abs() < INVERSE_SCALE_EPSILON { 1.0 } else { s.y };

    Vec2::new(
        rotated.x / sx + geom.width as f32 / 2.0,
        rotated.y / sy + geom.height as f32 / 2.0,
    )
}

/// Layer pixel coordinates back to world space (the forward paint transform)
pub fn layer_pixel_to_world(geom: &LayerGeometry, uv: Vec2) -> Vec2 {
    let local = Vec2::new(
        uv.x - geom.width as f32 / 2.0,
        uv.y - geom.height as f32 / 2.0,
    ) * signed_scale(geom);
    Vec2::from_angle(geom.transform.rot).rotate(local) + geom.transform.position()
}

/// Whether fractional pixel coordinates fall on the layer
#[inline]
pub fn contains_pixel(geom: &LayerGeometry, uv: Vec2) -> bool {
    uv.x >= 0.0 && uv.y >= 0.0 && uv.x < geom.width as f32 && uv.y < geom.height as f32
}

/// Whether a world point lands inside the layer's pixel rectangle
#[inline]
pub fn is_inside_layer(geom: &LayerGeometry, p: Vec2) -> bool {
    contains_pixel(geom, world_to_layer_pixel(geom, p))
}

/// Topmost visible layer under a world point.
///
/// `layers` is in paint order (last = top).
pub fn pick_topmost(layers: &[Layer], p: Vec2) -> Option<&Layer> {
    layers
        .iter()
        .rev()
        .filter(|layer| layer.visible)
        .find(|layer| is_inside_layer(&layer.geometry(), p))
}

/// World-space corners of a layer, clockwise from top-left
pub fn layer_corners(geom: &LayerGeometry) -> [Vec2; 4] {
    let (w, h) = (geom.width as f32, geom.height as f32);
    [
        layer_pixel_to_world(geom, Vec2::new(0.0, 0.0)),
        layer_pixel_to_world(geom, Vec2::new(w, 0.0)),
        layer_pixel_to_world(geom, Vec2::new(w, h)),
        layer_pixel_to_world(geom, Vec2::new(0.0, h)),
    ]
}
