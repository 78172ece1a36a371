//! World-to-screen camera shared by all layers
//!
//! Pan + uniform zoom. The camera is view state only: it is never part of
//! the undo history.

use layering_config::{DEFAULT_MAX_VIEW_SCALE, DEFAULT_MIN_VIEW_SCALE};

use crate::constants::SCALE_EPSILON;
use crate::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Screen pixels per world unit
    pub scale: f32,
    /// Screen-space translation
    pub tx: f32,
    pub ty: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_VIEW_SCALE, DEFAULT_MAX_VIEW_SCALE)
    }
}

impl Camera {
    /// Identity camera with the given zoom bounds
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
            min_scale,
            max_scale: max_scale.max(min_scale),
        }
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    /// Clamp a scale to the zoom bounds
    #[inline]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Screen point to world point
    #[inline]
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        (p - self.translation()) / self.scale.max(SCALE_EPSILON)
    }

    /// World point to screen point
    #[inline]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.translation()
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.tx += delta.x;
        self.ty += delta.y;
    }

    /// Set a new (clamped) scale while keeping `world` under `screen`
    pub fn set_scale_about(&mut self, scale: f32, screen: Vec2, world: Vec2) {
        self.scale = self.clamp_scale(scale);
        self.tx = screen.x - world.x * self.scale;
        self.ty = screen.y - world.y * self.scale;
    }

    /// Multiply the scale by `factor` keeping the world point under `screen` fixed
    pub fn zoom_about(&mut self, screen: Vec2, factor: f32) {
        let world = self.screen_to_world(screen);
        self.set_scale_about(self.scale * factor, screen, world);
    }
}
