//! Value types shared across the engine: ids, tools, transforms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MOVE_EPSILON_POSITION, MOVE_EPSILON_ROTATION, MOVE_EPSILON_SCALE};

pub use glam::Vec2;

/// Stable identity of a layer for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer_{}", self.0)
    }
}

/// What a brush dab does to the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BrushMode {
    /// Mask alpha moves toward 0
    #[default]
    Erase = 0,
    /// Mask alpha moves toward 1
    Restore = 1,
}

/// Active editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tool {
    #[default]
    Move,
    Erase,
    Restore,
    Zoom,
}

impl Tool {
    /// Next tool in toolbar order
    pub fn cycle(self) -> Self {
        match self {
            Tool::Move => Tool::Erase,
            Tool::Erase => Tool::Restore,
            Tool::Restore => Tool::Zoom,
            Tool::Zoom => Tool::Move,
        }
    }

    /// The brush mode for painting tools, None otherwise
    pub fn brush_mode(self) -> Option<BrushMode> {
        match self {
            Tool::Erase => Some(BrushMode::Erase),
            Tool::Restore => Some(BrushMode::Restore),
            Tool::Move | Tool::Zoom => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Move => "Move",
            Tool::Erase => "Erase",
            Tool::Restore => "Restore",
            Tool::Zoom => "Zoom",
        }
    }
}

/// Placement of a layer in world space.
///
/// `x`/`y` is the layer center, `rot` is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rot: f32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rot: 0.0,
        }
    }
}

impl LayerTransform {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn set_position(&mut self, p: Vec2) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Whether `self` differs from `other` enough to be recorded as an edit
    pub fn differs_from(&self, other: &LayerTransform) -> bool {
        (self.x - other.x).abs() > MOVE_EPSILON_POSITION
            || (self.y - other.y).abs() > MOVE_EPSILON_POSITION
            || (self.scale - other.scale).abs() > MOVE_EPSILON_SCALE
            || (self.rot - other.rot).abs() > MOVE_EPSILON_ROTATION
    }
}

/// Per-axis mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    /// -1.0 when mirrored left-right, +1.0 otherwise
    #[inline]
    pub fn sign_x(&self) -> f32 {
        if self.horizontal { -1.0 } else { 1.0 }
    }

    /// -1.0 when mirrored top-bottom, +1.0 otherwise
    #[inline]
    pub fn sign_y(&self) -> f32 {
        if self.vertical { -1.0 } else { 1.0 }
    }
}

/// Everything needed to map between world and layer pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGeometry {
    pub transform: LayerTransform,
    pub flip: Flip,
    /// Natural pixel dimensions
    pub width: u32,
    pub height: u32,
}
