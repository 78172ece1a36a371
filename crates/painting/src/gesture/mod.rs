//! Pointer input and the gesture controllers that interpret it
//!
//! Pointer positions are in screen pixels. Controllers are handed the set of
//! pointers currently down and re-baseline whenever its size changes, so
//! lifting or adding a finger never makes the target jump.

mod move_gesture;
mod zoom;

pub use move_gesture::{rotate_handle, MoveController, MoveMode};
pub use zoom::{ZoomController, ZoomMode};

use serde::{Deserialize, Serialize};

use crate::types::Vec2;

pub type PointerId = u64;

/// Input device behind a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// One raw pointer event in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        id: PointerId,
        pos: Vec2,
        kind: PointerKind,
    },
    Move {
        id: PointerId,
        pos: Vec2,
    },
    Up {
        id: PointerId,
    },
    /// Treated exactly like `Up`
    Cancel {
        id: PointerId,
    },
}

impl PointerEvent {
    pub fn id(&self) -> PointerId {
        match *self {
            PointerEvent::Down { id, .. }
            | PointerEvent::Move { id, .. }
            | PointerEvent::Up { id }
            | PointerEvent::Cancel { id } => id,
        }
    }
}

/// One wheel notch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Pointer position in screen space
    pub pos: Vec2,
    /// Positive means "scroll down"
    pub delta_y: f32,
    /// Rotate instead of scale (Shift on desktop)
    pub rotate_modifier: bool,
}

impl WheelInput {
    /// +1 for scroll up, -1 for scroll down
    #[inline]
    pub fn direction(&self) -> f32 {
        if self.delta_y > 0.0 { -1.0 } else { 1.0 }
    }
}

/// Pointers currently down, in the order they were pressed
#[derive(Debug, Clone, Default)]
pub struct PointerSet {
    points: Vec<(PointerId, Vec2)>,
}

impl PointerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pointer, or update it if already present
    pub fn insert(&mut self, id: PointerId, pos: Vec2) {
        if !self.update(id, pos) {
            self.points.push((id, pos));
        }
    }

    /// Move a known pointer. Returns false for unknown ids.
    pub fn update(&mut self, id: PointerId, pos: Vec2) -> bool {
        match self.points.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => {
                entry.1 = pos;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: PointerId) -> bool {
        let before = self.points.len();
        self.points.retain(|(pid, _)| *pid != id);
        self.points.len() != before
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.points.iter().any(|(pid, _)| *pid == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Vec2> {
        self.points.first().map(|(_, p)| *p)
    }

    /// The two oldest pointers
    pub fn first_two(&self) -> Option<(Vec2, Vec2)> {
        match self.points.as_slice() {
            [(_, a), (_, b), ..] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Midpoint, distance and angle of a two-pointer pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetrics {
    pub mid: Vec2,
    pub dist: f32,
    pub angle: f32,
}

impl PairMetrics {
    pub fn of(a: Vec2, b: Vec2) -> Self {
        let d = b - a;
        Self {
            mid: (a + b) * 0.5,
            dist: d.length(),
            angle: d.y.atan2(d.x),
        }
    }

    /// Current distance over baseline distance, 1.0 for a degenerate baseline
    pub fn ratio_to(&self, baseline: &PairMetrics) -> f32 {
        if baseline.dist > crate::constants::DISTANCE_EPSILON {
            self.dist / baseline.dist
        } else {
            1.0
        }
    }
}
