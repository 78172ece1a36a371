//! Zoom tool: pan and pinch the camera

use tracing::trace;

use super::{PairMetrics, PointerSet};
use crate::camera::Camera;
use crate::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomMode {
    Idle,
    Pan {
        start_pointer: Vec2,
        start_translation: Vec2,
    },
    Pinch {
        start_scale: f32,
        start: PairMetrics,
        /// World point under the pinch midpoint at baseline
        start_world_mid: Vec2,
    },
}

/// Camera pan/zoom gesture. Never touches document state or history.
#[derive(Debug)]
pub struct ZoomController {
    mode: ZoomMode,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomController {
    pub fn new() -> Self {
        Self { mode: ZoomMode::Idle }
    }

    #[inline]
    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode != ZoomMode::Idle
    }

    pub fn pointer_down(&mut self, pointers: &PointerSet, camera: &Camera) {
        self.rebaseline(pointers, camera);
    }

    pub fn pointer_move(&mut self, pointers: &PointerSet, camera: &mut Camera) {
        let needs_rebaseline = match self.mode {
            ZoomMode::Idle => return,
            ZoomMode::Pan { .. } => pointers.len() != 1,
            ZoomMode::Pinch { .. } => pointers.len() < 2,
        };
        if needs_rebaseline {
            self.rebaseline(pointers, camera);
        }

        match self.mode {
            ZoomMode::Idle => {}
            ZoomMode::Pan {
                start_pointer,
                start_translation,
            } => {
                let Some(p) = pointers.first() else { return };
                let t = start_translation + (p - start_pointer);
                camera.tx = t.x;
                camera.ty = t.y;
            }
            ZoomMode::Pinch {
                start_scale,
                start,
                start_world_mid,
            } => {
                let Some((a, b)) = pointers.first_two() else { return };
                let now = PairMetrics::of(a, b);
                camera.set_scale_about(start_scale * now.ratio_to(&start), now.mid, start_world_mid);
            }
        }
    }

    /// A pointer lifted or was cancelled. `pointers` no longer contains it.
    pub fn pointer_up(&mut self, pointers: &PointerSet, camera: &Camera) {
        if pointers.is_empty() {
            self.finish();
        } else {
            self.rebaseline(pointers, camera);
        }
    }

    pub fn finish(&mut self) {
        self.mode = ZoomMode::Idle;
    }

    fn rebaseline(&mut self, pointers: &PointerSet, camera: &Camera) {
        self.mode = match (pointers.first(), pointers.first_two()) {
            (_, Some((a, b))) => {
                let pair = PairMetrics::of(a, b);
                ZoomMode::Pinch {
                    start_scale: camera.scale,
                    start: pair,
                    start_world_mid: camera.screen_to_world(pair.mid),
                }
            }
            (Some(p), None) => ZoomMode::Pan {
                start_pointer: p,
                start_translation: camera.translation(),
            },
            (None, None) => ZoomMode::Idle,
        };
        trace!("Zoom gesture re-baselined: {:?}", self.mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_pointer_pans() {
        let mut camera = Camera::default();
        let mut ctl = ZoomController::new();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(10.0, 10.0));
        ctl.pointer_down(&pointers, &camera);
        pointers.update(1, Vec2::new(35.0, -5.0));
        ctl.pointer_move(&pointers, &mut camera);

        assert_eq!(camera.translation(), Vec2::new(25.0, -15.0));
        assert_eq!(camera.scale, 1.0);
    }

    #[test]
    fn test_pinch_keeps_midpoint_world_fixed() {
        let mut camera = Camera::default();
        let mut ctl = ZoomController::new();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(100.0, 100.0));
        pointers.insert(2, Vec2::new(200.0, 100.0));
        ctl.pointer_down(&pointers, &camera);
        let world_mid = camera.screen_to_world(Vec2::new(150.0, 100.0));

        pointers.update(1, Vec2::new(50.0, 100.0));
        pointers.update(2, Vec2::new(250.0, 100.0));
        ctl.pointer_move(&pointers, &mut camera);

        assert!((camera.scale - 2.0).abs() < 1e-5);
        let after = camera.screen_to_world(Vec2::new(150.0, 100.0));
        assert!((after - world_mid).length() < 1e-3);
    }

    #[test]
    fn test_pinch_clamped() {
        let mut camera = Camera::default();
        let mut ctl = ZoomController::new();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(0.0, 0.0));
        pointers.insert(2, Vec2::new(10.0, 0.0));
        ctl.pointer_down(&pointers, &camera);
        pointers.update(2, Vec2::new(1000.0, 0.0));
        ctl.pointer_move(&pointers, &mut camera);

        assert_eq!(camera.scale, layering_config::DEFAULT_MAX_VIEW_SCALE);
    }

    #[test]
    fn test_release_returns_to_pan_then_idle() {
        let camera = Camera::default();
        let mut ctl = ZoomController::new();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::ZERO);
        pointers.insert(2, Vec2::new(10.0, 0.0));
        ctl.pointer_down(&pointers, &camera);
        assert!(matches!(ctl.mode(), ZoomMode::Pinch { .. }));

        pointers.remove(2);
        ctl.pointer_up(&pointers, &camera);
        assert!(matches!(ctl.mode(), ZoomMode::Pan { .. }));

        pointers.remove(1);
        ctl.pointer_up(&pointers, &camera);
        assert!(!ctl.is_active());
    }
}
