//! Move tool: drag, pinch and rotate the active layer
//!
//! One pointer translates. Two pointers translate by the centroid, scale by
//! the pointer-distance ratio and rotate by the pointer-angle delta. A mouse
//! press on the rotate handle rotates the layer around its center instead.
//! The whole gesture, however many re-baselines it went through, is
//! committed as one `Move` action when the last pointer lifts.

use tracing::{debug, trace};

use super::{PairMetrics, PointerKind, PointerSet};
use crate::camera::Camera;
use crate::constants::{ROTATE_HANDLE_GAP, ROTATE_HANDLE_RADIUS, ROTATE_HANDLE_SLOP, SCALE_EPSILON};
use crate::history::HistoryAction;
use crate::stack::LayerStack;
use crate::types::{LayerGeometry, LayerId, LayerTransform, Vec2};

/// Rotate handle center and hit radius in world space.
///
/// The handle sits a fixed screen distance below the layer's bottom edge,
/// so its world offset shrinks as the camera zooms in.
pub fn rotate_handle(geom: &LayerGeometry, camera_scale: f32) -> (Vec2, f32) {
    let inv = 1.0 / camera_scale.max(SCALE_EPSILON);
    let t = geom.transform;
    let down = Vec2::from_angle(t.rot).rotate(Vec2::Y);
    let bottom = t.position() + down * (geom.height as f32 * 0.5 * t.scale);
    (bottom + down * (ROTATE_HANDLE_GAP * inv), ROTATE_HANDLE_RADIUS * inv)
}

/// Current interpretation of the pointers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveMode {
    Idle,
    OnePointer { start_world: Vec2 },
    TwoPointer { start_center_world: Vec2, start: PairMetrics },
    RotateHandle { start_angle: f32 },
}

#[derive(Debug)]
pub struct MoveController {
    mode: MoveMode,
    /// Layer captured when the gesture began
    layer: Option<LayerId>,
    /// Transform at the last re-baseline
    baseline: LayerTransform,
    /// Transform when the gesture began, for the history record
    gesture_start: LayerTransform,
    min_scale: f32,
    max_scale: f32,
}

impl Default for MoveController {
    fn default() -> Self {
        Self::new(
            layering_config::DEFAULT_MIN_LAYER_SCALE,
            layering_config::DEFAULT_MAX_LAYER_SCALE,
        )
    }
}

impl MoveController {
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            mode: MoveMode::Idle,
            layer: None,
            baseline: LayerTransform::default(),
            gesture_start: LayerTransform::default(),
            min_scale,
            max_scale: max_scale.max(min_scale),
        }
    }

    #[inline]
    pub fn mode(&self) -> MoveMode {
        self.mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode != MoveMode::Idle
    }

    /// Layer the running gesture acts on
    #[inline]
    pub fn target(&self) -> Option<LayerId> {
        self.layer
    }

    /// A pointer went down. `pointers` already contains it.
    pub fn pointer_down(&mut self, pointers: &PointerSet, kind: PointerKind, camera: &Camera, stack: &LayerStack) {
        if self.mode == MoveMode::Idle {
            let Some(layer) = stack.active() else {
                return;
            };
            self.layer = Some(layer.id());
            self.gesture_start = layer.transform;
            debug!("Move gesture started on {}", layer.id());

            if kind == PointerKind::Mouse && pointers.len() == 1 {
                if let Some(p) = pointers.first() {
                    let world = camera.screen_to_world(p);
                    let (handle, radius) = rotate_handle(&layer.geometry(), camera.scale);
                    let slop = ROTATE_HANDLE_SLOP / camera.scale.max(SCALE_EPSILON);
                    if world.distance(handle) <= radius + slop {
                        self.baseline = layer.transform;
                        self.mode = MoveMode::RotateHandle {
                            start_angle: angle_from(layer.transform.position(), world),
                        };
                        trace!("Move gesture: rotate handle");
                        return;
                    }
                }
            }
        }
        self.rebaseline(pointers, camera, stack);
    }

    /// Pointers moved. Updates the target layer's transform.
    pub fn pointer_move(&mut self, pointers: &PointerSet, camera: &Camera, stack: &mut LayerStack) {
        let needs_rebaseline = match self.mode {
            MoveMode::Idle => return,
            MoveMode::OnePointer { .. } | MoveMode::RotateHandle { .. } => pointers.len() != 1,
            MoveMode::TwoPointer { .. } => pointers.len() < 2,
        };
        if needs_rebaseline {
            self.rebaseline(pointers, camera, stack);
        }

        let Some(layer) = self.layer.and_then(|id| stack.get_mut(id)) else {
            return;
        };
        let st = self.baseline;

        match self.mode {
            MoveMode::Idle => {}
            MoveMode::OnePointer { start_world } => {
                let Some(p) = pointers.first() else { return };
                let delta = camera.screen_to_world(p) - start_world;
                layer.transform.set_position(st.position() + delta);
            }
            MoveMode::TwoPointer { start_center_world, start } => {
                let Some((a, b)) = pointers.first_two() else { return };
                let now = PairMetrics::of(a, b);
                let delta = camera.screen_to_world(now.mid) - start_center_world;
                layer.transform = LayerTransform {
                    x: st.x + delta.x,
                    y: st.y + delta.y,
                    scale: (st.scale * now.ratio_to(&start)).clamp(self.min_scale, self.max_scale),
                    rot: st.rot + (now.angle - start.angle),
                };
            }
            MoveMode::RotateHandle { start_angle } => {
                let Some(p) = pointers.first() else { return };
                let world = camera.screen_to_world(p);
                layer.transform.rot = st.rot + (angle_from(st.position(), world) - start_angle);
            }
        }
    }

    /// A pointer lifted or was cancelled. `pointers` no longer contains it.
    ///
    /// When the last pointer lifts, returns the gesture's `Move` action if
    /// the net change passes the epsilons.
    pub fn pointer_up(&mut self, pointers: &PointerSet, camera: &Camera, stack: &LayerStack) -> Option<HistoryAction> {
        if self.mode == MoveMode::Idle {
            return None;
        }
        if pointers.is_empty() {
            return self.finish(stack);
        }
        self.rebaseline(pointers, camera, stack);
        None
    }

    /// End the gesture immediately, as if every pointer lifted
    pub fn finish(&mut self, stack: &LayerStack) -> Option<HistoryAction> {
        let was_active = self.is_active();
        self.mode = MoveMode::Idle;
        let id = self.layer.take()?;
        if !was_active {
            return None;
        }
        let after = stack.get(id)?.transform;
        if !after.differs_from(&self.gesture_start) {
            debug!("Move gesture on {} ended without change", id);
            return None;
        }
        debug!("Move gesture on {} committed", id);
        Some(HistoryAction::Move {
            layer: id,
            before: self.gesture_start,
            after,
        })
    }

    fn rebaseline(&mut self, pointers: &PointerSet, camera: &Camera, stack: &LayerStack) {
        let Some(layer) = self.layer.and_then(|id| stack.get(id)) else {
            return;
        };
        self.baseline = layer.transform;
        self.mode = match (pointers.first(), pointers.first_two()) {
            (_, Some((a, b))) => {
                let pair = PairMetrics::of(a, b);
                MoveMode::TwoPointer {
                    start_center_world: camera.screen_to_world(pair.mid),
                    start: pair,
                }
            }
            (Some(p), None) => MoveMode::OnePointer {
                start_world: camera.screen_to_world(p),
            },
            (None, None) => self.mode,
        };
        trace!("Move gesture re-baselined: {:?}", self.mode);
    }
}

#[inline]
fn angle_from(center: Vec2, p: Vec2) -> f32 {
    let d = p - center;
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelSurface;

    fn setup() -> (LayerStack, LayerId, Camera) {
        let mut stack = LayerStack::new();
        let mut layer = stack.create_layer(PixelSurface::new(100, 60));
        layer.transform.set_position(Vec2::new(150.0, 200.0));
        let id = stack.add(layer);
        (stack, id, Camera::default())
    }

    fn transform(stack: &LayerStack, id: LayerId) -> LayerTransform {
        stack.get(id).map(|l| l.transform).unwrap_or_default()
    }

    #[test]
    fn test_one_pointer_drag_translates() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(10.0, 10.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        pointers.update(1, Vec2::new(40.0, 25.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);

        assert_eq!(transform(&stack, id).position(), Vec2::new(180.0, 215.0));

        pointers.remove(1);
        let action = ctl.pointer_up(&pointers, &camera, &stack);
        assert!(matches!(action, Some(HistoryAction::Move { layer, .. }) if layer == id));
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_drag_respects_camera_zoom() {
        let (mut stack, id, mut camera) = setup();
        camera.scale = 2.0;
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::ZERO);
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        pointers.update(1, Vec2::new(20.0, 0.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);

        assert_eq!(transform(&stack, id).x, 160.0);
    }

    #[test]
    fn test_two_finger_scale() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(100.0, 200.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        pointers.insert(2, Vec2::new(200.0, 200.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);

        pointers.update(1, Vec2::new(50.0, 200.0));
        pointers.update(2, Vec2::new(250.0, 200.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);

        let t = transform(&stack, id);
        assert!((t.scale - 2.0).abs() < 1e-5);
        assert!(t.rot.abs() < 1e-6);
        assert!((t.position() - Vec2::new(150.0, 200.0)).length() < 1e-4);
    }

    #[test]
    fn test_two_finger_rotate_and_scale_clamp() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(0.0, 0.0));
        pointers.insert(2, Vec2::new(10.0, 0.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);

        pointers.update(2, Vec2::new(0.0, 1000.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);

        let t = transform(&stack, id);
        assert_eq!(t.scale, layering_config::DEFAULT_MAX_LAYER_SCALE);
        assert!((t.rot - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_lifting_finger_rebaselines_without_jump() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(100.0, 100.0));
        pointers.insert(2, Vec2::new(200.0, 100.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        pointers.update(2, Vec2::new(300.0, 100.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);
        let pinched = transform(&stack, id);

        pointers.remove(2);
        assert!(ctl.pointer_up(&pointers, &camera, &stack).is_none());
        assert!(matches!(ctl.mode(), MoveMode::OnePointer { .. }));

        // Same position as the baseline: nothing moves
        ctl.pointer_move(&pointers, &camera, &mut stack);
        assert_eq!(transform(&stack, id), pinched);

        // History covers the whole gesture
        pointers.remove(1);
        let Some(HistoryAction::Move { before, after, .. }) = ctl.pointer_up(&pointers, &camera, &stack) else {
            panic!("expected a move action");
        };
        assert_eq!(before.scale, 1.0);
        assert_eq!(after, pinched);
    }

    #[test]
    fn test_tiny_motion_not_recorded() {
        let (mut stack, _, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::new(10.0, 10.0));
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        pointers.update(1, Vec2::new(10.3, 10.2));
        ctl.pointer_move(&pointers, &camera, &mut stack);
        pointers.remove(1);
        assert!(ctl.pointer_up(&pointers, &camera, &stack).is_none());
    }

    #[test]
    fn test_deleted_layer_makes_gesture_inert() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        pointers.insert(1, Vec2::ZERO);
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        stack.delete(id);
        pointers.update(1, Vec2::new(50.0, 50.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);
        pointers.remove(1);
        assert!(ctl.pointer_up(&pointers, &camera, &stack).is_none());
    }

    #[test]
    fn test_rotate_handle_drag() {
        let (mut stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();

        let geom = stack.get(id).map(|l| l.geometry());
        let Some(geom) = geom else { panic!("layer missing") };
        let (handle, _) = rotate_handle(&geom, camera.scale);
        assert_eq!(handle, Vec2::new(150.0, 200.0 + 30.0 + 34.0));

        pointers.insert(1, handle);
        ctl.pointer_down(&pointers, PointerKind::Mouse, &camera, &stack);
        assert!(matches!(ctl.mode(), MoveMode::RotateHandle { .. }));

        // Swing the handle a quarter turn around the center
        pointers.update(1, Vec2::new(150.0 - 64.0, 200.0));
        ctl.pointer_move(&pointers, &camera, &mut stack);
        let t = transform(&stack, id);
        assert!((t.rot - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(t.position(), Vec2::new(150.0, 200.0));
    }

    #[test]
    fn test_touch_on_handle_moves_instead() {
        let (stack, id, camera) = setup();
        let mut ctl = MoveController::default();
        let mut pointers = PointerSet::new();
        let Some(geom) = stack.get(id).map(|l| l.geometry()) else { panic!("layer missing") };
        let (handle, _) = rotate_handle(&geom, camera.scale);

        pointers.insert(1, handle);
        ctl.pointer_down(&pointers, PointerKind::Touch, &camera, &stack);
        assert!(matches!(ctl.mode(), MoveMode::OnePointer { .. }));
    }
}
