//! Pointer and wheel dispatch by tool

use std::time::Instant;

use tracing::trace;

use crate::gesture::{PointerEvent, PointerId, PointerKind, WheelInput};
use crate::types::{Tool, Vec2};

use super::Editor;

impl Editor {
    /// Brush center in world space for a pointer at `screen`
    pub fn brush_center_world(&self, screen: Vec2) -> Vec2 {
        let offset = Vec2::new(0.0, self.config.brush_offset_px);
        self.camera.screen_to_world(screen - offset)
    }

    /// Route one pointer event to the current tool
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { id, pos, kind } => self.pointer_down(id, pos, kind),
            PointerEvent::Move { id, pos } => self.pointer_move(id, pos),
            PointerEvent::Up { id } | PointerEvent::Cancel { id } => self.pointer_up(id),
        }
    }

    fn pointer_down(&mut self, id: PointerId, pos: Vec2, kind: PointerKind) {
        self.pointers.insert(id, pos);
        match self.tool {
            Tool::Move => {
                self.move_gesture
                    .pointer_down(&self.pointers, kind, &self.camera, &self.stack);
            }
            Tool::Zoom => self.zoom_gesture.pointer_down(&self.pointers, &self.camera),
            Tool::Erase | Tool::Restore => {
                if self.stroke_pointer.is_none() && self.begin_stroke(self.brush_center_world(pos)) {
                    self.stroke_pointer = Some(id);
                }
            }
        }
        self.request_render();
    }

    fn pointer_move(&mut self, id: PointerId, pos: Vec2) {
        if !self.pointers.update(id, pos) {
            return;
        }
        match self.tool {
            Tool::Move => {
                self.move_gesture
                    .pointer_move(&self.pointers, &self.camera, &mut self.stack);
            }
            Tool::Zoom => self.zoom_gesture.pointer_move(&self.pointers, &mut self.camera),
            Tool::Erase | Tool::Restore => {
                if self.stroke_pointer == Some(id) {
                    self.stroke_to(self.brush_center_world(pos));
                }
            }
        }
        self.request_render();
    }

    fn pointer_up(&mut self, id: PointerId) {
        if !self.pointers.remove(id) {
            return;
        }
        match self.tool {
            Tool::Move => {
                if let Some(action) = self
                    .move_gesture
                    .pointer_up(&self.pointers, &self.camera, &self.stack)
                {
                    self.record(action);
                }
            }
            Tool::Zoom => self.zoom_gesture.pointer_up(&self.pointers, &self.camera),
            Tool::Erase | Tool::Restore => {
                if self.stroke_pointer == Some(id) {
                    self.end_stroke();
                }
            }
        }
        self.request_render();
    }

    /// One wheel notch. Move: scale (or rotate) the active layer. Zoom: zoom
    /// the camera about the pointer. Other tools ignore the wheel.
    pub fn handle_wheel(&mut self, wheel: WheelInput, now: Instant) {
        let dir = wheel.direction();
        let factor = 1.0 + self.config.wheel_scale_step * dir;
        match self.tool {
            Tool::Zoom => {
                self.camera.zoom_about(wheel.pos, factor);
            }
            Tool::Move => {
                let Some(id) = self.stack.active_id() else {
                    return;
                };
                if let Some(action) = self.wheel.touch(&self.stack, id, now) {
                    self.record(action);
                }
                let (min, max) = (self.config.min_layer_scale, self.config.max_layer_scale);
                let rotate_step = self.config.wheel_rotate_step_deg.to_radians();
                let Some(layer) = self.stack.get_mut(id) else {
                    return;
                };
                if wheel.rotate_modifier {
                    layer.transform.rot += rotate_step * dir;
                } else {
                    layer.transform.scale = (layer.transform.scale * factor).clamp(min, max);
                }
                trace!("Wheel on {}: scale={:.3} rot={:.3}", id, layer.transform.scale, layer.transform.rot);
            }
            Tool::Erase | Tool::Restore => return,
        }
        self.request_render();
    }

    /// Advance time-based state. Commits a wheel burst once it goes idle.
    ///
    /// Returns true when something was recorded.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.wheel.poll(&self.stack, now) {
            Some(action) => {
                self.record(action);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::history::HistoryAction;
    use crate::surface::PixelSurface;
    use crate::types::LayerId;
    use layering_config::{DisplayConfig, EditorConfig};

    fn editor_with_layer() -> (Editor, LayerId) {
        let mut editor = Editor::new(EditorConfig::default(), DisplayConfig::new(400, 400));
        let id = editor.add_layer(PixelSurface::filled(100, 100, [10, 10, 10, 255])).unwrap();
        (editor, id)
    }

    fn down(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::Down { id, pos: Vec2::new(x, y), kind: PointerKind::Touch }
    }

    fn moved(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::Move { id, pos: Vec2::new(x, y) }
    }

    #[test]
    fn test_move_tool_drag_commits_move() {
        let (mut editor, id) = editor_with_layer();
        editor.handle_pointer(down(1, 200.0, 200.0));
        editor.handle_pointer(moved(1, 230.0, 190.0));
        editor.handle_pointer(PointerEvent::Up { id: 1 });

        let pos = editor.stack().get(id).map(|l| l.transform.position());
        assert_eq!(pos, Some(Vec2::new(230.0, 190.0)));
        assert!(matches!(editor.history().peek_undo(), Some(HistoryAction::Move { .. })));
    }

    #[test]
    fn test_cancel_finalizes_like_up() {
        let (mut editor, _) = editor_with_layer();
        editor.set_tool(Tool::Erase);
        editor.handle_pointer(down(3, 200.0, 200.0));
        assert!(editor.is_stroking());
        editor.handle_pointer(PointerEvent::Cancel { id: 3 });
        assert!(!editor.is_stroking());
        assert!(matches!(editor.history().peek_undo(), Some(HistoryAction::Mask { .. })));
    }

    #[test]
    fn test_second_pointer_does_not_paint() {
        let (mut editor, id) = editor_with_layer();
        editor.set_tool(Tool::Erase);
        editor.handle_pointer(down(1, 160.0, 160.0));
        editor.handle_pointer(down(2, 240.0, 240.0));
        editor.handle_pointer(moved(2, 245.0, 245.0));
        editor.handle_pointer(PointerEvent::Up { id: 2 });
        assert!(editor.is_stroking());
        editor.handle_pointer(PointerEvent::Up { id: 1 });

        // Layer spans 150..250; (240, 240) maps to layer pixel (90, 90)
        let alpha = editor.stack().get(id).map_or(0, |l| l.mask().alpha(90, 90));
        assert_eq!(alpha, 255);
    }

    #[test]
    fn test_zoom_tool_pans_camera_only() {
        let (mut editor, _) = editor_with_layer();
        editor.set_tool(Tool::Zoom);
        editor.handle_pointer(down(1, 10.0, 10.0));
        editor.handle_pointer(moved(1, 30.0, 40.0));
        editor.handle_pointer(PointerEvent::Up { id: 1 });
        assert_eq!(editor.camera().translation(), Vec2::new(20.0, 30.0));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_wheel_scales_then_commits_after_idle() {
        let (mut editor, id) = editor_with_layer();
        let t0 = Instant::now();
        let up = WheelInput { pos: Vec2::ZERO, delta_y: -100.0, rotate_modifier: false };
        editor.handle_wheel(up, t0);
        editor.handle_wheel(up, t0 + Duration::from_millis(50));

        let scale = editor.stack().get(id).map_or(0.0, |l| l.transform.scale);
        assert!((scale - 1.07 * 1.07).abs() < 1e-5);

        assert!(!editor.tick(t0 + Duration::from_millis(100)));
        assert!(editor.tick(t0 + Duration::from_millis(300)));
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_wheel_rotate_modifier() {
        let (mut editor, id) = editor_with_layer();
        let notch = WheelInput { pos: Vec2::ZERO, delta_y: 3.0, rotate_modifier: true };
        editor.handle_wheel(notch, Instant::now());
        let rot = editor.stack().get(id).map_or(0.0, |l| l.transform.rot);
        assert!((rot + 2.0f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_zooms_camera_in_zoom_mode() {
        let (mut editor, id) = editor_with_layer();
        editor.set_tool(Tool::Zoom);
        let notch = WheelInput { pos: Vec2::new(100.0, 100.0), delta_y: -1.0, rotate_modifier: false };
        editor.handle_wheel(notch, Instant::now());
        assert!((editor.camera().scale - 1.07).abs() < 1e-6);
        assert_eq!(editor.stack().get(id).map(|l| l.transform.scale), Some(1.0));
    }

    #[test]
    fn test_tool_change_finalizes_move_gesture() {
        let (mut editor, _) = editor_with_layer();
        editor.handle_pointer(down(1, 200.0, 200.0));
        editor.handle_pointer(moved(1, 260.0, 200.0));
        editor.set_tool(Tool::Zoom);
        assert_eq!(editor.history().undo_len(), 1);

        // The stale pointer is forgotten
        editor.handle_pointer(moved(1, 300.0, 200.0));
        assert_eq!(editor.camera().translation(), Vec2::ZERO);
    }
}
