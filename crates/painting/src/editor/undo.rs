//! Undo/redo and the history-recorded layer property edits

use tracing::debug;

use crate::constants::OPACITY_EPSILON;
use crate::history::HistoryAction;
use crate::types::LayerId;

use super::Editor;

impl Editor {
    /// Commit a pending wheel burst so it lands in history before undo/redo
    fn flush_wheel(&mut self) {
        if let Some(action) = self.wheel.flush(&self.stack) {
            self.record(action);
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.wheel.is_pending()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last edit
    ///
    /// Returns the layer that changed, or None if there was nothing to undo
    pub fn undo(&mut self) -> Option<LayerId> {
        self.finish_gestures();
        self.flush_wheel();
        let id = self.history.undo(&mut self.stack)?;
        self.request_render();
        Some(id)
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> Option<LayerId> {
        self.finish_gestures();
        self.flush_wheel();
        let id = self.history.redo(&mut self.stack)?;
        self.request_render();
        Some(id)
    }

    /// Start an opacity slider drag on the active layer
    pub fn begin_opacity_edit(&mut self) {
        if let Some(layer) = self.stack.active() {
            self.opacity_edit = Some((layer.id(), layer.opacity()));
        }
    }

    /// Set the active layer's opacity live. Starts an edit session if none is open.
    pub fn set_active_opacity(&mut self, opacity: f32) {
        if self.opacity_edit.is_none() {
            self.begin_opacity_edit();
        }
        if let Some(layer) = self.stack.active_mut() {
            layer.set_opacity(opacity);
            self.request_render();
        }
    }

    /// Close the opacity session, recording it if the value really changed
    pub fn commit_opacity_edit(&mut self) -> bool {
        let Some((id, before)) = self.opacity_edit.take() else {
            return false;
        };
        let Some(after) = self.stack.get(id).map(|l| l.opacity()) else {
            return false;
        };
        if (after - before).abs() <= OPACITY_EPSILON {
            return false;
        }
        debug!("Opacity of {}: {:.3} -> {:.3}", id, before, after);
        self.record(HistoryAction::Opacity { layer: id, before, after });
        true
    }

    /// Mirror the active layer left-right
    pub fn flip_active_horizontal(&mut self) -> bool {
        self.flip_active(|flip| flip.horizontal = !flip.horizontal)
    }

    /// Mirror the active layer top-bottom
    pub fn flip_active_vertical(&mut self) -> bool {
        self.flip_active(|flip| flip.vertical = !flip.vertical)
    }

    fn flip_active(&mut self, toggle: impl FnOnce(&mut crate::types::Flip)) -> bool {
        let Some(layer) = self.stack.active_mut() else {
            return false;
        };
        let before = layer.flip;
        toggle(&mut layer.flip);
        let action = HistoryAction::Flip {
            layer: layer.id(),
            before,
            after: layer.flip,
        };
        self.record(action);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::gesture::WheelInput;
    use crate::surface::PixelSurface;
    use crate::types::{Flip, Vec2};

    fn editor_with_layer() -> (Editor, LayerId) {
        let mut editor = Editor::default();
        let id = editor.add_layer(PixelSurface::filled(8, 8, [0, 0, 0, 255])).unwrap();
        (editor, id)
    }

    fn opacity(editor: &Editor, id: LayerId) -> f32 {
        editor.stack().get(id).map_or(-1.0, |l| l.opacity())
    }

    #[test]
    fn test_opacity_session_records_once() {
        let (mut editor, id) = editor_with_layer();
        editor.begin_opacity_edit();
        editor.set_active_opacity(0.8);
        editor.set_active_opacity(0.4);
        assert!(editor.commit_opacity_edit());
        assert_eq!(editor.history().undo_len(), 1);

        editor.undo();
        assert_eq!(opacity(&editor, id), 1.0);
        editor.redo();
        assert_eq!(opacity(&editor, id), 0.4);
    }

    #[test]
    fn test_opacity_unchanged_not_recorded() {
        let (mut editor, _) = editor_with_layer();
        editor.begin_opacity_edit();
        editor.set_active_opacity(1.0);
        assert!(!editor.commit_opacity_edit());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_flip_roundtrip() {
        let (mut editor, id) = editor_with_layer();
        assert!(editor.flip_active_horizontal());
        assert!(editor.flip_active_vertical());
        let flip = editor.stack().get(id).map(|l| l.flip);
        assert_eq!(flip, Some(Flip { horizontal: true, vertical: true }));

        editor.undo();
        editor.undo();
        assert_eq!(editor.stack().get(id).map(|l| l.flip), Some(Flip::default()));
    }

    #[test]
    fn test_flip_without_layer() {
        let mut editor = Editor::default();
        assert!(!editor.flip_active_horizontal());
    }

    #[test]
    fn test_undo_flushes_pending_wheel_burst() {
        let (mut editor, id) = editor_with_layer();
        let scale_before = editor.stack().get(id).map_or(0.0, |l| l.transform.scale);
        let now = Instant::now();
        let notch = WheelInput { pos: Vec2::ZERO, delta_y: -1.0, rotate_modifier: false };
        editor.handle_wheel(notch, now);
        editor.handle_wheel(notch, now + Duration::from_millis(10));
        assert!(editor.can_undo());

        assert_eq!(editor.undo(), Some(id));
        let scale = editor.stack().get(id).map_or(0.0, |l| l.transform.scale);
        assert_eq!(scale, scale_before);
        assert!(editor.can_redo());
    }
}
