//! Complete editing session
//!
//! This module connects:
//! - Input handling (pointer and wheel events from the front end)
//! - Gesture controllers (move, zoom) and the brush engine
//! - Stroke capture and the undo/redo history
//! - The layer stack, the camera and redraw scheduling
//!
//! The editor is single-threaded: every operation runs to completion
//! before the next event is handled.

mod input;
mod layers;
mod stroke;
mod undo;

use std::time::Duration;

use layering_config::{DisplayConfig, EditorConfig};
use tracing::debug;

use crate::brush::BrushSettings;
use crate::camera::Camera;
use crate::gesture::{MoveController, PointerId, PointerSet, ZoomController};
use crate::history::{History, HistoryAction, TransformCoalescer};
use crate::magic::SourceCache;
use crate::render::RenderScheduler;
use crate::stack::LayerStack;
use crate::stroke::StrokeCapture;
use crate::types::{LayerId, Tool};

/// Interactive compositing session over one layer stack
///
/// Workflow:
/// 1. Layers come in via `add_layer`
/// 2. Pointer and wheel events are routed by the current tool
/// 3. Edits are recorded in the history as they finish
/// 4. `flatten` / `export` produce the final image
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) display: DisplayConfig,
    pub(crate) stack: LayerStack,
    pub(crate) camera: Camera,
    pub(crate) history: History,
    pub(crate) wheel: TransformCoalescer,
    pub(crate) tool: Tool,
    pub(crate) brush: BrushSettings,
    pub(crate) pointers: PointerSet,
    pub(crate) move_gesture: MoveController,
    pub(crate) zoom_gesture: ZoomController,
    /// Brush gesture in progress
    pub(crate) stroke: Option<StrokeCapture>,
    /// Pointer driving the brush gesture
    pub(crate) stroke_pointer: Option<PointerId>,
    pub(crate) source_cache: SourceCache,
    /// Layer and starting opacity of a slider drag
    pub(crate) opacity_edit: Option<(LayerId, f32)>,
    pub(crate) render: RenderScheduler,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), DisplayConfig::default())
    }
}

impl Editor {
    /// Create an empty session
    pub fn new(config: EditorConfig, display: DisplayConfig) -> Self {
        let (w, h, dpr) = (display.width, display.height, display.scale);
        debug!("Editor: {}x{} @{} history={}", w, h, dpr, config.max_history);
        Self {
            stack: LayerStack::new(),
            camera: Camera::new(config.min_view_scale, config.max_view_scale),
            history: History::new(config.max_history),
            wheel: TransformCoalescer::new(Duration::from_millis(config.wheel_commit_ms)),
            tool: Tool::default(),
            brush: BrushSettings::from(&config.brush),
            pointers: PointerSet::new(),
            move_gesture: MoveController::new(config.min_layer_scale, config.max_layer_scale),
            zoom_gesture: ZoomController::new(),
            stroke: None,
            stroke_pointer: None,
            source_cache: SourceCache::new(),
            opacity_edit: None,
            render: RenderScheduler::new(),
            config,
            display,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Viewport resize. Layers keep their world placement.
    pub fn set_display(&mut self, display: DisplayConfig) {
        self.display = display;
        self.request_render();
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Direct camera access for front ends. Camera changes are never recorded.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.request_render();
        &mut self.camera
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Any gesture in progress is finalized first.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.finish_gestures();
        self.tool = tool;
        debug!("Tool: {}", tool.label());
        self.request_render();
    }

    pub fn cycle_tool(&mut self) -> Tool {
        self.set_tool(self.tool.cycle());
        self.tool
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// Replace the brush settings, clamped to their ranges
    pub fn set_brush(&mut self, settings: BrushSettings) {
        self.brush = BrushSettings::new(
            settings.size,
            settings.hardness,
            settings.strength,
            settings.magic_enabled,
            settings.magic_tolerance,
        );
    }

    /// Mark the view dirty. Returns true when a frame should be scheduled.
    pub fn request_render(&mut self) -> bool {
        self.render.request()
    }

    /// Consume the scheduled frame. Returns whether a redraw is due.
    pub fn take_frame(&mut self) -> bool {
        self.render.take_frame()
    }

    /// Record an action and schedule a redraw
    pub(crate) fn record(&mut self, action: HistoryAction) {
        self.history.record(action);
        self.request_render();
    }

    /// Finalize every gesture in progress, committing what they changed
    pub fn finish_gestures(&mut self) {
        if let Some(action) = self.move_gesture.finish(&self.stack) {
            self.record(action);
        }
        self.zoom_gesture.finish();
        self.end_stroke();
        self.stroke_pointer = None;
        self.pointers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelSurface;

    #[test]
    fn test_editor_creation() {
        let editor = Editor::default();
        assert_eq!(editor.tool(), Tool::Move);
        assert!(editor.stack().is_empty());
        assert_eq!(editor.history().max_levels(), 30);
        assert_eq!(editor.brush().size, 60.0);
    }

    #[test]
    fn test_cycle_tool() {
        let mut editor = Editor::default();
        assert_eq!(editor.cycle_tool(), Tool::Erase);
        assert_eq!(editor.cycle_tool(), Tool::Restore);
        assert_eq!(editor.cycle_tool(), Tool::Zoom);
        assert_eq!(editor.cycle_tool(), Tool::Move);
    }

    #[test]
    fn test_set_brush_clamps() {
        let mut editor = Editor::default();
        editor.set_brush(BrushSettings {
            size: 10.0,
            hardness: 3.0,
            strength: 0.5,
            magic_enabled: true,
            magic_tolerance: 140.0,
        });
        assert_eq!(editor.brush().hardness, 1.0);
        assert_eq!(editor.brush().magic_tolerance, 100.0);
    }

    #[test]
    fn test_changes_schedule_one_frame() {
        let mut editor = Editor::default();
        editor.add_layer(PixelSurface::filled(10, 10, [1, 1, 1, 255])).unwrap();
        editor.set_tool(Tool::Erase);
        assert!(editor.take_frame());
        assert!(!editor.take_frame());
    }
}
