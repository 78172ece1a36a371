//! Layering compositor engine - layers, masks, brushes and history
//!
//! This crate provides the reusable core of the layer compositor:
//! - [`surface`] - CPU 8-bit RGBA surfaces, rectangles and pixel patches
//! - [`layer`] - Source pixels + alpha mask + lazily rebuilt composite
//! - [`camera`] / [`mapper`] - Screen, world and layer pixel space
//! - [`brush`] / [`magic`] - Falloff dabs and the contiguous color fill
//! - [`stroke`] - Bounded before/after capture for one brush gesture
//! - [`history`] - Bounded undo/redo of typed actions
//! - [`gesture`] - Pointer interpretation for the move and zoom tools
//! - [`stack`] - Ordered layers with an active pointer
//! - [`flatten`] - Final composite for export
//! - [`editor`] - The complete session wiring it all together

pub mod brush;
pub mod camera;
pub mod constants;
pub mod editor;
pub mod flatten;
pub mod gesture;
pub mod history;
pub mod layer;
pub mod magic;
pub mod mapper;
pub mod render;
pub mod stack;
pub mod stroke;
pub mod surface;
pub mod types;
pub mod validation;

pub use brush::{BrushSettings, Dab};
pub use camera::Camera;
pub use constants::*;
pub use editor::Editor;
pub use flatten::flatten;
pub use gesture::{PointerEvent, PointerKind, WheelInput};
pub use history::{History, HistoryAction};
pub use layer::Layer;
pub use magic::SourceCache;
pub use render::RenderScheduler;
pub use stack::LayerStack;
pub use stroke::StrokeCapture;
pub use surface::*;
pub use types::*;
pub use validation::*;
