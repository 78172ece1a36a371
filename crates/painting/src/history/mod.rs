//! Undo/redo history of reversible document edits
//!
//! Every edit is a [`HistoryAction`] holding the before and after state of
//! exactly the fields it changed. The undo stack is bounded; the oldest
//! entries are evicted first. Recording a new action clears redo.

mod coalesce;

pub use coalesce::TransformCoalescer;

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::stack::LayerStack;
use crate::surface::PixelPatch;
use crate::types::{Flip, LayerId, LayerTransform};

/// Which half of an action to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// A reversible edit to one layer
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// Position, scale and rotation change
    Move {
        layer: LayerId,
        before: LayerTransform,
        after: LayerTransform,
    },
    Flip {
        layer: LayerId,
        before: Flip,
        after: Flip,
    },
    Opacity {
        layer: LayerId,
        before: f32,
        after: f32,
    },
    /// Mask pixels over one rectangle. Both patches share the same rect.
    Mask {
        layer: LayerId,
        before: PixelPatch,
        after: PixelPatch,
    },
}

impl HistoryAction {
    pub fn layer_id(&self) -> LayerId {
        match self {
            HistoryAction::Move { layer, .. }
            | HistoryAction::Flip { layer, .. }
            | HistoryAction::Opacity { layer, .. }
            | HistoryAction::Mask { layer, .. } => *layer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::Move { .. } => "Move",
            HistoryAction::Flip { .. } => "Flip",
            HistoryAction::Opacity { .. } => "Opacity",
            HistoryAction::Mask { .. } => "Mask",
        }
    }

    /// Approximate heap bytes held by the action
    pub fn memory_size(&self) -> usize {
        let payload = match self {
            HistoryAction::Mask { before, after, .. } => before.memory_size() + after.memory_size(),
            _ => 0,
        };
        std::mem::size_of::<Self>() + payload
    }

    /// Write one side of the action into its layer.
    ///
    /// Returns false when the layer no longer exists.
    pub fn apply(&self, stack: &mut LayerStack, side: Side) -> bool {
        let Some(target) = stack.get_mut(self.layer_id()) else {
            warn!("{} action targets missing {}", self.label(), self.layer_id());
            return false;
        };
        let use_before = side == Side::Before;
        match self {
            HistoryAction::Move { before, after, .. } => {
                target.transform = if use_before { *before } else { *after };
            }
            HistoryAction::Flip { before, after, .. } => {
                target.flip = if use_before { *before } else { *after };
            }
            HistoryAction::Opacity { before, after, .. } => {
                target.set_opacity(if use_before { *before } else { *after });
            }
            HistoryAction::Mask { before, after, .. } => {
                target.write_mask_patch(if use_before { before } else { after });
            }
        }
        true
    }
}

/// Bounded undo stack plus redo stack
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryAction>,
    redo_stack: Vec<HistoryAction>,
    max_levels: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(layering_config::DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_levels.min(64)),
            redo_stack: Vec::new(),
            max_levels: max_levels.max(1),
        }
    }

    /// Push a new action, evicting the oldest past the bound. Clears redo.
    pub fn record(&mut self, action: HistoryAction) {
        debug!("History: record {} on {}", action.label(), action.layer_id());
        self.undo_stack.push_back(action);
        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        debug!(
            "History: {} entries, ~{} bytes",
            self.undo_stack.len(),
            self.memory_usage()
        );
    }

    /// Revert the newest action. Returns the affected layer, if any.
    pub fn undo(&mut self, stack: &mut LayerStack) -> Option<LayerId> {
        let action = self.undo_stack.pop_back()?;
        debug!("History: undo {} on {}", action.label(), action.layer_id());
        action.apply(stack, Side::Before);
        let id = action.layer_id();
        self.redo_stack.push(action);
        Some(id)
    }

    /// Re-apply the most recently undone action
    pub fn redo(&mut self, stack: &mut LayerStack) -> Option<LayerId> {
        let action = self.redo_stack.pop()?;
        debug!("History: redo {} on {}", action.label(), action.layer_id());
        action.apply(stack, Side::After);
        let id = action.layer_id();
        self.undo_stack.push_back(action);
        Some(id)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[inline]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    #[inline]
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Newest undoable action
    pub fn peek_undo(&self) -> Option<&HistoryAction> {
        self.undo_stack.back()
    }

    /// Total approximate bytes held by both stacks
    pub fn memory_usage(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(HistoryAction::memory_size)
            .sum()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PixelRect, PixelSurface};

    fn stack_with_layer() -> (LayerStack, LayerId) {
        let mut stack = LayerStack::new();
        let layer = stack.create_layer(PixelSurface::filled(16, 16, [9, 9, 9, 255]));
        let id = stack.add(layer);
        (stack, id)
    }

    fn opacity_action(layer: LayerId, after: f32) -> HistoryAction {
        HistoryAction::Opacity {
            layer,
            before: 1.0,
            after,
        }
    }

    #[test]
    fn test_undo_redo_move() {
        let (mut stack, id) = stack_with_layer();
        let before = stack.get(id).map(|l| l.transform).unwrap_or_default();
        let after = LayerTransform {
            x: 40.0,
            y: 12.0,
            scale: 2.0,
            rot: 0.5,
        };
        if let Some(layer) = stack.get_mut(id) {
            layer.transform = after;
        }

        let mut history = History::new(30);
        history.record(HistoryAction::Move { layer: id, before, after });

        assert_eq!(history.undo(&mut stack), Some(id));
        assert_eq!(stack.get(id).map(|l| l.transform), Some(before));
        assert_eq!(history.redo(&mut stack), Some(id));
        assert_eq!(stack.get(id).map(|l| l.transform), Some(after));
    }

    #[test]
    fn test_undo_redo_flip_and_opacity() {
        let (mut stack, id) = stack_with_layer();
        let mut history = History::default();
        history.record(HistoryAction::Flip {
            layer: id,
            before: Flip::default(),
            after: Flip { horizontal: true, vertical: false },
        });
        history.record(opacity_action(id, 0.25));

        history.undo(&mut stack);
        assert_eq!(stack.get(id).map(|l| l.opacity()), Some(1.0));
        history.undo(&mut stack);
        assert_eq!(stack.get(id).map(|l| l.flip), Some(Flip::default()));
        history.redo(&mut stack);
        assert_eq!(stack.get(id).map(|l| l.flip.horizontal), Some(true));
    }

    #[test]
    fn test_mask_action_writes_patch() {
        let (mut stack, id) = stack_with_layer();
        let rect = PixelRect::new(2, 2, 4, 4);
        let before = stack.get(id).map(|l| l.mask().read_rect(rect)).unwrap_or_else(|| PixelPatch::blank(rect));
        let after = PixelPatch::blank(rect);

        let mut history = History::default();
        history.record(HistoryAction::Mask { layer: id, before, after });
        history.undo(&mut stack);
        assert_eq!(stack.get(id).map(|l| l.mask().alpha(3, 3)), Some(255));
        history.redo(&mut stack);
        assert_eq!(stack.get(id).map(|l| l.mask().alpha(3, 3)), Some(0));
        assert_eq!(stack.get(id).map(|l| l.mask().alpha(6, 6)), Some(255));
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let id = LayerId(1);
        let mut history = History::new(30);
        for i in 0..35 {
            history.record(opacity_action(id, i as f32 / 100.0));
        }
        assert_eq!(history.undo_len(), 30);
        assert_eq!(history.peek_undo(), Some(&opacity_action(id, 0.34)));
    }

    #[test]
    fn test_record_clears_redo() {
        let (mut stack, id) = stack_with_layer();
        let mut history = History::default();
        history.record(opacity_action(id, 0.5));
        history.undo(&mut stack);
        assert!(history.can_redo());

        history.record(opacity_action(id, 0.7));
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut stack), None);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut stack = LayerStack::new();
        let mut history = History::default();
        assert_eq!(history.undo(&mut stack), None);
        assert_eq!(history.redo(&mut stack), None);
    }

    #[test]
    fn test_missing_layer_still_moves_between_stacks() {
        let mut stack = LayerStack::new();
        let mut history = History::default();
        history.record(opacity_action(LayerId(42), 0.1));
        assert_eq!(history.undo(&mut stack), Some(LayerId(42)));
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_memory_usage_counts_patches() {
        let rect = PixelRect::new(0, 0, 10, 10);
        let mut history = History::default();
        history.record(HistoryAction::Mask {
            layer: LayerId(1),
            before: PixelPatch::blank(rect),
            after: PixelPatch::blank(rect),
        });
        assert!(history.memory_usage() >= 800);
        history.clear();
        assert_eq!(history.memory_usage(), 0);
    }

    #[test]
    fn test_eviction_releases_memory() {
        let mask = |n| HistoryAction::Mask {
            layer: LayerId(n),
            before: PixelPatch::blank(PixelRect::new(0, 0, 10, 10)),
            after: PixelPatch::blank(PixelRect::new(0, 0, 10, 10)),
        };
        let mut history = History::new(2);
        history.record(mask(1));
        history.record(mask(2));
        let full = history.memory_usage();
        history.record(mask(3));
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.memory_usage(), full);
    }
}
