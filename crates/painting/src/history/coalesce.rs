//! Debounced history for wheel-driven transforms
//!
//! Each wheel notch nudges a layer's scale or rotation. Recording every
//! notch would flood the history, so a burst of notches is folded into a
//! single `Move` action committed once the wheel has been idle for the
//! configured window.

use std::time::{Duration, Instant};

use tracing::trace;

use super::HistoryAction;
use crate::stack::LayerStack;
use crate::types::{LayerId, LayerTransform};

#[derive(Debug, Clone, Copy)]
struct PendingBurst {
    layer: LayerId,
    start: LayerTransform,
    last_touch: Instant,
}

#[derive(Debug)]
pub struct TransformCoalescer {
    window: Duration,
    pending: Option<PendingBurst>,
}

impl Default for TransformCoalescer {
    fn default() -> Self {
        Self::new(Duration::from_millis(layering_config::DEFAULT_WHEEL_COMMIT_MS))
    }
}

impl TransformCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Note that `layer` is about to be changed by the wheel.
    ///
    /// The first touch of a burst snapshots the starting transform. Touching
    /// a different layer closes the previous burst and returns its action.
    pub fn touch(&mut self, stack: &LayerStack, layer: LayerId, now: Instant) -> Option<HistoryAction> {
        let mut committed = None;
        if let Some(pending) = self.pending.as_mut() {
            if pending.layer == layer {
                pending.last_touch = now;
                return None;
            }
            committed = self.flush(stack);
        }

        let start = stack.get(layer)?.transform;
        trace!("Wheel burst started on {}", layer);
        self.pending = Some(PendingBurst {
            layer,
            start,
            last_touch: now,
        });
        committed
    }

    /// Commit the burst if the wheel has been idle for the whole window
    pub fn poll(&mut self, stack: &LayerStack, now: Instant) -> Option<HistoryAction> {
        let pending = self.pending?;
        if now.saturating_duration_since(pending.last_touch) < self.window {
            return None;
        }
        self.flush(stack)
    }

    /// Commit any pending burst now.
    ///
    /// Returns None when nothing is pending, the layer is gone or the net
    /// change is below the move epsilons.
    pub fn flush(&mut self, stack: &LayerStack) -> Option<HistoryAction> {
        let pending = self.pending.take()?;
        let after = stack.get(pending.layer)?.transform;
        if !after.differs_from(&pending.start) {
            trace!("Wheel burst on {} below epsilon, dropped", pending.layer);
            return None;
        }
        Some(HistoryAction::Move {
            layer: pending.layer,
            before: pending.start,
            after,
        })
    }

    /// Forget any pending burst without recording it
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
