//! Redraw coalescing
//!
//! Any number of state changes between two display refreshes produce at
//! most one redraw. Front ends call [`RenderScheduler::request`] on every
//! change and only schedule a frame callback when it returns true.

#[derive(Debug, Default, Clone)]
pub struct RenderScheduler {
    render_dirty: bool,
    frame_scheduled: bool,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the view dirty. Returns true when a new frame must be scheduled.
    pub fn request(&mut self) -> bool {
        self.render_dirty = true;
        if self.frame_scheduled {
            return false;
        }
        self.frame_scheduled = true;
        true
    }

    /// Consume the scheduled frame. Returns whether a redraw is due.
    pub fn take_frame(&mut self) -> bool {
        self.frame_scheduled = false;
        std::mem::take(&mut self.render_dirty)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.render_dirty
    }
}
