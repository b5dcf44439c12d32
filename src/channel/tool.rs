//! Tool-output scheduler: frame-aligned coalescing, verbatim reveal.
//!
//! Command output arrives in arbitrary-sized chunks and is never re-sliced;
//! pacing here only reduces how often the consumer redraws. Appends open a
//! short coalescing window and everything buffered when it closes is
//! revealed in one release.

use std::time::Instant;

use crate::buffer::ChannelBuffer;
use crate::config::Tuning;
use crate::schedule::TickLoop;

#[derive(Debug)]
pub struct ToolChannel {
    pending: ChannelBuffer,
    window: TickLoop,
}

impl ToolChannel {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pending: ChannelBuffer::default(),
            window: TickLoop::new(tuning.tool_coalesce()),
        }
    }

    pub fn on_append(&mut self, text: &str, now: Instant) {
        if text.is_empty() {
            return;
        }
        self.pending.push_str(text);
        self.window.ensure_running(now);
    }

    /// Closes a due coalescing window, revealing everything buffered.
    pub fn on_timer(&mut self, now: Instant) -> Option<String> {
        if !self.window.due(now) {
            return None;
        }
        self.window.stop();
        let slice = self.pending.take_all();
        if slice.is_empty() {
            None
        } else {
            Some(slice)
        }
    }

    /// Forced flush of everything pending; cancels the window.
    pub fn drain(&mut self) -> Option<String> {
        self.window.stop();
        let slice = self.pending.take_all();
        if slice.is_empty() {
            None
        } else {
            Some(slice)
        }
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.window.stop();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.window.deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
