//! Reasoning-channel scheduler: continuous frame-driven reveal loop.
//!
//! Reasoning text has no boost/steady split. While a backlog exists the
//! channel keeps a frame deadline armed and releases a backlog-scaled slice
//! per frame; when the backlog empties the loop disarms itself.

use std::time::Instant;

use crate::buffer::ChannelBuffer;
use crate::config::Tuning;
use crate::pacer;
use crate::rate::RateEstimator;
use crate::schedule::TickLoop;

#[derive(Debug)]
pub struct ReasoningChannel {
    tuning: Tuning,
    pending: ChannelBuffer,
    rate: RateEstimator,
    frames: TickLoop,
}

impl ReasoningChannel {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.clone(),
            pending: ChannelBuffer::default(),
            rate: RateEstimator::new(tuning.ewma_weight),
            frames: TickLoop::new(tuning.reasoning_frame()),
        }
    }

    /// Appends a delta. The first frame of an idle loop is due immediately
    /// so fresh reasoning starts revealing without a full frame of lag.
    pub fn on_delta(&mut self, text: &str, now: Instant) {
        if text.is_empty() {
            return;
        }
        self.rate.observe(text.chars().count(), now);
        self.pending.push_str(text);
        self.frames.start(now);
    }

    /// Runs one frame if due; returns the revealed slice.
    pub fn on_timer(&mut self, now: Instant) -> Option<String> {
        if !self.frames.due(now) {
            return None;
        }
        if self.pending.is_empty() {
            self.frames.stop();
            return None;
        }

        let base = pacer::desired_chunk(&self.tuning, self.rate.stats());
        let slice = self.pending.take_chars(base * self.scale());
        if self.pending.is_empty() {
            self.frames.stop();
        } else {
            self.frames.advance(now);
        }
        Some(slice)
    }

    /// Forced flush of everything pending; clears all state.
    pub fn drain(&mut self) -> Option<String> {
        let slice = self.pending.take_all();
        self.reset();
        if slice.is_empty() {
            None
        } else {
            Some(slice)
        }
    }

    /// Drops buffered-but-unrevealed text when a snapshot supersedes it.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
        self.frames.stop();
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.rate.reset();
        self.frames.stop();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.frames.deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn scale(&self) -> usize {
        let backlog = self.pending.char_len();
        if backlog > self.tuning.reasoning_quad_backlog {
            4
        } else if backlog > self.tuning.reasoning_triple_backlog {
            3
        } else if backlog > self.tuning.reasoning_double_backlog {
            2
        } else {
            1
        }
    }
}
