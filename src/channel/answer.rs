//! Answer-channel scheduler: boost window, steady pacing, spooler backstop.

use std::time::Instant;

use crate::buffer::ChannelBuffer;
use crate::config::Tuning;
use crate::pacer;
use crate::rate::RateEstimator;
use crate::schedule::{earliest, TickLoop, TimerPair};

/// Observable reveal regime of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No turn in progress.
    Idle,
    /// Inside the post-turn-start window: every delta reveals immediately.
    Boosted,
    /// Outside the window: releases are paced and coalesced.
    Steady,
}

/// Pacing state for one session's answer stream.
///
/// Text enters through [`AnswerChannel::on_delta`] and leaves as ordered
/// prefix slices from `on_delta`, [`AnswerChannel::on_timer`], or
/// [`AnswerChannel::drain`]. The spooler tick runs for the whole turn and
/// guarantees forward progress on a large backlog even when the host delays
/// the soft/hard timers.
#[derive(Debug)]
pub struct AnswerChannel {
    tuning: Tuning,
    pending: ChannelBuffer,
    rate: RateEstimator,
    timers: TimerPair,
    spool: TickLoop,
    turn_started_at: Option<Instant>,
    last_release_at: Option<Instant>,
}

impl AnswerChannel {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.clone(),
            pending: ChannelBuffer::default(),
            rate: RateEstimator::new(tuning.ewma_weight),
            timers: TimerPair::default(),
            spool: TickLoop::new(tuning.spool_period()),
            turn_started_at: None,
            last_release_at: None,
        }
    }

    pub fn phase(&self, now: Instant) -> Phase {
        match self.turn_started_at {
            None => Phase::Idle,
            Some(start) if now.duration_since(start) < self.tuning.boost_window() => Phase::Boosted,
            Some(_) => Phase::Steady,
        }
    }

    /// Anchors the boost window at an explicit turn-start event.
    pub fn note_turn_started(&mut self, now: Instant) {
        self.reset();
        self.turn_started_at = Some(now);
    }

    /// Appends a delta; returns text to reveal right away, if any.
    pub fn on_delta(&mut self, text: &str, now: Instant) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        if self.turn_started_at.is_none() {
            // No explicit turn-start seen; the first delta opens the window.
            self.turn_started_at = Some(now);
        }
        self.rate.observe(text.chars().count(), now);
        self.pending.push_str(text);
        self.spool.ensure_running(now);

        if self.phase(now) == Phase::Boosted {
            return self.release_all(now);
        }

        let stats = self.rate.stats();
        let chunk = pacer::desired_chunk(&self.tuning, stats);
        let (soft, hard) = pacer::desired_waits(&self.tuning, stats);

        if self.pending.char_len() >= chunk {
            match self.last_release_at {
                Some(last) if now.duration_since(last) < self.tuning.min_flush_interval() => {
                    self.timers.arm_soft(last + self.tuning.min_flush_interval());
                    self.timers.arm_hard_if_unset(now + hard);
                }
                _ => return self.release_paced(now),
            }
        } else {
            self.timers.arm_soft(now + soft);
            self.timers.arm_hard_if_unset(now + hard);
        }
        None
    }

    /// Fires every due deadline; returns slices in release order.
    pub fn on_timer(&mut self, now: Instant) -> Vec<String> {
        let mut out = Vec::new();

        if self.spool.due(now) {
            self.spool.advance(now);
            let released = match self.phase(now) {
                Phase::Steady => self.release_paced(now),
                // Backstop only; boost deltas normally drain on arrival.
                Phase::Boosted => self.release_all(now),
                Phase::Idle => None,
            };
            out.extend(released);
        }

        if self.timers.hard_due(now) {
            out.extend(self.release_forced_slice(now));
        } else if self.timers.soft_due(now) {
            self.timers.clear_soft();
            out.extend(self.release_paced(now));
        }

        out
    }

    /// Forced flush of everything pending; clears all turn state.
    pub fn drain(&mut self) -> Option<String> {
        let slice = self.pending.take_all();
        self.reset();
        if slice.is_empty() {
            None
        } else {
            Some(slice)
        }
    }

    /// Drops buffered-but-unrevealed text without touching turn state.
    /// Used when a full snapshot supersedes the delta stream.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
        self.timers.clear();
    }

    /// Clears all state without revealing pending text.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.rate.reset();
        self.timers.clear();
        self.spool.stop();
        self.turn_started_at = None;
        self.last_release_at = None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.timers.deadline(), self.spool.deadline())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn release_all(&mut self, now: Instant) -> Option<String> {
        let slice = self.pending.take_all();
        self.finish_release(now, slice)
    }

    /// Release observing the word-boundary/size gate.
    fn release_paced(&mut self, now: Instant) -> Option<String> {
        let chunk = pacer::desired_chunk(&self.tuning, self.rate.stats());
        if !self.pending.release_allowed(chunk) {
            return None;
        }
        let slice = self.pending.take_chars(self.scaled(chunk));
        self.finish_release(now, slice)
    }

    /// Hard-timer release: bypasses the gate but stays size-bounded.
    fn release_forced_slice(&mut self, now: Instant) -> Option<String> {
        let chunk = pacer::desired_chunk(&self.tuning, self.rate.stats());
        let slice = self.pending.take_chars(self.scaled(chunk));
        self.finish_release(now, slice)
    }

    /// Catch-up scaling: a growing backlog widens each slice.
    fn scaled(&self, chunk: usize) -> usize {
        let backlog = self.pending.char_len();
        if backlog > self.tuning.spool_triple_backlog {
            chunk * 3
        } else if backlog > self.tuning.spool_double_backlog {
            chunk * 2
        } else {
            chunk
        }
    }

    fn finish_release(&mut self, now: Instant, slice: String) -> Option<String> {
        self.timers.clear();
        if slice.is_empty() {
            return None;
        }
        self.last_release_at = Some(now);
        if !self.pending.is_empty() {
            let (soft, hard) = pacer::desired_waits(&self.tuning, self.rate.stats());
            self.timers.arm_soft(now + soft);
            self.timers.arm_hard_if_unset(now + hard);
        }
        Some(slice)
    }
}
