//! Cooperative scheduling primitives.
//!
//! Nothing here sleeps. Deadlines are stored and compared against a
//! host-supplied `now`; the host (timer loop, frame callback, or test)
//! decides when to look. `TickLoop` backs both the answer spooler and the
//! reasoning/tool frame loops; `TimerPair` holds the soft/hard one-shot
//! waits of the steady regime.

use std::time::{Duration, Instant};

/// Fixed-period tick generator with catch-up.
///
/// When the host observes a tick late, the next deadline re-anchors to
/// `now + period` instead of queueing missed ticks.
#[derive(Debug, Clone)]
pub struct TickLoop {
    period: Duration,
    next: Option<Instant>,
}

impl TickLoop {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Arms the first tick at `at` if the loop is not already running.
    pub fn start(&mut self, at: Instant) {
        if self.next.is_none() {
            self.next = Some(at);
        }
    }

    /// Arms the first tick one period from `now` if not already running.
    pub fn ensure_running(&mut self, now: Instant) {
        self.start(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn due(&self, now: Instant) -> bool {
        self.next.is_some_and(|next| now >= next)
    }

    /// Schedules the tick after a fired one.
    pub fn advance(&mut self, now: Instant) {
        if let Some(next) = self.next {
            let mut upcoming = next + self.period;
            if upcoming <= now {
                upcoming = now + self.period;
            }
            self.next = Some(upcoming);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }
}

/// Soft/hard one-shot deadline pair for the steady pacing regime.
///
/// The soft deadline re-arms on every arrival (coalescing), the hard
/// deadline arms once and bounds total latency. Any successful release
/// clears both.
#[derive(Debug, Clone, Default)]
pub struct TimerPair {
    soft: Option<Instant>,
    hard: Option<Instant>,
}

impl TimerPair {
    pub fn arm_soft(&mut self, at: Instant) {
        self.soft = Some(at);
    }

    pub fn arm_hard_if_unset(&mut self, at: Instant) {
        if self.hard.is_none() {
            self.hard = Some(at);
        }
    }

    pub fn clear(&mut self) {
        self.soft = None;
        self.hard = None;
    }

    pub fn clear_soft(&mut self) {
        self.soft = None;
    }

    pub fn soft_due(&self, now: Instant) -> bool {
        self.soft.is_some_and(|at| now >= at)
    }

    pub fn hard_due(&self, now: Instant) -> bool {
        self.hard.is_some_and(|at| now >= at)
    }

    pub fn deadline(&self) -> Option<Instant> {
        earliest(self.soft, self.hard)
    }
}

/// Earlier of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
