//! Arrival-rate estimation for a single stream channel.

use std::time::Instant;

/// Smoothed arrival statistics. Both fields stay `None` until two deltas
/// have been observed, since one timestamp yields no interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateStats {
    /// EWMA of the gap between consecutive deltas, in milliseconds.
    pub inter_arrival_ms: Option<f64>,
    /// EWMA of observed throughput, in characters per second.
    pub chars_per_sec: Option<f64>,
}

/// Exponentially-weighted moving average over delta arrivals.
///
/// Updated only when a delta arrives; the estimator never decays on its own.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    weight: f64,
    last_delta_at: Option<Instant>,
    stats: RateStats,
}

impl RateEstimator {
    /// Creates an estimator giving `weight` to each new sample and
    /// `1 - weight` to history.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            last_delta_at: None,
            stats: RateStats::default(),
        }
    }

    /// Folds one delta arrival into the averages.
    ///
    /// The interval is floored at 1 ms so a same-instant burst cannot
    /// produce an infinite instantaneous rate. The first computable sample
    /// seeds the averages raw instead of folding against zero.
    pub fn observe(&mut self, delta_chars: usize, now: Instant) {
        if let Some(last) = self.last_delta_at {
            let interval_ms = (now.duration_since(last).as_secs_f64() * 1000.0).max(1.0);
            let rate = delta_chars as f64 * 1000.0 / interval_ms;
            self.stats.inter_arrival_ms = Some(self.fold(self.stats.inter_arrival_ms, interval_ms));
            self.stats.chars_per_sec = Some(self.fold(self.stats.chars_per_sec, rate));
        }
        self.last_delta_at = Some(now);
    }

    pub fn stats(&self) -> RateStats {
        self.stats
    }

    /// Forgets all history; the next delta starts a fresh seed.
    pub fn reset(&mut self) {
        self.last_delta_at = None;
        self.stats = RateStats::default();
    }

    fn fold(&self, previous: Option<f64>, sample: f64) -> f64 {
        match previous {
            Some(previous) => previous * (1.0 - self.weight) + sample * self.weight,
            None => sample,
        }
    }
}
