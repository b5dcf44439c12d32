//! Pacing configuration.
//!
//! Every timing constant in the engine lives here as a tunable default.
//! The values are heuristics, not contracts: the clamp semantics and the
//! proportional relationships between them are what the scheduler relies on.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for the reveal pacing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// EWMA weight given to each new rate sample.
    pub ewma_weight: f64,
    /// Render frame budget used to size paced chunks, in milliseconds.
    pub frame_budget_ms: u64,
    /// Minimum characters per paced release.
    pub chunk_floor: usize,
    /// Maximum characters per paced release.
    pub chunk_ceiling: usize,
    /// Soft coalescing wait bounds, in milliseconds.
    pub soft_wait_min_ms: u64,
    pub soft_wait_max_ms: u64,
    /// Hard latency-bound wait bounds, in milliseconds.
    pub hard_wait_min_ms: u64,
    pub hard_wait_max_ms: u64,
    /// Minimum spacing between consecutive releases, in milliseconds.
    pub min_flush_interval_ms: u64,
    /// Window after turn start during which deltas reveal immediately.
    pub boost_window_ms: u64,
    /// Fixed spooler tick period for the answer channel, in milliseconds.
    pub spool_period_ms: u64,
    /// Answer backlog sizes above which slices scale x2 / x3.
    pub spool_double_backlog: usize,
    pub spool_triple_backlog: usize,
    /// Reasoning reveal frame period, in milliseconds.
    pub reasoning_frame_ms: u64,
    /// Reasoning backlog sizes above which slices scale x2 / x3 / x4.
    pub reasoning_double_backlog: usize,
    pub reasoning_triple_backlog: usize,
    pub reasoning_quad_backlog: usize,
    /// Coalescing window for tool-output releases, in milliseconds.
    pub tool_coalesce_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ewma_weight: 0.3,
            frame_budget_ms: 32,
            chunk_floor: 12,
            chunk_ceiling: 256,
            soft_wait_min_ms: 16,
            soft_wait_max_ms: 120,
            hard_wait_min_ms: 80,
            hard_wait_max_ms: 320,
            min_flush_interval_ms: 16,
            boost_window_ms: 4000,
            spool_period_ms: 33,
            spool_double_backlog: 200,
            spool_triple_backlog: 400,
            reasoning_frame_ms: 32,
            reasoning_double_backlog: 40,
            reasoning_triple_backlog: 100,
            reasoning_quad_backlog: 200,
            tool_coalesce_ms: 33,
        }
    }
}

impl Tuning {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut tuning = Self::default();
        if let Some(value) = env_u64("STREAM_REVEAL_BOOST_WINDOW_MS") {
            tuning.boost_window_ms = value;
        }
        if let Some(value) = env_u64("STREAM_REVEAL_FRAME_BUDGET_MS") {
            tuning.frame_budget_ms = value.max(1);
        }
        if let Some(value) = env_u64("STREAM_REVEAL_SPOOL_PERIOD_MS") {
            tuning.spool_period_ms = value.max(1);
        }
        tuning
    }

    pub fn boost_window(&self) -> Duration {
        Duration::from_millis(self.boost_window_ms)
    }

    pub fn min_flush_interval(&self) -> Duration {
        Duration::from_millis(self.min_flush_interval_ms)
    }

    pub fn spool_period(&self) -> Duration {
        Duration::from_millis(self.spool_period_ms)
    }

    pub fn reasoning_frame(&self) -> Duration {
        Duration::from_millis(self.reasoning_frame_ms)
    }

    pub fn tool_coalesce(&self) -> Duration {
        Duration::from_millis(self.tool_coalesce_ms)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
