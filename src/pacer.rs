//! Adaptive release sizing and wait selection.
//!
//! Pure policy over [`RateStats`]: how many characters one release should
//! carry, and how long the scheduler may coalesce before revealing. Soft
//! waits let small bursts merge into one render; hard waits bound worst-case
//! latency even when arrivals stall (hard is ~3x soft, soft is ~1.1x the
//! observed inter-arrival gap).

use std::time::Duration;

use crate::config::Tuning;
use crate::rate::RateStats;

/// Characters one paced release should carry to fill a render frame.
///
/// Falls back to the floor until a throughput estimate exists.
pub fn desired_chunk(tuning: &Tuning, stats: RateStats) -> usize {
    match stats.chars_per_sec {
        Some(cps) => {
            let per_frame = cps * tuning.frame_budget_ms as f64 / 1000.0;
            (per_frame as usize).clamp(tuning.chunk_floor, tuning.chunk_ceiling)
        }
        None => tuning.chunk_floor,
    }
}

/// `(soft, hard)` coalescing waits for the current arrival cadence.
pub fn desired_waits(tuning: &Tuning, stats: RateStats) -> (Duration, Duration) {
    let soft_ms = stats
        .inter_arrival_ms
        .map(|gap| gap * 1.1)
        .unwrap_or(tuning.soft_wait_min_ms as f64)
        .clamp(tuning.soft_wait_min_ms as f64, tuning.soft_wait_max_ms as f64);
    let hard_ms =
        (soft_ms * 3.0).clamp(tuning.hard_wait_min_ms as f64, tuning.hard_wait_max_ms as f64);

    (
        Duration::from_secs_f64(soft_ms / 1000.0),
        Duration::from_secs_f64(hard_ms / 1000.0),
    )
}
