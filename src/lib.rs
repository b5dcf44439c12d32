//! Adaptive pacing and coalescing for streamed agent output.
//!
//! Invariant: per channel, the concatenation of every release equals the
//! concatenation of every delta, in order — pacing changes *when* text
//! appears, never *what* or in what order.
//!
//! # Public API Overview
//! - Route protocol events through [`StreamCoordinator`] and receive reveals
//!   via a [`RevealSink`] implementation.
//! - Run in real time with [`RevealDriver`], or drive the clock yourself
//!   with `next_deadline()` / `on_timer(now, ..)` for deterministic hosts
//!   and tests.
//! - Tune every timing heuristic through [`Tuning`]; the defaults match the
//!   original interactive-latency calibration.
//! - Reuse the leaf primitives (`rate`, `pacer`, `buffer`, `schedule`,
//!   `channel`) directly when embedding a custom scheduler.

pub mod buffer;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod pacer;
pub mod rate;
pub mod schedule;
pub mod sink;

pub use crate::config::Tuning;
pub use crate::coordinator::{SessionId, StreamCoordinator};
pub use crate::driver::{EventSender, RevealDriver};
pub use crate::rate::{RateEstimator, RateStats};
pub use crate::sink::RevealSink;

/// Protocol event types consumed by the coordinator.
pub use agent_events::AgentStreamEvent;
