//! Real-time host loop bridging tokio timers to the coordinator.
//!
//! The coordinator itself never sleeps; this driver is the one place wall
//! clock enters. It waits on whichever comes first, the next protocol
//! event or the coordinator's earliest deadline, and stamps `now` on each
//! callback. Uses the tokio clock throughout so paused-clock tests drive
//! the loop deterministically.

use tokio::sync::mpsc;

use agent_events::AgentStreamEvent;

use crate::config::Tuning;
use crate::coordinator::{SessionId, StreamCoordinator};
use crate::sink::RevealSink;

/// Handle producers use to feed `(session, event)` pairs into the driver.
pub type EventSender = mpsc::UnboundedSender<(SessionId, AgentStreamEvent)>;

/// Owns a coordinator and a sink and runs them on the tokio event loop.
pub struct RevealDriver<S: RevealSink> {
    coordinator: StreamCoordinator,
    sink: S,
    events: mpsc::UnboundedReceiver<(SessionId, AgentStreamEvent)>,
}

impl<S: RevealSink> RevealDriver<S> {
    pub fn new(tuning: Tuning, sink: S) -> (EventSender, Self) {
        let (sender, events) = mpsc::unbounded_channel();
        (
            sender,
            Self {
                coordinator: StreamCoordinator::new(tuning),
                sink,
                events,
            },
        )
    }

    /// Runs until every sender is dropped, then force-drains whatever is
    /// still buffered and returns the sink.
    pub async fn run(mut self) -> S {
        loop {
            let deadline = self.coordinator.next_deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some((session_id, event)) => {
                        let now = tokio::time::Instant::now().into_std();
                        self.coordinator.on_event(&session_id, event, now, &mut self.sink);
                    }
                    None => break,
                },
                () = sleep_until_deadline(deadline) => {
                    let now = tokio::time::Instant::now().into_std();
                    self.coordinator.on_timer(now, &mut self.sink);
                }
            }
        }

        // The producer went away; nothing further can arrive, so reveal
        // everything still pending rather than dropping it.
        tracing::debug!("event channel closed, draining sessions");
        self.coordinator.drain_all(&mut self.sink);
        self.sink
    }
}

async fn sleep_until_deadline(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}
