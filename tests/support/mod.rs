//! Shared test doubles for the integration suites.

// Each suite compiles its own copy; not every suite uses every helper.
#![allow(dead_code)]

use std::time::{Duration, Instant};

use stream_reveal::{RevealSink, StreamCoordinator};

/// Every sink call the coordinator makes, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Answer {
        session_id: String,
        text: String,
        streaming: bool,
    },
    Reasoning {
        session_id: String,
        text: String,
        streaming: bool,
    },
    ToolOutput {
        session_id: String,
        text: String,
        streaming: bool,
    },
    ReplaceAnswer {
        session_id: String,
        text: String,
    },
    ReplaceReasoning {
        session_id: String,
        text: String,
    },
    System {
        session_id: String,
        text: String,
    },
    Loading {
        session_id: String,
        loading: bool,
    },
    Snapshot {
        session_id: String,
    },
}

/// Spy sink that records calls verbatim for later assertion.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenated answer text for a session, replaces included.
    pub fn answer_text(&self, session_id: &str) -> String {
        let mut out = String::new();
        for call in &self.calls {
            match call {
                SinkCall::Answer {
                    session_id: id,
                    text,
                    ..
                } if id == session_id => out.push_str(text),
                SinkCall::ReplaceAnswer {
                    session_id: id,
                    text,
                } if id == session_id => {
                    out.clear();
                    out.push_str(text);
                }
                _ => {}
            }
        }
        out
    }

    pub fn reasoning_text(&self, session_id: &str) -> String {
        let mut out = String::new();
        for call in &self.calls {
            match call {
                SinkCall::Reasoning {
                    session_id: id,
                    text,
                    ..
                } if id == session_id => out.push_str(text),
                SinkCall::ReplaceReasoning {
                    session_id: id,
                    text,
                } if id == session_id => {
                    out.clear();
                    out.push_str(text);
                }
                _ => {}
            }
        }
        out
    }

    pub fn tool_output_text(&self, session_id: &str) -> String {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SinkCall::ToolOutput {
                    session_id: id,
                    text,
                    ..
                } if id == session_id => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot_count(&self, session_id: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::Snapshot { session_id: id } if id == session_id))
            .count()
    }

    pub fn answer_release_count(&self, session_id: &str) -> usize {
        self.calls
            .iter()
            .filter(
                |call| matches!(call, SinkCall::Answer { session_id: id, .. } if id == session_id),
            )
            .count()
    }
}

impl RevealSink for RecordingSink {
    fn append_answer(&mut self, session_id: &str, text: &str, streaming: bool) {
        self.calls.push(SinkCall::Answer {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
            streaming,
        });
    }

    fn append_reasoning(&mut self, session_id: &str, text: &str, streaming: bool) {
        self.calls.push(SinkCall::Reasoning {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
            streaming,
        });
    }

    fn append_tool_output(&mut self, session_id: &str, text: &str, streaming: bool) {
        self.calls.push(SinkCall::ToolOutput {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
            streaming,
        });
    }

    fn replace_answer(&mut self, session_id: &str, text: &str) {
        self.calls.push(SinkCall::ReplaceAnswer {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
        });
    }

    fn replace_reasoning(&mut self, session_id: &str, text: &str) {
        self.calls.push(SinkCall::ReplaceReasoning {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
        });
    }

    fn system_message(&mut self, session_id: &str, text: &str) {
        self.calls.push(SinkCall::System {
            session_id: session_id.to_owned(),
            text: text.to_owned(),
        });
    }

    fn set_loading(&mut self, session_id: &str, loading: bool) {
        self.calls.push(SinkCall::Loading {
            session_id: session_id.to_owned(),
            loading,
        });
    }

    fn snapshot(&mut self, session_id: &str) {
        self.calls.push(SinkCall::Snapshot {
            session_id: session_id.to_owned(),
        });
    }
}

/// Advances the coordinator clock by firing its own deadlines up to
/// `horizon` past `now`; returns the time the pump stopped at.
pub fn pump(
    coordinator: &mut StreamCoordinator,
    sink: &mut RecordingSink,
    now: Instant,
    horizon: Duration,
) -> Instant {
    let end = now + horizon;
    while let Some(deadline) = coordinator.next_deadline() {
        if deadline > end {
            break;
        }
        coordinator.on_timer(deadline, sink);
    }
    end
}
