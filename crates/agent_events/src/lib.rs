//! Typed protocol events emitted by the agent process.
//!
//! This crate owns the event shapes and their line-oriented decoding only.
//! It intentionally knows nothing about pacing, sessions, or rendering;
//! the transport hands it bytes and gets normalized events back, with
//! unknown payloads preserved for parity-safe passthrough.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stream event after normalization, tagged the way the agent process
/// writes them (one JSON object per stdout line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    TurnStarted,
    TurnComplete,
    TaskComplete,
    Error {
        code: Option<String>,
        message: Option<String>,
    },
    Abort,
    AnswerDelta {
        text: String,
    },
    /// Full replace sent when the producer emits a complete message
    /// instead of deltas.
    AnswerSnapshot {
        text: String,
    },
    ReasoningDelta {
        text: String,
    },
    ReasoningSnapshot {
        text: String,
    },
    ExecBegin {
        command: String,
    },
    ExecOutputDelta {
        chunk: Vec<u8>,
    },
    ExecEnd {
        exit_code: i32,
    },
    BackgroundNote {
        text: String,
    },
    /// Unknown event type retained for parity-safe passthrough behavior.
    Unknown {
        event_type: String,
        payload: Value,
    },
}

impl AgentStreamEvent {
    /// Whether this event ends the current turn's streaming state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TurnComplete | Self::TaskComplete | Self::Error { .. } | Self::Abort
        )
    }
}

/// Incremental parser for newline-delimited JSON event streams.
///
/// Feed arbitrary byte chunks; complete lines drain as events. Lines that
/// fail typed decoding surface as [`AgentStreamEvent::Unknown`] so the
/// caller can log them without losing the payload.
#[derive(Debug, Default)]
pub struct JsonlEventParser {
    buffer: String,
}

impl JsonlEventParser {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<AgentStreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find('\n') {
            let line = self.buffer[..split].trim().to_string();
            self.buffer.drain(0..split + 1);
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Parse a complete event payload in one shot.
    pub fn parse_lines(input: &str) -> Vec<AgentStreamEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes());
        if !parser.buffer.trim().is_empty() {
            let tail = parser.buffer.trim().to_string();
            events.extend(parse_line(&tail));
        }
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn parse_line(line: &str) -> Option<AgentStreamEvent> {
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<AgentStreamEvent>(line) {
        Ok(event) => Some(event),
        Err(_) => {
            let payload =
                serde_json::from_str::<Value>(line).unwrap_or_else(|_| Value::String(line.into()));
            let event_type = payload
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("malformed")
                .to_owned();
            Some(AgentStreamEvent::Unknown {
                event_type,
                payload,
            })
        }
    }
}
