//! Session stream coordination.
//!
//! Owns every session's channel state directly and applies protocol events
//! to the right channel; the consumer store is strictly a downstream sink.
//! All methods run on one logical thread: the host calls `on_event` as
//! events arrive and `on_timer` whenever `next_deadline()` passes.

use std::collections::HashMap;
use std::time::Instant;

use agent_events::AgentStreamEvent;

use crate::channel::{AnswerChannel, ReasoningChannel, ToolChannel};
use crate::config::Tuning;
use crate::schedule::earliest;
use crate::sink::RevealSink;

pub type SessionId = String;

#[derive(Debug)]
struct SessionStreams {
    answer: AnswerChannel,
    reasoning: ReasoningChannel,
    tool: ToolChannel,
    /// Answer text already forwarded to the sink; snapshot reconciliation
    /// compares against this to reveal only the unseen suffix.
    revealed_answer: String,
    revealed_reasoning: String,
    turn_active: bool,
}

impl SessionStreams {
    fn new(tuning: &Tuning) -> Self {
        Self {
            answer: AnswerChannel::new(tuning),
            reasoning: ReasoningChannel::new(tuning),
            tool: ToolChannel::new(tuning),
            revealed_answer: String::new(),
            revealed_reasoning: String::new(),
            turn_active: false,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest(
            self.answer.next_deadline(),
            earliest(self.reasoning.next_deadline(), self.tool.next_deadline()),
        )
    }
}

/// Routes protocol events to per-session channel schedulers and forwards
/// every release to the consumer sink.
pub struct StreamCoordinator {
    tuning: Tuning,
    sessions: HashMap<SessionId, SessionStreams>,
}

impl StreamCoordinator {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            sessions: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Tuning::default())
    }

    /// Applies one protocol event for a session, creating the session's
    /// backing state lazily. Reveals flow out through `sink`.
    pub fn on_event(
        &mut self,
        session_id: &str,
        event: AgentStreamEvent,
        now: Instant,
        sink: &mut impl RevealSink,
    ) {
        match event {
            AgentStreamEvent::TurnStarted => {
                let session = self.session_mut(session_id);
                session.answer.note_turn_started(now);
                session.reasoning.reset();
                session.tool.reset();
                session.revealed_answer.clear();
                session.revealed_reasoning.clear();
                session.turn_active = true;
                sink.set_loading(session_id, true);
            }
            AgentStreamEvent::AnswerDelta { text } => {
                let session = self.session_mut(session_id);
                session.turn_active = true;
                if let Some(slice) = session.answer.on_delta(&text, now) {
                    session.revealed_answer.push_str(&slice);
                    sink.append_answer(session_id, &slice, true);
                }
            }
            AgentStreamEvent::AnswerSnapshot { text } => {
                let session = self.session_mut(session_id);
                session.turn_active = true;
                session.answer.discard_pending();
                if let Some(suffix) = unseen_suffix(&session.revealed_answer, &text) {
                    if !suffix.is_empty() {
                        let suffix = suffix.to_owned();
                        session.revealed_answer = text;
                        sink.append_answer(session_id, &suffix, true);
                    }
                } else {
                    tracing::warn!(session_id, "answer snapshot rewrites revealed content");
                    session.revealed_answer = text.clone();
                    sink.replace_answer(session_id, &text);
                }
            }
            AgentStreamEvent::ReasoningDelta { text } => {
                let session = self.session_mut(session_id);
                session.turn_active = true;
                session.reasoning.on_delta(&text, now);
            }
            AgentStreamEvent::ReasoningSnapshot { text } => {
                let session = self.session_mut(session_id);
                session.turn_active = true;
                session.reasoning.discard_pending();
                if let Some(suffix) = unseen_suffix(&session.revealed_reasoning, &text) {
                    if !suffix.is_empty() {
                        let suffix = suffix.to_owned();
                        session.revealed_reasoning = text;
                        sink.append_reasoning(session_id, &suffix, true);
                    }
                } else {
                    tracing::warn!(session_id, "reasoning snapshot rewrites revealed content");
                    session.revealed_reasoning = text.clone();
                    sink.replace_reasoning(session_id, &text);
                }
            }
            AgentStreamEvent::ExecBegin { command } => {
                let session = self.session_mut(session_id);
                session.turn_active = true;
                session.tool.on_append(&format!("$ {command}\n"), now);
            }
            AgentStreamEvent::ExecOutputDelta { chunk } => {
                let text = String::from_utf8_lossy(&chunk).into_owned();
                self.session_mut(session_id).tool.on_append(&text, now);
            }
            AgentStreamEvent::ExecEnd { exit_code } => {
                let session = self.session_mut(session_id);
                if let Some(slice) = session.tool.drain() {
                    sink.append_tool_output(session_id, &slice, true);
                }
                if exit_code != 0 {
                    sink.append_tool_output(session_id, &format!("(exit {exit_code})\n"), true);
                }
            }
            AgentStreamEvent::BackgroundNote { text } => {
                let session = self.session_mut(session_id);
                let mut note = text;
                if !note.ends_with('\n') {
                    note.push('\n');
                }
                session.tool.on_append(&note, now);
            }
            AgentStreamEvent::TurnComplete | AgentStreamEvent::TaskComplete => {
                self.finish_turn(session_id, sink, true);
            }
            AgentStreamEvent::Error { code, message } => {
                self.finish_turn(session_id, sink, false);
                sink.system_message(session_id, &format_stream_error(code, message));
            }
            AgentStreamEvent::Abort => {
                self.finish_turn(session_id, sink, false);
            }
            AgentStreamEvent::Unknown {
                event_type,
                payload: _,
            } => {
                tracing::debug!(session_id, %event_type, "ignoring unknown stream event");
            }
        }
    }

    /// Fires due deadlines for every session. Safe to call at any time;
    /// nothing happens unless a deadline has actually passed.
    pub fn on_timer(&mut self, now: Instant, sink: &mut impl RevealSink) {
        for (session_id, session) in &mut self.sessions {
            for slice in session.answer.on_timer(now) {
                session.revealed_answer.push_str(&slice);
                sink.append_answer(session_id, &slice, true);
            }
            if let Some(slice) = session.reasoning.on_timer(now) {
                session.revealed_reasoning.push_str(&slice);
                sink.append_reasoning(session_id, &slice, true);
            }
            if let Some(slice) = session.tool.on_timer(now) {
                sink.append_tool_output(session_id, &slice, true);
            }
        }
    }

    /// Earliest deadline across every session and channel, for the host's
    /// timer loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sessions
            .values()
            .fold(None, |acc, session| earliest(acc, session.next_deadline()))
    }

    /// Clears all channel state for a session and cancels its scheduled
    /// work without revealing anything. Idempotent; unknown sessions are a
    /// no-op.
    pub fn reset(&mut self, session_id: &str) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            tracing::debug!(session_id, "resetting session streams");
            session.answer.reset();
            session.reasoning.reset();
            session.tool.reset();
            session.revealed_answer.clear();
            session.revealed_reasoning.clear();
            session.turn_active = false;
        }
    }

    /// Drops a session outright. Any deadline that would have fired for it
    /// simply no longer exists.
    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Force-drains every session, as on host shutdown: buffered text must
    /// not be lost just because the producer went away.
    pub fn drain_all(&mut self, sink: &mut impl RevealSink) {
        let session_ids: Vec<SessionId> = self.sessions.keys().cloned().collect();
        for session_id in session_ids {
            self.finish_turn(&session_id, sink, false);
        }
    }

    fn finish_turn(&mut self, session_id: &str, sink: &mut impl RevealSink, completed: bool) {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return;
        };

        if let Some(slice) = session.answer.drain() {
            session.revealed_answer.push_str(&slice);
            sink.append_answer(session_id, &slice, false);
        }
        if let Some(slice) = session.reasoning.drain() {
            session.revealed_reasoning.push_str(&slice);
            sink.append_reasoning(session_id, &slice, false);
        }
        if let Some(slice) = session.tool.drain() {
            sink.append_tool_output(session_id, &slice, false);
        }

        let was_active = session.turn_active;
        session.turn_active = false;
        sink.set_loading(session_id, false);
        if completed && was_active {
            sink.snapshot(session_id);
        }
    }

    fn session_mut(&mut self, session_id: &str) -> &mut SessionStreams {
        self.sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| {
                tracing::debug!(session_id, "creating session stream state");
                SessionStreams::new(&self.tuning)
            })
    }
}

/// Returns the part of `snapshot` not yet revealed, or `None` when the
/// snapshot contradicts revealed content and a replace is required.
fn unseen_suffix<'a>(revealed: &str, snapshot: &'a str) -> Option<&'a str> {
    snapshot.strip_prefix(revealed)
}

fn format_stream_error(code: Option<String>, message: Option<String>) -> String {
    let message = message
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "unknown error".to_owned());
    match code {
        Some(code) if !code.trim().is_empty() => format!("stream error ({code}): {message}"),
        _ => format!("stream error: {message}"),
    }
}
