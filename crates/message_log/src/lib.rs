//! In-memory message store fed by the reveal engine.
//!
//! One record per session accumulates whatever the coordinator releases.
//! The store is deliberately dumb about pacing: it appends what it is
//! given and keeps per-turn snapshots when asked, so hosts can render the
//! live record and persist finalized turns without re-deriving either.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stream_reveal::RevealSink;

/// Live accumulated state for one session.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub answer: String,
    pub reasoning: String,
    pub tool_output: String,
    pub system: Vec<String>,
    pub loading: bool,
    /// Number of distinct reveal calls per channel, useful for hosts that
    /// want to budget redraws.
    pub answer_releases: usize,
    pub reasoning_releases: usize,
    pub tool_releases: usize,
}

/// Immutable copy of a session record taken when a turn finalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedTurn {
    pub session_id: String,
    pub answer: String,
    pub reasoning: String,
    pub tool_output: String,
}

/// Accumulates reveals across sessions and records finalized turns.
#[derive(Debug, Default)]
pub struct MessageLog {
    sessions: HashMap<String, SessionRecord>,
    finalized: Vec<FinalizedTurn>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, session_id: &str) -> Option<&SessionRecord> {
        self.sessions.get(session_id)
    }

    pub fn answer_text(&self, session_id: &str) -> &str {
        self.sessions
            .get(session_id)
            .map(|record| record.answer.as_str())
            .unwrap_or("")
    }

    pub fn reasoning_text(&self, session_id: &str) -> &str {
        self.sessions
            .get(session_id)
            .map(|record| record.reasoning.as_str())
            .unwrap_or("")
    }

    pub fn tool_output_text(&self, session_id: &str) -> &str {
        self.sessions
            .get(session_id)
            .map(|record| record.tool_output.as_str())
            .unwrap_or("")
    }

    pub fn is_loading(&self, session_id: &str) -> bool {
        self.sessions
            .get(session_id)
            .map(|record| record.loading)
            .unwrap_or(false)
    }

    pub fn finalized_turns(&self) -> &[FinalizedTurn] {
        &self.finalized
    }

    /// Drops a session's live record. Finalized turns survive removal.
    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    fn record_mut(&mut self, session_id: &str) -> &mut SessionRecord {
        self.sessions.entry(session_id.to_owned()).or_default()
    }
}

impl RevealSink for MessageLog {
    fn append_answer(&mut self, session_id: &str, text: &str, _streaming: bool) {
        let record = self.record_mut(session_id);
        record.answer.push_str(text);
        record.answer_releases += 1;
    }

    fn append_reasoning(&mut self, session_id: &str, text: &str, _streaming: bool) {
        let record = self.record_mut(session_id);
        record.reasoning.push_str(text);
        record.reasoning_releases += 1;
    }

    fn append_tool_output(&mut self, session_id: &str, text: &str, _streaming: bool) {
        let record = self.record_mut(session_id);
        record.tool_output.push_str(text);
        record.tool_releases += 1;
    }

    fn replace_answer(&mut self, session_id: &str, text: &str) {
        let record = self.record_mut(session_id);
        record.answer.clear();
        record.answer.push_str(text);
        record.answer_releases += 1;
    }

    fn replace_reasoning(&mut self, session_id: &str, text: &str) {
        let record = self.record_mut(session_id);
        record.reasoning.clear();
        record.reasoning.push_str(text);
        record.reasoning_releases += 1;
    }

    fn system_message(&mut self, session_id: &str, text: &str) {
        self.record_mut(session_id).system.push(text.to_owned());
    }

    fn set_loading(&mut self, session_id: &str, loading: bool) {
        self.record_mut(session_id).loading = loading;
    }

    fn snapshot(&mut self, session_id: &str) {
        let record = self.record_mut(session_id);
        let turn = FinalizedTurn {
            session_id: session_id.to_owned(),
            answer: record.answer.clone(),
            reasoning: record.reasoning.clone(),
            tool_output: record.tool_output.clone(),
        };
        self.finalized.push(turn);
    }
}
