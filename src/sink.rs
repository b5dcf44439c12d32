//! Consumer-facing output surface.
//!
//! The engine never renders and never persists; everything it decides to
//! reveal flows through this trait. Implementations are expected to be
//! cheap: a call is an append to in-memory message state plus a redraw
//! request, not I/O.

/// Downstream message/UI store fed by the coordinator.
///
/// `streaming` is `true` while more content may follow for the same turn
/// and `false` on the final slice of a drain. `snapshot` asks the store to
/// persist the finalized turn; it fires at most once per completed turn.
pub trait RevealSink {
    fn append_answer(&mut self, session_id: &str, text: &str, streaming: bool);
    fn append_reasoning(&mut self, session_id: &str, text: &str, streaming: bool);
    fn append_tool_output(&mut self, session_id: &str, text: &str, streaming: bool);

    /// Replaces the answer content outright. Used only when a producer
    /// snapshot contradicts what has already been revealed.
    fn replace_answer(&mut self, session_id: &str, text: &str);
    fn replace_reasoning(&mut self, session_id: &str, text: &str);

    /// Surfaces a system-level notice (producer errors, mostly).
    fn system_message(&mut self, session_id: &str, text: &str);

    fn set_loading(&mut self, session_id: &str, loading: bool);

    /// Requests durable persistence of the finalized turn.
    fn snapshot(&mut self, session_id: &str);
}
