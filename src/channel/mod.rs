//! Per-channel flush scheduling state machines.
//!
//! Each logical stream of a session gets its own scheduler: the answer
//! channel runs the boost/steady regime with a spooler backstop, the
//! reasoning channel runs a continuous frame-driven reveal loop, and the
//! tool-output channel coalesces appends into frame-aligned verbatim
//! releases. All three share the same externally-driven clock: the owner
//! passes `now` in, reads `next_deadline()` out, and calls `on_timer` when
//! a deadline passes.

mod answer;
mod reasoning;
mod tool;

pub use answer::{AnswerChannel, Phase};
pub use reasoning::ReasoningChannel;
pub use tool::ToolChannel;
