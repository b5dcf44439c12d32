//! Cancellation semantics: reset, abort, and session removal must never
//! leak buffered text into later reveals.

mod support;

use std::time::{Duration, Instant};

use stream_reveal::{AgentStreamEvent, StreamCoordinator, Tuning};
use support::{pump, RecordingSink, SinkCall};

#[test]
fn reset_discards_pending_text_and_deadlines() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());
    let mut sink = RecordingSink::new();
    let start = Instant::now();

    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, start, &mut sink);
    let at = start + Duration::from_secs(10);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::AnswerDelta {
            text: "buffered".to_owned(),
        },
        at,
        &mut sink,
    );
    assert!(coordinator.next_deadline().is_some());

    coordinator.reset("s1");
    assert_eq!(coordinator.next_deadline(), None);

    // No deadline exists, but a stray timer call must also reveal nothing.
    coordinator.on_timer(at + Duration::from_secs(1), &mut sink);
    assert_eq!(sink.answer_text("s1"), "");
}

#[test]
fn reset_is_idempotent_and_tolerates_unknown_sessions() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());

    coordinator.reset("never-seen");
    assert!(!coordinator.has_session("never-seen"));

    let mut sink = RecordingSink::new();
    coordinator.on_event(
        "s1",
        AgentStreamEvent::TurnStarted,
        Instant::now(),
        &mut sink,
    );
    coordinator.reset("s1");
    coordinator.reset("s1");
    assert!(coordinator.has_session("s1"));
    assert_eq!(coordinator.next_deadline(), None);
}

#[test]
fn abort_drains_but_does_not_finalize() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());
    let mut sink = RecordingSink::new();
    let start = Instant::now();

    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, start, &mut sink);
    let at = start + Duration::from_secs(10);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::AnswerDelta {
            text: "partial answ".to_owned(),
        },
        at,
        &mut sink,
    );
    coordinator.on_event("s1", AgentStreamEvent::Abort, at, &mut sink);

    // Buffered text reveals on abort so nothing is silently lost.
    assert_eq!(sink.answer_text("s1"), "partial answ");
    assert_eq!(sink.snapshot_count("s1"), 0);
    assert!(matches!(
        sink.calls.last(),
        Some(SinkCall::Loading { loading: false, .. })
    ));
}

#[test]
fn error_reports_and_clears_loading() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());
    let mut sink = RecordingSink::new();
    let start = Instant::now();

    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, start, &mut sink);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::Error {
            code: None,
            message: Some("connection dropped".to_owned()),
        },
        start,
        &mut sink,
    );

    assert_eq!(sink.snapshot_count("s1"), 0);
    assert!(sink.calls.contains(&SinkCall::System {
        session_id: "s1".to_owned(),
        text: "stream error: connection dropped".to_owned(),
    }));
}

#[test]
fn removed_session_stops_scheduling() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());
    let mut sink = RecordingSink::new();
    let start = Instant::now();

    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, start, &mut sink);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::AnswerDelta {
            text: "going away".to_owned(),
        },
        start + Duration::from_secs(10),
        &mut sink,
    );

    coordinator.remove_session("s1");
    assert!(!coordinator.has_session("s1"));
    assert_eq!(coordinator.next_deadline(), None);
}

#[test]
fn new_turn_after_reset_streams_cleanly() {
    let mut coordinator = StreamCoordinator::new(Tuning::default());
    let mut sink = RecordingSink::new();
    let start = Instant::now();

    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, start, &mut sink);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::AnswerDelta {
            text: "stale".to_owned(),
        },
        start + Duration::from_secs(10),
        &mut sink,
    );
    coordinator.reset("s1");
    sink.calls.clear();

    // A second turn gets a fresh boost window.
    let restart = start + Duration::from_secs(20);
    coordinator.on_event("s1", AgentStreamEvent::TurnStarted, restart, &mut sink);
    coordinator.on_event(
        "s1",
        AgentStreamEvent::AnswerDelta {
            text: "fresh".to_owned(),
        },
        restart + Duration::from_millis(50),
        &mut sink,
    );
    let end = pump(
        &mut coordinator,
        &mut sink,
        restart + Duration::from_millis(50),
        Duration::from_secs(1),
    );
    coordinator.on_event("s1", AgentStreamEvent::TurnComplete, end, &mut sink);

    assert_eq!(sink.answer_text("s1"), "fresh");
    assert_eq!(sink.snapshot_count("s1"), 1);
}
