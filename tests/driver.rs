//! Driver loop behavior under the paused tokio clock.

mod support;

use std::time::Duration;

use stream_reveal::{AgentStreamEvent, RevealDriver, Tuning};
use support::RecordingSink;

#[tokio::test(start_paused = true)]
async fn driver_delivers_a_full_turn_and_returns_the_sink() {
    let (sender, driver) = RevealDriver::new(Tuning::default(), RecordingSink::new());
    let handle = tokio::spawn(driver.run());

    let send = |event| sender.send(("s1".to_owned(), event)).expect("driver alive");

    send(AgentStreamEvent::TurnStarted);
    send(AgentStreamEvent::AnswerDelta {
        text: "Streaming ".to_owned(),
    });
    send(AgentStreamEvent::AnswerDelta {
        text: "works.".to_owned(),
    });
    send(AgentStreamEvent::ReasoningDelta {
        text: "Short thought.".to_owned(),
    });

    // Let the paused clock advance far enough for every timer to fire.
    tokio::time::sleep(Duration::from_secs(2)).await;
    send(AgentStreamEvent::TurnComplete);

    drop(sender);
    let sink = handle.await.expect("driver task completes");

    assert_eq!(sink.answer_text("s1"), "Streaming works.");
    assert_eq!(sink.reasoning_text("s1"), "Short thought.");
    assert_eq!(sink.snapshot_count("s1"), 1);
}

#[tokio::test(start_paused = true)]
async fn closing_the_channel_drains_buffered_text() {
    let (sender, driver) = RevealDriver::new(Tuning::default(), RecordingSink::new());
    let handle = tokio::spawn(driver.run());

    sender
        .send(("s1".to_owned(), AgentStreamEvent::TurnStarted))
        .expect("driver alive");
    // Age the turn out of its boost window so the fragment stays buffered.
    tokio::time::sleep(Duration::from_secs(10)).await;
    sender
        .send((
            "s1".to_owned(),
            AgentStreamEvent::AnswerDelta {
                text: "unfinishe".to_owned(),
            },
        ))
        .expect("driver alive");

    // Yield so the driver observes the event, then close before any
    // coalescing timer can fire.
    tokio::time::sleep(Duration::from_millis(1)).await;
    drop(sender);

    let sink = handle.await.expect("driver task completes");
    assert_eq!(sink.answer_text("s1"), "unfinishe");
}

#[tokio::test(start_paused = true)]
async fn driver_paces_without_events_arriving() {
    let (sender, driver) = RevealDriver::new(Tuning::default(), RecordingSink::new());
    let handle = tokio::spawn(driver.run());

    // A reasoning backlog reveals on the driver's own timers.
    sender
        .send((
            "s1".to_owned(),
            AgentStreamEvent::ReasoningDelta {
                text: "x".repeat(150),
            },
        ))
        .expect("driver alive");

    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(sender);
    let sink = handle.await.expect("driver task completes");

    assert_eq!(sink.reasoning_text("s1"), "x".repeat(150));
    let frames = sink
        .calls
        .iter()
        .filter(|call| matches!(call, support::SinkCall::Reasoning { .. }))
        .count();
    assert!(frames > 1, "backlog should reveal across frames, got {frames}");
}
