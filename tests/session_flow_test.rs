// End-to-end session behaviour through ChatController with a scripted transport.

mod common;

use common::*;
use ragchat::app::{RejectReason, SubmitOutcome};
use ragchat::cli::TerminalRenderer;
use ragchat::events::SessionEvent;
use ragchat::models::{Conversation, MessageRole};
use ragchat::session::SessionState;

fn started_id(outcome: SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Started(id) => id,
        other => panic!("expected Started, got {:?}", other),
    }
}

#[tokio::test]
async fn test_token_round_trip() {
    let body = format!(
        "{}{}{}",
        token_frame("Hello, "),
        token_frame("world"),
        token_frame("!")
    );
    let mock = MockChatConfig::new()
        .with_chunks(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("greet me"));
    let events = collect_until_terminal(&mut rx).await;

    let appended: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::AnswerAppended { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(appended, vec!["Hello, ", "world", "!"]);
    assert_eq!(events.last(), Some(&SessionEvent::SessionCompleted { id }));

    let session = controller.wait().await.unwrap();
    assert_eq!(session.answer_text(), "Hello, world!");
    assert_eq!(session.state(), SessionState::Completed);
}

#[tokio::test]
async fn test_sources_replace_prior_list() {
    let body = format!(
        "{}{}",
        sources_frame(&[source("Alpha", 0.5)]),
        sources_frame(&[source("Beta", 0.25)])
    );
    let mock = MockChatConfig::new()
        .with_chunks(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("which doc?"));
    let events = collect_until_terminal(&mut rx).await;

    let mut conversation = Conversation::new();
    for event in &events {
        conversation.apply(event);
    }
    assert_eq!(
        conversation.message(&id).unwrap().sources,
        vec![source("Beta", 0.25)]
    );
    let session = controller.wait().await.unwrap();
    assert_eq!(session.sources(), &[source("Beta", 0.25)]);
}

#[tokio::test]
async fn test_error_after_tokens_leaves_no_partial_answer() {
    let first = format!("{}{}", token_frame("The answer "), token_frame("is "));
    let second = format!("{}{}", error_frame("Generation failed"), token_frame("42"));
    let mock = MockChatConfig::new()
        .with_chunks(&[first.as_bytes(), second.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("meaning of life?"));
    let session = controller.wait().await.unwrap();
    let events = drain(&mut rx);

    let failed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::SessionFailed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(
        failed[0],
        &SessionEvent::SessionFailed {
            id: id.clone(),
            message: "Generation failed".to_string()
        }
    );

    let failed_at = events
        .iter()
        .position(|e| matches!(e, SessionEvent::SessionFailed { .. }))
        .unwrap();
    assert_eq!(failed_at, events.len() - 1);
    assert!(!events[failed_at..]
        .iter()
        .any(|e| matches!(e, SessionEvent::AnswerAppended { .. })));

    let mut conversation = Conversation::new();
    for event in &events {
        conversation.apply(event);
    }
    assert!(conversation.message(&id).is_none());
    assert!(conversation
        .messages()
        .iter()
        .all(|m| m.role == MessageRole::User));
    assert_eq!(conversation.error(), Some("Generation failed"));

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.answer_text(), "");
}

#[tokio::test]
async fn test_transport_drop_mid_stream() {
    let body = token_frame("partial");
    let mock = MockChatConfig::new()
        .with_chunks_then_error(
            &[body.as_bytes()],
            HttpError::Io("connection reset by peer".to_string()),
        )
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("q"));
    let events = collect_until_terminal(&mut rx).await;

    assert_eq!(
        events.last(),
        Some(&SessionEvent::SessionFailed {
            id,
            message: "The connection to the chat service was lost.".to_string()
        })
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::AnswerAppended { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_non_success_status_fails_before_any_chunk() {
    let mock = MockChatConfig::new()
        .with_open_error(HttpError::ServerError {
            status: 500,
            message: r#"{"detail":"Index not found"}"#.to_string(),
        })
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("q"));
    let events = collect_until_terminal(&mut rx).await;

    assert_eq!(
        events,
        vec![
            SessionEvent::Started {
                id: id.clone(),
                query: "q".to_string()
            },
            SessionEvent::SessionFailed {
                id,
                message: "The chat service returned an error (HTTP 500): Index not found"
                    .to_string()
            },
        ]
    );
    assert_eq!(mock.open_streams(), 0);
}

#[tokio::test]
async fn test_submit_while_streaming_is_noop() {
    let body = token_frame("thinking");
    let mock = MockChatConfig::new()
        .with_open_stream(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("first"));
    // Wait until the first token is through so the transport is definitely open.
    loop {
        match rx.recv().await {
            Some(SessionEvent::AnswerAppended { .. }) => break,
            Some(_) => continue,
            None => panic!("channel closed"),
        }
    }

    assert_eq!(
        controller.submit("second"),
        SubmitOutcome::Rejected(RejectReason::AlreadyStreaming)
    );
    assert_eq!(controller.active_session_id(), Some(id.as_str()));
    assert_eq!(mock.get_requests().len(), 1);
    assert!(drain(&mut rx).is_empty());

    controller.cancel();
}

#[tokio::test]
async fn test_resubmit_after_completion_gets_fresh_session() {
    let body = token_frame("one");
    let mock = MockChatConfig::new()
        .with_chunks(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let first = started_id(controller.submit("first"));
    collect_until_terminal(&mut rx).await;
    assert!(!controller.is_streaming());

    let second = started_id(controller.submit("second"));
    assert_ne!(first, second);
    let events = collect_until_terminal(&mut rx).await;
    assert!(events.iter().all(|e| e.session_id() == second));
    assert_eq!(mock.get_requests().len(), 2);
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let mock = MockChatConfig::new()
        .with_chunks(&[error_frame("No docs found").as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    started_id(controller.submit("first"));
    let events = collect_until_terminal(&mut rx).await;
    assert!(matches!(
        events.last(),
        Some(SessionEvent::SessionFailed { .. })
    ));

    assert!(matches!(controller.submit("again"), SubmitOutcome::Started(_)));
}

#[tokio::test]
async fn test_cancel_stops_delivery_and_closes_transport() {
    let body = token_frame("slow");
    let mock = MockChatConfig::new()
        .with_open_stream(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);

    let id = started_id(controller.submit("q"));
    loop {
        if let Some(SessionEvent::AnswerAppended { .. }) = rx.recv().await {
            break;
        }
    }

    assert_eq!(controller.cancel(), Some(id));
    for _ in 0..100 {
        if mock.open_streams() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(mock.open_streams(), 0);
    assert!(drain(&mut rx).is_empty());
    assert!(controller.wait().await.is_none());

    // A new query is accepted straight away.
    assert!(matches!(controller.submit("next"), SubmitOutcome::Started(_)));
}

#[tokio::test]
async fn test_dropping_controller_closes_transport() {
    let mock = MockChatConfig::new().with_open_stream(&[]).build();
    let (mut controller, _rx) = controller_for(&mock);

    started_id(controller.submit("q"));
    while mock.open_streams() == 0 {
        tokio::task::yield_now().await;
    }

    drop(controller);
    for _ in 0..100 {
        if mock.open_streams() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(mock.open_streams(), 0);
}

/// Cancel a session while most of its tokens are still queued, start another
/// one and render everything that comes out of the channel.
async fn cancel_then_resubmit_renders_only_new_answer() {
    const FRAMES: usize = 50;
    let body: String = (0..FRAMES).map(|i| token_frame(&format!("t{} ", i))).collect();
    let mock = MockChatConfig::new()
        .with_open_stream(&[body.as_bytes()])
        .build();
    let (mut controller, mut rx) = controller_for(&mock);
    let mut renderer = TerminalRenderer::new(Vec::new());

    let old = started_id(controller.submit("first"));
    loop {
        let event = rx.recv().await.unwrap();
        renderer.handle(&event).unwrap();
        if matches!(event, SessionEvent::AnswerAppended { .. }) {
            break;
        }
    }

    assert_eq!(controller.cancel(), Some(old.clone()));
    renderer.cancelled(&old).unwrap();
    let new = started_id(controller.submit("second"));

    let mut appended = 0;
    while appended < FRAMES {
        let event = rx.recv().await.unwrap();
        assert_eq!(event.session_id(), new, "event from cancelled session: {:?}", event);
        if matches!(event, SessionEvent::AnswerAppended { .. }) {
            appended += 1;
        }
        renderer.handle(&event).unwrap();
    }
    controller.cancel();

    let expected_new: String = (0..FRAMES).map(|i| format!("t{} ", i)).collect();
    assert_eq!(
        String::from_utf8(renderer.into_inner()).unwrap(),
        format!("t0 \n[cancelled]\n{}", expected_new)
    );
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_cancelled_tokens_do_not_leak_into_next_answer() {
    cancel_then_resubmit_renders_only_new_answer().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_tokens_do_not_leak_into_next_answer_multi_thread() {
    cancel_then_resubmit_renders_only_new_answer().await;
}
