//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use ragchat::app::SessionEvents;
use ragchat::events::SessionEvent;
use ragchat::sse::{ChatEvent, Source, StreamDecoder};

/// `data:` frame for a token event.
pub fn token_frame(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "token", "content": content})
    )
}

/// `data:` frame for a sources event.
pub fn sources_frame(sources: &[Source]) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "sources", "sources": sources})
    )
}

/// `data:` frame for an error event.
pub fn error_frame(message: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "error", "message": message})
    )
}

pub fn source(title: &str, distance: f64) -> Source {
    Source {
        title: title.to_string(),
        url: format!("https://docs.example/{}", title.to_lowercase().replace(' ', "-")),
        snippet: format!("About {}...", title),
        distance,
        position: 0,
    }
}

/// Decode `chunks` in order and collect every event, finishing at the end.
pub fn decode_all<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Vec<ChatEvent> {
    let mut decoder = StreamDecoder::new();
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(decoder.feed(chunk));
    }
    decoder.finish();
    events
}

/// Receive events until a terminal one for any session arrives.
pub async fn collect_until_terminal(
    rx: &mut SessionEvents,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

/// Everything currently queued on the channel.
pub fn drain(rx: &mut SessionEvents) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
