//! Typed payloads carried by `data:` frames.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A supporting document returned by retrieval. Rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    /// Vector distance from the query; smaller is closer.
    #[serde(default)]
    pub distance: f64,
    /// Position of the chunk within its source page.
    #[serde(default)]
    pub position: i64,
}

/// One decoded event from the chat stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Replaces the current source list.
    Sources { sources: Vec<Source> },
    /// Fragment to append to the in-progress answer.
    Token { content: String },
    /// Server-signaled failure; terminal for the request.
    Error { message: String },
}

impl ChatEvent {
    /// Returns the wire `type` name for logging.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatEvent::Sources { .. } => "sources",
            ChatEvent::Token { .. } => "token",
            ChatEvent::Error { .. } => "error",
        }
    }
}

/// Reasons a `data:` frame was not turned into a [`ChatEvent`].
///
/// None of these abort a stream; the frame is logged and dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SseParseError {
    #[error("invalid JSON in data frame: {0}")]
    InvalidJson(String),
    #[error("data frame has no `type` field")]
    MissingType,
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("malformed `{event_type}` payload: {reason}")]
    InvalidPayload { event_type: String, reason: String },
}
