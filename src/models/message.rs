use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sse::Source;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single entry in the rendered conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Supporting documents (assistant messages only).
    #[serde(default)]
    pub sources: Vec<Source>,
    /// True while tokens are still arriving for this message.
    #[serde(default)]
    pub is_streaming: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::User,
            content: content.into(),
            sources: Vec::new(),
            is_streaming: false,
            created_at: Utc::now(),
        }
    }

    /// An empty assistant entry waiting for tokens.
    pub fn assistant_placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            content: String::new(),
            sources: Vec::new(),
            is_streaming: true,
            created_at: Utc::now(),
        }
    }
}
