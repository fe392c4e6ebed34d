//! Notifications emitted to the rendering layer.
//!
//! These are the only thing a front end sees of a chat session. They carry
//! no wire-format details and are immutable once sent.

use serde::Serialize;

use crate::sse::Source;

/// A change in the state of one chat session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A query was accepted; `id` names the in-progress assistant entry.
    Started { id: String, query: String },
    /// The source list for `id` was replaced.
    SourcesUpdated { id: String, sources: Vec<Source> },
    /// `text` was appended to the answer for `id`.
    AnswerAppended { id: String, text: String },
    /// The session ended in failure; its partial answer is void.
    SessionFailed { id: String, message: String },
    /// The stream ended cleanly.
    SessionCompleted { id: String },
}

impl SessionEvent {
    /// Session this event belongs to.
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Started { id, .. }
            | SessionEvent::SourcesUpdated { id, .. }
            | SessionEvent::AnswerAppended { id, .. }
            | SessionEvent::SessionFailed { id, .. }
            | SessionEvent::SessionCompleted { id } => id,
        }
    }

    /// True for the last event a session can emit.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::SessionFailed { .. } | SessionEvent::SessionCompleted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_accessor() {
        let event = SessionEvent::AnswerAppended {
            id: "abc".to_string(),
            text: "x".to_string(),
        };
        assert_eq!(event.session_id(), "abc");
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_terminal_events() {
        assert!(SessionEvent::SessionCompleted {
            id: "a".to_string()
        }
        .is_terminal());
        assert!(SessionEvent::SessionFailed {
            id: "a".to_string(),
            message: "m".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let event = SessionEvent::SessionCompleted {
            id: "s1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"kind": "session_completed", "id": "s1"})
        );
    }
}
