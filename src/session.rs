//! Per-query session state machine.
//!
//! ```text
//! Idle ──start──▶ Streaming ──complete──▶ Completed
//!                     │
//!                     └──error / fail──▶ Failed
//! ```
//!
//! Only `Streaming` accepts events. `Completed` and `Failed` are terminal;
//! a new query always gets a fresh `Session`.

use uuid::Uuid;

use crate::events::SessionEvent;
use crate::sse::{ChatEvent, Source};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Streaming,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

/// State of one submitted query's in-flight answer.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    query: String,
    answer_text: String,
    sources: Vec<Source>,
    state: SessionState,
    error: Option<String>,
}

impl Session {
    /// Create an idle session with a fresh assistant message id.
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), query)
    }

    pub fn with_id(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            answer_text: String::new(),
            sources: Vec::new(),
            state: SessionState::Idle,
            error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// User-visible error, set once the session has failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// Idle → Streaming.
    pub fn start(&mut self) -> Option<SessionEvent> {
        if self.state != SessionState::Idle {
            return None;
        }
        self.state = SessionState::Streaming;
        tracing::info!(session_id = %self.id, "Session started");
        Some(SessionEvent::Started {
            id: self.id.clone(),
            query: self.query.clone(),
        })
    }

    /// Apply one decoded event. Returns the notification to publish, if any.
    pub fn apply(&mut self, event: ChatEvent) -> Option<SessionEvent> {
        if !self.is_active() {
            tracing::debug!(
                session_id = %self.id,
                event_type = event.event_type_name(),
                "Ignoring event for inactive session"
            );
            return None;
        }

        match event {
            ChatEvent::Sources { sources } => {
                self.sources = sources;
                Some(SessionEvent::SourcesUpdated {
                    id: self.id.clone(),
                    sources: self.sources.clone(),
                })
            }
            ChatEvent::Token { content } => {
                self.answer_text.push_str(&content);
                Some(SessionEvent::AnswerAppended {
                    id: self.id.clone(),
                    text: content,
                })
            }
            ChatEvent::Error { message } => self.fail(message),
        }
    }

    /// Streaming → Completed.
    pub fn complete(&mut self) -> Option<SessionEvent> {
        if !self.is_active() {
            return None;
        }
        self.state = SessionState::Completed;
        tracing::info!(
            session_id = %self.id,
            answer_len = self.answer_text.len(),
            sources = self.sources.len(),
            "Session completed"
        );
        Some(SessionEvent::SessionCompleted {
            id: self.id.clone(),
        })
    }

    /// Streaming → Failed. The partial answer and sources are discarded.
    pub fn fail(&mut self, message: impl Into<String>) -> Option<SessionEvent> {
        if !self.is_active() {
            return None;
        }
        let message = message.into();
        self.state = SessionState::Failed;
        self.answer_text.clear();
        self.sources.clear();
        self.error = Some(message.clone());
        tracing::info!(session_id = %self.id, error = %message, "Session failed");
        Some(SessionEvent::SessionFailed {
            id: self.id.clone(),
            message,
        })
    }
}
