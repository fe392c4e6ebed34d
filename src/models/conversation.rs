//! Rendering-side view of the chat, built purely from [`SessionEvent`]s.

use crate::events::SessionEvent;

use super::message::{Message, MessageRole};

/// The message list and the last user-visible error.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn assistant_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id && m.role == MessageRole::Assistant)
    }

    /// Fold one notification into the view.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { id, query } => {
                self.error = None;
                self.messages
                    .push(Message::user(format!("{}-query", id), query.clone()));
                self.messages.push(Message::assistant_placeholder(id.clone()));
            }
            SessionEvent::SourcesUpdated { id, sources } => {
                if let Some(message) = self.assistant_mut(id) {
                    message.sources = sources.clone();
                }
            }
            SessionEvent::AnswerAppended { id, text } => {
                if let Some(message) = self.assistant_mut(id) {
                    message.content.push_str(text);
                }
            }
            SessionEvent::SessionFailed { id, message } => {
                self.discard(id);
                self.error = Some(message.clone());
            }
            SessionEvent::SessionCompleted { id } => {
                if let Some(message) = self.assistant_mut(id) {
                    message.is_streaming = false;
                }
            }
        }
    }

    /// Remove an in-progress assistant entry, e.g. after the user cancels.
    pub fn discard(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages
            .retain(|m| !(m.id == id && m.role == MessageRole::Assistant));
        self.messages.len() < before
    }
}
