//! Plain-text terminal renderer for session notifications.

use std::io::{self, Write};

use crate::events::SessionEvent;
use crate::models::Conversation;
use crate::sse::Source;

/// Writes answers to `out` as tokens arrive.
///
/// The [`Conversation`] it maintains is the authoritative view; text already
/// written to a terminal cannot be taken back, so a failed answer is followed
/// by a notice that it was discarded. Only the most recently started
/// session is rendered; events for any other id are ignored.
pub struct TerminalRenderer<W: Write> {
    out: W,
    conversation: Conversation,
    active: Option<String>,
    answer_started: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            conversation: Conversation::new(),
            active: None,
            answer_started: false,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one notification.
    pub fn handle(&mut self, event: &SessionEvent) -> io::Result<()> {
        if let SessionEvent::Started { id, .. } = event {
            self.active = Some(id.clone());
        } else if self.active.as_deref() != Some(event.session_id()) {
            tracing::trace!(session_id = %event.session_id(), "Not rendering stale event");
            return Ok(());
        }
        self.conversation.apply(event);

        match event {
            SessionEvent::Started { .. } => {
                self.answer_started = false;
            }
            SessionEvent::SourcesUpdated { .. } => {}
            SessionEvent::AnswerAppended { text, .. } => {
                self.answer_started = true;
                self.out.write_all(text.as_bytes())?;
                self.out.flush()?;
            }
            SessionEvent::SessionFailed { message, .. } => {
                if self.answer_started {
                    writeln!(self.out)?;
                    writeln!(self.out, "[partial answer discarded]")?;
                }
                writeln!(self.out, "Error: {}", message)?;
            }
            SessionEvent::SessionCompleted { id } => {
                writeln!(self.out)?;
                let sources = self
                    .conversation
                    .message(id)
                    .map(|m| m.sources.clone())
                    .unwrap_or_default();
                write_sources(&mut self.out, &sources)?;
            }
        }
        Ok(())
    }

    /// Note that the active answer was cancelled by the user.
    pub fn cancelled(&mut self, id: &str) -> io::Result<()> {
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.conversation.discard(id);
        writeln!(self.out)?;
        writeln!(self.out, "[cancelled]")
    }
}

fn write_sources<W: Write>(out: &mut W, sources: &[Source]) -> io::Result<()> {
    if sources.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Sources:")?;
    for (i, source) in sources.iter().enumerate() {
        writeln!(
            out,
            "  [{}] {} - {} (distance {:.3})",
            i + 1,
            source.title,
            source.url,
            source.distance
        )?;
    }
    Ok(())
}
