//! Query submission and stream lifecycle.
//!
//! [`ChatController`] enforces the single-active-session rule, spawns the
//! decode loop for each accepted query, and publishes
//! [`SessionEvent`](crate::events::SessionEvent)s on an unbounded channel.
//! The rendering layer only ever reads that channel, through
//! [`SessionEvents`].

pub mod stream;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::adapters::ReqwestHttpClient;
use crate::client::RagClient;
use crate::session::Session;
use crate::traits::HttpClient;

pub use stream::{run_session, EventSink, SessionEvents};

use stream::{event_channel, Envelope};

/// Why a submission was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Query was empty or whitespace.
    EmptyQuery,
    /// Another session is still streaming.
    AlreadyStreaming,
}

/// Result of [`ChatController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new session was created with this id.
    Started(String),
    Rejected(RejectReason),
}

struct ActiveStream {
    id: String,
    sink: EventSink,
    handle: JoinHandle<Session>,
}

/// Owns the chat client and at most one in-flight session.
pub struct ChatController<C: HttpClient + 'static = ReqwestHttpClient> {
    client: Arc<RagClient<C>>,
    events_tx: mpsc::UnboundedSender<Envelope>,
    active: Option<ActiveStream>,
}

impl<C: HttpClient + 'static> ChatController<C> {
    /// Create a controller together with the receiving end of its event channel.
    pub fn channel(client: RagClient<C>) -> (Self, SessionEvents) {
        let (events_tx, events) = event_channel();
        let controller = Self {
            client: Arc::new(client),
            events_tx,
            active: None,
        };
        (controller, events)
    }

    pub fn client(&self) -> &RagClient<C> {
        &self.client
    }

    /// True while a session is in the `Streaming` state.
    pub fn is_streaming(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.sink.is_streaming())
    }

    /// Id of the streaming session, if any.
    pub fn active_session_id(&self) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|active| active.sink.is_streaming())
            .map(|active| active.id.as_str())
    }

    /// Submit a query.
    ///
    /// Rejected without side effects if the query is blank or a session is
    /// still streaming. Otherwise `Started` is emitted synchronously and the
    /// transport is opened on a spawned task. Must be called from within a
    /// tokio runtime.
    pub fn submit(&mut self, query: &str) -> SubmitOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyQuery);
        }
        if self.is_streaming() {
            tracing::debug!("Rejecting submission while a session is streaming");
            return SubmitOutcome::Rejected(RejectReason::AlreadyStreaming);
        }

        let mut session = Session::new(query);
        let sink = EventSink::new(self.events_tx.clone());
        if let Some(note) = session.start() {
            sink.emit(note);
        }
        let id = session.id().to_string();

        let client = Arc::clone(&self.client);
        let task_sink = sink.clone();
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            let opened = client.open_stream(&query).await;
            match opened {
                Ok(body) => {
                    run_session(body, &mut session, &task_sink).await;
                }
                Err(err) => {
                    tracing::warn!(session_id = %session.id(), "Failed to open stream: {}", err);
                    if let Some(note) = session.fail(err.user_message()) {
                        task_sink.emit(note);
                    }
                }
            }
            task_sink.mark_finished();
            session
        });

        self.active = Some(ActiveStream {
            id: id.clone(),
            sink,
            handle,
        });
        SubmitOutcome::Started(id)
    }

    /// Tear down the streaming session, closing its transport.
    ///
    /// No further events for it are delivered, not even ones already queued
    /// on the channel. Returns the cancelled id.
    pub fn cancel(&mut self) -> Option<String> {
        if !self.is_streaming() {
            return None;
        }
        let active = self.active.take()?;
        active.sink.cancel();
        active.handle.abort();
        tracing::info!(session_id = %active.id, "Session cancelled");
        Some(active.id)
    }

    /// Wait for the most recent session's task to finish and return its
    /// final state. Returns `None` if there is none or it was aborted.
    pub async fn wait(&mut self) -> Option<Session> {
        let active = self.active.take()?;
        match active.handle.await {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::debug!(session_id = %active.id, "Session task ended abnormally: {}", err);
                None
            }
        }
    }
}

impl<C: HttpClient + 'static> Drop for ChatController<C> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.sink.cancel();
            active.handle.abort();
        }
    }
}
