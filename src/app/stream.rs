//! The decode loop: raw chunks in, session notifications out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::error::transport_user_message;
use crate::events::SessionEvent;
use crate::session::{Session, SessionState};
use crate::sse::StreamDecoder;
use crate::traits::HttpError;

/// A notification together with the cancel flag of the session that sent it.
#[derive(Debug)]
pub(crate) struct Envelope {
    cancelled: Arc<AtomicBool>,
    event: SessionEvent,
}

/// Receiving side of the notification channel.
///
/// Events of a cancelled session are skipped, including ones that were
/// already queued when it was cancelled.
#[derive(Debug)]
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl SessionEvents {
    /// Next live event. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let envelope = self.rx.recv().await?;
            if let Some(event) = Self::open(envelope) {
                return Some(event);
            }
        }
    }

    /// Next live event if one is queued right now.
    pub fn try_recv(&mut self) -> Result<SessionEvent, TryRecvError> {
        loop {
            let envelope = self.rx.try_recv()?;
            if let Some(event) = Self::open(envelope) {
                return Ok(event);
            }
        }
    }

    fn open(envelope: Envelope) -> Option<SessionEvent> {
        if envelope.cancelled.load(Ordering::SeqCst) {
            tracing::trace!(
                session_id = %envelope.event.session_id(),
                "Skipping event of cancelled session"
            );
            return None;
        }
        Some(envelope.event)
    }
}

/// Create a notification channel.
pub(crate) fn event_channel() -> (mpsc::UnboundedSender<Envelope>, SessionEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, SessionEvents { rx })
}

/// Outbound side of the notification channel for one session.
///
/// Cancelling and sending happen under the same lock, so once `cancel`
/// returns nothing more is sent. The `streaming` flag is cleared before a
/// terminal event is sent, so a receiver that has seen
/// `SessionCompleted`/`SessionFailed` can submit again immediately.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<Envelope>>>>,
    cancelled: Arc<AtomicBool>,
    streaming: Arc<AtomicBool>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            cancelled: Arc::new(AtomicBool::new(false)),
            streaming: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A sink wired to a fresh channel.
    pub fn channel() -> (Self, SessionEvents) {
        let (tx, events) = event_channel();
        (Self::new(tx), events)
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<Envelope>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a notification. Returns false if it was suppressed.
    pub fn emit(&self, event: SessionEvent) -> bool {
        let tx = self.sender();
        let Some(tx) = tx.as_ref() else {
            return false;
        };
        if event.is_terminal() {
            self.streaming.store(false, Ordering::SeqCst);
        }
        tx.send(Envelope {
            cancelled: Arc::clone(&self.cancelled),
            event,
        })
        .is_ok()
    }

    /// Stop delivery for good and invalidate anything still queued.
    pub fn cancel(&self) {
        let mut tx = self.sender();
        self.cancelled.store(true, Ordering::SeqCst);
        self.streaming.store(false, Ordering::SeqCst);
        tx.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancelled, or nobody is listening any more.
    pub fn is_closed(&self) -> bool {
        self.sender().as_ref().map_or(true, |tx| tx.is_closed())
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_finished(&self) {
        self.streaming.store(false, Ordering::SeqCst);
    }
}

/// Drive `session` from a chunk stream until it reaches a terminal state.
///
/// Chunks are pulled one at a time; the task suspends between them. Events
/// are applied strictly in arrival order. A server `error` event stops
/// processing immediately and the stream is dropped, closing the transport.
/// If the sink is closed, the loop returns without touching the session
/// further.
pub async fn run_session<S>(mut stream: S, session: &mut Session, sink: &EventSink) -> SessionState
where
    S: Stream<Item = Result<Bytes, HttpError>> + Unpin,
{
    let mut decoder = StreamDecoder::new();

    while session.is_active() {
        if sink.is_closed() {
            tracing::debug!(session_id = %session.id(), "Listener gone, abandoning stream");
            return session.state();
        }

        match stream.next().await {
            Some(Ok(chunk)) => {
                tracing::trace!(session_id = %session.id(), bytes = chunk.len(), "Chunk received");
                for event in decoder.feed(&chunk) {
                    if let Some(note) = session.apply(event) {
                        sink.emit(note);
                    }
                    if !session.is_active() {
                        break;
                    }
                }
            }
            Some(Err(err)) => {
                tracing::warn!(session_id = %session.id(), "Stream failed: {}", err);
                if let Some(note) = session.fail(transport_user_message(&err)) {
                    sink.emit(note);
                }
            }
            None => {
                decoder.finish();
                if let Some(note) = session.complete() {
                    sink.emit(note);
                }
            }
        }
    }

    tracing::debug!(
        session_id = %session.id(),
        frames = decoder.frames_seen(),
        dropped = decoder.frames_dropped(),
        "Stream finished"
    );
    session.state()
}
