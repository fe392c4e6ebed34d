//! Chunk-to-event decoding.

use crate::sse::buffer::FrameBuffer;
use crate::sse::events::{ChatEvent, SseParseError};
use crate::sse::parser::parse_frame;

/// Turns raw body chunks into [`ChatEvent`]s.
///
/// Malformed frames are logged and skipped; they never poison the buffer or
/// stop decoding of later frames. The event sequence produced for a byte
/// stream does not depend on where the chunk boundaries fall.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: FrameBuffer,
    frames_seen: u64,
    frames_dropped: u64,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and collect the events it completed, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ChatEvent> {
        self.buffer
            .push(chunk)
            .iter()
            .filter_map(|line| self.decode_line(line))
            .collect()
    }

    /// End of input. Any unterminated tail is discarded, never parsed.
    pub fn finish(&mut self) {
        let dropped = self.buffer.finish();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "Discarding unterminated trailing frame");
        }
    }

    /// Number of `data:` frames seen so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Number of `data:` frames that did not yield an event.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    fn decode_line(&mut self, line: &str) -> Option<ChatEvent> {
        match parse_frame(line) {
            Ok(Some(event)) => {
                self.frames_seen += 1;
                tracing::trace!(event_type = event.event_type_name(), "Decoded frame");
                Some(event)
            }
            Ok(None) => None,
            Err(err) => {
                self.frames_seen += 1;
                self.frames_dropped += 1;
                match err {
                    SseParseError::UnknownEventType(_) | SseParseError::MissingType => {
                        tracing::debug!("Ignoring frame: {}", err)
                    }
                    _ => tracing::warn!("Dropping malformed frame: {}", err),
                }
                None
            }
        }
    }
}
