//! Decoding of the chat service's event stream.
//!
//! The body is newline-delimited; each event is a single line of the form
//! `data: <JSON object>`. Everything else on the wire is ignored.
//!
//! # Module structure
//! - `buffer` - [`FrameBuffer`], stateful UTF-8 decoding and line splitting
//! - `events` - [`ChatEvent`], [`Source`], [`SseParseError`]
//! - `parser` - single-frame parsing
//! - `decoder` - [`StreamDecoder`], chunks in, events out

mod buffer;
mod decoder;
mod events;
mod parser;

pub use buffer::FrameBuffer;
pub use decoder::StreamDecoder;
pub use events::{ChatEvent, Source, SseParseError};
pub use parser::{parse_frame, parse_payload, DATA_PREFIX};
