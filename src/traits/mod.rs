//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - the stream transport used by the chat client

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
