//! HTTP transport trait abstraction.
//!
//! The chat client only needs two things from the network: a plain GET for
//! the health endpoint and a POST whose response body is handed back as a
//! lazy, forward-only stream of raw chunks. Keeping that behind a trait lets
//! the stream driver be exercised with scripted chunk sequences.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A streaming response body.
///
/// Yields raw chunks in arrival order. A transport failure shows up as a
/// single `Err` item in place of the next chunk; chunks already yielded are
/// never revoked. The stream cannot be restarted.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Fully-buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Non-2xx status at open time.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// The body stream broke after it was opened.
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Other(String),
}

/// Trait for the HTTP operations the chat client performs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and buffer the whole body.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// Perform a POST request and return the response body as a chunk stream.
    ///
    /// Implementations must return `HttpError::ServerError` for a non-2xx
    /// status before yielding any chunk.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
