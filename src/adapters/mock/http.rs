//! Mock HTTP client for testing.
//!
//! Responses are scripted per URL. Streaming responses are delivered as the
//! exact chunk sequence given, which is how tests exercise arbitrary chunk
//! boundaries without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered response for `get`.
    Success(Response),
    /// Fail at open time.
    Error(HttpError),
    /// Stream these chunks, then end cleanly.
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail mid-stream.
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then never yield again.
    Pending(Vec<Bytes>),
}

/// Decrements the open-stream counter when the body stream is dropped.
struct OpenStreamGuard(Arc<AtomicUsize>);

impl Drop for OpenStreamGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock HTTP client for testing.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://rag.test/chat",
///     MockResponse::Stream(vec![Bytes::from("data: {\"type\":\"token\",\"content\":\"hi\"}\n")]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    open_streams: Arc<AtomicUsize>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a specific URL (exact match, then prefix match).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of body streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        responses
            .iter()
            .find(|(pattern, _)| url.starts_with(pattern.as_str()))
            .map(|(_, response)| response.clone())
    }

    fn track(&self, stream: ByteStream) -> ByteStream {
        self.open_streams.fetch_add(1, Ordering::SeqCst);
        let guard = OpenStreamGuard(Arc::clone(&self.open_streams));
        Box::pin(stream.map(move |item| {
            let _ = &guard;
            item
        }))
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);

        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));

        let stream: ByteStream = match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => {
                Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
            }
            Some(MockResponse::StreamThenError(chunks, err)) => Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::once(async move { Err(err) })),
            ),
            Some(MockResponse::Pending(chunks)) => Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::pending()),
            ),
            Some(MockResponse::Error(err)) => return Err(err),
            Some(MockResponse::Success(_)) => {
                return Err(HttpError::Other(
                    "Non-stream response on stream request".to_string(),
                ))
            }
            None => {
                return Err(HttpError::Other(format!("No mock response for URL: {}", url)))
            }
        };

        Ok(self.track(stream))
    }
}
