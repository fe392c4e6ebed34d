//! HTTP client for the retrieval-augmented chat backend.

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult};
use crate::models::{ChatRequest, HealthStatus};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// Client for the chat backend.
///
/// Generic over the transport so the stream driver can be tested against
/// scripted chunk sequences.
pub struct RagClient<C: HttpClient = ReqwestHttpClient> {
    config: ClientConfig,
    http: C,
}

impl RagClient<ReqwestHttpClient> {
    /// Build a reqwest-backed client from config.
    pub fn from_config(config: ClientConfig) -> ChatResult<Self> {
        let http = match config.connect_timeout() {
            Some(timeout) => ReqwestHttpClient::with_connect_timeout(timeout)?,
            None => ReqwestHttpClient::new(),
        };
        Ok(Self::with_http(config, http))
    }
}

impl<C: HttpClient> RagClient<C> {
    pub fn with_http(config: ClientConfig, http: C) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Open a streaming answer for `query`.
    ///
    /// Sends `POST /chat` with `{"query", "top_k"}`. A non-2xx status fails
    /// here, before any chunk is produced.
    pub async fn open_stream(&self, query: &str) -> ChatResult<ByteStream> {
        let request = ChatRequest::new(query, self.config.top_k);
        let body = serde_json::to_string(&request)?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let url = self.config.chat_url();
        tracing::debug!(%url, top_k = request.top_k, "Opening chat stream");
        let stream = self.http.post_stream(&url, &body, &headers).await?;
        Ok(stream)
    }

    /// Query `GET /health`.
    pub async fn health_check(&self) -> ChatResult<HealthStatus> {
        let url = self.config.health_url();
        let response = self.http.get(&url, &Headers::new()).await?;

        if !response.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatError::Http(HttpError::ServerError {
                status: response.status,
                message,
            }));
        }

        Ok(response.json()?)
    }
}
