//! Unified error type for the chat client.

use thiserror::Error;

use crate::traits::HttpError;

/// Errors returned by the chat client library.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The transport failed to open or broke mid-stream.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A non-stream response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Message suitable for showing to the user in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Http(err) => transport_user_message(err),
            ChatError::Json(_) => "The chat service sent a response this client could not read.".to_string(),
            ChatError::Config(msg) => format!("Configuration problem: {}", msg),
        }
    }
}

/// User-facing text for a transport failure.
pub fn transport_user_message(err: &HttpError) -> String {
    match err {
        HttpError::ConnectionFailed(_) => {
            "Could not connect to the chat service. Is the backend running?".to_string()
        }
        HttpError::Timeout(_) => "The chat service took too long to respond.".to_string(),
        HttpError::ServerError { status, message } => {
            let detail = server_error_detail(message);
            if detail.is_empty() {
                format!("The chat service returned an error (HTTP {}).", status)
            } else {
                format!("The chat service returned an error (HTTP {}): {}", status, detail)
            }
        }
        HttpError::Io(_) => "The connection to the chat service was lost.".to_string(),
        HttpError::InvalidUrl(url) => format!("Invalid chat service URL: {}", url),
        HttpError::Other(msg) => format!("Request to the chat service failed: {}", msg),
    }
}

/// Pull `detail` out of a JSON error body, falling back to the raw text.
fn server_error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
