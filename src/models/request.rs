use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    pub top_k: u32,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>, top_k: u32) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// Response of `GET /health`.
///
/// Only `status` is required; the index flags are reported by the reference
/// backend and default to `false` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub faiss_index_exists: bool,
    #[serde(default)]
    pub metadata_exists: bool,
}

impl HealthStatus {
    /// Backend is up and has an index to search.
    pub fn is_ready(&self) -> bool {
        self.status == "ok" && self.faiss_index_exists && self.metadata_exists
    }
}
