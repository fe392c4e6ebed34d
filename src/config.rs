//! Client configuration.
//!
//! Values come from defaults, then environment variables, then command-line
//! flags (applied by the binary through the builder methods).

use std::time::Duration;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default number of documents to retrieve per query.
pub const DEFAULT_TOP_K: u32 = 5;

pub const ENV_BASE_URL: &str = "RAGCHAT_API_URL";
pub const ENV_TOP_K: &str = "RAGCHAT_TOP_K";
pub const ENV_CONNECT_TIMEOUT: &str = "RAGCHAT_CONNECT_TIMEOUT_SECS";

/// Configuration for the chat client.
///
/// # Example
///
/// ```
/// use ragchat::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://rag.internal:8000/")
///     .with_top_k(3);
/// assert_eq!(config.base_url, "http://rag.internal:8000");
/// assert_eq!(config.top_k, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Documents to retrieve per query.
    pub top_k: u32,
    /// Bound on connection establishment. The stream itself is never timed out.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            top_k: DEFAULT_TOP_K,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Unparseable values are skipped with a warning and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }

        if let Some(raw) = lookup(ENV_TOP_K) {
            match raw.trim().parse::<u32>() {
                Ok(top_k) if top_k > 0 => config = config.with_top_k(top_k),
                _ => tracing::warn!("Ignoring invalid {}={:?}", ENV_TOP_K, raw),
            }
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_connect_timeout_secs(secs),
                _ => tracing::warn!("Ignoring invalid {}={:?}", ENV_CONNECT_TIMEOUT, raw),
            }
        }

        config
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}
