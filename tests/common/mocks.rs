//! Mock transport configuration for integration tests.

pub use ragchat::adapters::mock::{MockHttpClient, MockResponse};
pub use ragchat::traits::HttpError;

use bytes::Bytes;
use ragchat::app::{ChatController, SessionEvents};
use ragchat::client::RagClient;
use ragchat::config::ClientConfig;

pub const BASE_URL: &str = "http://rag.test";
pub const CHAT_URL: &str = "http://rag.test/chat";

/// Builder for a mock transport scripted for `/chat`.
pub struct MockChatConfig {
    client: MockHttpClient,
}

impl MockChatConfig {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Serve `chunks` as the body of `/chat`, then end cleanly.
    pub fn with_chunks(self, chunks: &[&[u8]]) -> Self {
        self.client.set_response(
            CHAT_URL,
            MockResponse::Stream(chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect()),
        );
        self
    }

    /// Serve `chunks`, then break the connection.
    pub fn with_chunks_then_error(self, chunks: &[&[u8]], error: HttpError) -> Self {
        self.client.set_response(
            CHAT_URL,
            MockResponse::StreamThenError(
                chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect(),
                error,
            ),
        );
        self
    }

    /// Serve `chunks` and then hold the stream open forever.
    pub fn with_open_stream(self, chunks: &[&[u8]]) -> Self {
        self.client.set_response(
            CHAT_URL,
            MockResponse::Pending(chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect()),
        );
        self
    }

    /// Fail `/chat` at open time.
    pub fn with_open_error(self, error: HttpError) -> Self {
        self.client.set_response(CHAT_URL, MockResponse::Error(error));
        self
    }

    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller wired to `mock`, plus its event receiver.
pub fn controller_for(mock: &MockHttpClient) -> (ChatController<MockHttpClient>, SessionEvents) {
    let client = RagClient::with_http(ClientConfig::default().with_base_url(BASE_URL), mock.clone());
    ChatController::channel(client)
}
