//! Concrete implementations of the transport trait.
//!
//! - [`ReqwestHttpClient`] - production HTTP client using reqwest
//! - [`mock::MockHttpClient`] - scripted responses and chunk streams for tests

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
