//! Request/response types and the rendering-side conversation model.

mod conversation;
mod message;
mod request;

pub use conversation::Conversation;
pub use message::{Message, MessageRole};
pub use request::{ChatRequest, HealthStatus};
