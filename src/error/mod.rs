//! Error handling for the chat client.
//!
//! | Failure | Surfaced as |
//! |---------|-------------|
//! | Malformed frame | logged and dropped, never shown |
//! | Server `error` event | `SessionFailed` with the server's message |
//! | Transport failure | `SessionFailed` with [`ChatError::user_message`] |
//! | Unterminated trailing frame | dropped silently |

mod chat_error;

pub use chat_error::{transport_user_message, ChatError};

/// Type alias for Results using ChatError.
pub type ChatResult<T> = Result<T, ChatError>;
