//! Frame parsing: one complete line in, at most one [`ChatEvent`] out.

use crate::sse::events::{ChatEvent, SseParseError};

/// Literal marker that introduces an event frame.
pub const DATA_PREFIX: &str = "data: ";

/// Parse a single complete line.
///
/// Returns `Ok(None)` for lines that are not event frames (blank separators,
/// `:` comments, `event:` or `id:` fields). Frames whose payload is not JSON,
/// has no `type`, names a type this client does not know, or does not match
/// the shape of its type come back as `Err`.
pub fn parse_frame(line: &str) -> Result<Option<ChatEvent>, SseParseError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    parse_payload(payload).map(Some)
}

/// Parse the JSON payload of a `data:` frame.
pub fn parse_payload(payload: &str) -> Result<ChatEvent, SseParseError> {
    // Parse to Value first so unknown types are told apart from broken shapes.
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| SseParseError::InvalidJson(e.to_string()))?;

    let event_type = match value.get("type") {
        None | Some(serde_json::Value::Null) => return Err(SseParseError::MissingType),
        Some(serde_json::Value::String(t)) => t.clone(),
        Some(other) => return Err(SseParseError::UnknownEventType(other.to_string())),
    };

    match event_type.as_str() {
        "sources" | "token" | "error" => {
            serde_json::from_value(value).map_err(|e| SseParseError::InvalidPayload {
                event_type,
                reason: e.to_string(),
            })
        }
        _ => Err(SseParseError::UnknownEventType(event_type)),
    }
}
