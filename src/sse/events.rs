//! SSE line and event types.

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event name declaration (e.g., "event: patch")
    Event(String),
    /// Data payload line
    Data(String),
    /// Last event id
    Id(String),
    /// Reconnection delay hint, unparsed
    Retry(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment or unknown field (ignored)
    Comment(String),
}

/// A complete event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Event name, `"message"` when the frame did not set one
    pub name: String,
    /// Data lines joined with `\n`
    pub data: String,
    /// Value of the last `id:` field seen in this frame
    pub id: Option<String>,
}

impl InboundEvent {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            id: None,
        }
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

/// SSE framing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SseParseError {
    /// A single line exceeded the parser's limit
    #[error("SSE line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}
