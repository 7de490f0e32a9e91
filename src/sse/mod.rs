//! SSE (Server-Sent Events) stream parser
//!
//! SSE format consists of:
//! - `event: <name>` - event name line
//! - `data: <payload>` - data payload line(s)
//! - `id: <id>` - last event id
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Line and event definitions (SseLine, InboundEvent, SseParseError)
//! - `parser` - Parsing logic (SseParser, LineDecoder, parse_sse_line)
//! - `classify` - Mapping event names to handling behavior

mod classify;
mod events;
mod parser;

// Re-export public types
pub use classify::{classify, EventKind};
pub use events::{InboundEvent, SseLine, SseParseError, DEFAULT_EVENT_NAME};
pub use parser::{parse_sse_line, LineDecoder, SseParser, MAX_LINE_BYTES};
