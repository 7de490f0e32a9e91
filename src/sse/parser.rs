//! SSE stream parsing logic
//!
//! Contains the stateful SseParser for accumulating lines and emitting events,
//! and the LineDecoder that turns raw body chunks into lines.

use bytes::{Buf, BytesMut};

use crate::sse::events::{InboundEvent, SseLine, SseParseError, DEFAULT_EVENT_NAME};

/// Longest line accepted before the stream is considered malformed.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim_start().to_string());
    }

    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" => SseLine::Id(value.to_string()),
        "retry" => SseLine::Retry(value.to_string()),
        // Unknown field - ignored like a comment
        _ => SseLine::Comment(line.to_string()),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete events
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event name being accumulated
    current_event_name: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
    /// Last event id, carried across frames
    last_event_id: Option<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line to the parser, potentially returning a complete event
    ///
    /// Returns:
    /// - `Ok(Some(event))` - A complete event was parsed
    /// - `Ok(None)` - Line was consumed but event is incomplete
    /// - `Err(error)` - The line was rejected
    pub fn feed_line(&mut self, line: &str) -> Result<Option<InboundEvent>, SseParseError> {
        if line.len() > MAX_LINE_BYTES {
            return Err(SseParseError::LineTooLong {
                limit: MAX_LINE_BYTES,
            });
        }

        match parse_sse_line(line) {
            SseLine::Event(name) => {
                self.current_event_name = Some(name);
                Ok(None)
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                Ok(None)
            }
            SseLine::Id(id) => {
                // Ids containing NUL are ignored per the SSE processing model
                if !id.contains('\0') {
                    self.last_event_id = Some(id);
                }
                Ok(None)
            }
            SseLine::Retry(_) | SseLine::Comment(_) => Ok(None),
            SseLine::Empty => Ok(self.try_emit_event()),
        }
    }

    /// Emit the accumulated frame, if it carried any data lines
    fn try_emit_event(&mut self) -> Option<InboundEvent> {
        let name = self.current_event_name.take();
        if self.data_buffer.is_empty() {
            return None;
        }
        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        Some(InboundEvent {
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }

    /// Last event id seen on the stream
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.current_event_name = None;
        self.data_buffer.clear();
        self.last_event_id = None;
    }
}

/// Splits a chunked body into lines.
///
/// `\r\n`, `\n` and a bare `\r` all end a line. Bytes are buffered until a
/// line ending arrives, so multi-byte UTF-8 sequences split across chunks
/// decode correctly.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
    /// The previous line ended on `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Take the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Result<Option<String>, SseParseError> {
        if self.skip_lf && !self.buffer.is_empty() {
            if self.buffer[0] == b'\n' {
                self.buffer.advance(1);
            }
            self.skip_lf = false;
        }

        match self.buffer.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(pos) => {
                let line = self.buffer.split_to(pos);
                self.skip_lf = self.buffer[0] == b'\r';
                self.buffer.advance(1);
                Ok(Some(decode_line(&line)))
            }
            None if self.buffer.len() > MAX_LINE_BYTES => Err(SseParseError::LineTooLong {
                limit: MAX_LINE_BYTES,
            }),
            None => Ok(None),
        }
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        self.skip_lf = false;
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        Some(decode_line(&rest))
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
