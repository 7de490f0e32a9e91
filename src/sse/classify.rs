//! Event name classification.

use std::fmt;

/// Handling behavior selected for an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `data`: the payload is a complete document
    FullReplace,
    /// `patch`: the payload is a JSON Patch against the current document
    Patch,
    /// `error`: the upstream gave up on this stream
    StreamError,
    /// Anything else; logged and skipped
    Unrecognized,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::FullReplace,
        EventKind::Patch,
        EventKind::StreamError,
        EventKind::Unrecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::FullReplace => "full_replace",
            EventKind::Patch => "patch",
            EventKind::StreamError => "stream_error",
            EventKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an event name to its kind. Case-sensitive, exact match.
pub fn classify(event_name: &str) -> EventKind {
    match event_name {
        "data" => EventKind::FullReplace,
        "patch" => EventKind::Patch,
        "error" => EventKind::StreamError,
        _ => EventKind::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_names() {
        assert_eq!(classify("data"), EventKind::FullReplace);
        assert_eq!(classify("patch"), EventKind::Patch);
        assert_eq!(classify("error"), EventKind::StreamError);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("Data"), EventKind::Unrecognized);
        assert_eq!(classify("PATCH"), EventKind::Unrecognized);
        assert_eq!(classify(" error"), EventKind::Unrecognized);
    }

    #[test]
    fn test_classify_unknown_names() {
        assert_eq!(classify("message"), EventKind::Unrecognized);
        assert_eq!(classify(""), EventKind::Unrecognized);
        assert_eq!(classify("snapshot"), EventKind::Unrecognized);
    }
}
