//! Transport-level error types.
//!
//! This module defines errors raised while opening or reading the SSE
//! connection, independent of the event protocol carried over it.

use crate::sse::SseParseError;

/// Connection-level failures surfaced by an [`SseTransport`](crate::traits::SseTransport).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Connection to the server failed.
    #[error("Connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request or read timed out.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// HTTP status error (non-2xx response).
    #[error("Server returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The target could not be turned into a request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The body stream broke mid-read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The stream carried malformed SSE framing.
    #[error("Malformed SSE stream: {0}")]
    Framing(#[from] SseParseError),

    /// Generic transport error.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Check if this error is likely transient, so a new session may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed { .. } => true,
            TransportError::Timeout(_) => true,
            TransportError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            TransportError::Io(_) => true,
            TransportError::InvalidUrl(_) => false,
            TransportError::Framing(_) => false,
            TransportError::Other(_) => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed { .. } => "E_TRANSPORT_CONN",
            TransportError::Timeout(_) => "E_TRANSPORT_TIMEOUT",
            TransportError::HttpStatus { .. } => "E_TRANSPORT_HTTP",
            TransportError::InvalidUrl(_) => "E_TRANSPORT_URL",
            TransportError::Io(_) => "E_TRANSPORT_IO",
            TransportError::Framing(_) => "E_TRANSPORT_FRAMING",
            TransportError::Other(_) => "E_TRANSPORT_OTHER",
        }
    }
}

/// Classify a reqwest error into a TransportError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidUrl(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if let Some(status) = err.status() {
        TransportError::HttpStatus {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        TransportError::Io(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::ConnectionFailed {
            url: "http://x".to_string(),
            message: "refused".to_string(),
        }
        .is_retryable());
        assert!(TransportError::Timeout("read".to_string()).is_retryable());
        assert!(TransportError::HttpStatus {
            status: 503,
            message: String::new(),
        }
        .is_retryable());
        assert!(!TransportError::HttpStatus {
            status: 401,
            message: String::new(),
        }
        .is_retryable());
        assert!(!TransportError::InvalidUrl("nope".to_string()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TransportError::HttpStatus {
                status: 404,
                message: "missing".to_string(),
            }
            .to_string(),
            "Server returned HTTP 404: missing"
        );
        assert_eq!(
            TransportError::from(SseParseError::LineTooLong { limit: 4 }).to_string(),
            "Malformed SSE stream: SSE line exceeds 4 bytes"
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            TransportError::Timeout(String::new()).error_code(),
            TransportError::Io(String::new()).error_code(),
            TransportError::Other(String::new()).error_code(),
            TransportError::InvalidUrl(String::new()).error_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn test_classify_connect_error() {
        // Use a port that's unlikely to be in use
        let url = "http://127.0.0.1:59999/stream";
        let err = reqwest::Client::new().get(url).send().await.unwrap_err();
        assert!(matches!(
            classify_reqwest_error(&err, url),
            TransportError::ConnectionFailed { .. } | TransportError::Other(_)
        ));
    }
}
