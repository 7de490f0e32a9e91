//! Reqwest-based SSE transport adapter.
//!
//! This module provides the production transport, implementing
//! [`SseTransport`] with a streaming `GET` request and the crate's own
//! line decoder and SSE parser.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::error::{classify_reqwest_error, TransportError};
use crate::sse::{InboundEvent, LineDecoder, SseParser};
use crate::traits::{SseConnection, SseTransport};

type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// SSE transport using reqwest.
///
/// # Example
///
/// ```ignore
/// use patchstream::adapters::ReqwestSseTransport;
/// use patchstream::traits::SseTransport;
///
/// let transport = ReqwestSseTransport::new();
/// let mut conn = transport.connect("https://example.com/stream").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestSseTransport {
    client: reqwest::Client,
}

impl ReqwestSseTransport {
    /// Create a new transport with default client settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport whose client gives up connecting after `timeout`.
    ///
    /// No overall request timeout is set: the response body is a stream
    /// that stays open indefinitely.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a transport with a custom reqwest::Client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Default for ReqwestSseTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SseTransport for ReqwestSseTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn SseConnection>, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, url))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::HttpStatus { status, message });
        }

        debug!(url, "SSE stream established");

        Ok(Box::new(ReqwestSseConnection {
            url: url.to_string(),
            body: Some(Box::pin(response.bytes_stream())),
            decoder: LineDecoder::new(),
            parser: SseParser::new(),
        }))
    }
}

/// One streaming response body.
pub struct ReqwestSseConnection {
    url: String,
    /// `None` once the body ended or the connection was released
    body: Option<BodyStream>,
    decoder: LineDecoder,
    parser: SseParser,
}

impl ReqwestSseConnection {
    /// Parse buffered lines until an event completes or the buffer runs dry.
    fn drain(&mut self) -> Result<Option<InboundEvent>, TransportError> {
        while let Some(line) = self.decoder.next_line()? {
            if let Some(event) = self.parser.feed_line(&line)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl SseConnection for ReqwestSseConnection {
    async fn next_event(&mut self) -> Option<Result<InboundEvent, TransportError>> {
        loop {
            match self.drain() {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => {}
                Err(e) => {
                    self.body = None;
                    return Some(Err(e));
                }
            }

            let body = self.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => self.decoder.push(&chunk),
                Some(Err(e)) => {
                    self.body = None;
                    return Some(Err(classify_reqwest_error(&e, &self.url)));
                }
                None => {
                    // An unterminated trailing frame is discarded, as SSE requires.
                    self.body = None;
                    if let Some(line) = self.decoder.finish() {
                        if let Err(e) = self.parser.feed_line(&line) {
                            return Some(Err(e.into()));
                        }
                    }
                    return None;
                }
            }
        }
    }

    async fn disconnect(&mut self) {
        if self.body.take().is_some() {
            debug!(url = %self.url, "SSE connection released");
        }
        self.parser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_sse_transport_default() {
        let transport = ReqwestSseTransport::default();
        let _ = transport.inner();
    }

    #[test]
    fn test_reqwest_sse_transport_with_connect_timeout() {
        let transport = ReqwestSseTransport::with_connect_timeout(Duration::from_secs(3)).unwrap();
        let _ = transport.clone().inner();
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let transport = ReqwestSseTransport::new();
        let result = transport.connect("not-a-valid-url").await;
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connect_connection_refused() {
        let transport = ReqwestSseTransport::new();
        // Use a port that's unlikely to be in use
        let result = transport.connect("http://127.0.0.1:59999/stream").await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionFailed { .. }) | Err(TransportError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_drain_parses_buffered_frames() {
        let mut conn = ReqwestSseConnection {
            url: "http://test".to_string(),
            body: None,
            decoder: LineDecoder::new(),
            parser: SseParser::new(),
        };
        conn.decoder.push(b"event: data\ndata: {}\n\nevent: patch\ndata: []\n\n");
        assert_eq!(conn.next_event().await, Some(Ok(InboundEvent::new("data", "{}"))));
        assert_eq!(conn.next_event().await, Some(Ok(InboundEvent::new("patch", "[]"))));
        assert_eq!(conn.next_event().await, None);
        conn.disconnect().await;
        conn.disconnect().await;
    }
}
