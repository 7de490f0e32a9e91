//! SSE transport trait abstraction.
//!
//! Provides a trait-based abstraction over the network connection that
//! delivers SSE events, enabling dependency injection and mocking in tests.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::sse::InboundEvent;

/// Opens SSE connections.
///
/// # Example
///
/// ```ignore
/// use patchstream::traits::SseTransport;
///
/// async fn first_event<T: SseTransport>(transport: &T, url: &str) {
///     let mut conn = transport.connect(url).await?;
///     if let Some(Ok(event)) = conn.next_event().await {
///         println!("{}: {}", event.name, event.data);
///     }
///     conn.disconnect().await;
/// }
/// ```
#[async_trait]
pub trait SseTransport: Send + Sync {
    /// Open a connection to `url`.
    ///
    /// Returns once the stream is established (response headers received).
    async fn connect(&self, url: &str) -> Result<Box<dyn SseConnection>, TransportError>;
}

/// A single open SSE connection, owned by one session.
#[async_trait]
pub trait SseConnection: Send {
    /// Wait for the next event.
    ///
    /// # Returns
    /// - `Some(Ok(event))` for each complete event, in arrival order
    /// - `Some(Err(error))` if the connection failed
    /// - `None` once the server closed the stream or after `disconnect`
    async fn next_event(&mut self) -> Option<Result<InboundEvent, TransportError>>;

    /// Release the underlying connection.
    ///
    /// Calling this more than once is harmless.
    async fn disconnect(&mut self);
}
