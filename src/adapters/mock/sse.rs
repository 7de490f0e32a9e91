//! Mock SSE transport for testing.
//!
//! Events are scripted through a channel, so tests can push events before
//! or after the session connects and observe connect/disconnect calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::sse::InboundEvent;
use crate::traits::{SseConnection, SseTransport};

/// A scripted item delivered by the mock connection.
#[derive(Debug, Clone)]
enum MockItem {
    Event(InboundEvent),
    Error(TransportError),
}

#[derive(Debug)]
struct MockState {
    /// Sender half of the script; dropping it ends the stream
    script_tx: Mutex<Option<mpsc::UnboundedSender<MockItem>>>,
    /// Receiver half, handed to the first connection
    script_rx: Mutex<Option<mpsc::UnboundedReceiver<MockItem>>>,
    connect_error: Mutex<Option<TransportError>>,
    connect_delay: Mutex<Option<Duration>>,
    connected_urls: Mutex<Vec<String>>,
    connect_calls: AtomicUsize,
    disconnect_calls: Arc<AtomicUsize>,
}

/// Mock SSE transport for testing.
///
/// # Example
///
/// ```ignore
/// use patchstream::adapters::mock::MockSseTransport;
///
/// let transport = MockSseTransport::new();
/// transport.push_event("data", r#"{"a":1}"#);
/// transport.end_stream();
///
/// // ... run a session against `transport.clone()` ...
///
/// assert_eq!(transport.disconnect_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockSseTransport {
    state: Arc<MockState>,
}

impl MockSseTransport {
    /// Create a mock with an empty, open script.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(MockState {
                script_tx: Mutex::new(Some(tx)),
                script_rx: Mutex::new(Some(rx)),
                connect_error: Mutex::new(None),
                connect_delay: Mutex::new(None),
                connected_urls: Mutex::new(Vec::new()),
                connect_calls: AtomicUsize::new(0),
                disconnect_calls: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    fn push(&self, item: MockItem) {
        if let Some(tx) = self.state.script_tx.lock().unwrap().as_ref() {
            // Ignore send errors (connection already released)
            let _ = tx.send(item);
        }
    }

    /// Queue an event.
    pub fn push_event(&self, name: &str, data: &str) {
        self.push(MockItem::Event(InboundEvent::new(name, data)));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.push(MockItem::Error(error));
    }

    /// End the stream after the queued items, as if the server closed it.
    pub fn end_stream(&self) {
        self.state.script_tx.lock().unwrap().take();
    }

    /// Make `connect` fail with `error`.
    pub fn fail_connect_with(&self, error: TransportError) {
        *self.state.connect_error.lock().unwrap() = Some(error);
    }

    /// Make `connect` wait before answering.
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.state.connect_delay.lock().unwrap() = Some(delay);
    }

    /// Number of `connect` calls.
    pub fn connect_count(&self) -> usize {
        self.state.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls across all connections.
    pub fn disconnect_count(&self) -> usize {
        self.state.disconnect_calls.load(Ordering::SeqCst)
    }

    /// URLs passed to `connect`.
    pub fn connected_urls(&self) -> Vec<String> {
        self.state.connected_urls.lock().unwrap().clone()
    }
}

impl Default for MockSseTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SseTransport for MockSseTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn SseConnection>, TransportError> {
        self.state.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.state.connected_urls.lock().unwrap().push(url.to_string());

        let delay = *self.state.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.state.connect_error.lock().unwrap().clone() {
            return Err(error);
        }

        let rx = self
            .state
            .script_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TransportError::Other("mock script already consumed".to_string()))?;

        Ok(Box::new(MockSseConnection {
            rx: Some(rx),
            disconnect_calls: Arc::clone(&self.state.disconnect_calls),
        }))
    }
}

/// Connection handed out by [`MockSseTransport`].
pub struct MockSseConnection {
    rx: Option<mpsc::UnboundedReceiver<MockItem>>,
    disconnect_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SseConnection for MockSseConnection {
    async fn next_event(&mut self) -> Option<Result<InboundEvent, TransportError>> {
        match self.rx.as_mut()?.recv().await? {
            MockItem::Event(event) => Some(Ok(event)),
            MockItem::Error(error) => Some(Err(error)),
        }
    }

    async fn disconnect(&mut self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.rx = None;
    }
}
