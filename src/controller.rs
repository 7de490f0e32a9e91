//! Lifecycle controller for a streaming session.
//!
//! [`StreamController`] owns the store and the session task. `start()` spawns
//! the task and returns at once; `close()` asks it to stop and waits, bounded
//! by [`StreamConfig::close_timeout`], for the connection to be released.
//! Failures come back as values; nothing here ends the process.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::adapters::ReqwestSseTransport;
use crate::config::StreamConfig;
use crate::error::{StreamError, TransportError};
use crate::session::{
    CloseReason, DispatchTable, SessionOutcome, SessionState, SessionStateTracker, SseSession,
};
use crate::state::ReconciledStore;
use crate::traits::SseTransport;

/// Result of [`StreamController::close`].
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    /// The session task finished and released its connection
    Closed(SessionOutcome),
    /// `close()` already ran
    AlreadyClosed,
    /// The task did not finish within the close timeout and was aborted.
    /// Carries the events dispatched before the abort.
    TimedOut(SessionOutcome),
    /// `start()` was never called
    NotStarted,
    /// The session task panicked
    Panicked,
}

/// The spawned session; `Err` carries the panic message.
type SessionTask = JoinHandle<Result<SessionOutcome, String>>;

#[derive(Debug, Default)]
struct Lifecycle {
    started: bool,
    closed: bool,
    handle: Option<SessionTask>,
}

pub struct StreamController {
    config: StreamConfig,
    transport: Arc<dyn SseTransport>,
    store: Arc<ReconciledStore>,
    state: Arc<SessionStateTracker>,
    dispatch: DispatchTable,
    shutdown: watch::Sender<bool>,
    lifecycle: Mutex<Lifecycle>,
}

impl StreamController {
    /// Create a controller for `config.target_url`.
    ///
    /// Fails with [`StreamError::InvalidTarget`] unless the target is an
    /// absolute http(s) URL.
    pub fn new(config: StreamConfig, transport: Arc<dyn SseTransport>) -> Result<Self, StreamError> {
        validate_target(&config.target_url)?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            config,
            transport,
            store: Arc::new(ReconciledStore::new()),
            state: Arc::new(SessionStateTracker::new()),
            dispatch: DispatchTable::default(),
            shutdown,
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    /// Create a controller backed by [`ReqwestSseTransport`].
    pub fn with_reqwest(config: StreamConfig) -> Result<Self, StreamError> {
        let transport = match config.connect_timeout {
            Some(timeout) => ReqwestSseTransport::with_connect_timeout(timeout)?,
            None => ReqwestSseTransport::new(),
        };
        Self::new(config, Arc::new(transport))
    }

    /// Replace the event handlers. Only effective before `start()`.
    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Spawn the session task. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<(), StreamError> {
        let mut lifecycle = self.lock_lifecycle();
        if lifecycle.started || lifecycle.closed {
            return Err(StreamError::AlreadyStarted);
        }

        let session = SseSession::new(
            self.config.target_url.clone(),
            Arc::clone(&self.transport),
            Arc::clone(&self.store),
            Arc::clone(&self.state),
        )
        .with_dispatch(self.dispatch.clone());

        let state = Arc::clone(&self.state);
        let run = session.run(self.shutdown.subscribe());
        // A panicking session must still close the tracker, or wait_closed never returns.
        lifecycle.handle = Some(tokio::spawn(async move {
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => Ok(outcome),
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(error = %message, "Session task panicked");
                    state.mark_closed(panicked(&message, state.events_processed()));
                    Err(message)
                }
            }
        }));
        lifecycle.started = true;
        debug!(url = %self.config.target_url, "Session task spawned");
        Ok(())
    }

    /// Stop the session and wait for it to release the connection.
    ///
    /// Only the first call does anything; later calls return
    /// [`CloseOutcome::AlreadyClosed`].
    pub async fn close(&self) -> CloseOutcome {
        let (was_started, handle) = {
            let mut lifecycle = self.lock_lifecycle();
            if lifecycle.closed {
                return CloseOutcome::AlreadyClosed;
            }
            lifecycle.closed = true;
            (lifecycle.started, lifecycle.handle.take())
        };

        self.shutdown.send_replace(true);

        let mut handle = match handle {
            Some(handle) => handle,
            None => {
                debug!(started = was_started, "Close requested with no session task");
                self.state.mark_closed(SessionOutcome::requested(0));
                return CloseOutcome::NotStarted;
            }
        };

        match tokio::time::timeout(self.config.close_timeout, &mut handle).await {
            Ok(Ok(Ok(outcome))) => CloseOutcome::Closed(outcome),
            Ok(Ok(Err(_))) => CloseOutcome::Panicked,
            Ok(Err(join_err)) => {
                error!(error = %join_err, "Session task failed");
                self.state
                    .mark_closed(panicked(&join_err.to_string(), self.state.events_processed()));
                CloseOutcome::Panicked
            }
            Err(_) => {
                handle.abort();
                let events_processed = self.state.events_processed();
                warn!(
                    url = %self.config.target_url,
                    timeout_ms = self.config.close_timeout.as_millis() as u64,
                    events = events_processed,
                    "Session did not release its connection in time; connection may be leaked"
                );
                self.state.mark_closed(SessionOutcome::requested(events_processed));
                let outcome = self
                    .state
                    .outcome()
                    .unwrap_or_else(|| SessionOutcome::requested(events_processed));
                CloseOutcome::TimedOut(outcome)
            }
        }
    }

    /// Wait for the session to close, without asking it to.
    ///
    /// Never returns if the session was neither started nor closed.
    pub async fn wait_closed(&self) -> SessionOutcome {
        self.state.wait_closed().await
    }

    /// Events dispatched so far, counted while the session runs.
    pub fn events_processed(&self) -> u64 {
        self.state.events_processed()
    }

    /// Current document, if a full document has arrived.
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.store.snapshot()
    }

    pub fn store(&self) -> Arc<ReconciledStore> {
        Arc::clone(&self.store)
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Error the session ended with, if it ended with one.
    pub fn last_error(&self) -> Option<StreamError> {
        self.state.outcome().and_then(|outcome| outcome.error)
    }

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

fn panicked(message: &str, events_processed: u64) -> SessionOutcome {
    SessionOutcome {
        reason: CloseReason::Fatal,
        error: Some(StreamError::Transport(TransportError::Other(format!(
            "session task panicked: {message}"
        )))),
        events_processed,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

fn validate_target(target: &str) -> Result<(), StreamError> {
    let url = reqwest::Url::parse(target)
        .map_err(|e| StreamError::InvalidTarget(format!("{target}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(StreamError::InvalidTarget(format!(
            "{target}: unsupported scheme {scheme}"
        ))),
    }
}
