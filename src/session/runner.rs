//! The receive loop of one session.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dispatch::{DispatchTable, Disposition};
use super::state::{CloseReason, SessionOutcome, SessionStateTracker};
use crate::error::StreamError;
use crate::state::ReconciledStore;
use crate::traits::SseTransport;

/// One connection to one target, from connect to close.
pub struct SseSession {
    target: String,
    transport: Arc<dyn SseTransport>,
    store: Arc<ReconciledStore>,
    dispatch: DispatchTable,
    state: Arc<SessionStateTracker>,
}

impl SseSession {
    pub fn new(
        target: impl Into<String>,
        transport: Arc<dyn SseTransport>,
        store: Arc<ReconciledStore>,
        state: Arc<SessionStateTracker>,
    ) -> Self {
        Self {
            target: target.into(),
            transport,
            store,
            dispatch: DispatchTable::default(),
            state,
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Run until the stream ends, a handler closes the session, or
    /// `shutdown` flips to `true`.
    ///
    /// The connection is disconnected exactly once and the tracker is
    /// marked closed before this returns.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> SessionOutcome {
        let outcome = self.run_inner(&mut shutdown).await;
        match &outcome.error {
            Some(err) => warn!(
                url = %self.target,
                reason = ?outcome.reason,
                code = err.error_code(),
                error = %err,
                events = outcome.events_processed,
                "Session closed with error"
            ),
            None => info!(
                url = %self.target,
                reason = ?outcome.reason,
                events = outcome.events_processed,
                "Session closed"
            ),
        }
        self.state.mark_closed(outcome.clone());
        outcome
    }

    async fn run_inner(&self, shutdown: &mut watch::Receiver<bool>) -> SessionOutcome {
        if *shutdown.borrow() {
            return SessionOutcome::requested(0);
        }

        debug!(url = %self.target, "Connecting");
        let connected = tokio::select! {
            biased;
            _ = shutdown.wait_for(|stop| *stop) => return SessionOutcome::requested(0),
            result = self.transport.connect(&self.target) => result,
        };

        let mut conn = match connected {
            Ok(conn) => conn,
            Err(err) => {
                return SessionOutcome {
                    reason: CloseReason::TransportEnded,
                    error: Some(StreamError::Transport(err)),
                    events_processed: 0,
                }
            }
        };

        self.state.mark_open();
        info!(url = %self.target, "Session open");

        let mut events_processed = 0u64;
        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => {
                    break SessionOutcome::requested(events_processed);
                }
                next = conn.next_event() => next,
            };

            match next {
                Some(Ok(event)) => {
                    events_processed += 1;
                    self.state.record_event();
                    if let Disposition::Close(err) = self.dispatch.dispatch(&self.store, &event) {
                        break SessionOutcome {
                            reason: CloseReason::Fatal,
                            error: Some(err),
                            events_processed,
                        };
                    }
                }
                Some(Err(err)) => {
                    break SessionOutcome {
                        reason: CloseReason::TransportEnded,
                        error: Some(StreamError::Transport(err)),
                        events_processed,
                    };
                }
                None => {
                    break SessionOutcome {
                        reason: CloseReason::TransportEnded,
                        error: None,
                        events_processed,
                    };
                }
            }
        };

        conn.disconnect().await;
        outcome
    }
}
