//! Session lifecycle state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

use crate::error::StreamError;

/// Lifecycle of one session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Open => write!(f, "open"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// `close()` was called
    Requested,
    /// A data-integrity fault or an upstream `error` event
    Fatal,
    /// The connection failed or the server ended the stream
    TransportEnded,
}

/// Final report of a closed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub reason: CloseReason,
    pub error: Option<StreamError>,
    /// Events dispatched before the session closed
    pub events_processed: u64,
}

impl SessionOutcome {
    pub fn requested(events_processed: u64) -> Self {
        Self {
            reason: CloseReason::Requested,
            error: None,
            events_processed,
        }
    }
}

/// Publishes state transitions and keeps the final outcome.
///
/// Transitions are one-way: `Connecting -> Open -> Closed`, or straight to
/// `Closed`. Anything else is ignored.
#[derive(Debug)]
pub struct SessionStateTracker {
    tx: watch::Sender<SessionState>,
    outcome: Mutex<Option<SessionOutcome>>,
    /// Live count of dispatched events, readable while the session runs
    events: AtomicU64,
}

impl SessionStateTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Connecting);
        Self {
            tx,
            outcome: Mutex::new(None),
            events: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Move `Connecting -> Open`. Returns false if the session was not connecting.
    pub fn mark_open(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == SessionState::Connecting {
                *state = SessionState::Open;
                true
            } else {
                false
            }
        })
    }

    /// Move to `Closed`, recording `outcome`. Only the first call has any effect.
    pub fn mark_closed(&self, outcome: SessionOutcome) -> bool {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        drop(slot);
        self.tx.send_replace(SessionState::Closed);
        true
    }

    /// Count one dispatched event.
    pub fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    /// Events dispatched so far.
    pub fn events_processed(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    /// Final outcome, once closed.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until the session is closed and return its outcome.
    pub async fn wait_closed(&self) -> SessionOutcome {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so this cannot fail while we borrow it.
        let _ = rx.wait_for(|state| *state == SessionState::Closed).await;
        self.outcome()
            .unwrap_or_else(|| SessionOutcome::requested(0))
    }
}

impl Default for SessionStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
