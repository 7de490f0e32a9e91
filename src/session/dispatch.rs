//! Per-kind event handlers.
//!
//! Each handler gets the store and the event and decides whether the
//! session continues. Handlers never hold state of their own.

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error};

use crate::error::StreamError;
use crate::json_patch::PatchDocument;
use crate::logging::snippet;
use crate::sse::{classify, EventKind, InboundEvent};
use crate::state::ReconciledStore;

/// What the session does after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Continue,
    Close(StreamError),
}

pub type Handler = fn(&ReconciledStore, &InboundEvent) -> Disposition;

/// Handler table keyed by [`EventKind`].
#[derive(Clone)]
pub struct DispatchTable {
    handlers: HashMap<EventKind, Handler>,
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl DispatchTable {
    /// Override the handler for `kind`.
    pub fn with_handler(mut self, kind: EventKind, handler: Handler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Classify `event` and run its handler.
    pub fn dispatch(&self, store: &ReconciledStore, event: &InboundEvent) -> Disposition {
        let kind = classify(&event.name);
        let handler = self
            .handlers
            .get(&kind)
            .copied()
            .unwrap_or(handle_unrecognized);
        handler(store, event)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        let handlers: HashMap<EventKind, Handler> = EventKind::ALL
            .into_iter()
            .map(|kind| (kind, default_handler(kind)))
            .collect();
        Self { handlers }
    }
}

fn default_handler(kind: EventKind) -> Handler {
    match kind {
        EventKind::FullReplace => handle_full_replace,
        EventKind::Patch => handle_patch,
        EventKind::StreamError => handle_stream_error,
        EventKind::Unrecognized => handle_unrecognized,
    }
}

/// Replace the document with the event payload.
pub fn handle_full_replace(store: &ReconciledStore, event: &InboundEvent) -> Disposition {
    match store.replace_raw(event.payload()) {
        Ok(()) => {
            debug!(payload = %snippet(&event.data), "Data received");
            Disposition::Continue
        }
        Err(err) => {
            error!(error = %err, payload = %snippet(&event.data), "Data received is not JSON");
            Disposition::Close(err.into())
        }
    }
}

/// Decode the payload as a JSON Patch and apply it.
pub fn handle_patch(store: &ReconciledStore, event: &InboundEvent) -> Disposition {
    let patch = match PatchDocument::from_slice(event.payload()) {
        Ok(patch) => patch,
        Err(err) => {
            error!(error = %err, payload = %snippet(&event.data), "Patch received is not a JSON Patch");
            return Disposition::Close(StreamError::Decode {
                kind: EventKind::Patch,
                message: err.to_string(),
            });
        }
    };
    debug!(ops = patch.len(), payload = %snippet(&event.data), "Patch received");

    match store.apply_patch(&patch) {
        Ok(()) => {
            debug!(revision = store.revision(), "Document patched");
            Disposition::Continue
        }
        Err(err) => {
            error!(error = %err, "Patch could not be applied");
            Disposition::Close(err.into())
        }
    }
}

/// The upstream gave up on the stream.
pub fn handle_stream_error(_store: &ReconciledStore, event: &InboundEvent) -> Disposition {
    error!(payload = %snippet(&event.data), "Upstream reported an error");
    Disposition::Close(StreamError::StreamErrorSignal {
        payload: event.data.clone(),
    })
}

pub fn handle_unrecognized(_store: &ReconciledStore, event: &InboundEvent) -> Disposition {
    debug!(name = %event.name, payload = %snippet(&event.data), "Unhandled event received");
    Disposition::Continue
}
