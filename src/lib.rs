//! patchstream - keeps a JSON document in sync with a Server-Sent Events
//! stream of full snapshots (`data`) and RFC 6902 patches (`patch`).
//!
//! The pieces, leaves first:
//! - [`json_patch`] applies a patch document to a JSON value
//! - [`sse`] decodes the wire format and classifies event names
//! - [`state`] holds the reconciled document
//! - [`session`] runs one connection and dispatches events into the store
//! - [`controller`] starts and closes a session

pub mod adapters;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod json_patch;
pub mod logging;
pub mod proxy_url;
pub mod session;
pub mod sse;
pub mod state;
pub mod traits;

pub use config::StreamConfig;
pub use controller::{CloseOutcome, StreamController};
pub use error::{StreamError, TransportError};
pub use session::{CloseReason, SessionOutcome, SessionState};
