//! Streaming-related error types.
//!
//! This module defines the errors that end a reconciliation session:
//! data-integrity faults, upstream error signals and transport failures.

use crate::json_patch::PatchError;
use crate::sse::EventKind;

use super::TransportError;

/// Errors surfaced by the session and its controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// Payload was not well-formed where JSON was expected.
    #[error("Invalid JSON in {kind} payload: {message}")]
    Decode { kind: EventKind, message: String },

    /// Patch is well-formed but does not apply to the current document.
    #[error("Patch rejected: {0}")]
    Patch(#[from] PatchError),

    /// A patch arrived before any full document.
    #[error("Patch received before any full document")]
    NoBaseDocument,

    /// The upstream sent an `error` event.
    #[error("Upstream reported an error: {payload}")]
    StreamErrorSignal { payload: String },

    /// Connection-level failure.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The session target could not be used.
    #[error("Invalid stream target: {0}")]
    InvalidTarget(String),

    /// `start()` was called on a session that already ran or was closed.
    #[error("Session was already started or closed")]
    AlreadyStarted,
}

impl StreamError {
    /// True for faults after which the local document can no longer be trusted.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            StreamError::Decode { .. } | StreamError::Patch(_) | StreamError::NoBaseDocument
        )
    }

    /// Check if a fresh session is likely to succeed.
    ///
    /// Data-integrity faults are retryable: a new session starts from a new
    /// full document.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Decode { .. } | StreamError::Patch(_) | StreamError::NoBaseDocument => {
                true
            }
            StreamError::StreamErrorSignal { .. } => false,
            StreamError::Transport(err) => err.is_retryable(),
            StreamError::InvalidTarget(_) | StreamError::AlreadyStarted => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Decode { kind, .. } => {
                format!("Received a malformed {} event; the stream was closed.", kind)
            }
            StreamError::Patch(_) | StreamError::NoBaseDocument => {
                "The local copy fell out of sync with the server; the stream was closed."
                    .to_string()
            }
            StreamError::StreamErrorSignal { payload } => {
                format!("The server ended the stream with an error: {}", payload)
            }
            StreamError::Transport(err) => format!("Connection problem: {}", err),
            StreamError::InvalidTarget(target) => {
                format!("'{}' is not a usable stream URL.", target)
            }
            StreamError::AlreadyStarted => {
                "This session has already been used; create a new one to reconnect.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Decode { .. } => "E_STREAM_JSON",
            StreamError::Patch(_) => "E_STREAM_PATCH",
            StreamError::NoBaseDocument => "E_STREAM_NO_BASE",
            StreamError::StreamErrorSignal { .. } => "E_STREAM_UPSTREAM",
            StreamError::Transport(err) => err.error_code(),
            StreamError::InvalidTarget(_) => "E_STREAM_TARGET",
            StreamError::AlreadyStarted => "E_STREAM_REUSED",
        }
    }
}
