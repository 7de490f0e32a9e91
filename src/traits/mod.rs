//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`SseTransport`] - Opens SSE connections
//! - [`SseConnection`] - Reads events from one open connection and releases it

pub mod sse;

pub use sse::{SseConnection, SseTransport};
