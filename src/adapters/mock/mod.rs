//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait abstractions,
//! enabling session tests without network dependencies.
//!
//! # Available Mocks
//!
//! - [`MockSseTransport`] - Scripted SSE events with connect/disconnect counters

pub mod sse;

pub use sse::{MockSseConnection, MockSseTransport};
