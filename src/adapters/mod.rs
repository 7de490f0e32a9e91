//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestSseTransport`] - SSE over a streaming reqwest `GET`
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockSseTransport`] - Scripted events, connect/disconnect counters

pub mod mock;
pub mod reqwest_sse;

pub use mock::MockSseTransport;
pub use reqwest_sse::{ReqwestSseConnection, ReqwestSseTransport};
