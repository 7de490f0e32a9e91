//! Common helpers for integration tests.
//!
//! # Example
//!
//! ```ignore
//! let server = sse_server(&sse_body(&[("data", r#"{"a":1}"#)])).await;
//! let url = format!("{}{}", server.uri(), STREAM_PATH);
//! ```

#![allow(dead_code)]

use patchstream::state::ReconciledStore;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STREAM_PATH: &str = "/stream";

/// Encode `(event, data)` pairs as a `text/event-stream` body.
///
/// Multi-line data is split across several `data:` lines.
pub fn sse_body(events: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, data) in events {
        body.push_str(&format!("event: {}\n", name));
        for line in data.split('\n') {
            body.push_str(&format!("data: {}\n", line));
        }
        body.push('\n');
    }
    body
}

/// Start a server answering `GET /stream` with `body` as an event stream.
pub async fn sse_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .and(header("Accept", "text/event-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/event-stream")
                .set_body_string(body.to_string()),
        )
        .mount(&server)
        .await;
    server
}

pub fn stream_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), STREAM_PATH)
}

/// Poll until the store reaches `revision`, panicking after a second.
pub async fn wait_for_revision(store: &ReconciledStore, revision: u64) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while store.revision() < revision {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("store never reached revision {revision}"));
}
