//! Logging setup and payload snippets.

use std::borrow::Cow;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,patchstream=debug";

/// Longest payload excerpt written to the log, in characters.
pub const SNIPPET_CHARS: usize = 256;

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Truncate `payload` for logging, appending the number of elided characters.
pub fn snippet(payload: &str) -> Cow<'_, str> {
    match payload.char_indices().nth(SNIPPET_CHARS) {
        None => Cow::Borrowed(payload),
        Some((cut, _)) => {
            let rest = payload[cut..].chars().count();
            Cow::Owned(format!("{}… (+{} chars)", &payload[..cut], rest))
        }
    }
}
