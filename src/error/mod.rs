//! Error handling for the streaming core.
//!
//! - **TransportError**: connection-level failures from the SSE transport
//! - **StreamError**: everything that ends a session, including data-integrity
//!   faults (bad JSON, rejected patches, patches without a base document) and
//!   upstream `error` events
//!
//! None of these terminate the process. The controller hands them to its
//! caller together with the closed-session notification.
//!
//! | Error | Ends session | Retryable with a new session |
//! |-------|--------------|------------------------------|
//! | Decode / Patch / NoBaseDocument | Yes | Yes |
//! | StreamErrorSignal | Yes | No |
//! | Transport | Yes | Depends on the failure |

mod stream;
mod transport;

pub use stream::StreamError;
pub use transport::{classify_reqwest_error, TransportError};
