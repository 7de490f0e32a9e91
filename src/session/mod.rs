//! One streaming session: connect, dispatch events into the store, close.
//!
//! - [`SseSession`] runs the receive loop
//! - [`DispatchTable`] maps event kinds to handlers
//! - [`SessionStateTracker`] publishes `Connecting -> Open -> Closed`

pub mod dispatch;
pub mod runner;
pub mod state;

pub use dispatch::{DispatchTable, Disposition, Handler};
pub use runner::SseSession;
pub use state::{CloseReason, SessionOutcome, SessionState, SessionStateTracker};
