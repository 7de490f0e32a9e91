//! Reconciled document state.
//!
//! The store is the only shared mutable resource: the session task writes to
//! it, any number of readers call [`ReconciledStore::snapshot`].

mod store;

pub use store::{ReconciledStore, StoreError};
