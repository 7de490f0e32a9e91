//! RFC 6902 JSON Patch, on top of the `json-patch` crate.
//!
//! # Module structure
//! - `types` - Patch document, operation kinds and error definitions
//! - `apply` - Applying a patch document to a `serde_json::Value`

mod apply;
mod types;

pub use apply::apply;
pub use types::{OpKind, PatchDocument, PatchError, PatchFailure};
