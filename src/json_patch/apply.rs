//! Applying a patch document to a JSON value.
//!
//! The operations themselves are carried out by the `json-patch` crate
//! against a private copy of the base document, so a failure part way
//! through a patch never leaks a half-patched value to the caller.

use serde_json::Value;

use super::types::{PatchDocument, PatchError, PatchFailure};

/// Apply `patch` to `base`, returning the patched document.
///
/// `base` is left untouched. A `null` base means there is no document yet
/// and fails on the first operation; an empty patch is always a no-op.
pub fn apply(base: &Value, patch: &PatchDocument) -> Result<Value, PatchError> {
    let Some(first) = patch.operations().first() else {
        return Ok(base.clone());
    };
    if base.is_null() {
        return Err(PatchError::new(0, first, PatchFailure::NoDocument));
    }

    let mut working = base.clone();
    ::json_patch::patch(&mut working, patch.operations()).map_err(|err| {
        let reason = PatchFailure::from(&err.kind);
        match patch.operations().get(err.operation) {
            Some(op) => PatchError::new(err.operation, op, reason),
            None => PatchError::new(0, first, reason),
        }
    })?;
    Ok(working)
}
