//! Reconciled state store.
//!
//! Holds the single current JSON document. Readers take a cheap `Arc` clone
//! of the current value; writers build the next value off to the side and
//! swap it in, so a reader never sees a half-applied patch.

use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::StreamError;
use crate::json_patch::{self, PatchDocument, PatchError};
use crate::sse::EventKind;

/// Errors returned by store mutations. The current document is unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("document is not valid JSON: {0}")]
    Decode(String),
    #[error("no base document to patch")]
    NoBaseDocument,
    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl From<StoreError> for StreamError {
    fn from(err: StoreError) -> Self {
        match err {
            // The store only ever decodes full documents.
            StoreError::Decode(message) => StreamError::Decode {
                kind: EventKind::FullReplace,
                message,
            },
            StoreError::NoBaseDocument => StreamError::NoBaseDocument,
            StoreError::Patch(err) => StreamError::Patch(err),
        }
    }
}

/// The single canonical document, absent until the first full replace.
#[derive(Debug, Default)]
pub struct ReconciledStore {
    current: RwLock<Option<Arc<Value>>>,
    /// Serializes mutators so a patch is always computed against the latest value.
    writer: Mutex<()>,
    /// Count of successful mutations.
    revision: AtomicU64,
}

impl ReconciledStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document, or `None` before the first full replace.
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Number of successful mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Unconditionally overwrite the current document.
    pub fn replace(&self, doc: Value) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(doc);
    }

    /// Decode `raw` as JSON and overwrite the current document with it.
    pub fn replace_raw(&self, raw: &[u8]) -> Result<(), StoreError> {
        let doc: Value =
            serde_json::from_slice(raw).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.replace(doc);
        Ok(())
    }

    /// Apply `patch` to the current document.
    pub fn apply_patch(&self, patch: &PatchDocument) -> Result<(), StoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let base = self.snapshot().ok_or(StoreError::NoBaseDocument)?;
        let next = json_patch::apply(&base, patch)?;
        self.swap(next);
        Ok(())
    }

    /// Must be called with `writer` held.
    fn swap(&self, doc: Value) {
        let next = Arc::new(doc);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(next);
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::PatchFailure;
    use serde_json::json;

    fn patch(raw: Value) -> PatchDocument {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let store = ReconciledStore::new();
        assert!(store.is_empty());
        assert!(store.snapshot().is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_replace_then_snapshot_round_trips() {
        let store = ReconciledStore::new();
        let doc = json!({"prices": [{"title": "A", "price": 1.5}], "ok": true, "n": null});
        store.replace(doc.clone());
        assert_eq!(*store.snapshot().unwrap(), doc);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_replace_raw_rejects_bad_json_and_keeps_state() {
        let store = ReconciledStore::new();
        store.replace(json!({"a": 1}));
        let err = store.replace_raw(b"{not json").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
        assert_eq!(*store.snapshot().unwrap(), json!({"a": 1}));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_patch_without_base_fails() {
        let store = ReconciledStore::new();
        let err = store
            .apply_patch(&patch(json!([{"op": "add", "path": "/a", "value": 1}])))
            .unwrap_err();
        assert_eq!(err, StoreError::NoBaseDocument);
        assert!(store.is_empty());
    }

    #[test]
    fn test_ordered_patches() {
        let store = ReconciledStore::new();
        store.replace(json!({"a": 1}));
        store
            .apply_patch(&patch(json!([{"op": "add", "path": "/b", "value": 2}])))
            .unwrap();
        assert_eq!(*store.snapshot().unwrap(), json!({"a": 1, "b": 2}));
        store
            .apply_patch(&patch(json!([{"op": "remove", "path": "/a"}])))
            .unwrap();
        assert_eq!(*store.snapshot().unwrap(), json!({"b": 2}));
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_failed_patch_leaves_state() {
        let store = ReconciledStore::new();
        store.replace(json!({"a": 1}));
        let err = store
            .apply_patch(&patch(json!([{"op": "replace", "path": "/missing", "value": 1}])))
            .unwrap_err();
        match err {
            StoreError::Patch(err) => assert_eq!(err.reason, PatchFailure::PathNotFound),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*store.snapshot().unwrap(), json!({"a": 1}));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_snapshot_is_stable_across_mutation() {
        let store = ReconciledStore::new();
        store.replace(json!({"a": 1}));
        let before = store.snapshot().unwrap();
        store
            .apply_patch(&patch(json!([{"op": "replace", "path": "/a", "value": 2}])))
            .unwrap();
        assert_eq!(*before, json!({"a": 1}));
        assert_eq!(*store.snapshot().unwrap(), json!({"a": 2}));
    }

    #[test]
    fn test_concurrent_readers_never_see_partial_patch() {
        let store = Arc::new(ReconciledStore::new());
        store.replace(json!({"x": 0, "y": 0}));

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 1..=200 {
                    store
                        .apply_patch(&patch(json!([
                            {"op": "replace", "path": "/x", "value": i},
                            {"op": "replace", "path": "/y", "value": i}
                        ])))
                        .unwrap();
                }
            })
        };

        for _ in 0..500 {
            let doc = store.snapshot().unwrap();
            assert_eq!(doc["x"], doc["y"]);
        }
        writer.join().unwrap();
        assert_eq!(*store.snapshot().unwrap(), json!({"x": 200, "y": 200}));
    }

    #[test]
    fn test_store_error_converts_to_stream_error() {
        let err: StreamError = StoreError::Decode("eof".to_string()).into();
        assert_eq!(
            err,
            StreamError::Decode {
                kind: EventKind::FullReplace,
                message: "eof".to_string()
            }
        );
        let err: StreamError = StoreError::NoBaseDocument.into();
        assert_eq!(err, StreamError::NoBaseDocument);
    }
}
