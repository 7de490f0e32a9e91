//! JSON Patch document and error types.

use ::json_patch::{Patch, PatchErrorKind, PatchOperation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation name, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }
}

impl From<&PatchOperation> for OpKind {
    fn from(op: &PatchOperation) -> Self {
        match op {
            PatchOperation::Add(_) => OpKind::Add,
            PatchOperation::Remove(_) => OpKind::Remove,
            PatchOperation::Replace(_) => OpKind::Replace,
            PatchOperation::Move(_) => OpKind::Move,
            PatchOperation::Copy(_) => OpKind::Copy,
            PatchOperation::Test(_) => OpKind::Test,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target path of `op`, in pointer notation.
pub(crate) fn op_path(op: &PatchOperation) -> String {
    match op {
        PatchOperation::Add(op) => op.path.to_string(),
        PatchOperation::Remove(op) => op.path.to_string(),
        PatchOperation::Replace(op) => op.path.to_string(),
        PatchOperation::Move(op) => op.path.to_string(),
        PatchOperation::Copy(op) => op.path.to_string(),
        PatchOperation::Test(op) => op.path.to_string(),
    }
}

/// An ordered sequence of operations, applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(Patch);

impl PatchDocument {
    pub fn new(ops: Vec<PatchOperation>) -> Self {
        Self(Patch(ops))
    }

    /// Decode a patch document from raw JSON bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0 .0
    }

    pub fn as_patch(&self) -> &Patch {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0 .0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0 .0.is_empty()
    }
}

impl From<Patch> for PatchDocument {
    fn from(patch: Patch) -> Self {
        Self(patch)
    }
}

/// Why an operation could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PatchFailure {
    /// `path` does not resolve to a location the operation can use.
    #[error("path not found")]
    PathNotFound,
    /// `from` of a move or copy does not resolve.
    #[error("\"from\" path not found")]
    FromPathNotFound,
    #[error("test value does not match")]
    TestFailed,
    #[error("cannot move a value into one of its own children")]
    MoveIntoDescendant,
    #[error("no base document")]
    NoDocument,
    #[error("operation rejected")]
    Rejected,
}

impl From<&PatchErrorKind> for PatchFailure {
    fn from(kind: &PatchErrorKind) -> Self {
        match kind {
            PatchErrorKind::TestFailed => PatchFailure::TestFailed,
            PatchErrorKind::InvalidPointer => PatchFailure::PathNotFound,
            PatchErrorKind::InvalidFromPointer => PatchFailure::FromPathNotFound,
            PatchErrorKind::CannotMoveInsideItself => PatchFailure::MoveIntoDescendant,
            _ => PatchFailure::Rejected,
        }
    }
}

/// First operation of a patch that failed to apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("op #{index} ({op} {path}): {reason}")]
pub struct PatchError {
    /// Position of the failing operation within the patch.
    pub index: usize,
    pub op: OpKind,
    /// Target path, in pointer notation.
    pub path: String,
    pub reason: PatchFailure,
}

impl PatchError {
    pub fn new(index: usize, op: &PatchOperation, reason: PatchFailure) -> Self {
        Self {
            index,
            op: OpKind::from(op),
            path: op_path(op),
            reason,
        }
    }
}
