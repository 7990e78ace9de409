//! Error types for the store collaborator and the canvas composition.

use crate::store::{FileId, FrameId};

/// Failures reported by a [`crate::store::CanvasStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    FileNotFound(FileId),
    #[error("frame not found: {0}")]
    FrameNotFound(FrameId),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("invalid store snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures surfaced by [`crate::canvas::Canvas`] operations.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("canvas already destroyed")]
    Destroyed,
}
