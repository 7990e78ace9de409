//! Store collaborator: files, frames, saved canvas positions.
//!
//! DESIGN
//! ======
//! The navigation engine never owns document data. It reads frames and
//! commits finished gestures through the `CanvasStore` trait, which mirrors
//! the editor's store actions (`move_frame`, `save_canvas_position`,
//! `select_frame`, `delete_frame`, `create_frame`). `MemoryStore` is the
//! in-memory implementation used by the host binary and the tests; it
//! serializes to JSON so a host can persist it however it likes.
//!
//! Frames keep insertion order, which is also their stacking order.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_FRAME_CODE, DEFAULT_FRAME_CURSOR, DEFAULT_FRAME_SIZE};
use crate::error::StoreError;

/// Unique identifier for a file.
pub type FileId = Uuid;

/// Unique identifier for a frame within a file.
pub type FrameId = Uuid;

/// Persisted camera placement for a file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub left: f64,
    pub top: f64,
    pub zoom: f64,
}

impl Default for CanvasPosition {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, zoom: 1.0 }
    }
}

/// A positioned, sized block of widget code in virtual space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub name: String,
    pub code: String,
    /// Left edge in virtual coordinates.
    pub x: f64,
    /// Top edge in virtual coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Editor cursor offset into `code`.
    pub cursor_position: usize,
}

impl Frame {
    /// A default-sized frame with placeholder code at `at`.
    #[must_use]
    pub fn new(at: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Frame".into(),
            code: DEFAULT_FRAME_CODE.into(),
            x: at.x,
            y: at.y,
            width: DEFAULT_FRAME_SIZE,
            height: DEFAULT_FRAME_SIZE,
            cursor_position: DEFAULT_FRAME_CURSOR,
        }
    }

    /// Bounding box in virtual coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Sparse geometry update for a frame. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl FramePatch {
    /// Patch that moves a frame to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that replaces the whole bounding box.
    #[must_use]
    pub fn bounds(rect: Rect) -> Self {
        Self { x: Some(rect.x), y: Some(rect.y), width: Some(rect.width), height: Some(rect.height) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }

    pub fn apply(&self, frame: &mut Frame) {
        if let Some(x) = self.x {
            frame.x = x;
        }
        if let Some(y) = self.y {
            frame.y = y;
        }
        if let Some(width) = self.width {
            frame.width = width;
        }
        if let Some(height) = self.height {
            frame.height = height;
        }
    }
}

/// A document: its frames, selection, and saved camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub name: String,
    pub canvas_position: CanvasPosition,
    pub selected_frame_id: Option<FrameId>,
    /// Frames in stacking order (later entries draw above earlier ones).
    pub frames: Vec<Frame>,
}

impl File {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            canvas_position: CanvasPosition::default(),
            selected_frame_id: None,
            frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn frame(&self, frame_id: &FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == *frame_id)
    }

    fn frame_mut(&mut self, frame_id: &FrameId) -> Result<&mut Frame, StoreError> {
        self.frames
            .iter_mut()
            .find(|f| f.id == *frame_id)
            .ok_or(StoreError::FrameNotFound(*frame_id))
    }
}

/// Operations the canvas consumes from its persistence collaborator.
pub trait CanvasStore {
    /// Look up a file.
    fn file(&self, file_id: &FileId) -> Result<&File, StoreError>;

    /// Create a default frame with its top-left at `at` and select it.
    fn create_frame(&mut self, file_id: &FileId, at: Point) -> Result<FrameId, StoreError>;

    /// Remove a frame, clearing the selection if it was selected.
    fn delete_frame(&mut self, file_id: &FileId, frame_id: &FrameId) -> Result<(), StoreError>;

    /// Select a frame, or clear the selection with `None`.
    fn select_frame(&mut self, file_id: &FileId, frame_id: Option<FrameId>) -> Result<(), StoreError>;

    /// Apply a geometry patch to a frame.
    fn move_frame(&mut self, file_id: &FileId, frame_id: &FrameId, patch: FramePatch) -> Result<(), StoreError>;

    /// Remember where the camera was for a file.
    fn save_canvas_position(&mut self, file_id: &FileId, position: CanvasPosition) -> Result<(), StoreError>;
}

/// A store shared between the canvas and its debounced camera writer.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// Wrap a store for sharing.
pub fn shared<S>(store: S) -> SharedStore<S> {
    Arc::new(Mutex::new(store))
}

/// Lock a shared store, mapping poisoning to [`StoreError::Poisoned`].
pub fn lock<S>(store: &SharedStore<S>) -> Result<MutexGuard<'_, S>, StoreError> {
    store.lock().map_err(|_| StoreError::Poisoned)
}

/// In-memory store of files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    files: HashMap<FileId, File>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON snapshot, falling back to an empty store when it is invalid.
    #[must_use]
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "discarding invalid store snapshot");
                Self::default()
            }
        }
    }

    /// Serialize to a pretty-printed JSON snapshot.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Create an empty `Untitled` file and return its id.
    pub fn create_file(&mut self) -> FileId {
        let file = File::new("Untitled");
        let id = file.id;
        self.files.insert(id, file);
        id
    }

    pub fn rename_file(&mut self, file_id: &FileId, name: &str) -> Result<(), StoreError> {
        self.file_mut(file_id)?.name = name.to_string();
        Ok(())
    }

    /// Remove a file, returning it if it was present.
    pub fn delete_file(&mut self, file_id: &FileId) -> Option<File> {
        self.files.remove(file_id)
    }

    pub fn rename_frame(&mut self, file_id: &FileId, frame_id: &FrameId, name: &str) -> Result<(), StoreError> {
        self.file_mut(file_id)?.frame_mut(frame_id)?.name = name.to_string();
        Ok(())
    }

    fn file_mut(&mut self, file_id: &FileId) -> Result<&mut File, StoreError> {
        self.files.get_mut(file_id).ok_or(StoreError::FileNotFound(*file_id))
    }
}

impl CanvasStore for MemoryStore {
    fn file(&self, file_id: &FileId) -> Result<&File, StoreError> {
        self.files.get(file_id).ok_or(StoreError::FileNotFound(*file_id))
    }

    fn create_frame(&mut self, file_id: &FileId, at: Point) -> Result<FrameId, StoreError> {
        let file = self.file_mut(file_id)?;
        let frame = Frame::new(at);
        let id = frame.id;
        file.frames.push(frame);
        file.selected_frame_id = Some(id);
        Ok(id)
    }

    fn delete_frame(&mut self, file_id: &FileId, frame_id: &FrameId) -> Result<(), StoreError> {
        let file = self.file_mut(file_id)?;
        let before = file.frames.len();
        file.frames.retain(|f| f.id != *frame_id);
        if file.frames.len() == before {
            return Err(StoreError::FrameNotFound(*frame_id));
        }
        if file.selected_frame_id == Some(*frame_id) {
            file.selected_frame_id = None;
        }
        Ok(())
    }

    fn select_frame(&mut self, file_id: &FileId, frame_id: Option<FrameId>) -> Result<(), StoreError> {
        let file = self.file_mut(file_id)?;
        if let Some(id) = frame_id {
            file.frame(&id).ok_or(StoreError::FrameNotFound(id))?;
        }
        file.selected_frame_id = frame_id;
        Ok(())
    }

    fn move_frame(&mut self, file_id: &FileId, frame_id: &FrameId, patch: FramePatch) -> Result<(), StoreError> {
        let frame = self.file_mut(file_id)?.frame_mut(frame_id)?;
        patch.apply(frame);
        Ok(())
    }

    fn save_canvas_position(&mut self, file_id: &FileId, position: CanvasPosition) -> Result<(), StoreError> {
        self.file_mut(file_id)?.canvas_position = position;
        Ok(())
    }
}
