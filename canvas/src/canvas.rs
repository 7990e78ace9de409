//! Canvas — one file's frames laid out in a viewport.
//!
//! DESIGN
//! ======
//! `Canvas` binds a [`File`](crate::store::File) in a shared store to a
//! [`Viewport`]:
//!
//! - on create, the camera is restored from the file's saved position;
//! - camera updates are debounced into `save_canvas_position`;
//! - every frame gets a [`FrameController`], registered as an interactable,
//!   and controllers of frames that left the store are dropped;
//! - background taps create a frame in draw mode, otherwise clear the
//!   selection;
//! - Backspace/Delete deletes the selected frame while focus is inside.
//!
//! Presses are hit-tested against the file's frames in virtual space. A hit
//! frame's interactable id is appended to the host's target path, so a
//! no-pan area the host marked inside the frame still wins.
//!
//! The store is shared with the debounce task, so it sits behind
//! `Arc<Mutex<_>>`. No lock is held across a viewport call that can reach
//! the host callbacks.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraHandle, Point, Rect};
use crate::error::{CanvasError, StoreError};
use crate::frame::FrameController;
use crate::gesture::{BackgroundPressHandler, PressCoordinates, PressTarget, TargetPath};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, Key, Modifiers, WheelDelta};
use crate::interactable::Interactable;
use crate::store::{CanvasStore, FileId, FrameId, SharedStore, lock};
use crate::viewport::{Viewport, ViewportHooks, ViewportProps};
use crate::zoom_controls::ZoomControls;

/// What a registered region on the canvas is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Frame(FrameId),
    /// A host-marked area exempt from background panning.
    NoPan,
}

/// What a background tap does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// Taps clear the selection.
    #[default]
    Select,
    /// The next tap creates a frame at the tap point.
    DrawFrame,
}

// =============================================================================
// Host hooks
// =============================================================================

struct CanvasHooks<S> {
    file_id: FileId,
    store: SharedStore<S>,
    mode: Rc<Cell<CanvasMode>>,
    camera: Option<CameraHandle>,
}

impl<S: CanvasStore + 'static> ViewportHooks for CanvasHooks<S> {
    fn on_create(&mut self, camera: &CameraHandle) {
        match lock(&self.store).and_then(|store| Ok(store.file(&self.file_id)?.canvas_position)) {
            Ok(pos) => camera.update_top_left(pos.left, pos.top, Some(pos.zoom)),
            Err(e) => warn!(file_id = %self.file_id, error = %e, "could not restore canvas position"),
        }
        self.camera = Some(camera.clone());
    }

    fn on_destroy(&mut self) {
        debug!(file_id = %self.file_id, "canvas viewport destroyed");
    }

    fn on_press_outside_interactable(&mut self) -> Box<dyn BackgroundPressHandler> {
        Box::new(TapHandler {
            file_id: self.file_id,
            store: self.store.clone(),
            mode: Rc::clone(&self.mode),
            camera: self.camera.clone(),
        })
    }
}

/// Background press handler built fresh for each press.
struct TapHandler<S> {
    file_id: FileId,
    store: SharedStore<S>,
    mode: Rc<Cell<CanvasMode>>,
    camera: Option<CameraHandle>,
}

impl<S: CanvasStore> TapHandler<S> {
    fn tap(&self, coords: PressCoordinates) -> Result<(), StoreError> {
        let mut store = lock(&self.store)?;
        match (self.mode.get(), &self.camera) {
            (CanvasMode::DrawFrame, Some(camera)) => {
                let at = camera.translate_client_xy_to_virtual_space(coords.client_x, coords.client_y);
                let frame_id = store.create_frame(&self.file_id, at)?;
                self.mode.set(CanvasMode::Select);
                info!(%frame_id, x = at.x, y = at.y, "frame created");
            }
            _ => store.select_frame(&self.file_id, None)?,
        }
        Ok(())
    }
}

impl<S: CanvasStore> BackgroundPressHandler for TapHandler<S> {
    fn on_tap(&mut self, coords: PressCoordinates) {
        if let Err(e) = self.tap(coords) {
            warn!(error = %e, "background tap failed");
        }
    }
}

// =============================================================================
// Canvas
// =============================================================================

/// A mounted canvas for one file.
pub struct Canvas<S> {
    file_id: FileId,
    store: SharedStore<S>,
    viewport: Viewport<Region>,
    frames: HashMap<FrameId, FrameController<Region>>,
    mode: Rc<Cell<CanvasMode>>,
    focus_inside: bool,
}

impl<S: CanvasStore + Send + 'static> Canvas<S> {
    /// Mount the canvas for `file_id`. Fails when the file does not exist.
    pub fn mount(store: SharedStore<S>, file_id: FileId, props: ViewportProps) -> Result<Self, CanvasError> {
        lock(&store)?.file(&file_id)?;

        let mode = Rc::new(Cell::new(CanvasMode::Select));
        let hooks = Box::new(CanvasHooks { file_id, store: store.clone(), mode: Rc::clone(&mode), camera: None });
        let sink_store = store.clone();
        let on_updated = move |camera: Camera| {
            let saved = lock(&sink_store).and_then(|mut s| s.save_canvas_position(&file_id, camera.position()));
            if let Err(e) = saved {
                warn!(%file_id, error = %e, "failed to save canvas position");
            }
        };
        let viewport = Viewport::mount(props, hooks, on_updated);

        let mut canvas = Self { file_id, store, viewport, frames: HashMap::new(), mode, focus_inside: false };
        canvas.sync_frames()?;
        info!(%file_id, frames = canvas.frames.len(), "canvas mounted");
        Ok(canvas)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    #[must_use]
    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    #[must_use]
    pub fn camera(&self) -> &CameraHandle {
        self.viewport.camera()
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport<Region> {
        &self.viewport
    }

    /// A zoom panel bound to this canvas's camera.
    #[must_use]
    pub fn zoom_controls(&self) -> ZoomControls {
        ZoomControls::new(self.viewport.camera().clone())
    }

    #[must_use]
    pub fn mode(&self) -> CanvasMode {
        self.mode.get()
    }

    pub fn set_mode(&mut self, mode: CanvasMode) {
        debug!(?mode, "canvas mode");
        self.mode.set(mode);
    }

    #[must_use]
    pub fn focus_inside(&self) -> bool {
        self.focus_inside
    }

    /// Whether keyboard focus is inside the canvas element.
    pub fn set_focus(&mut self, inside: bool) {
        self.focus_inside = inside;
    }

    /// Number of mounted frame controllers.
    #[must_use]
    pub fn mounted_frames(&self) -> usize {
        self.frames.len()
    }

    /// Live autopan timers across all frames.
    #[must_use]
    pub fn active_autopan_timers(&self) -> usize {
        self.viewport.ledger().active()
    }

    /// Ephemeral geometry of a frame being dragged or resized.
    #[must_use]
    pub fn preview(&self, frame_id: &FrameId) -> Option<Rect> {
        self.frames.get(frame_id)?.preview()
    }

    /// Exempt a host area from background panning until the guard drops.
    #[must_use = "dropping the guard re-enables panning immediately"]
    pub fn no_pan_area(&self) -> Interactable<Region> {
        self.viewport.no_pan_area(Region::NoPan)
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Mount controllers for new frames and drop those of deleted ones.
    pub fn sync_frames(&mut self) -> Result<(), CanvasError> {
        let ids: Vec<FrameId> = lock(&self.store)?.file(&self.file_id)?.frames.iter().map(|f| f.id).collect();
        self.frames.retain(|id, _| ids.contains(id));
        for id in ids {
            if self.frames.contains_key(&id) {
                continue;
            }
            let controller = FrameController::mount(
                self.viewport.registry(),
                Region::Frame(id),
                self.file_id,
                id,
                self.viewport.camera().clone(),
                self.viewport.config().autopan,
                self.viewport.ledger().clone(),
            );
            self.frames.insert(id, controller);
        }
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// A pointer went down inside the canvas. `host_path` lists interactable
    /// ids the host found between the event target and the canvas element.
    pub fn pointer_down(&mut self, client: Point, button: Button, host_path: &TargetPath) -> Result<(), CanvasError> {
        self.ensure_live()?;
        if button != Button::Primary {
            return Ok(());
        }
        self.focus_inside = true;

        // One frame gesture at a time: a press that never got its release
        // must not leave a drag or its autopan timer behind.
        for ctrl in self.frames.values_mut() {
            ctrl.cancel();
        }
        // Frames the store gained since the last sync need an interactable
        // before they can be pressed.
        self.sync_frames()?;

        let hit = {
            let store = lock(&self.store)?;
            let file = store.file(&self.file_id)?;
            let virtual_pt = self.viewport.camera().get().client_to_virtual(client);
            hit_test(virtual_pt, &file.frames, file.selected_frame_id, &self.viewport.camera().get())
        };
        let mut path = host_path.clone();
        let mut part = HitPart::Body;
        if let Some(hit) = hit {
            if let Some(ctrl) = self.frames.get(&hit.frame_id) {
                path = path.with(ctrl.interactable_id());
                part = hit.part;
            }
        }

        if let PressTarget::Foreground { region: Region::Frame(frame_id), .. } = self.viewport.pointer_down(client, &path) {
            if let Some(ctrl) = self.frames.get_mut(&frame_id) {
                let mut store = lock(&self.store)?;
                ctrl.press(&mut *store, part, client)?;
            }
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, client: Point) -> Result<(), CanvasError> {
        self.ensure_live()?;
        if let Some(Region::Frame(frame_id)) = self.viewport.pointer_move(client) {
            if let Some(ctrl) = self.frames.get_mut(&frame_id) {
                ctrl.pointer_move(client);
            }
        }
        Ok(())
    }

    pub fn pointer_up(&mut self, client: Point) -> Result<(), CanvasError> {
        self.ensure_live()?;
        if let Some(Region::Frame(frame_id)) = self.viewport.pointer_up(client) {
            if let Some(ctrl) = self.frames.get_mut(&frame_id) {
                let mut store = lock(&self.store)?;
                ctrl.release(&mut *store, client)?;
            }
        }
        self.sync_frames()
    }

    pub fn wheel(&mut self, client: Point, delta: WheelDelta, modifiers: Modifiers) -> Result<(), CanvasError> {
        self.ensure_live()?;
        self.viewport.wheel(client, delta, modifiers);
        Ok(())
    }

    /// The canvas element moved or resized.
    pub fn set_client_rect(&mut self, rect: Rect) -> Result<(), CanvasError> {
        self.ensure_live()?;
        self.viewport.set_client_rect(rect);
        Ok(())
    }

    /// A press landed outside the canvas element.
    pub fn press_outside(&mut self) {
        self.focus_inside = false;
        self.mode.set(CanvasMode::Select);
    }

    /// Handle a key press. Returns whether a frame was deleted.
    pub fn key_down(&mut self, key: &Key) -> Result<bool, CanvasError> {
        self.ensure_live()?;
        if key.is_escape() {
            self.mode.set(CanvasMode::Select);
            return Ok(false);
        }
        let mut deleted = false;
        {
            let mut store = lock(&self.store)?;
            for ctrl in self.frames.values_mut() {
                deleted |= ctrl.key_down(&mut *store, key, self.focus_inside)?;
            }
        }
        if deleted {
            self.sync_frames()?;
        }
        Ok(deleted)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop all gestures and tear the viewport down. Idempotent.
    pub fn destroy(&mut self) {
        for ctrl in self.frames.values_mut() {
            ctrl.cancel();
        }
        self.frames.clear();
        self.viewport.destroy();
    }

    /// Destroy and wait until the final camera position is saved.
    pub async fn shutdown(mut self) {
        for ctrl in self.frames.values_mut() {
            ctrl.cancel();
        }
        self.frames.clear();
        let file_id = self.file_id;
        self.viewport.shutdown().await;
        info!(%file_id, "canvas shut down");
    }

    fn ensure_live(&self) -> Result<(), CanvasError> {
        if self.viewport.is_destroyed() {
            return Err(CanvasError::Destroyed);
        }
        Ok(())
    }
}
