//! Frame controller — drag and resize for one frame on the canvas.
//!
//! DESIGN
//! ======
//! Each mounted frame owns a `FrameController`. Mounting registers the frame
//! as an interactable, so presses on it never reach the background pan/tap
//! path; dropping the controller unregisters it.
//!
//! A press selects the frame and opens a session:
//! - **Drag** snapshots the frame origin, the press point, the camera, and the
//!   viewport rectangle. Moves feed a [`BoundaryAutopanner`] bound to the
//!   session, so the timer cannot outlive the drag.
//! - **Resize** snapshots the same plus the grabbed handle.
//!
//! While a session is open the store is never written; [`FrameController::preview`]
//! gives the ephemeral geometry. Release stops the autopanner first, then
//! commits through `CanvasStore::move_frame`.
//!
//! The net delta is measured in virtual space: the virtual point under the
//! pointer now, minus the virtual point under the pointer at press time. With
//! a still camera that is the screen delta divided by zoom; when autopan
//! scrolled the view the frame also travels with the scroll.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::fmt;

use tracing::{debug, info};

use crate::autopan::{AutopanConfig, BoundaryAutopanner, PanDirection, TimerLedger};
use crate::camera::{Camera, CameraHandle, Point, Rect};
use crate::consts::MIN_FRAME_SIZE_PX;
use crate::error::StoreError;
use crate::hit::{HitPart, ResizeAnchor};
use crate::input::Key;
use crate::interactable::{Interactable, InteractableId, InteractableRegistry};
use crate::store::{CanvasStore, FileId, FramePatch, FrameId};

/// Pointer and camera captured at press time.
#[derive(Debug, Clone, Copy)]
struct PressSnapshot {
    start_client: Point,
    start_camera: Camera,
    last_client: Point,
}

impl PressSnapshot {
    fn new(client: Point, camera: Camera) -> Self {
        Self { start_client: client, start_camera: camera, last_client: client }
    }

    /// Virtual displacement of the pointer since the press, under the current camera.
    fn delta(&self, now: &Camera) -> (f64, f64) {
        let start = self.start_camera.client_to_virtual(self.start_client);
        let current = now.client_to_virtual(self.last_client);
        (current.x - start.x, current.y - start.y)
    }
}

#[derive(Debug)]
struct DragSession {
    origin: Rect,
    press: PressSnapshot,
    autopanner: BoundaryAutopanner,
}

#[derive(Debug)]
struct ResizeSession {
    anchor: ResizeAnchor,
    origin: Rect,
    press: PressSnapshot,
}

#[derive(Debug)]
enum FrameGesture {
    Drag(DragSession),
    Resize(ResizeSession),
}

/// Per-frame gesture controller. `R` is the viewport's region type.
pub struct FrameController<R> {
    file_id: FileId,
    frame_id: FrameId,
    interactable: Interactable<R>,
    camera: CameraHandle,
    autopan: AutopanConfig,
    ledger: TimerLedger,
    gesture: Option<FrameGesture>,
}

impl<R: Clone> FrameController<R> {
    /// Mount a controller, registering `region` for the frame.
    #[must_use]
    pub fn mount(
        registry: &InteractableRegistry<R>,
        region: R,
        file_id: FileId,
        frame_id: FrameId,
        camera: CameraHandle,
        autopan: AutopanConfig,
        ledger: TimerLedger,
    ) -> Self {
        let interactable = registry.register(region);
        debug!(%frame_id, id = %interactable.id(), "frame mounted");
        Self { file_id, frame_id, interactable, camera, autopan, ledger, gesture: None }
    }
}

impl<R> FrameController<R> {
    #[must_use]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Id to stamp on the frame's element so presses classify as foreground.
    #[must_use]
    pub fn interactable_id(&self) -> InteractableId {
        self.interactable.id()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(FrameGesture::Drag(_)))
    }

    #[must_use]
    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, Some(FrameGesture::Resize(_)))
    }

    /// Current autopan direction of an active drag.
    #[must_use]
    pub fn autopan_direction(&self) -> Option<PanDirection> {
        match &self.gesture {
            Some(FrameGesture::Drag(drag)) => drag.autopanner.direction(),
            _ => None,
        }
    }

    // =========================================================================
    // Gesture
    // =========================================================================

    /// Press on `part` of the frame: select it and open a drag or resize session.
    pub fn press<S: CanvasStore>(&mut self, store: &mut S, part: HitPart, client: Point) -> Result<(), StoreError> {
        let origin = store
            .file(&self.file_id)?
            .frame(&self.frame_id)
            .ok_or(StoreError::FrameNotFound(self.frame_id))?
            .bounds();
        store.select_frame(&self.file_id, Some(self.frame_id))?;

        // Replacing a session drops its autopanner before the new one exists.
        self.gesture = None;
        let camera = self.camera.get();
        let press = PressSnapshot::new(client, camera);
        self.gesture = Some(match part {
            HitPart::Body => FrameGesture::Drag(DragSession {
                origin,
                press,
                autopanner: BoundaryAutopanner::new(
                    self.camera.clone(),
                    camera.viewport,
                    self.autopan,
                    self.ledger.clone(),
                ),
            }),
            HitPart::ResizeHandle(anchor) => FrameGesture::Resize(ResizeSession { anchor, origin, press }),
        });
        debug!(frame_id = %self.frame_id, ?part, "frame gesture started");
        Ok(())
    }

    /// Track the pointer. Returns the preview geometry.
    pub fn pointer_move(&mut self, client: Point) -> Option<Rect> {
        match self.gesture.as_mut()? {
            FrameGesture::Drag(drag) => {
                drag.press.last_client = client;
                drag.autopanner.update(client);
            }
            FrameGesture::Resize(resize) => resize.press.last_client = client,
        }
        self.preview()
    }

    /// Ephemeral geometry of the frame while a session is open.
    #[must_use]
    pub fn preview(&self) -> Option<Rect> {
        let camera = self.camera.get();
        match self.gesture.as_ref()? {
            FrameGesture::Drag(drag) => {
                let (dx, dy) = drag.press.delta(&camera);
                Some(Rect::new(drag.origin.x + dx, drag.origin.y + dy, drag.origin.width, drag.origin.height))
            }
            FrameGesture::Resize(resize) => {
                let (dx, dy) = resize.press.delta(&camera);
                Some(resize.anchor.resize(resize.origin, dx, dy, MIN_FRAME_SIZE_PX))
            }
        }
    }

    /// Finish the session at `client` and commit the final geometry.
    ///
    /// Returns the committed patch, or `None` when no session was open.
    pub fn release<S: CanvasStore>(&mut self, store: &mut S, client: Point) -> Result<Option<FramePatch>, StoreError> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(None);
        };
        let patch = match &mut gesture {
            FrameGesture::Drag(drag) => {
                drag.autopanner.stop();
                drag.press.last_client = client;
                let (dx, dy) = drag.press.delta(&self.camera.get());
                FramePatch::position(drag.origin.x + dx, drag.origin.y + dy)
            }
            FrameGesture::Resize(resize) => {
                resize.press.last_client = client;
                let (dx, dy) = resize.press.delta(&self.camera.get());
                FramePatch::bounds(resize.anchor.resize(resize.origin, dx, dy, MIN_FRAME_SIZE_PX))
            }
        };
        drop(gesture);
        store.move_frame(&self.file_id, &self.frame_id, patch)?;
        info!(frame_id = %self.frame_id, ?patch, "frame geometry committed");
        Ok(Some(patch))
    }

    /// Abandon the session without committing. Stops any autopan.
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            debug!(frame_id = %self.frame_id, "frame gesture cancelled");
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Delete the frame on Backspace/Delete when it is selected and focus is
    /// inside the canvas. Returns whether the frame was deleted.
    pub fn key_down<S: CanvasStore>(&mut self, store: &mut S, key: &Key, focus_in_canvas: bool) -> Result<bool, StoreError> {
        if !key.is_delete() || !focus_in_canvas {
            return Ok(false);
        }
        if store.file(&self.file_id)?.selected_frame_id != Some(self.frame_id) {
            return Ok(false);
        }
        self.cancel();
        store.delete_frame(&self.file_id, &self.frame_id)?;
        info!(frame_id = %self.frame_id, "frame deleted");
        Ok(true)
    }
}

impl<R> fmt::Debug for FrameController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameController")
            .field("frame_id", &self.frame_id)
            .field("interactable", &self.interactable)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}
