//! Camera — pan/zoom state and client ↔ virtual-space conversions.
//!
//! DESIGN
//! ======
//! `Camera` is a plain `Copy` snapshot: the top-left corner of the visible
//! region in virtual units, the zoom factor, and the client rectangle the
//! viewport occupies. All coordinate math lives here and is pure.
//!
//! `CameraHandle` is the shared, mutable camera. It wraps a
//! `tokio::sync::watch` sender so every mutation publishes a new snapshot;
//! the viewport's persistence debouncer and any display panel subscribe to it.
//! Handles are passed explicitly to every consumer; there is no global camera.
//!
//! UNITS
//! =====
//! `move_by` takes a screen-space delta in pixels. The virtual offset moves by
//! `delta / zoom`, so a fixed pixel step scrolls at the same on-screen speed at
//! every zoom level. Zoom is clamped to [`ZoomBounds`].

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::store::CanvasPosition;

/// A point in either client (screen) or virtual space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `p` lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Inclusive range of accepted zoom factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: MIN_ZOOM, max: MAX_ZOOM }
    }
}

impl ZoomBounds {
    /// Clamp `zoom` into range. Non-finite or non-positive input yields `None`.
    #[must_use]
    pub fn clamp(&self, zoom: f64) -> Option<f64> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return None;
        }
        Some(zoom.clamp(self.min, self.max))
    }
}

/// Snapshot of the camera.
///
/// `left` / `top` are the virtual coordinates shown at the viewport's top-left
/// corner. `zoom` is screen pixels per virtual unit (1.0 = no zoom).
/// `viewport` is the client rectangle of the viewport element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub left: f64,
    pub top: f64,
    pub zoom: f64,
    pub viewport: Rect,
}

impl Default for Camera {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, zoom: 1.0, viewport: Rect::default() }
    }
}

impl Camera {
    /// Identity camera over the given client rectangle.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self { viewport, ..Self::default() }
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        self.zoom
    }

    /// Virtual x coordinate at the middle of the viewport.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.left + self.viewport.width / self.zoom / 2.0
    }

    /// Virtual y coordinate at the middle of the viewport.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.top + self.viewport.height / self.zoom / 2.0
    }

    /// Convert a client-space point (window pixels) to virtual coordinates.
    #[must_use]
    pub fn client_to_virtual(&self, client: Point) -> Point {
        Point {
            x: self.left + (client.x - self.viewport.x) / self.zoom,
            y: self.top + (client.y - self.viewport.y) / self.zoom,
        }
    }

    /// Convert a virtual point to client coordinates. This is the render transform.
    #[must_use]
    pub fn virtual_to_client(&self, virt: Point) -> Point {
        Point {
            x: (virt.x - self.left) * self.zoom + self.viewport.x,
            y: (virt.y - self.top) * self.zoom + self.viewport.y,
        }
    }

    /// Same as [`Camera::client_to_virtual`] taking raw coordinates.
    #[must_use]
    pub fn translate_client_xy_to_virtual_space(&self, client_x: f64, client_y: f64) -> Point {
        self.client_to_virtual(Point::new(client_x, client_y))
    }

    /// Convert a screen-space distance (pixels) to a virtual distance.
    #[must_use]
    pub fn screen_dist_to_virtual(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// The persisted form of this camera.
    #[must_use]
    pub fn position(&self) -> CanvasPosition {
        CanvasPosition { left: self.left, top: self.top, zoom: self.zoom }
    }

    fn pan_screen(&mut self, dx: f64, dy: f64) {
        self.left += dx / self.zoom;
        self.top += dy / self.zoom;
    }

    /// Set `zoom` while keeping virtual `anchor` at the same client position.
    fn zoom_around(&mut self, anchor: Point, zoom: f64) {
        let on_screen = self.virtual_to_client(anchor);
        self.zoom = zoom;
        self.left = anchor.x - (on_screen.x - self.viewport.x) / zoom;
        self.top = anchor.y - (on_screen.y - self.viewport.y) / zoom;
    }
}

/// Shared, observable camera owned by a mounted viewport.
///
/// Cloning the handle shares the same camera. Every mutating call publishes a
/// new snapshot to subscribers; invalid input (non-finite numbers) is logged
/// and ignored without publishing.
#[derive(Debug, Clone)]
pub struct CameraHandle {
    tx: Arc<watch::Sender<Camera>>,
    bounds: ZoomBounds,
}

impl CameraHandle {
    #[must_use]
    pub fn new(camera: Camera, bounds: ZoomBounds) -> Self {
        let zoom = bounds.clamp(camera.zoom).unwrap_or(1.0);
        let (tx, _rx) = watch::channel(Camera { zoom, ..camera });
        Self { tx: Arc::new(tx), bounds }
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> Camera {
        *self.tx.borrow()
    }

    /// Receive every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Camera> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.get().left
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.get().top
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        self.get().zoom
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.get().center_x()
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.get().center_y()
    }

    #[must_use]
    pub fn translate_client_xy_to_virtual_space(&self, client_x: f64, client_y: f64) -> Point {
        self.get().translate_client_xy_to_virtual_space(client_x, client_y)
    }

    /// Translate the view by a screen-space delta in pixels.
    pub fn move_by(&self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            warn!(dx, dy, "ignoring non-finite camera move");
            return;
        }
        self.tx.send_modify(|cam| cam.pan_screen(dx, dy));
    }

    /// Set the top-left corner absolutely, and the zoom when given.
    pub fn update_top_left(&self, left: f64, top: f64, zoom: Option<f64>) {
        if !left.is_finite() || !top.is_finite() {
            warn!(left, top, "ignoring non-finite camera position");
            return;
        }
        let zoom = match zoom.map(|z| self.bounds.clamp(z)) {
            Some(None) => {
                warn!(?zoom, "ignoring invalid zoom factor");
                None
            }
            Some(Some(z)) => Some(z),
            None => None,
        };
        self.tx.send_modify(|cam| {
            cam.left = left;
            cam.top = top;
            if let Some(z) = zoom {
                cam.zoom = z;
            }
        });
    }

    /// Set the zoom, keeping virtual point `(center_x, center_y)` visually stationary.
    pub fn recenter(&self, center_x: f64, center_y: f64, zoom: f64) {
        let anchor = Point::new(center_x, center_y);
        let Some(zoom) = self.bounds.clamp(zoom) else {
            warn!(zoom, "ignoring invalid zoom factor");
            return;
        };
        if !anchor.is_finite() {
            warn!(center_x, center_y, "ignoring non-finite recenter anchor");
            return;
        }
        self.tx.send_modify(|cam| cam.zoom_around(anchor, zoom));
    }

    /// Zoom to `zoom`, keeping the virtual point under `client` fixed on screen.
    pub fn zoom_at(&self, client: Point, zoom: f64) {
        if !client.is_finite() {
            warn!(?client, "ignoring non-finite zoom anchor");
            return;
        }
        let anchor = self.get().client_to_virtual(client);
        self.recenter(anchor.x, anchor.y, zoom);
    }

    /// Record the viewport's new client rectangle (mount or resize).
    pub fn set_viewport(&self, viewport: Rect) {
        self.tx.send_modify(|cam| cam.viewport = viewport);
    }
}
