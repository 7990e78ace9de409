//! Zoom control panel: reset zoom, reset coordinates, zoom readout.

#[cfg(test)]
#[path = "zoom_controls_test.rs"]
mod zoom_controls_test;

use tracing::debug;

use crate::camera::CameraHandle;

/// A panel driving the camera it was given.
#[derive(Debug, Clone)]
pub struct ZoomControls {
    camera: CameraHandle,
}

impl ZoomControls {
    #[must_use]
    pub fn new(camera: CameraHandle) -> Self {
        Self { camera }
    }

    /// Back to 100%, keeping the current center in place.
    pub fn reset_zoom(&self) {
        let cam = self.camera.get();
        debug!(zoom = cam.zoom, "reset zoom");
        self.camera.recenter(cam.center_x(), cam.center_y(), 1.0);
    }

    /// Move the top-left corner to the origin, keeping the zoom.
    pub fn reset_coordinates(&self) {
        debug!("reset coordinates");
        self.camera.update_top_left(0.0, 0.0, None);
    }

    /// Current zoom as a rounded percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zoom_percent(&self) -> u32 {
        // Zoom is positive and bounded, so the cast cannot wrap.
        (self.camera.zoom_factor() * 100.0).round() as u32
    }
}
