//! Shared numeric constants for the canvas crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest zoom factor the camera accepts.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom factor the camera accepts.
pub const MAX_ZOOM: f64 = 10.0;

/// Zoom change per pixel of ctrl+wheel delta (applied exponentially).
pub const WHEEL_ZOOM_SPEED: f64 = 0.01;

// ── Autopan ─────────────────────────────────────────────────────

/// Thickness of the edge band, in screen pixels, that triggers autopan during a drag.
pub const AUTOPAN_BUFFER_PX: f64 = 16.0;

/// Screen pixels the camera moves per autopan tick along each active axis.
pub const AUTOPAN_STEP_PX: f64 = 4.0;

/// Autopan tick period in milliseconds.
pub const AUTOPAN_TICK_MS: u64 = 4;

// ── Gestures ────────────────────────────────────────────────────

/// Maximum pointer travel, in screen pixels, for a background press to count as a tap.
pub const TAP_SLOP_PX: f64 = 5.0;

/// Maximum press duration in milliseconds for a background press to count as a tap.
pub const TAP_MAX_MS: u64 = 300;

// ── Persistence ─────────────────────────────────────────────────

/// Quiet period after the last camera update before the position is saved.
pub const CAMERA_SAVE_DEBOUNCE_MS: u64 = 50;

/// Upper bound on how long a continuous burst of camera updates can defer a save.
pub const CAMERA_SAVE_MAX_WAIT_MS: u64 = 500;

// ── Frames ──────────────────────────────────────────────────────

/// Screen-space hit slop in pixels for frame resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Minimum frame width and height in virtual units.
pub const MIN_FRAME_SIZE_PX: f64 = 40.0;

/// Width and height of a newly created frame.
pub const DEFAULT_FRAME_SIZE: f64 = 400.0;

/// Code placed in a newly created frame.
pub const DEFAULT_FRAME_CODE: &str = "<>\n  \n</>";

/// Cursor offset in a new frame: between the fragment's opening and closing tags.
pub const DEFAULT_FRAME_CURSOR: usize = 5;
