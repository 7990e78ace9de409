//! Gesture classification: foreground vs background presses, tap vs pan.
//!
//! DESIGN
//! ======
//! A press is classified once, on pointer-down, by walking the event's
//! [`TargetPath`] from the innermost element outwards. The first id that is
//! still registered makes the gesture foreground and hands it to that region.
//! Ids that are no longer registered are skipped, so stale markers left by a
//! region that unmounted abnormally are inert.
//!
//! Background presses start as [`BackgroundGesture::Pressed`]. Moving past the
//! tap slop turns them into [`BackgroundGesture::Panning`], which reports the
//! camera delta for every subsequent move. A release that never left the slop
//! and came quickly enough is a tap.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::camera::Point;
use crate::consts::{TAP_MAX_MS, TAP_SLOP_PX};
use crate::interactable::{InteractableId, InteractableRegistry};

/// Interactable ids met walking from the event target up to the viewport, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetPath(Vec<InteractableId>);

impl TargetPath {
    /// A target with no interactable ancestors.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Append an outer ancestor.
    #[must_use]
    pub fn with(mut self, id: InteractableId) -> Self {
        self.0.push(id);
        self
    }

    /// Put `id` in front as the innermost ancestor.
    #[must_use]
    pub fn nested_in(mut self, id: InteractableId) -> Self {
        self.0.insert(0, id);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = InteractableId> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<InteractableId> for TargetPath {
    fn from_iter<I: IntoIterator<Item = InteractableId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Where a press belongs.
#[derive(Debug, Clone, PartialEq)]
pub enum PressTarget<R> {
    /// Inside a registered region; the region handles the gesture.
    Foreground { id: InteractableId, region: R },
    /// On the background; the viewport pans or reports a tap.
    Background,
}

/// Decide whether a press on `path` belongs to a registered region.
pub fn classify<R: Clone>(registry: &InteractableRegistry<R>, path: &TargetPath) -> PressTarget<R> {
    for id in path.iter() {
        if let Some(region) = registry.lookup(id) {
            return PressTarget::Foreground { id, region };
        }
        debug!(%id, "skipping unregistered interactable marker");
    }
    PressTarget::Background
}

/// Client coordinates of a background press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressCoordinates {
    pub client_x: f64,
    pub client_y: f64,
}

impl From<Point> for PressCoordinates {
    fn from(p: Point) -> Self {
        Self { client_x: p.x, client_y: p.y }
    }
}

/// Per-press callbacks for a background gesture, supplied by the host when the press starts.
pub trait BackgroundPressHandler {
    /// The press was a tap.
    fn on_tap(&mut self, coords: PressCoordinates);

    /// The press turned into a pan.
    fn on_pan_start(&mut self) {}

    /// A pan ended.
    fn on_pan_end(&mut self) {}
}

/// Adapts a closure into a [`BackgroundPressHandler`] that only cares about taps.
pub struct OnTap<F>(pub F);

impl<F: FnMut(PressCoordinates)> BackgroundPressHandler for OnTap<F> {
    fn on_tap(&mut self, coords: PressCoordinates) {
        (self.0)(coords);
    }
}

/// Handler for hosts that ignore background taps.
pub struct IgnorePress;

impl BackgroundPressHandler for IgnorePress {
    fn on_tap(&mut self, _coords: PressCoordinates) {}
}

/// Limits within which a background press counts as a tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapThreshold {
    /// Maximum pointer travel from the press point, in screen pixels.
    pub max_distance: f64,
    /// Maximum time between press and release.
    pub max_duration: Duration,
}

impl Default for TapThreshold {
    fn default() -> Self {
        Self { max_distance: TAP_SLOP_PX, max_duration: Duration::from_millis(TAP_MAX_MS) }
    }
}

/// State of a background gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundGesture {
    /// Pressed and still within the tap slop.
    Pressed {
        /// Client position of the press.
        start: Point,
        /// When the press began.
        started_at: Instant,
    },
    /// Dragging the background.
    Panning {
        /// Client position of the previous pointer event.
        last: Point,
    },
}

/// Outcome of releasing a background gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    Tap(PressCoordinates),
    PanEnd,
}

impl BackgroundGesture {
    #[must_use]
    pub fn press(at: Point, now: Instant) -> Self {
        Self::Pressed { start: at, started_at: now }
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    /// Track a pointer move. Returns the screen-space camera delta to apply, if any.
    ///
    /// The camera moves opposite to the pointer so the content follows it.
    pub fn motion(&mut self, to: Point, threshold: &TapThreshold) -> Option<(f64, f64)> {
        match *self {
            Self::Pressed { start, .. } => {
                if start.distance(to) <= threshold.max_distance {
                    return None;
                }
                *self = Self::Panning { last: to };
                Some((start.x - to.x, start.y - to.y))
            }
            Self::Panning { last } => {
                *self = Self::Panning { last: to };
                if last == to {
                    return None;
                }
                Some((last.x - to.x, last.y - to.y))
            }
        }
    }

    /// Finish the gesture. Call [`BackgroundGesture::motion`] with the release point first.
    #[must_use]
    pub fn release(self, now: Instant, threshold: &TapThreshold) -> Release {
        match self {
            Self::Pressed { start, started_at } if now.duration_since(started_at) <= threshold.max_duration => {
                Release::Tap(start.into())
            }
            Self::Pressed { .. } | Self::Panning { .. } => Release::PanEnd,
        }
    }
}
