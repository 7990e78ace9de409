//! Hit testing — which frame, and which part of it, is under a point.
//!
//! DESIGN
//! ======
//! Frames are tested top-down: the selected frame first (it draws above the
//! rest), then the others from last to first in stacking order. Each frame
//! exposes a body and eight resize handles along its edges and corners. The
//! handle band is a fixed number of screen pixels wide, converted to virtual
//! units with the camera's zoom so handles stay grabbable at any zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::HANDLE_RADIUS_PX;
use crate::store::{Frame, FrameId};

/// Which part of a frame was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Drag this handle of `orig` by a virtual delta. The opposite edges stay
    /// put and neither side shrinks below `min_size`.
    #[must_use]
    pub fn resize(self, orig: Rect, dx: f64, dy: f64, min_size: f64) -> Rect {
        let (mut left, mut right) = (orig.left(), orig.right());
        let (mut top, mut bottom) = (orig.top(), orig.bottom());
        if self.moves_left() {
            left = (left + dx).min(right - min_size);
        }
        if self.moves_right() {
            right = (right + dx).max(left + min_size);
        }
        if self.moves_top() {
            top = (top + dy).min(bottom - min_size);
        }
        if self.moves_bottom() {
            bottom = (bottom + dy).max(top + min_size);
        }
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub frame_id: FrameId,
    pub part: HitPart,
}

/// Test which frame (if any) is under `virtual_pt`, the selected frame first.
#[must_use]
pub fn hit_test(virtual_pt: Point, frames: &[Frame], selected: Option<FrameId>, camera: &Camera) -> Option<Hit> {
    let slop = camera.screen_dist_to_virtual(HANDLE_RADIUS_PX);
    let selected_frame = selected.and_then(|id| frames.iter().find(|f| f.id == id));
    let others = frames.iter().rev().filter(|f| Some(f.id) != selected);

    selected_frame.into_iter().chain(others).find_map(|frame| {
        hit_part(frame.bounds(), virtual_pt, slop).map(|part| Hit { frame_id: frame.id, part })
    })
}

/// Classify `p` against one frame's bounds with a handle band of `slop` virtual units.
fn hit_part(bounds: Rect, p: Point, slop: f64) -> Option<HitPart> {
    let outer = Rect::new(bounds.x - slop, bounds.y - slop, bounds.width + 2.0 * slop, bounds.height + 2.0 * slop);
    if !outer.contains(p) {
        return None;
    }

    // Right and bottom win on frames thinner than the band.
    let east = (p.x - bounds.right()).abs() <= slop;
    let west = !east && (p.x - bounds.left()).abs() <= slop;
    let south = (p.y - bounds.bottom()).abs() <= slop;
    let north = !south && (p.y - bounds.top()).abs() <= slop;

    let anchor = match (north, south, west, east) {
        (true, _, true, _) => ResizeAnchor::Nw,
        (true, _, _, true) => ResizeAnchor::Ne,
        (_, true, true, _) => ResizeAnchor::Sw,
        (_, true, _, true) => ResizeAnchor::Se,
        (true, ..) => ResizeAnchor::N,
        (_, true, ..) => ResizeAnchor::S,
        (_, _, true, _) => ResizeAnchor::W,
        (_, _, _, true) => ResizeAnchor::E,
        _ => return Some(HitPart::Body),
    };
    Some(HitPart::ResizeHandle(anchor))
}
