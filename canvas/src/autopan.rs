//! Boundary autopan — keeps panning while a drag holds the pointer near an edge.
//!
//! DESIGN
//! ======
//! During a foreground drag the pointer's client position is checked against
//! the viewport rectangle captured when the drag began, shrunk by the chrome
//! insets and then by the buffer band. Outside the inner rectangle the pointer
//! is in one of eight edge zones, each mapped to a [`PanDirection`].
//!
//! While in a zone, a [`PanTimer`] task calls `CameraHandle::move_by` every
//! tick with a fixed pixel step along the direction. The timer is an owned
//! guard: dropping it aborts the task. The autopanner holds at most one, and
//! replaces it only after dropping the old one, so a drag never has two
//! timers and a torn-down drag never leaves one behind.
//!
//! [`TimerLedger`] counts live timers across a viewport for diagnostics.

#[cfg(test)]
#[path = "autopan_test.rs"]
mod autopan_test;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::camera::{CameraHandle, Point, Rect};
use crate::consts::{AUTOPAN_BUFFER_PX, AUTOPAN_STEP_PX, AUTOPAN_TICK_MS};

/// Direction of continuous panning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    LeftUp,
    Up,
    RightUp,
    Right,
    RightDown,
    Down,
    LeftDown,
    Left,
}

impl PanDirection {
    /// Unit step along each axis (screen space, y down).
    #[must_use]
    pub fn delta(self) -> (f64, f64) {
        match self {
            Self::LeftUp => (-1.0, -1.0),
            Self::Up => (0.0, -1.0),
            Self::RightUp => (1.0, -1.0),
            Self::Right => (1.0, 0.0),
            Self::RightDown => (1.0, 1.0),
            Self::Down => (0.0, 1.0),
            Self::LeftDown => (-1.0, 1.0),
            Self::Left => (-1.0, 0.0),
        }
    }
}

/// Space taken from each side of the viewport by chrome drawn over it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Insets {
    /// Shrink `rect` by these insets.
    #[must_use]
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x + self.left,
            rect.y + self.top,
            rect.width - self.left - self.right,
            rect.height - self.top - self.bottom,
        )
    }
}

/// Autopan tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutopanConfig {
    /// Thickness of the trigger band inside the usable rectangle, in pixels.
    pub buffer: f64,
    /// Chrome overlapping the viewport.
    pub insets: Insets,
    /// Pixels moved per tick along each active axis.
    pub step: f64,
    /// Tick period.
    pub tick: Duration,
}

impl Default for AutopanConfig {
    fn default() -> Self {
        Self {
            buffer: AUTOPAN_BUFFER_PX,
            insets: Insets::default(),
            step: AUTOPAN_STEP_PX,
            tick: Duration::from_millis(AUTOPAN_TICK_MS),
        }
    }
}

/// Which edge zone `pointer` is in, or `None` when it is inside the buffer.
///
/// Corners take precedence over edges.
#[must_use]
pub fn direction_for(viewport: Rect, config: &AutopanConfig, pointer: Point) -> Option<PanDirection> {
    let usable = config.insets.apply(viewport);
    let left = usable.left() + config.buffer;
    let top = usable.top() + config.buffer;
    let right = usable.right() - config.buffer;
    let bottom = usable.bottom() - config.buffer;
    let (x, y) = (pointer.x, pointer.y);

    if x < left && y < top {
        Some(PanDirection::LeftUp)
    } else if x > right && y < top {
        Some(PanDirection::RightUp)
    } else if x > right && y > bottom {
        Some(PanDirection::RightDown)
    } else if x < left && y > bottom {
        Some(PanDirection::LeftDown)
    } else if y < top {
        Some(PanDirection::Up)
    } else if x > right {
        Some(PanDirection::Right)
    } else if y > bottom {
        Some(PanDirection::Down)
    } else if x < left {
        Some(PanDirection::Left)
    } else {
        None
    }
}

/// Count of live autopan timers. Touched only on the event thread, where
/// timers are started and dropped; the timer tasks never see it.
#[derive(Debug, Clone, Default)]
pub struct TimerLedger {
    active: Rc<Cell<usize>>,
}

impl TimerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.active.get()
    }

    fn acquire(&self) {
        self.active.set(self.active.get() + 1);
    }

    fn release(&self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}

/// A running pan task. Dropping it stops the task.
#[derive(Debug)]
pub struct PanTimer {
    direction: PanDirection,
    task: JoinHandle<()>,
    ledger: TimerLedger,
}

impl PanTimer {
    /// Start moving `camera` in `direction`. Returns `None` outside a tokio runtime.
    #[must_use]
    pub fn start(camera: CameraHandle, direction: PanDirection, config: &AutopanConfig, ledger: &TimerLedger) -> Option<Self> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(?direction, "no async runtime; autopan disabled");
            return None;
        };
        let (ux, uy) = direction.delta();
        let (dx, dy) = (ux * config.step, uy * config.step);
        let period = config.tick;
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                camera.move_by(dx, dy);
            }
        });
        ledger.acquire();
        debug!(?direction, "autopan started");
        Some(Self { direction, task, ledger: ledger.clone() })
    }

    #[must_use]
    pub fn direction(&self) -> PanDirection {
        self.direction
    }
}

impl Drop for PanTimer {
    fn drop(&mut self) {
        self.task.abort();
        self.ledger.release();
        debug!(direction = ?self.direction, "autopan stopped");
    }
}

/// Per-drag autopan state machine: idle, or panning in one direction.
#[derive(Debug)]
pub struct BoundaryAutopanner {
    camera: CameraHandle,
    config: AutopanConfig,
    /// Viewport rectangle captured at drag start.
    viewport: Rect,
    ledger: TimerLedger,
    timer: Option<PanTimer>,
}

impl BoundaryAutopanner {
    /// Begin tracking a drag inside `viewport`.
    #[must_use]
    pub fn new(camera: CameraHandle, viewport: Rect, config: AutopanConfig, ledger: TimerLedger) -> Self {
        Self { camera, config, viewport, ledger, timer: None }
    }

    /// Feed the pointer's client position. Returns the active direction afterwards.
    pub fn update(&mut self, pointer: Point) -> Option<PanDirection> {
        let wanted = direction_for(self.viewport, &self.config, pointer);
        match (wanted, self.direction()) {
            (None, _) => self.stop(),
            (Some(next), Some(current)) if next == current => {}
            (Some(next), _) => {
                self.stop();
                self.timer = PanTimer::start(self.camera.clone(), next, &self.config, &self.ledger);
            }
        }
        self.direction()
    }

    /// Stop panning. Idempotent.
    pub fn stop(&mut self) {
        self.timer = None;
    }

    #[must_use]
    pub fn direction(&self) -> Option<PanDirection> {
        self.timer.as_ref().map(PanTimer::direction)
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }
}
