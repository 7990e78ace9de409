//! Viewport — the pannable, zoomable space that hosts frames.
//!
//! DESIGN
//! ======
//! The viewport owns the camera and the interactable registry for its mounted
//! lifetime and turns raw pointer, wheel, and resize events into camera moves
//! or delegated gestures:
//!
//! ```text
//! pointer_down ─► classify(target path)
//!                  ├─ Foreground(region) ─► caller routes move/up to the region
//!                  └─ Background ─► handler = hooks.on_press_outside_interactable()
//!                                   ├─ moved past slop ─► camera.move_by per move
//!                                   └─ quick, still release ─► handler.on_tap
//! ```
//!
//! Camera updates reach the host's `on_updated` sink through a [`Debouncer`];
//! the sink runs on the runtime, so it must be `Send`. Everything else runs on
//! the caller's thread.
//!
//! LIFECYCLE
//! =========
//! `mount` creates the camera, calls `on_create` (where hosts restore a saved
//! position), then starts the debouncer so the restore is not written back.
//! `destroy` flushes pending camera state, drops any gesture in progress, and
//! calls `on_destroy` exactly once. It never fails and also runs on drop.
//! `shutdown().await` additionally waits for the final write.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use std::fmt;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::autopan::TimerLedger;
use crate::camera::{Camera, CameraHandle, Point, Rect};
use crate::config::CanvasConfig;
use crate::debounce::Debouncer;
use crate::gesture::{
    BackgroundGesture, BackgroundPressHandler, PressTarget, Release, TapThreshold, TargetPath, classify,
};
use crate::input::{Modifiers, WheelDelta};
use crate::interactable::{Interactable, InteractableId, InteractableRegistry};

/// Host callbacks for a mounted viewport.
pub trait ViewportHooks {
    /// The viewport mounted. Restore a saved camera position here.
    fn on_create(&mut self, _camera: &CameraHandle) {}

    /// The viewport is being torn down.
    fn on_destroy(&mut self) {}

    /// A press landed outside every interactable region. Returns the handler
    /// for this press only.
    fn on_press_outside_interactable(&mut self) -> Box<dyn BackgroundPressHandler>;
}

/// Mount-time options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProps {
    /// Client rectangle the viewport occupies.
    pub client_rect: Rect,
    /// Keyboard focus order of the viewport element.
    pub tab_index: i32,
    pub config: CanvasConfig,
}

impl ViewportProps {
    #[must_use]
    pub fn new(client_rect: Rect) -> Self {
        Self { client_rect, tab_index: 0, config: CanvasConfig::default() }
    }
}

/// The press being tracked between pointer-down and pointer-up.
enum ActivePress<R> {
    Foreground { id: InteractableId, region: R },
    Background { gesture: BackgroundGesture, handler: Box<dyn BackgroundPressHandler> },
}

/// A mounted viewport. `R` is the region type stored in its registry.
pub struct Viewport<R> {
    camera: CameraHandle,
    registry: InteractableRegistry<R>,
    hooks: Box<dyn ViewportHooks>,
    debouncer: Option<Debouncer>,
    config: CanvasConfig,
    ledger: TimerLedger,
    tab_index: i32,
    press: Option<ActivePress<R>>,
    destroyed: bool,
}

impl<R: Clone> Viewport<R> {
    /// Mount a viewport. `on_updated` receives debounced camera snapshots.
    pub fn mount<F>(props: ViewportProps, mut hooks: Box<dyn ViewportHooks>, on_updated: F) -> Self
    where
        F: FnMut(Camera) + Send + 'static,
    {
        let camera = CameraHandle::new(Camera::new(props.client_rect), props.config.zoom);
        hooks.on_create(&camera);
        let debouncer = Debouncer::spawn(camera.subscribe(), props.config.debounce, on_updated);
        info!(rect = ?props.client_rect, "viewport mounted");
        Self {
            camera,
            registry: InteractableRegistry::new(),
            hooks,
            debouncer: Some(debouncer),
            config: props.config,
            ledger: TimerLedger::new(),
            tab_index: props.tab_index,
            press: None,
            destroyed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The camera, valid for this viewport's mounted lifetime.
    #[must_use]
    pub fn camera(&self) -> &CameraHandle {
        &self.camera
    }

    #[must_use]
    pub fn registry(&self) -> &InteractableRegistry<R> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Live autopan timers started by regions in this viewport.
    #[must_use]
    pub fn ledger(&self) -> &TimerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn tab_index(&self) -> i32 {
        self.tab_index
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether a background press has turned into a pan.
    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(&self.press, Some(ActivePress::Background { gesture, .. }) if gesture.is_panning())
    }

    /// Exempt a region from background panning until the guard drops.
    #[must_use = "dropping the guard re-enables panning immediately"]
    pub fn no_pan_area(&self, region: R) -> Interactable<R> {
        self.registry.register(region)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Start a press. A foreground result means the caller owns the gesture
    /// and should route the matching move/up to that region.
    pub fn pointer_down(&mut self, client: Point, path: &TargetPath) -> PressTarget<R> {
        if self.destroyed {
            debug!("pointer down after destroy ignored");
            return PressTarget::Background;
        }
        match self.press.take() {
            Some(ActivePress::Background { gesture, mut handler }) if gesture.is_panning() => {
                debug!("new press ended an unfinished pan");
                handler.on_pan_end();
            }
            Some(_) => debug!("new press replaced an unfinished one"),
            None => {}
        }
        let target = classify(&self.registry, path);
        self.press = Some(match &target {
            PressTarget::Foreground { id, region } => ActivePress::Foreground { id: *id, region: region.clone() },
            PressTarget::Background => ActivePress::Background {
                gesture: BackgroundGesture::press(client, Instant::now()),
                handler: self.hooks.on_press_outside_interactable(),
            },
        });
        target
    }

    /// Track a move. Returns the region owning the press when it is foreground.
    pub fn pointer_move(&mut self, client: Point) -> Option<R> {
        let threshold = self.config.tap;
        match self.press.as_mut()? {
            ActivePress::Foreground { region, .. } => Some(region.clone()),
            ActivePress::Background { gesture, handler } => {
                pan_background(&self.camera, gesture, handler.as_mut(), client, &threshold);
                None
            }
        }
    }

    /// Finish a press. Returns the region owning it when it was foreground.
    pub fn pointer_up(&mut self, client: Point) -> Option<R> {
        let threshold = self.config.tap;
        match self.press.take()? {
            ActivePress::Foreground { id, region } => {
                debug!(%id, "foreground press released");
                Some(region)
            }
            ActivePress::Background { mut gesture, mut handler } => {
                pan_background(&self.camera, &mut gesture, handler.as_mut(), client, &threshold);
                match gesture.release(Instant::now(), &threshold) {
                    Release::Tap(coords) => handler.on_tap(coords),
                    Release::PanEnd if gesture.is_panning() => handler.on_pan_end(),
                    Release::PanEnd => debug!("slow press released without a tap"),
                }
                None
            }
        }
    }

    /// Pan by the wheel delta, or zoom around the pointer with ctrl/meta held.
    pub fn wheel(&mut self, client: Point, delta: WheelDelta, modifiers: Modifiers) {
        if self.destroyed {
            return;
        }
        if modifiers.zooms_wheel() {
            let factor = (-delta.dy * self.config.wheel_zoom_speed).exp();
            self.camera.zoom_at(client, self.camera.zoom_factor() * factor);
        } else {
            self.camera.move_by(delta.dx, delta.dy);
        }
    }

    /// The viewport element moved or resized.
    pub fn set_client_rect(&mut self, rect: Rect) {
        if self.destroyed {
            return;
        }
        self.camera.set_viewport(rect);
    }
}

/// Feed a background move into the gesture, panning the camera once it leaves the tap slop.
fn pan_background(
    camera: &CameraHandle,
    gesture: &mut BackgroundGesture,
    handler: &mut dyn BackgroundPressHandler,
    client: Point,
    threshold: &TapThreshold,
) {
    let was_panning = gesture.is_panning();
    let Some((dx, dy)) = gesture.motion(client, threshold) else {
        return;
    };
    if !was_panning {
        handler.on_pan_start();
    }
    camera.move_by(dx, dy);
}

impl<R> Viewport<R> {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Tear down: flush camera persistence and notify the host. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.press = None;
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.flush();
        }
        self.hooks.on_destroy();
        info!("viewport destroyed");
    }

    /// Destroy and wait for the final camera write.
    pub async fn shutdown(mut self) {
        self.destroy();
        if let Some(debouncer) = self.debouncer.take() {
            debouncer.finish().await;
        }
    }
}

impl<R> Drop for Viewport<R> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<R> fmt::Debug for Viewport<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("camera", &self.camera.get())
            .field("tab_index", &self.tab_index)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
