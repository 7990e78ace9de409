#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::gesture::PressCoordinates;

#[derive(Debug, Clone, PartialEq)]
enum Region {
    Widget(u32),
    NoPan,
}

#[derive(Debug, Default)]
struct Log {
    created: usize,
    destroyed: usize,
    handlers: usize,
    taps: Vec<PressCoordinates>,
    pan_starts: usize,
    pan_ends: usize,
}

type SharedLog = Rc<RefCell<Log>>;

struct Recorder {
    log: SharedLog,
    restore: Option<(f64, f64, f64)>,
}

struct PressRecorder(SharedLog);

impl BackgroundPressHandler for PressRecorder {
    fn on_tap(&mut self, coords: PressCoordinates) {
        self.0.borrow_mut().taps.push(coords);
    }

    fn on_pan_start(&mut self) {
        self.0.borrow_mut().pan_starts += 1;
    }

    fn on_pan_end(&mut self) {
        self.0.borrow_mut().pan_ends += 1;
    }
}

impl ViewportHooks for Recorder {
    fn on_create(&mut self, camera: &CameraHandle) {
        self.log.borrow_mut().created += 1;
        if let Some((left, top, zoom)) = self.restore {
            camera.update_top_left(left, top, Some(zoom));
        }
    }

    fn on_destroy(&mut self) {
        self.log.borrow_mut().destroyed += 1;
    }

    fn on_press_outside_interactable(&mut self) -> Box<dyn BackgroundPressHandler> {
        self.log.borrow_mut().handlers += 1;
        Box::new(PressRecorder(Rc::clone(&self.log)))
    }
}

type Saved = Arc<Mutex<Vec<Camera>>>;

fn mount_with(restore: Option<(f64, f64, f64)>) -> (Viewport<Region>, SharedLog, Saved) {
    let log = SharedLog::default();
    let saved: Saved = Arc::default();
    let sink = Arc::clone(&saved);
    let hooks = Box::new(Recorder { log: Rc::clone(&log), restore });
    let props = ViewportProps::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let viewport = Viewport::mount(props, hooks, move |c| sink.lock().unwrap().push(c));
    (viewport, log, saved)
}

fn mount() -> (Viewport<Region>, SharedLog, Saved) {
    mount_with(None)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

async fn settle() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}

// =============================================================
// Lifecycle
// =============================================================

#[tokio::test(start_paused = true)]
async fn mount_calls_on_create_and_restore_is_not_saved_back() {
    let (viewport, log, saved) = mount_with(Some((120.0, -40.0, 2.0)));
    assert_eq!(log.borrow().created, 1);
    assert_eq!(viewport.camera().left(), 120.0);
    assert_eq!(viewport.camera().zoom_factor(), 2.0);
    settle().await;
    assert!(saved.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn camera_updates_are_debounced_to_on_updated() {
    let (viewport, _log, saved) = mount();
    for _ in 0..10 {
        viewport.camera().move_by(1.0, 0.0);
    }
    settle().await;
    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].left, 10.0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_the_last_camera_state() {
    let (viewport, log, saved) = mount();
    viewport.camera().move_by(25.0, 5.0);
    viewport.shutdown().await;
    assert_eq!(log.borrow().destroyed, 1);
    let saved = saved.lock().unwrap();
    assert_eq!(saved.last().map(|c| (c.left, c.top)), Some((25.0, 5.0)));
}

#[tokio::test(start_paused = true)]
async fn destroy_is_idempotent_and_drop_does_not_repeat_it() {
    let (mut viewport, log, _saved) = mount();
    viewport.destroy();
    viewport.destroy();
    assert!(viewport.is_destroyed());
    drop(viewport);
    assert_eq!(log.borrow().destroyed, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_viewport_destroys_it() {
    let (viewport, log, saved) = mount();
    viewport.camera().move_by(3.0, 0.0);
    drop(viewport);
    assert_eq!(log.borrow().destroyed, 1);
    settle().await;
    assert_eq!(saved.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_after_destroy_are_ignored() {
    let (mut viewport, log, _saved) = mount();
    viewport.destroy();
    let before = viewport.camera().get();
    assert_eq!(viewport.pointer_down(pt(10.0, 10.0), &TargetPath::background()), PressTarget::Background);
    assert_eq!(viewport.pointer_move(pt(200.0, 200.0)), None);
    viewport.wheel(pt(0.0, 0.0), WheelDelta { dx: 50.0, dy: 50.0 }, Modifiers::default());
    assert_eq!(viewport.camera().get(), before);
    assert_eq!(log.borrow().handlers, 0);
}

// =============================================================
// Background gestures
// =============================================================

#[tokio::test(start_paused = true)]
async fn background_drag_pans_camera_against_pointer() {
    let (mut viewport, log, _saved) = mount();
    viewport.camera().update_top_left(0.0, 0.0, Some(2.0));
    viewport.pointer_down(pt(100.0, 100.0), &TargetPath::background());
    viewport.pointer_move(pt(140.0, 100.0));
    assert!(viewport.is_panning());
    viewport.pointer_move(pt(160.0, 120.0));
    viewport.pointer_up(pt(160.0, 120.0));

    assert_eq!(viewport.camera().left(), -30.0);
    assert_eq!(viewport.camera().top(), -10.0);
    let log = log.borrow();
    assert_eq!((log.pan_starts, log.pan_ends), (1, 1));
    assert!(log.taps.is_empty());
}

#[tokio::test(start_paused = true)]
async fn quick_still_press_is_a_tap() {
    let (mut viewport, log, _saved) = mount();
    viewport.pointer_down(pt(50.0, 60.0), &TargetPath::background());
    viewport.pointer_move(pt(52.0, 61.0));
    tokio::time::advance(Duration::from_millis(80)).await;
    viewport.pointer_up(pt(52.0, 61.0));

    assert_eq!(viewport.camera().left(), 0.0);
    assert_eq!(log.borrow().taps, vec![PressCoordinates { client_x: 50.0, client_y: 60.0 }]);
}

#[tokio::test(start_paused = true)]
async fn release_far_away_without_moves_is_a_pan() {
    let (mut viewport, log, _saved) = mount();
    viewport.pointer_down(pt(50.0, 50.0), &TargetPath::background());
    viewport.pointer_up(pt(90.0, 50.0));
    assert_eq!(viewport.camera().left(), -40.0);
    assert!(log.borrow().taps.is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_press_ends_an_unreleased_pan() {
    let (mut viewport, log, _saved) = mount();
    viewport.pointer_down(pt(100.0, 100.0), &TargetPath::background());
    viewport.pointer_move(pt(150.0, 100.0));
    assert!(viewport.is_panning());

    viewport.pointer_down(pt(300.0, 300.0), &TargetPath::background());
    assert!(!viewport.is_panning());
    assert_eq!((log.borrow().pan_starts, log.borrow().pan_ends), (1, 1));

    viewport.pointer_up(pt(300.0, 300.0));
    assert_eq!(log.borrow().pan_ends, 1, "the tap that follows is not a pan");
    assert_eq!(log.borrow().taps.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unreleased_tap_press_is_replaced_without_pan_end() {
    let (mut viewport, log, _saved) = mount();
    viewport.pointer_down(pt(10.0, 10.0), &TargetPath::background());
    viewport.pointer_down(pt(20.0, 20.0), &TargetPath::background());
    assert_eq!(log.borrow().pan_ends, 0);
    assert_eq!(log.borrow().handlers, 2);
}

#[tokio::test(start_paused = true)]
async fn each_press_asks_for_a_fresh_handler() {
    let (mut viewport, log, _saved) = mount();
    for _ in 0..3 {
        viewport.pointer_down(pt(1.0, 1.0), &TargetPath::background());
        viewport.pointer_up(pt(1.0, 1.0));
    }
    assert_eq!(log.borrow().handlers, 3);
    assert_eq!(log.borrow().taps.len(), 3);
}

// =============================================================
// Foreground gestures
// =============================================================

#[tokio::test(start_paused = true)]
async fn press_inside_registered_region_is_delegated() {
    let (mut viewport, log, _saved) = mount();
    let widget = viewport.registry().register(Region::Widget(1));
    let path = TargetPath::background().with(widget.id());

    let target = viewport.pointer_down(pt(10.0, 10.0), &path);
    assert!(matches!(target, PressTarget::Foreground { region: Region::Widget(1), .. }));
    assert_eq!(viewport.pointer_move(pt(300.0, 300.0)), Some(Region::Widget(1)));
    assert_eq!(viewport.pointer_up(pt(300.0, 300.0)), Some(Region::Widget(1)));

    assert_eq!(viewport.camera().left(), 0.0);
    assert_eq!(log.borrow().handlers, 0, "background handler must not be requested");
}

#[tokio::test(start_paused = true)]
async fn no_pan_area_blocks_panning_until_dropped() {
    let (mut viewport, _log, _saved) = mount();
    let guard = viewport.no_pan_area(Region::NoPan);
    let path = TargetPath::background().with(guard.id());

    viewport.pointer_down(pt(10.0, 10.0), &path);
    viewport.pointer_move(pt(200.0, 10.0));
    viewport.pointer_up(pt(200.0, 10.0));
    assert_eq!(viewport.camera().left(), 0.0);

    drop(guard);
    viewport.pointer_down(pt(10.0, 10.0), &path);
    viewport.pointer_move(pt(200.0, 10.0));
    viewport.pointer_up(pt(200.0, 10.0));
    assert_eq!(viewport.camera().left(), -190.0);
}

#[tokio::test(start_paused = true)]
async fn move_without_press_does_nothing() {
    let (mut viewport, _log, _saved) = mount();
    assert_eq!(viewport.pointer_move(pt(10.0, 10.0)), None);
    assert_eq!(viewport.pointer_up(pt(10.0, 10.0)), None);
    assert_eq!(viewport.camera().left(), 0.0);
}

// =============================================================
// Wheel and resize
// =============================================================

#[tokio::test(start_paused = true)]
async fn plain_wheel_pans() {
    let (mut viewport, _log, _saved) = mount();
    viewport.wheel(pt(0.0, 0.0), WheelDelta { dx: 30.0, dy: -20.0 }, Modifiers::default());
    assert_eq!(viewport.camera().left(), 30.0);
    assert_eq!(viewport.camera().top(), -20.0);
}

#[tokio::test(start_paused = true)]
async fn ctrl_wheel_zooms_around_pointer() {
    let (mut viewport, _log, _saved) = mount();
    let pointer = pt(200.0, 150.0);
    let anchor = viewport.camera().get().client_to_virtual(pointer);
    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };

    viewport.wheel(pointer, WheelDelta { dx: 0.0, dy: -100.0 }, ctrl);

    let cam = viewport.camera().get();
    assert!(cam.zoom > 1.0);
    let after = cam.client_to_virtual(pointer);
    assert!((after.x - anchor.x).abs() < 1e-9);
    assert!((after.y - anchor.y).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn wheel_zoom_respects_bounds() {
    let (mut viewport, _log, _saved) = mount();
    let meta = Modifiers { meta: true, ..Modifiers::default() };
    viewport.wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 500.0 }, meta);
    assert_eq!(viewport.camera().zoom_factor(), viewport.config().zoom.min);
}

#[tokio::test(start_paused = true)]
async fn set_client_rect_updates_camera_viewport() {
    let (mut viewport, _log, _saved) = mount();
    let rect = Rect::new(10.0, 20.0, 400.0, 300.0);
    viewport.set_client_rect(rect);
    assert_eq!(viewport.camera().get().viewport, rect);
    assert_eq!(viewport.tab_index(), 0);
}
