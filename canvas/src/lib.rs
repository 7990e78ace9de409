//! Virtual-space navigation engine for the composer's frame canvas.
//!
//! The crate owns everything between raw input and committed frame geometry:
//! the pan/zoom camera, the registry of regions that opt out of background
//! panning, tap/pan classification, boundary autopan while dragging a frame,
//! and debounced persistence of the camera. Document data lives behind the
//! [`store::CanvasStore`] trait; the host supplies events and renders using
//! [`camera::Camera::virtual_to_client`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`canvas`] | One file's frames mounted in a viewport |
//! | [`viewport`] | Camera ownership, event routing, lifecycle hooks |
//! | [`frame`] | Per-frame drag/resize controller |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`interactable`] | Registry of regions exempt from background panning |
//! | [`gesture`] | Foreground/background classification, tap vs pan |
//! | [`autopan`] | Edge-triggered continuous panning during drags |
//! | [`debounce`] | Trailing-edge camera persistence with a final flush |
//! | [`hit`] | Hit-testing frames and their resize handles |
//! | [`input`] | Input event payloads |
//! | [`zoom_controls`] | Reset zoom / reset coordinates panel |
//! | [`store`] | Store collaborator trait and in-memory store |
//! | [`config`] | Runtime tuning from the environment |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (zoom limits, autopan step, etc.) |

pub mod autopan;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod consts;
pub mod debounce;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod interactable;
pub mod store;
pub mod viewport;
pub mod zoom_controls;
