//! Input scripts — a line-oriented event stream replayed against a canvas.
//!
//! ```text
//! # comment
//! viewport 0 0 1280 800
//! mode draw
//! down 200 150
//! up 200 150
//! down 300 300
//! move 1270 300
//! wait 120
//! up 1270 300
//! wheel 640 400 0 -120 ctrl
//! key Escape
//! focus in
//! outside
//! reset-zoom
//! reset-coords
//! print
//! ```
//!
//! Coordinates are client pixels. `down` takes an optional button
//! (`primary`, `middle`, `secondary`); `wheel` takes optional modifiers.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use canvas::camera::{Point, Rect};
use canvas::canvas::{Canvas, CanvasMode};
use canvas::error::CanvasError;
use canvas::gesture::TargetPath;
use canvas::input::{Button, Key, Modifiers, WheelDelta};
use canvas::store::{CanvasPosition, CanvasStore, Frame, FrameId, MemoryStore, lock};
use serde::Serialize;
use tracing::debug;

use crate::CliError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` is missing `{arg}`")]
    MissingArgument { line: usize, command: &'static str, arg: &'static str },
    #[error("line {line}: `{value}` is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: unexpected argument `{value}`")]
    InvalidArgument { line: usize, value: String },
}

/// One replayable event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Viewport(Rect),
    Down(Point, Button),
    Move(Point),
    Up(Point),
    Wheel(Point, WheelDelta, Modifiers),
    Key(Key),
    Focus(bool),
    Outside,
    Mode(CanvasMode),
    Wait(Duration),
    ResetZoom,
    ResetCoords,
    Print,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a whole script. Blank lines and `#` comments are skipped.
pub fn parse(script: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in script.lines().enumerate() {
        if let Some(cmd) = parse_line(idx + 1, raw)? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

struct Args<'a> {
    line: usize,
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn word(&mut self, arg: &'static str) -> Result<&'a str, ScriptError> {
        self.words.next().ok_or(ScriptError::MissingArgument { line: self.line, command: self.command, arg })
    }

    fn number<T: FromStr>(&mut self, arg: &'static str) -> Result<T, ScriptError> {
        let word = self.word(arg)?;
        word.parse().map_err(|_| ScriptError::InvalidNumber { line: self.line, value: word.to_owned() })
    }

    fn point(&mut self) -> Result<Point, ScriptError> {
        Ok(Point::new(self.number("x")?, self.number("y")?))
    }

    fn invalid(&self, value: &str) -> ScriptError {
        ScriptError::InvalidArgument { line: self.line, value: value.to_owned() }
    }

    fn finish(mut self) -> Result<(), ScriptError> {
        match self.words.next() {
            Some(extra) => Err(self.invalid(extra)),
            None => Ok(()),
        }
    }
}

fn parse_line(line: usize, raw: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let text = raw.split('#').next().unwrap_or_default().trim();
    let mut words = text.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let command: &'static str = match head {
        "viewport" => "viewport",
        "down" => "down",
        "move" => "move",
        "up" => "up",
        "wheel" => "wheel",
        "key" => "key",
        "focus" => "focus",
        "outside" => "outside",
        "mode" => "mode",
        "wait" => "wait",
        "reset-zoom" => "reset-zoom",
        "reset-coords" => "reset-coords",
        "print" => "print",
        other => return Err(ScriptError::UnknownCommand { line, command: other.to_owned() }),
    };
    let mut args = Args { line, command, words };

    let cmd = match command {
        "viewport" => {
            let rect = Rect::new(args.number("x")?, args.number("y")?, args.number("width")?, args.number("height")?);
            ScriptCommand::Viewport(rect)
        }
        "down" => {
            let at = args.point()?;
            let button = match args.words.next() {
                None | Some("primary") => Button::Primary,
                Some("middle") => Button::Middle,
                Some("secondary") => Button::Secondary,
                Some(other) => return Err(args.invalid(other)),
            };
            ScriptCommand::Down(at, button)
        }
        "move" => ScriptCommand::Move(args.point()?),
        "up" => ScriptCommand::Up(args.point()?),
        "wheel" => {
            let at = args.point()?;
            let delta = WheelDelta { dx: args.number("dx")?, dy: args.number("dy")? };
            let mut modifiers = Modifiers::default();
            let flags: Vec<&str> = args.words.by_ref().collect();
            for word in flags {
                match word {
                    "shift" => modifiers.shift = true,
                    "ctrl" => modifiers.ctrl = true,
                    "alt" => modifiers.alt = true,
                    "meta" => modifiers.meta = true,
                    other => return Err(args.invalid(other)),
                }
            }
            ScriptCommand::Wheel(at, delta, modifiers)
        }
        "key" => ScriptCommand::Key(Key::new(args.word("key")?)),
        "focus" => match args.word("in|out")? {
            "in" => ScriptCommand::Focus(true),
            "out" => ScriptCommand::Focus(false),
            other => return Err(args.invalid(other)),
        },
        "mode" => match args.word("select|draw")? {
            "select" => ScriptCommand::Mode(CanvasMode::Select),
            "draw" => ScriptCommand::Mode(CanvasMode::DrawFrame),
            other => return Err(args.invalid(other)),
        },
        "wait" => ScriptCommand::Wait(Duration::from_millis(args.number("ms")?)),
        "reset-zoom" => ScriptCommand::ResetZoom,
        "reset-coords" => ScriptCommand::ResetCoords,
        _ => ScriptCommand::Print,
    };
    args.finish()?;
    Ok(Some(cmd))
}

// =============================================================================
// Replay
// =============================================================================

/// State printed by the `print` command.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub camera: CanvasPosition,
    pub zoom_percent: u32,
    pub mode: &'static str,
    pub selected_frame_id: Option<FrameId>,
    pub frames: Vec<Frame>,
}

impl Snapshot {
    pub fn capture(canvas: &Canvas<MemoryStore>) -> Result<Self, CanvasError> {
        let store = lock(canvas.store())?;
        let file = store.file(&canvas.file_id())?;
        Ok(Self {
            camera: canvas.camera().get().position(),
            zoom_percent: canvas.zoom_controls().zoom_percent(),
            mode: match canvas.mode() {
                CanvasMode::Select => "select",
                CanvasMode::DrawFrame => "draw",
            },
            selected_frame_id: file.selected_frame_id,
            frames: file.frames.clone(),
        })
    }
}

/// Replay `commands` against `canvas`, writing `print` output to `out`.
pub async fn run<W: Write>(canvas: &mut Canvas<MemoryStore>, commands: &[ScriptCommand], out: &mut W) -> Result<(), CliError> {
    let host_path = TargetPath::background();
    for command in commands {
        debug!(?command, "replaying");
        match command {
            ScriptCommand::Viewport(rect) => canvas.set_client_rect(*rect)?,
            ScriptCommand::Down(at, button) => canvas.pointer_down(*at, *button, &host_path)?,
            ScriptCommand::Move(at) => canvas.pointer_move(*at)?,
            ScriptCommand::Up(at) => canvas.pointer_up(*at)?,
            ScriptCommand::Wheel(at, delta, modifiers) => canvas.wheel(*at, *delta, *modifiers)?,
            ScriptCommand::Key(key) => {
                canvas.key_down(key)?;
            }
            ScriptCommand::Focus(inside) => canvas.set_focus(*inside),
            ScriptCommand::Outside => canvas.press_outside(),
            ScriptCommand::Mode(mode) => canvas.set_mode(*mode),
            ScriptCommand::Wait(duration) => tokio::time::sleep(*duration).await,
            ScriptCommand::ResetZoom => canvas.zoom_controls().reset_zoom(),
            ScriptCommand::ResetCoords => canvas.zoom_controls().reset_coordinates(),
            ScriptCommand::Print => {
                let snapshot = Snapshot::capture(canvas)?;
                writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
            }
        }
    }
    Ok(())
}
