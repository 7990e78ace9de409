//! composer — replay input scripts against a frame canvas.
//!
//! Loads a JSON store, mounts one file's canvas at a given viewport size,
//! replays an input script (from a path or stdin), shuts the canvas down so
//! the last camera position is flushed, and writes the store back.

mod script;
mod store_file;

use std::io::{self, Read};
use std::path::PathBuf;

use canvas::camera::Rect;
use canvas::canvas::Canvas;
use canvas::config::CanvasConfig;
use canvas::error::{CanvasError, StoreError};
use canvas::store::{CanvasStore, lock, shared};
use canvas::viewport::ViewportProps;
use clap::Parser;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Script(#[from] script::ScriptError),
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "composer", about = "Replay input scripts against a frame canvas")]
struct Cli {
    /// JSON store snapshot; created if missing.
    #[arg(long, env = "COMPOSER_STORE", default_value = "composer.json")]
    store: PathBuf,

    /// File to open. A new file is created when omitted.
    #[arg(long)]
    file: Option<Uuid>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Script to replay; reads stdin when omitted.
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let source = match &cli.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let commands = script::parse(&source)?;

    let mut store = store_file::load(&cli.store)?;
    let file_id = match cli.file {
        Some(id) => {
            store.file(&id)?;
            id
        }
        None => {
            let id = store.create_file();
            info!(file_id = %id, "created file");
            id
        }
    };

    let store = shared(store);
    let props = ViewportProps {
        client_rect: Rect::new(0.0, 0.0, cli.width, cli.height),
        tab_index: 0,
        config: CanvasConfig::from_env(),
    };
    let mut canvas = Canvas::mount(store.clone(), file_id, props)?;

    let mut out = io::stdout().lock();
    let replayed = script::run(&mut canvas, &commands, &mut out).await;
    canvas.shutdown().await;

    let snapshot = lock(&store)?.clone();
    store_file::save(&cli.store, &snapshot)?;
    replayed?;
    info!(%file_id, commands = commands.len(), "script replayed");
    Ok(())
}
