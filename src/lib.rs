// Application registry: on-disk discovery and entry points
#[path = "appRegistry/mod.rs"]
pub mod app_registry;

// Input handler module for keyboard and pointer routing
#[path = "inputHandler/mod.rs"]
pub mod input_handler;

// Window state management module
pub mod state;

// Launcher menu module
pub mod launcher;

// Paint overlay module
pub mod paint;

// Rendering backends
pub mod render;

pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use app_registry::{AppRegistry, Catalog};
use compositor::{FrameStatus, Session};
use config::WmConfig;
use error::{InitError, WmError};
use input_handler::TerminalInput;
use render::{HeadlessRenderer, Renderer, TerminalRenderer};

/// Start the window manager and run until the quit hotkey
pub fn run() -> Result<(), WmError> {
    let config = WmConfig::load()?;

    // Keep running without a log file rather than refusing to start
    if let Err(e) = logging::init_logging(&config.log) {
        eprintln!("snakewm: logging disabled: {}", e);
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        apps_root = %config.apps_root.display(),
        "snakewm starting"
    );

    let registry = AppRegistry::discover(&config.apps_root, Catalog::with_builtins());
    let mut session = Session::new(&config, registry)?;

    let mut renderer: Box<dyn Renderer> =
        match TerminalRenderer::open(config.cell.width, config.cell.height) {
            Ok(terminal) => Box::new(terminal),
            Err(e) => {
                warn!(error = %e, "no terminal display, using headless renderer");
                Box::new(HeadlessRenderer::new(config.screen.width, config.screen.height))
            }
        };

    // Declared after the renderer so it is released first
    let mut input = TerminalInput::open(config.cell.width, config.cell.height)
        .map_err(InitError::InputDevice)?;

    let opened = session.autostart();
    info!(opened, "autostart complete");

    let interval = Duration::from_millis(config.frame_interval_ms);
    loop {
        let started = Instant::now();
        if session.frame(&mut input, renderer.as_mut()) == FrameStatus::Quit {
            break;
        }
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    info!(frames = session.frames(), "snakewm exiting");
    Ok(())
}
