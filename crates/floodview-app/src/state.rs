//! Application state shared between the viewer front end and the render loop thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use floodview_core::commands::ViewerCommand;
use floodview_core::state::FrameSnapshot;
use floodview_render::WaterLevel;

/// Commands sent to the render loop thread.
#[derive(Debug)]
pub enum RenderLoopCommand {
    /// A viewer command, applied at the next frame boundary.
    Viewer(ViewerCommand),
    /// Stop the render loop thread.
    Shutdown,
}

/// Shared application state.
///
/// `mpsc::Sender` is wrapped in a `Mutex` so the state is `Sync`.
pub struct AppState {
    /// Live water level, shared with the renderer.
    pub water_level: Arc<WaterLevel>,
    /// Sender into the render loop. `None` until the loop is started.
    pub command_tx: Mutex<Option<mpsc::Sender<RenderLoopCommand>>>,
    /// Snapshot of the most recent frame, written by the render loop.
    pub latest_snapshot: Arc<Mutex<Option<FrameSnapshot>>>,
    /// Set while a render loop thread is alive; the thread clears it on exit.
    pub running: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            water_level: Arc::new(WaterLevel::default()),
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
