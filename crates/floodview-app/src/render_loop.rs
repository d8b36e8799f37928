//! Render loop thread: applies viewer commands and renders frames at a fixed rate.
//!
//! The renderer is moved into this thread. Commands arrive over an `mpsc`
//! channel and take effect at the next frame boundary. The snapshot of each
//! frame is stored in shared state for polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use floodview_core::commands::ViewerCommand;
use floodview_core::constants::{
    CENTER_BOX_SIZE, DEFAULT_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, MAX_FRAME_SIDE,
};
use floodview_core::error::FloodResult;
use floodview_core::state::FrameSnapshot;
use floodview_core::types::CameraView;
use floodview_render::FrameRenderer;
use floodview_terrain::provider::TerrainHeightSource;

use crate::state::RenderLoopCommand;

/// Loop parameters fixed at start. View and resolution can change later by command.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub view: CameraView,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Stop after this many rendered frames. `None` runs until shutdown.
    pub max_frames: Option<u64>,
    /// Side of the centred box measured into each snapshot.
    pub center_box: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            view: CameraView::default(),
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            fps: DEFAULT_FPS,
            max_frames: None,
            center_box: CENTER_BOX_SIZE,
        }
    }
}

impl LoopSettings {
    fn frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.fps.max(1) as u64)
    }
}

/// Mutable viewer state owned by the loop.
#[derive(Debug, Clone, PartialEq)]
struct ViewState {
    view: CameraView,
    width: u32,
    height: u32,
    paused: bool,
}

/// Clears the running flag when the loop thread ends, including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Spawns the render loop in a new thread.
///
/// `running` is cleared when the thread exits. Returns the command sender and
/// a handle yielding the number of frames rendered.
pub fn spawn_render_loop<S>(
    renderer: FrameRenderer<S>,
    settings: LoopSettings,
    latest_snapshot: Arc<Mutex<Option<FrameSnapshot>>>,
    running: Arc<AtomicBool>,
) -> FloodResult<(mpsc::Sender<RenderLoopCommand>, JoinHandle<u64>)>
where
    S: TerrainHeightSource + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<RenderLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("floodview-render-loop".into())
        .spawn(move || {
            let _guard = RunningGuard(running);
            run_render_loop(&renderer, &settings, cmd_rx, &latest_snapshot)
        })?;

    Ok((cmd_tx, handle))
}

/// The render loop. Runs until Shutdown, channel disconnect, or the frame limit.
fn run_render_loop<S: TerrainHeightSource>(
    renderer: &FrameRenderer<S>,
    settings: &LoopSettings,
    cmd_rx: mpsc::Receiver<RenderLoopCommand>,
    latest_snapshot: &Mutex<Option<FrameSnapshot>>,
) -> u64 {
    let mut state = ViewState {
        view: settings.view,
        width: settings.width,
        height: settings.height,
        paused: false,
    };
    let frame_duration = settings.frame_duration();
    let mut rendered = 0u64;
    let mut next_frame_time = Instant::now();

    info!(
        "Render loop started: provider '{}', {}x{} at {} fps",
        renderer.source().name(),
        state.width,
        state.height,
        settings.fps
    );

    loop {
        // 1. Drain pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(RenderLoopCommand::Viewer(cmd)) => apply_command(renderer, &mut state, cmd),
                Ok(RenderLoopCommand::Shutdown) => {
                    info!("Render loop shut down after {rendered} frame(s)");
                    return rendered;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return rendered,
            }
        }

        // 2. Render one frame unless paused
        if !state.paused {
            let frame = renderer.render(&state.view, state.width, state.height);
            let snapshot = frame.snapshot_with_center_box(settings.center_box);
            if let Ok(mut lock) = latest_snapshot.lock() {
                *lock = Some(snapshot);
            }
            rendered += 1;

            if settings.max_frames.is_some_and(|max| rendered >= max) {
                info!("Render loop finished after {rendered} frame(s)");
                return rendered;
            }
        }

        // 3. Sleep until the next frame
        next_frame_time += frame_duration;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else if now - next_frame_time > frame_duration * 2 {
            // Too far behind: reset instead of bursting frames
            next_frame_time = now;
        }
    }
}

fn apply_command<S: TerrainHeightSource>(
    renderer: &FrameRenderer<S>,
    state: &mut ViewState,
    cmd: ViewerCommand,
) {
    match cmd {
        ViewerCommand::SetWaterLevelFeet { feet } => {
            let update = renderer.water_level().set_feet(feet);
            if update.clamped() {
                info!("Water level {feet} ft clamped to {:.1} m", update.applied);
            } else {
                debug!("Water level set to {feet} ft");
            }
        }
        ViewerCommand::SetWaterLevelMeters { meters } => {
            let update = renderer.water_level().set(meters);
            if update.clamped() {
                info!("Water level {meters} m clamped to {:.1} m", update.applied);
            } else {
                debug!("Water level set to {meters} m");
            }
        }
        ViewerCommand::SetView { view } => {
            debug!("View moved to ({}, {}) at {} m", view.lon, view.lat, view.height_m);
            state.view = view;
        }
        ViewerCommand::SetResolution { width, height } => {
            if width == 0 || height == 0 {
                warn!("Ignoring empty resolution {width}x{height}");
            } else if width > MAX_FRAME_SIDE || height > MAX_FRAME_SIDE {
                warn!("Ignoring resolution {width}x{height} above {MAX_FRAME_SIDE} px per side");
            } else {
                state.width = width;
                state.height = height;
            }
        }
        ViewerCommand::Pause => state.paused = true,
        ViewerCommand::Resume => state.paused = false,
    }
}
