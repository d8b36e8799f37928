//! Viewer control surface.
//!
//! These functions are what a front end calls. They bridge viewer requests
//! to the render loop thread via channels.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use floodview_core::commands::ViewerCommand;
use floodview_core::error::{FloodError, FloodResult};
use floodview_core::state::FrameSnapshot;
use floodview_render::FrameRenderer;
use floodview_terrain::provider::TerrainHeightSource;

use crate::render_loop::{self, LoopSettings};
use crate::state::{AppState, RenderLoopCommand};

fn poisoned<E>(_: E) -> FloodError {
    FloodError::render_loop("shared state lock poisoned")
}

/// Start rendering from `source`.
///
/// Fails while a previous loop is still alive. A loop that stopped, either on
/// shutdown or at its frame limit, can be followed by a new one.
pub fn start_render_loop<S>(
    state: &AppState,
    source: S,
    settings: LoopSettings,
) -> FloodResult<JoinHandle<u64>>
where
    S: TerrainHeightSource + 'static,
{
    if state.running.swap(true, Ordering::SeqCst) {
        return Err(FloodError::render_loop("already running"));
    }

    let renderer = FrameRenderer::new(source, Arc::clone(&state.water_level));
    let spawned = render_loop::spawn_render_loop(
        renderer,
        settings,
        Arc::clone(&state.latest_snapshot),
        Arc::clone(&state.running),
    );
    let (cmd_tx, handle) = match spawned {
        Ok(started) => started,
        Err(e) => {
            state.running.store(false, Ordering::SeqCst);
            return Err(FloodError::render_loop(format!("failed to start: {e}")));
        }
    };

    let mut tx_lock = state.command_tx.lock().map_err(poisoned)?;
    *tx_lock = Some(cmd_tx);

    Ok(handle)
}

/// Forward a viewer command to the render loop.
pub fn send_command(state: &AppState, command: ViewerCommand) -> FloodResult<()> {
    let tx_lock = state.command_tx.lock().map_err(poisoned)?;

    match tx_lock.as_ref() {
        Some(tx) => tx
            .send(RenderLoopCommand::Viewer(command))
            .map_err(|_| FloodError::render_loop("loop has exited")),
        None => Err(FloodError::render_loop("not started")),
    }
}

/// Latest frame snapshot, if any frame has been rendered.
pub fn get_snapshot(state: &AppState) -> FloodResult<Option<FrameSnapshot>> {
    let lock = state.latest_snapshot.lock().map_err(poisoned)?;
    Ok(lock.clone())
}

/// Ask the render loop to stop. Stopping a loop that already exited is not an error.
///
/// The loop clears `running` once its thread has actually exited.
pub fn stop_render_loop(state: &AppState) -> FloodResult<()> {
    let mut tx_lock = state.command_tx.lock().map_err(poisoned)?;

    if let Some(tx) = tx_lock.take() {
        let _ = tx.send(RenderLoopCommand::Shutdown);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodview_core::types::{CameraView, GeoPosition, TerrainSample};

    struct Flat(f64);

    impl TerrainHeightSource for Flat {
        fn name(&self) -> &str {
            "flat"
        }

        fn height(&self, _position: GeoPosition) -> TerrainSample {
            TerrainSample::Height(self.0)
        }
    }

    fn settings() -> LoopSettings {
        LoopSettings {
            view: CameraView::looking_down(0.0, 0.0, 10_000.0),
            width: 8,
            height: 8,
            fps: 500,
            max_frames: None,
            center_box: 4,
        }
    }

    #[test]
    fn test_send_before_start_fails() {
        let state = AppState::new();
        assert!(matches!(
            send_command(&state, ViewerCommand::Pause),
            Err(FloodError::RenderLoop(_))
        ));
        assert!(get_snapshot(&state).unwrap().is_none());
    }

    #[test]
    fn test_start_twice_fails() {
        let state = AppState::new();
        let handle = start_render_loop(&state, Flat(0.0), settings()).unwrap();
        assert!(start_render_loop(&state, Flat(0.0), settings()).is_err());

        stop_render_loop(&state).unwrap();
        handle.join().unwrap();
        assert!(!state.is_running());
    }

    #[test]
    fn test_restart_after_frame_limit() {
        let state = AppState::new();
        let limited = LoopSettings {
            max_frames: Some(2),
            ..settings()
        };

        let handle = start_render_loop(&state, Flat(0.0), limited.clone()).unwrap();
        assert_eq!(handle.join().unwrap(), 2);
        assert!(!state.is_running(), "loop that hit its frame limit is no longer running");
        assert!(matches!(
            send_command(&state, ViewerCommand::Pause),
            Err(FloodError::RenderLoop(_))
        ));

        let handle = start_render_loop(&state, Flat(0.0), limited).unwrap();
        assert_eq!(handle.join().unwrap(), 2);
        assert_eq!(get_snapshot(&state).unwrap().map(|s| s.frame), Some(1));
    }

    #[test]
    fn test_water_level_command_reaches_frames() {
        let state = AppState::new();
        let handle = start_render_loop(&state, Flat(100.0), settings()).unwrap();

        send_command(&state, ViewerCommand::SetWaterLevelMeters { meters: 200.0 }).unwrap();

        let mut flooded = false;
        for _ in 0..200 {
            std::thread::sleep(std::time::Duration::from_millis(5));
            if let Some(snapshot) = get_snapshot(&state).unwrap() {
                if snapshot.water_level_m == 200.0 {
                    flooded = snapshot.stats.flooded == snapshot.stats.sampled;
                    break;
                }
            }
        }

        stop_render_loop(&state).unwrap();
        handle.join().unwrap();
        assert!(flooded);
        assert_eq!(state.water_level.get(), 200.0);
    }
}
