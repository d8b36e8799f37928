use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use floodview_app::control;
use floodview_app::render_loop::LoopSettings;
use floodview_app::state::AppState;
use floodview_core::constants::{
    CENTER_BOX_SIZE, DEFAULT_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, MAX_FRAME_SIDE,
};
use floodview_core::error::{FloodError, FloodResult};
use floodview_core::state::FrameSnapshot;
use floodview_core::types::CameraView;
use floodview_terrain::ProviderConfig;

#[derive(Parser, Debug)]
#[command(name = "floodview")]
#[command(about = "Render a flood overlay at a chosen water level and report coverage")]
struct Args {
    /// Provider config JSON. Defaults to local tiles under `terrain/`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera longitude (degrees).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lon: f64,

    /// Camera latitude (degrees).
    #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
    lat: f64,

    /// Camera height above the surface (meters).
    #[arg(long, default_value_t = 20_000_000.0)]
    height: f64,

    /// Camera pitch (degrees, -90 looks straight down).
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    pitch: f64,

    /// Water level (feet).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    water_level_ft: f64,

    /// Frame width (pixels).
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH, value_parser = frame_side)]
    width: u32,

    /// Frame height (pixels).
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT, value_parser = frame_side)]
    height_px: u32,

    /// Frames to render before reporting.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Side of the centred measurement box (pixels).
    #[arg(long, default_value_t = CENTER_BOX_SIZE)]
    center_box: u32,
}

fn frame_side(s: &str) -> Result<u32, String> {
    let side: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_FRAME_SIDE).contains(&side) {
        Ok(side)
    } else {
        Err(format!("frame side must be between 1 and {MAX_FRAME_SIDE} pixels"))
    }
}

fn run(args: &Args) -> FloodResult<FrameSnapshot> {
    let config = match &args.config {
        Some(path) => ProviderConfig::load(path)?,
        None => ProviderConfig::default(),
    };
    let provider = config.build()?;

    let state = AppState::new();
    state.water_level.set_feet(args.water_level_ft);

    let settings = LoopSettings {
        view: CameraView::looking_down(args.lon, args.lat, args.height).with_pitch(args.pitch),
        width: args.width,
        height: args.height_px,
        fps: args.fps,
        max_frames: Some(args.frames.max(1)),
        center_box: args.center_box,
    };

    let handle = control::start_render_loop(&state, provider, settings)?;
    let rendered = handle
        .join()
        .map_err(|_| FloodError::render_loop("thread panicked"))?;
    info!("Rendered {rendered} frame(s)");

    control::get_snapshot(&state)?.ok_or_else(|| FloodError::render_loop("no frame rendered"))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("floodview: cannot encode snapshot: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("floodview: {e}");
            ExitCode::FAILURE
        }
    }
}
