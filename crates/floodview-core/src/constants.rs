//! Rendering constants and tuning parameters.

// --- Units ---

/// Meters per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

// --- Water level ---

/// Lowest selectable water level in feet.
pub const WATER_LEVEL_MIN_FT: f64 = -12_000.0;

/// Highest selectable water level in feet.
pub const WATER_LEVEL_MAX_FT: f64 = 10_000.0;

/// Lowest selectable water level in meters (-3657.6 m).
pub const WATER_LEVEL_MIN_M: f64 = WATER_LEVEL_MIN_FT * METERS_PER_FOOT;

/// Highest selectable water level in meters (3048 m).
pub const WATER_LEVEL_MAX_M: f64 = WATER_LEVEL_MAX_FT * METERS_PER_FOOT;

/// Water level at startup (meters).
pub const WATER_LEVEL_DEFAULT_M: f64 = 0.0;

// --- Flood shading ---

/// Flood overlay color, normalized RGB.
pub const FLOOD_COLOR: [f32; 3] = [0.0, 0.3, 0.8];

/// Overlay opacity for a flooded fragment.
pub const FLOOD_ALPHA: f32 = 0.7;

/// Overlay opacity for a dry or unknown fragment.
pub const DRY_ALPHA: f32 = 0.0;

// --- Globe ---

/// Mean Earth radius (meters). The globe is rendered as a sphere.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default vertical field of view for the globe camera (degrees).
pub const DEFAULT_FOV_DEG: f64 = 60.0;

/// Default camera pitch: looking straight down (degrees).
pub const DEFAULT_PITCH_DEG: f64 = -90.0;

// --- Frame loop ---

/// Default render loop rate (frames per second).
pub const DEFAULT_FPS: u32 = 30;

/// Default frame dimensions (pixels).
pub const DEFAULT_FRAME_WIDTH: u32 = 320;
pub const DEFAULT_FRAME_HEIGHT: u32 = 240;

/// Largest accepted frame side (pixels). Larger requests are clamped or rejected.
pub const MAX_FRAME_SIDE: u32 = 4096;

/// Side length of the centred measurement box used for coverage checks.
pub const CENTER_BOX_SIZE: u32 = 100;

// --- Terrain tiles ---

/// Arc-seconds per degree.
pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// Void sample marker in elevation grids.
pub const ELEVATION_VOID: i16 = -32768;
