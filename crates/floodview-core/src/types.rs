//! Fundamental geographic and shading types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FOV_DEG, DEFAULT_PITCH_DEG, DRY_ALPHA, FLOOD_ALPHA, FLOOD_COLOR};

/// Geographic position on the globe (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Longitude in degrees, east positive.
    pub lon: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
}

impl GeoPosition {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Unit vector from the globe center through this position.
    /// x points at (0°, 0°), y at (90°E, 0°), z at the north pole.
    pub fn to_unit_vector(&self) -> DVec3 {
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Position under a direction from the globe center. `dir` need not be normalized.
    pub fn from_vector(dir: DVec3) -> Self {
        let n = dir.normalize_or_zero();
        let lat = n.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = n.y.atan2(n.x).to_degrees();
        Self { lon, lat }
    }

    /// Same position with longitude wrapped into [-180, 180) and latitude clamped to [-90, 90].
    pub fn normalized(&self) -> Self {
        let lon = (self.lon + 180.0).rem_euclid(360.0) - 180.0;
        Self {
            lon,
            lat: self.lat.clamp(-90.0, 90.0),
        }
    }
}

/// Result of a terrain height query.
///
/// `NoData` is distinct from a height of zero: it means the active provider
/// has nothing for this position (uncovered region, ocean under a land-only
/// provider, or a tile still loading).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TerrainSample {
    /// Terrain height in meters relative to sea level.
    Height(f64),
    NoData,
}

impl TerrainSample {
    pub fn height(&self) -> Option<f64> {
        match self {
            TerrainSample::Height(h) => Some(*h),
            TerrainSample::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, TerrainSample::NoData)
    }
}

impl From<Option<f64>> for TerrainSample {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(h) if h.is_finite() => TerrainSample::Height(h),
            _ => TerrainSample::NoData,
        }
    }
}

/// Color and opacity chosen for one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderDecision {
    /// Normalized RGB.
    pub color: [f32; 3],
    pub opacity: f32,
}

impl RenderDecision {
    pub const TRANSPARENT: RenderDecision = RenderDecision {
        color: [0.0, 0.0, 0.0],
        opacity: DRY_ALPHA,
    };

    pub const FLOODED: RenderDecision = RenderDecision {
        color: FLOOD_COLOR,
        opacity: FLOOD_ALPHA,
    };

    pub fn is_flooded(&self) -> bool {
        self.opacity > 0.0
    }

    /// Alpha-blend this decision over an opaque base color.
    pub fn over(&self, base: [f32; 3]) -> [f32; 3] {
        let a = self.opacity;
        [
            self.color[0] * a + base[0] * (1.0 - a),
            self.color[1] * a + base[1] * (1.0 - a),
            self.color[2] * a + base[2] * (1.0 - a),
        ]
    }
}

impl Default for RenderDecision {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Globe camera placement, as set by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// Longitude of the point under the camera (degrees).
    pub lon: f64,
    /// Latitude of the point under the camera (degrees).
    pub lat: f64,
    /// Height above the globe surface (meters).
    pub height_m: f64,
    /// Compass heading (degrees, 0 = north, clockwise).
    #[serde(default)]
    pub heading_deg: f64,
    /// Pitch below the horizon (degrees, -90 = straight down).
    #[serde(default = "default_pitch")]
    pub pitch_deg: f64,
    /// Vertical field of view (degrees).
    #[serde(default = "default_fov")]
    pub fov_deg: f64,
}

fn default_pitch() -> f64 {
    DEFAULT_PITCH_DEG
}

fn default_fov() -> f64 {
    DEFAULT_FOV_DEG
}

impl CameraView {
    /// Camera above (lon, lat) looking straight down.
    pub fn looking_down(lon: f64, lat: f64, height_m: f64) -> Self {
        Self {
            lon,
            lat,
            height_m,
            heading_deg: 0.0,
            pitch_deg: DEFAULT_PITCH_DEG,
            fov_deg: DEFAULT_FOV_DEG,
        }
    }

    pub fn with_pitch(mut self, pitch_deg: f64) -> Self {
        self.pitch_deg = pitch_deg;
        self
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }
}

impl Default for CameraView {
    /// Full-globe view centred on (0°, 20°N) from 20,000 km.
    fn default() -> Self {
        Self::looking_down(0.0, 20.0, 20_000_000.0)
    }
}
