//! Frame snapshot: the summary of one rendered frame published to observers.

use serde::{Deserialize, Serialize};

use crate::types::CameraView;

/// Fragment counts for a frame or a region of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Fragments whose ray hit the globe and were shaded.
    pub sampled: u64,
    /// Shaded fragments drawn as flooded.
    pub flooded: u64,
    /// Shaded fragments whose provider had no height.
    pub no_data: u64,
}

impl FrameStats {
    /// Flooded share of shaded fragments; 0 when nothing was shaded.
    pub fn flooded_fraction(&self) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            self.flooded as f64 / self.sampled as f64
        }
    }

    pub fn no_data_fraction(&self) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            self.no_data as f64 / self.sampled as f64
        }
    }

    pub fn merge(&self, other: &FrameStats) -> FrameStats {
        FrameStats {
            sampled: self.sampled + other.sampled,
            flooded: self.flooded + other.flooded,
            no_data: self.no_data + other.no_data,
        }
    }
}

/// Published after every rendered frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub width: u32,
    pub height: u32,
    pub view: CameraView,
    /// Water level the frame was shaded against (meters).
    pub water_level_m: f64,
    /// Same level in feet, for the readout.
    pub water_level_ft: f64,
    /// Name of the active terrain provider.
    pub provider: String,
    pub stats: FrameStats,
    /// Counts within the centred measurement box.
    pub center: FrameStats,
    /// Terrain height under the screen center, if known (meters).
    pub center_height_m: Option<f64>,
}
