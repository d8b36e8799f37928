//! Viewer commands sent from the UI collaborator to the render loop.
//!
//! Commands are applied at the next frame boundary.

use serde::{Deserialize, Serialize};

use crate::types::CameraView;

/// All possible viewer actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ViewerCommand {
    // --- Water level ---
    /// Set the water level from the slider (feet).
    SetWaterLevelFeet { feet: f64 },
    /// Set the water level directly (meters).
    SetWaterLevelMeters { meters: f64 },

    // --- View ---
    /// Move the camera.
    SetView { view: CameraView },
    /// Change the output frame size (pixels).
    SetResolution { width: u32, height: u32 },

    // --- Loop control ---
    /// Stop producing frames until resumed.
    Pause,
    /// Resume frame production.
    Resume,
}
