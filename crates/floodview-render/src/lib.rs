//! Flood rendering for floodview.
//!
//! Shades every visible globe fragment blue where known terrain lies below
//! the live water level. Per-fragment evaluation is pure; the only shared
//! mutable input is the [`WaterLevel`], read once per frame.

pub mod camera;
pub mod frame;
pub mod ramp;
pub mod water_level;

pub use camera::GlobeCamera;
pub use frame::{Fragment, Frame, FrameRenderer};
pub use ramp::{evaluate, ElevationRamp};
pub use water_level::{WaterLevel, WaterLevelUpdate};
