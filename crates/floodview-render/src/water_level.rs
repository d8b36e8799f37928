//! Live water level shared between the viewer and the renderer.

use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use floodview_core::constants::{WATER_LEVEL_DEFAULT_M, WATER_LEVEL_MAX_M, WATER_LEVEL_MIN_M};
use floodview_core::units::{feet_to_meters, meters_to_feet};

/// Current water level in meters, bounded to the selectable range.
///
/// Stored as the bit pattern of an `f64` so readers never lock. The
/// renderer reads it once per frame; writes land on the next frame.
#[derive(Debug)]
pub struct WaterLevel {
    bits: AtomicU64,
}

/// Outcome of a [`WaterLevel::set`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterLevelUpdate {
    pub requested: f64,
    pub applied: f64,
}

impl WaterLevelUpdate {
    /// The stored value differs from the one asked for.
    pub fn clamped(&self) -> bool {
        self.requested.is_nan() || self.requested != self.applied
    }
}

impl WaterLevel {
    pub fn new(meters: f64) -> Self {
        let level = Self {
            bits: AtomicU64::new(WATER_LEVEL_DEFAULT_M.to_bits()),
        };
        level.set(meters);
        level
    }

    /// Store `meters`, clamped to [-3657.6, 3048]. NaN leaves the level unchanged.
    pub fn set(&self, meters: f64) -> WaterLevelUpdate {
        if meters.is_nan() {
            debug!("Ignoring NaN water level");
            return WaterLevelUpdate {
                requested: meters,
                applied: self.get(),
            };
        }

        let applied = meters.clamp(WATER_LEVEL_MIN_M, WATER_LEVEL_MAX_M);
        if applied != meters {
            debug!("Water level {meters} m clamped to {applied} m");
        }
        self.bits.store(applied.to_bits(), Ordering::Release);
        WaterLevelUpdate {
            requested: meters,
            applied,
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Slider input in feet.
    pub fn set_feet(&self, feet: f64) -> WaterLevelUpdate {
        self.set(feet_to_meters(feet))
    }

    pub fn get_feet(&self) -> f64 {
        meters_to_feet(self.get())
    }
}

impl Default for WaterLevel {
    fn default() -> Self {
        Self::new(WATER_LEVEL_DEFAULT_M)
    }
}
