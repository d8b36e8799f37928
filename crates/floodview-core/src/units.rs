//! Feet/meter conversion for the UI boundary.

use crate::constants::METERS_PER_FOOT;

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters / METERS_PER_FOOT
}
