//! Elevation ramp: the per-fragment flood rule.

use floodview_core::constants::{DRY_ALPHA, FLOOD_ALPHA, FLOOD_COLOR};
use floodview_core::types::{RenderDecision, TerrainSample};

/// Maps a terrain sample and a water level to an overlay color.
///
/// A fragment is flooded when its height is known and strictly below the
/// water level. Terrain exactly at the water line stays dry, and a sample
/// with no data is never flooded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationRamp {
    pub flood_color: [f32; 3],
    pub flood_alpha: f32,
}

impl Default for ElevationRamp {
    fn default() -> Self {
        Self {
            flood_color: FLOOD_COLOR,
            flood_alpha: FLOOD_ALPHA,
        }
    }
}

impl ElevationRamp {
    #[inline]
    pub fn evaluate(&self, sample: TerrainSample, water_level_m: f64) -> RenderDecision {
        match sample {
            TerrainSample::Height(h) if h < water_level_m => RenderDecision {
                color: self.flood_color,
                opacity: self.flood_alpha,
            },
            _ => RenderDecision {
                color: [0.0; 3],
                opacity: DRY_ALPHA,
            },
        }
    }
}

/// [`ElevationRamp::evaluate`] with the default flood color.
#[inline]
pub fn evaluate(sample: TerrainSample, water_level_m: f64) -> RenderDecision {
    ElevationRamp::default().evaluate(sample, water_level_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_below_water_is_flooded() {
        let d = evaluate(TerrainSample::Height(10.0), 20.0);
        assert_eq!(d, RenderDecision::FLOODED);
        assert_eq!(d.opacity, 0.7);
        assert_eq!(d.color, [0.0, 0.3, 0.8]);
    }

    #[test]
    fn test_at_water_line_is_dry() {
        assert_eq!(
            evaluate(TerrainSample::Height(1524.0), 1524.0),
            RenderDecision::TRANSPARENT
        );
    }

    #[test]
    fn test_above_water_is_dry() {
        assert_eq!(
            evaluate(TerrainSample::Height(1567.0), 1524.0),
            RenderDecision::TRANSPARENT
        );
    }

    #[test]
    fn test_no_data_never_floods() {
        for w in [-3657.6, 0.0, 1524.0, 3048.0] {
            assert_eq!(evaluate(TerrainSample::NoData, w), RenderDecision::TRANSPARENT);
        }
    }

    #[test]
    fn test_zero_height_is_data_not_absence() {
        assert!(evaluate(TerrainSample::Height(0.0), 1.0).is_flooded());
        assert!(!evaluate(TerrainSample::NoData, 1.0).is_flooded());
    }

    #[test]
    fn test_custom_ramp_color() {
        let ramp = ElevationRamp {
            flood_color: [1.0, 0.0, 0.0],
            flood_alpha: 0.5,
        };
        let d = ramp.evaluate(TerrainSample::Height(-1.0), 0.0);
        assert_eq!(d.color, [1.0, 0.0, 0.0]);
        assert_eq!(d.opacity, 0.5);
    }

    #[test]
    fn test_threshold_rule_randomized() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10_000 {
            let h: f64 = rng.gen_range(-11_000.0..9_000.0);
            let w: f64 = rng.gen_range(-3657.6..=3048.0);
            let d = evaluate(TerrainSample::Height(h), w);
            assert_eq!(d.is_flooded(), h < w, "h={h} w={w}");
        }
    }

    #[test]
    fn test_raising_water_never_unfloods() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let h: f64 = rng.gen_range(-5000.0..5000.0);
            let w1: f64 = rng.gen_range(-3657.6..=3048.0);
            let w2: f64 = rng.gen_range(w1..=3048.0);
            if evaluate(TerrainSample::Height(h), w1).is_flooded() {
                assert!(evaluate(TerrainSample::Height(h), w2).is_flooded(), "h={h} w1={w1} w2={w2}");
            }
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..1000 {
            let h: f64 = rng.gen_range(-100.0..100.0);
            let w: f64 = rng.gen_range(-100.0..100.0);
            let sample = TerrainSample::Height(h);
            assert_eq!(evaluate(sample, w), evaluate(sample, w));
        }
    }
}
