#[cfg(test)]
mod tests {
    use crate::commands::ViewerCommand;
    use crate::constants::*;
    use crate::error::FloodError;
    use crate::state::{FrameSnapshot, FrameStats};
    use crate::types::{CameraView, GeoPosition, RenderDecision, TerrainSample};
    use crate::units::{feet_to_meters, meters_to_feet};

    #[test]
    fn test_water_level_bounds_in_meters() {
        assert!((WATER_LEVEL_MIN_M - -3657.6).abs() < 1e-9);
        assert!((WATER_LEVEL_MAX_M - 3048.0).abs() < 1e-9);
    }

    #[test]
    fn test_feet_meter_conversion() {
        assert!((feet_to_meters(5000.0) - 1524.0).abs() < 1e-9);
        assert!((feet_to_meters(5200.0) - 1584.96).abs() < 1e-9);
        assert!((meters_to_feet(914.4) - 3000.0).abs() < 1e-9);
        assert!((meters_to_feet(feet_to_meters(-12_000.0)) - -12_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_is_not_zero_height() {
        let zero = TerrainSample::Height(0.0);
        let none = TerrainSample::NoData;
        assert_ne!(zero, none);
        assert_eq!(zero.height(), Some(0.0));
        assert_eq!(none.height(), None);
        assert!(none.is_no_data());
        assert!(!zero.is_no_data());
    }

    #[test]
    fn test_terrain_sample_from_option() {
        assert_eq!(TerrainSample::from(Some(12.5)), TerrainSample::Height(12.5));
        assert_eq!(TerrainSample::from(None), TerrainSample::NoData);
        assert_eq!(TerrainSample::from(Some(f64::NAN)), TerrainSample::NoData);
    }

    #[test]
    fn test_geo_unit_vector_roundtrip() {
        let positions = [
            GeoPosition::new(0.0, 0.0),
            GeoPosition::new(-104.99, 39.74),
            GeoPosition::new(-90.1, 29.95),
            GeoPosition::new(170.0, -45.0),
        ];
        for p in positions {
            let back = GeoPosition::from_vector(p.to_unit_vector());
            assert!((p.lon - back.lon).abs() < 1e-9, "lon {} vs {}", p.lon, back.lon);
            assert!((p.lat - back.lat).abs() < 1e-9, "lat {} vs {}", p.lat, back.lat);
        }
    }

    #[test]
    fn test_geo_unit_vector_axes() {
        let v = GeoPosition::new(0.0, 0.0).to_unit_vector();
        assert!((v.x - 1.0).abs() < 1e-12);
        let v = GeoPosition::new(90.0, 0.0).to_unit_vector();
        assert!((v.y - 1.0).abs() < 1e-12);
        let v = GeoPosition::new(0.0, 90.0).to_unit_vector();
        assert!((v.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_geo_normalized_wraps_longitude() {
        let p = GeoPosition::new(190.0, 95.0).normalized();
        assert!((p.lon - -170.0).abs() < 1e-9);
        assert_eq!(p.lat, 90.0);
        let p = GeoPosition::new(-180.0, 0.0).normalized();
        assert!((p.lon - -180.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_decision_constants() {
        assert!(RenderDecision::FLOODED.is_flooded());
        assert!(!RenderDecision::TRANSPARENT.is_flooded());
        assert_eq!(RenderDecision::FLOODED.opacity, 0.7);
        assert_eq!(RenderDecision::FLOODED.color, [0.0, 0.3, 0.8]);
        assert_eq!(RenderDecision::default(), RenderDecision::TRANSPARENT);
    }

    #[test]
    fn test_render_decision_over_base() {
        let base = [0.5, 0.5, 0.5];
        assert_eq!(RenderDecision::TRANSPARENT.over(base), base);

        let blended = RenderDecision::FLOODED.over([1.0, 1.0, 1.0]);
        assert!((blended[0] - 0.3).abs() < 1e-6);
        assert!((blended[1] - 0.51).abs() < 1e-6);
        assert!((blended[2] - 0.86).abs() < 1e-6);
    }

    #[test]
    fn test_frame_stats_fractions() {
        let stats = FrameStats {
            sampled: 200,
            flooded: 50,
            no_data: 20,
        };
        assert!((stats.flooded_fraction() - 0.25).abs() < 1e-12);
        assert!((stats.no_data_fraction() - 0.1).abs() < 1e-12);
        assert_eq!(FrameStats::default().flooded_fraction(), 0.0);

        let merged = stats.merge(&stats);
        assert_eq!(merged.sampled, 400);
        assert_eq!(merged.flooded, 100);
    }

    #[test]
    fn test_viewer_command_serde() {
        let commands = vec![
            ViewerCommand::SetWaterLevelFeet { feet: 5140.0 },
            ViewerCommand::SetWaterLevelMeters { meters: -10.0 },
            ViewerCommand::SetView {
                view: CameraView::looking_down(-104.99, 39.74, 15_000.0).with_pitch(-70.0),
            },
            ViewerCommand::SetResolution {
                width: 640,
                height: 480,
            },
            ViewerCommand::Pause,
            ViewerCommand::Resume,
        ];
        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: ViewerCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, back);
        }
    }

    #[test]
    fn test_viewer_command_tagged_json() {
        let cmd: ViewerCommand =
            serde_json::from_str(r#"{"type":"SetWaterLevelFeet","feet":3000}"#).unwrap();
        assert_eq!(cmd, ViewerCommand::SetWaterLevelFeet { feet: 3000.0 });
    }

    #[test]
    fn test_camera_view_defaults_from_json() {
        let view: CameraView =
            serde_json::from_str(r#"{"lon":-95.0,"lat":30.0,"height_m":1000000.0}"#).unwrap();
        assert_eq!(view.pitch_deg, DEFAULT_PITCH_DEG);
        assert_eq!(view.fov_deg, DEFAULT_FOV_DEG);
        assert_eq!(view.heading_deg, 0.0);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = FrameSnapshot {
            frame: 7,
            provider: "local-grid".into(),
            center_height_m: Some(1567.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: FrameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frame, 7);
        assert_eq!(back.provider, "local-grid");
        assert_eq!(back.center_height_m, Some(1567.0));
    }

    #[test]
    fn test_provider_unavailable_names_provider() {
        let err = FloodError::provider_unavailable("remote-hosted", "token file missing");
        let msg = err.to_string();
        assert!(msg.contains("remote-hosted"), "{msg}");
        assert!(msg.contains("token file missing"), "{msg}");
    }

    #[test]
    fn test_render_loop_error_message() {
        let err = FloodError::render_loop("already running");
        assert!(matches!(err, FloodError::RenderLoop(_)));
        assert_eq!(err.to_string(), "render loop: already running");
    }
}
