//! Swapping the terrain provider without touching renderer or water level code.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use floodview_core::error::FloodResult;
use floodview_core::types::{CameraView, GeoPosition, TerrainSample};
use floodview_render::{FrameRenderer, WaterLevel};
use floodview_terrain::fetch::{FetchOutcome, TileFetcher};
use floodview_terrain::fgrid::encode_fgrid;
use floodview_terrain::provider::{TerrainHeightSource, TerrainProvider};
use floodview_terrain::{ProviderConfig, RemoteSettings, RemoteTileProvider, TerrainGrid, TerrainHeader, TileKey};

fn plateau(key: TileKey, elevation: i16) -> TerrainGrid {
    TerrainGrid::new(
        TerrainHeader {
            origin_lat: key.lat as f64,
            origin_lon: key.lon as f64,
            cell_size: 1800.0,
            width: 3,
            height: 3,
            min_elevation: elevation,
            max_elevation: elevation,
        },
        vec![elevation; 9],
        None,
    )
}

fn tile_dir(name: &str, tiles: &[(TileKey, i16)]) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for &(key, elevation) in tiles {
        std::fs::write(
            dir.join(format!("{}.fgrid", key.name())),
            encode_fgrid(&plateau(key, elevation)),
        )
        .unwrap();
    }
    dir
}

/// Mid-tile view so the whole footprint stays on one tile.
fn view() -> CameraView {
    CameraView::looking_down(-104.5, 39.5, 15_000.0)
}

/// The same call site for every provider.
fn render_center<S: TerrainHeightSource>(renderer: &FrameRenderer<S>) -> (Option<f64>, f64) {
    let frame = renderer.render(&view(), 64, 48);
    (frame.center_height(), frame.stats.flooded_fraction())
}

struct Constant(f64);

impl TerrainHeightSource for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn height(&self, _position: GeoPosition) -> TerrainSample {
        TerrainSample::Height(self.0)
    }
}

#[test]
fn test_local_grid_from_config() {
    let dir = tile_dir("floodview_swap_local", &[(TileKey::new(39, -105), 1567)]);
    let config = ProviderConfig::from_json(&format!(
        r#"{{ "provider": "local-grid", "tile_dir": {} }}"#,
        serde_json::to_string(&dir).unwrap()
    ))
    .unwrap();

    let provider = config.build().unwrap();
    assert_eq!(provider.name(), "local-grid");

    let renderer = FrameRenderer::new(provider, Arc::new(WaterLevel::new(1585.0)));
    let (height, flooded) = render_center(&renderer);
    assert!((height.unwrap() - 1567.0).abs() < 1e-6);
    assert_eq!(flooded, 1.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_same_call_site_for_every_source() {
    let dir = tile_dir("floodview_swap_generic", &[(TileKey::new(39, -105), 100)]);
    let level = Arc::new(WaterLevel::new(150.0));

    let local = FrameRenderer::new(
        ProviderConfig::LocalGrid { tile_dir: dir.clone() }.build().unwrap(),
        Arc::clone(&level),
    );
    let synthetic = FrameRenderer::new(Constant(100.0), Arc::clone(&level));
    let boxed: FrameRenderer<Box<dyn TerrainHeightSource>> =
        FrameRenderer::new(Box::new(Constant(100.0)), Arc::clone(&level));

    let a = render_center(&local);
    let b = render_center(&synthetic);
    let c = render_center(&boxed);
    for (height, flooded) in [a, b, c] {
        assert!((height.unwrap() - 100.0).abs() < 1e-6);
        assert_eq!(flooded, 1.0);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_uncovered_region_renders_dry() {
    let dir = tile_dir("floodview_swap_uncovered", &[(TileKey::new(0, 0), -50)]);
    let provider = ProviderConfig::LocalGrid { tile_dir: dir.clone() }.build().unwrap();
    let renderer = FrameRenderer::new(provider, Arc::new(WaterLevel::new(3048.0)));

    let frame = renderer.render(&view(), 32, 24);
    assert_eq!(frame.stats.no_data, frame.stats.sampled);
    assert_eq!(frame.stats.flooded, 0);

    let _ = std::fs::remove_dir_all(&dir);
}

/// In-memory remote dataset.
struct MemoryTiles {
    calls: AtomicU64,
}

impl TileFetcher for MemoryTiles {
    fn fetch(&self, key: TileKey) -> FloodResult<FetchOutcome> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if key == TileKey::new(39, -105) {
            Ok(FetchOutcome::Tile(plateau(key, 1567)))
        } else {
            Ok(FetchOutcome::Missing)
        }
    }
}

#[test]
fn test_remote_tiles_stream_in_without_blocking_frames() {
    let fetcher = Arc::new(MemoryTiles {
        calls: AtomicU64::new(0),
    });
    let remote = RemoteTileProvider::new(fetcher, RemoteSettings::default()).unwrap();
    let renderer = FrameRenderer::new(
        TerrainProvider::RemoteHosted(remote),
        Arc::new(WaterLevel::new(1585.0)),
    );

    let first = renderer.render(&view(), 32, 24);
    assert_eq!(first.stats.no_data, first.stats.sampled, "first frame must not wait for tiles");
    assert_eq!(first.stats.flooded, 0);

    let mut flooded = 0.0;
    for _ in 0..400 {
        std::thread::sleep(Duration::from_millis(5));
        let (_, fraction) = render_center(&renderer);
        if fraction == 1.0 {
            flooded = fraction;
            break;
        }
    }
    assert_eq!(flooded, 1.0, "tile never streamed in");
    assert_eq!(renderer.source().name(), "remote-hosted");
}
