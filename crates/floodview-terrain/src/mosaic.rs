//! Tile mosaic: a set of grids indexed by 1° tile key.

use std::collections::HashMap;
use std::fmt;

use floodview_core::types::{GeoPosition, TerrainSample};

use crate::grid::TerrainGrid;

/// Integer SW corner of a 1°×1° tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub lat: i32,
    pub lon: i32,
}

impl TileKey {
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Tile containing a position. The north pole belongs to the 89° row.
    pub fn containing(position: &GeoPosition) -> Self {
        Self {
            lat: tile_floor(position.lat, -90, 89),
            lon: tile_floor(position.lon, -180, 179),
        }
    }

    /// HGT-style name, e.g. `N39W105`.
    pub fn name(&self) -> String {
        let ns = if self.lat < 0 { 'S' } else { 'N' };
        let ew = if self.lon < 0 { 'W' } else { 'E' };
        format!("{ns}{:02}{ew}{:03}", self.lat.unsigned_abs(), self.lon.unsigned_abs())
    }

    /// Parse an HGT-style name (`N39W105`, case-insensitive).
    pub fn parse_name(name: &str) -> Option<Self> {
        if name.len() != 7 || !name.is_ascii() {
            return None;
        }

        let lat_sign = match &name[0..1] {
            "N" | "n" => 1,
            "S" | "s" => -1,
            _ => return None,
        };
        let lat: i32 = name[1..3].parse().ok()?;

        let lon_sign = match &name[3..4] {
            "E" | "e" => 1,
            "W" | "w" => -1,
            _ => return None,
        };
        let lon: i32 = name[4..7].parse().ok()?;

        Some(Self::new(lat * lat_sign, lon * lon_sign))
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Whole-degree tile index of `degrees`, clamped to `[min, max]`.
fn tile_floor(degrees: f64, min: i32, max: i32) -> i32 {
    (degrees.floor() as i32).clamp(min, max)
}

/// Grids of arbitrary extent, looked up through the 1° tiles they touch.
#[derive(Debug, Default)]
pub struct TileMosaic {
    grids: Vec<TerrainGrid>,
    index: HashMap<TileKey, Vec<usize>>,
}

impl TileMosaic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grid. Only the tiles of the grid that lie on the globe are indexed.
    pub fn insert(&mut self, grid: TerrainGrid) {
        let id = self.grids.len();
        let h = &grid.header;
        let lat_start = tile_floor(h.origin_lat, -90, 89);
        let lat_end = tile_floor(h.north_lat(), -90, 89);
        let lon_start = tile_floor(h.origin_lon, -180, 179);
        let lon_end = tile_floor(h.east_lon(), -180, 179);

        for lat in lat_start..=lat_end {
            for lon in lon_start..=lon_end {
                self.index.entry(TileKey::new(lat, lon)).or_default().push(id);
            }
        }
        self.grids.push(grid);
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Height from the first grid whose extent contains the position.
    ///
    /// A containing grid answers for the position even when its sample is
    /// void or uncovered; later grids are not consulted.
    pub fn height(&self, position: &GeoPosition) -> TerrainSample {
        let Some(candidates) = self.index.get(&TileKey::containing(position)) else {
            return TerrainSample::NoData;
        };

        candidates
            .iter()
            .map(|&id| &self.grids[id])
            .find(|grid| grid.header.contains(position))
            .map_or(TerrainSample::NoData, |grid| {
                TerrainSample::from(grid.elevation_at(position))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TerrainHeader;

    fn flat_tile(lat: i32, lon: i32, elevation: i16) -> TerrainGrid {
        TerrainGrid::new(
            TerrainHeader {
                origin_lat: lat as f64,
                origin_lon: lon as f64,
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

    fn assert_height(sample: TerrainSample, expected: f64) {
        let h = sample.height().expect("expected a defined height");
        assert!((h - expected).abs() < 1e-6, "expected {expected}, got {h}");
    }

    #[test]
    fn test_tile_key_names() {
        assert_eq!(TileKey::new(39, -105).name(), "N39W105");
        assert_eq!(TileKey::new(-10, 45).name(), "S10E045");
        assert_eq!(TileKey::new(0, 0).name(), "N00E000");
        assert_eq!(TileKey::parse_name("N39W105"), Some(TileKey::new(39, -105)));
        assert_eq!(TileKey::parse_name("s10e045"), Some(TileKey::new(-10, 45)));
        assert_eq!(TileKey::parse_name("X39W105"), None);
        assert_eq!(TileKey::parse_name("N39W10"), None);
    }

    #[test]
    fn test_tile_key_containing_negative_coordinates() {
        let key = TileKey::containing(&GeoPosition::new(-104.99, 39.74));
        assert_eq!(key, TileKey::new(39, -105));
        let key = TileKey::containing(&GeoPosition::new(-0.5, -0.5));
        assert_eq!(key, TileKey::new(-1, -1));
        let key = TileKey::containing(&GeoPosition::new(10.5, 90.0));
        assert_eq!(key, TileKey::new(89, 10));
    }

    #[test]
    fn test_mosaic_routes_to_covering_tile() {
        let mut mosaic = TileMosaic::new();
        mosaic.insert(flat_tile(39, -105, 1600));
        mosaic.insert(flat_tile(29, -91, 2));
        assert_eq!(mosaic.len(), 2);

        assert_height(mosaic.height(&GeoPosition::new(-104.99, 39.74)), 1600.0);
        assert_height(mosaic.height(&GeoPosition::new(-90.1, 29.95)), 2.0);
    }

    #[test]
    fn test_mosaic_gap_is_no_data() {
        let mut mosaic = TileMosaic::new();
        mosaic.insert(flat_tile(39, -105, 1600));
        assert_eq!(
            mosaic.height(&GeoPosition::new(0.0, 0.0)),
            TerrainSample::NoData
        );
        assert!(TileMosaic::new().is_empty());
    }

    #[test]
    fn test_mosaic_index_stays_on_the_globe() {
        let mut mosaic = TileMosaic::new();
        // Spans far past both poles and the antimeridian.
        let mut grid = flat_tile(-500, -1000, 10);
        grid.header.cell_size = 2000.0 * 3600.0;
        mosaic.insert(grid);

        assert!(mosaic.index.len() <= 180 * 360);
        assert!(mosaic.index.keys().all(|k| (-90..=89).contains(&k.lat)));
        assert!(mosaic.index.keys().all(|k| (-180..=179).contains(&k.lon)));
    }

    #[test]
    fn test_mosaic_shared_edge() {
        let mut mosaic = TileMosaic::new();
        mosaic.insert(flat_tile(39, -105, 1600));
        // Exactly on the north edge of N39W105: still answered by that tile.
        assert_height(mosaic.height(&GeoPosition::new(-104.5, 40.0)), 1600.0);
    }
}
