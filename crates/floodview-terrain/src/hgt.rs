//! NASADEM / SRTM HGT tile parser.
//!
//! HGT files are flat arrays of big-endian i16 elevation values
//! covering 1° × 1° tiles. The filename encodes the SW corner
//! coordinates (e.g., N39W105.hgt).

use std::path::Path;

use floodview_core::constants::ELEVATION_VOID;
use floodview_core::error::{FloodError, FloodResult};

use crate::grid::{TerrainGrid, TerrainHeader};
use crate::mosaic::TileKey;

/// Parse an HGT filename to extract the SW corner coordinates.
/// Format: `N39E056.hgt` or `S10W045.hgt`
pub fn parse_hgt_filename(filename: &str) -> Option<(f64, f64)> {
    let name = filename
        .strip_suffix(".hgt")
        .or_else(|| filename.strip_suffix(".HGT"))?;
    let key = TileKey::parse_name(name)?;
    Some((key.lat as f64, key.lon as f64))
}

/// Determine the grid size from the file size.
/// 1 arc-second: 3601 × 3601 = 25,934,402 bytes
/// 3 arc-second: 1201 × 1201 = 2,884,802 bytes
fn grid_size_from_byte_count(byte_count: usize) -> Option<(u32, f64)> {
    match byte_count {
        25_934_402 => Some((3601, 1.0)),
        2_884_802 => Some((1201, 3.0)),
        _ => None,
    }
}

/// Parse raw HGT bytes into elevation values.
pub fn parse_hgt_bytes(data: &[u8]) -> FloodResult<(Vec<i16>, u32, f64)> {
    let (grid_side, cell_size) = grid_size_from_byte_count(data.len()).ok_or_else(|| {
        FloodError::invalid_tile(format!(
            "Unexpected HGT size: {} bytes (expected {} or {})",
            data.len(),
            3601 * 3601 * 2,
            1201 * 1201 * 2
        ))
    })?;

    let elevations = data
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    Ok((elevations, grid_side, cell_size))
}

/// Fill void samples by averaging non-void neighbors.
///
/// A void with no valid neighbor stays void: it must read as no data,
/// never as sea level.
pub fn fill_voids(elevations: &mut [i16], width: u32, height: u32) {
    let w = width as usize;
    let h = height as usize;

    let snapshot = elevations.to_vec();
    for r in 0..h {
        for c in 0..w {
            let idx = r * w + c;
            if snapshot[idx] != ELEVATION_VOID {
                continue;
            }

            let mut sum = 0i64;
            let mut count = 0i64;
            for dr in -1i32..=1 {
                for dc in -1i32..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let nr = r as i32 + dr;
                    let nc = c as i32 + dc;
                    if nr >= 0 && nr < h as i32 && nc >= 0 && nc < w as i32 {
                        let nidx = nr as usize * w + nc as usize;
                        if snapshot[nidx] != ELEVATION_VOID {
                            sum += snapshot[nidx] as i64;
                            count += 1;
                        }
                    }
                }
            }

            if count > 0 {
                elevations[idx] = (sum / count) as i16;
            }
        }
    }
}

/// Build a grid from HGT bytes for the tile whose SW corner is `key`.
pub fn grid_from_hgt_bytes(key: TileKey, data: &[u8]) -> FloodResult<TerrainGrid> {
    let (mut elevations, grid_side, cell_size) = parse_hgt_bytes(data)?;

    fill_voids(&mut elevations, grid_side, grid_side);

    let header = TerrainHeader {
        origin_lat: key.lat as f64,
        origin_lon: key.lon as f64,
        cell_size,
        width: grid_side,
        height: grid_side,
        min_elevation: 0,
        max_elevation: 0,
    };

    let mut grid = TerrainGrid::new(header, elevations, None);
    grid.refresh_elevation_range();
    Ok(grid)
}

/// Load a single HGT file into a TerrainGrid.
pub fn load_hgt(path: &Path) -> FloodResult<TerrainGrid> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| FloodError::invalid_tile("Invalid HGT filename"))?;

    let (lat, lon) = parse_hgt_filename(filename).ok_or_else(|| {
        FloodError::invalid_tile(format!(
            "Cannot parse HGT coordinates from filename: {filename}"
        ))
    })?;

    let data = std::fs::read(path)?;
    grid_from_hgt_bytes(TileKey::new(lat as i32, lon as i32), &data)
}
