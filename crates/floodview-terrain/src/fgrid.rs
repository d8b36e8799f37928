//! .fgrid binary format loader and encoder.
//!
//! Compact elevation grid for locally hosted tile directories. Unlike HGT,
//! a grid may cover any extent and may carry a coverage mask, which lets a
//! land-only dataset mark open ocean as uncovered.
//!
//! Layout: 64-byte little-endian header, big-endian i16 samples (HGT
//! convention), then the optional packed coverage mask.

use std::path::Path;

use floodview_core::constants::ARCSEC_PER_DEGREE;
use floodview_core::error::{FloodError, FloodResult};

use crate::grid::{TerrainGrid, TerrainHeader};

/// .fgrid magic bytes.
const FGRID_MAGIC: [u8; 4] = *b"FGRD";

/// Current format version.
const FGRID_VERSION: u16 = 1;

/// Header flag: has coverage mask.
const FLAG_HAS_COVERAGE_MASK: u16 = 0x0001;

/// Total header size in bytes.
const HEADER_SIZE: usize = 64;

/// Bytes of the header actually used; the rest is reserved.
const HEADER_USED: usize = 4 + 2 + 2 + 8 + 8 + 8 + 4 + 4 + 2 + 2;

/// Slack allowed when an extent ends exactly on a pole or spans the full globe.
const EXTENT_TOLERANCE: f64 = 1e-9;

/// Load a TerrainGrid from a .fgrid file.
pub fn load_fgrid(path: &Path) -> FloodResult<TerrainGrid> {
    let data = std::fs::read(path)?;
    parse_fgrid(&data)
}

fn le_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn le_i16(data: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([data[at], data[at + 1]])
}

fn le_u32(data: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(b)
}

fn le_f64(data: &[u8], at: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[at..at + 8]);
    f64::from_le_bytes(b)
}

/// Parse a .fgrid from a byte buffer.
pub fn parse_fgrid(data: &[u8]) -> FloodResult<TerrainGrid> {
    if data.len() < HEADER_SIZE {
        return Err(FloodError::invalid_tile("File too small for .fgrid header"));
    }

    if data[0..4] != FGRID_MAGIC {
        return Err(FloodError::invalid_tile("Invalid .fgrid magic bytes"));
    }

    let version = le_u16(data, 4);
    if version != FGRID_VERSION {
        return Err(FloodError::invalid_tile(format!(
            "Unsupported .fgrid version: {version}"
        )));
    }

    let flags = le_u16(data, 6);
    let origin_lat = le_f64(data, 8);
    let origin_lon = le_f64(data, 16);
    let cell_size = le_f64(data, 24);
    let width = le_u32(data, 32);
    let height = le_u32(data, 36);
    let min_elevation = le_i16(data, 40);
    let max_elevation = le_i16(data, 42);
    // Bytes 44..64 are reserved

    if width < 2 || height < 2 {
        return Err(FloodError::invalid_tile(format!(
            "Grid must be at least 2×2, got {width}×{height}"
        )));
    }
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(FloodError::invalid_tile(format!(
            "Invalid cell size: {cell_size}"
        )));
    }
    if !(origin_lat.is_finite() && origin_lon.is_finite()) {
        return Err(FloodError::invalid_tile("Non-finite grid origin"));
    }
    if !(-90.0..=90.0).contains(&origin_lat) || !(-180.0..=180.0).contains(&origin_lon) {
        return Err(FloodError::invalid_tile(format!(
            "Grid origin ({origin_lat}, {origin_lon}) is off the globe"
        )));
    }

    let cell_degrees = cell_size / ARCSEC_PER_DEGREE;
    let north_lat = origin_lat + (height - 1) as f64 * cell_degrees;
    let lon_span = (width - 1) as f64 * cell_degrees;
    if north_lat > 90.0 + EXTENT_TOLERANCE || lon_span > 360.0 + EXTENT_TOLERANCE {
        return Err(FloodError::invalid_tile(format!(
            "Grid extent {:.3}° × {lon_span:.3}° runs past the globe",
            north_lat - origin_lat
        )));
    }

    let sizes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|cells| Some((cells, cells.checked_mul(2)?.checked_add(HEADER_SIZE)?)));
    let Some((cell_count, elev_end)) = sizes else {
        return Err(FloodError::invalid_tile(format!(
            "Grid of {width}×{height} samples is too large"
        )));
    };
    let elev_start = HEADER_SIZE;

    if data.len() < elev_end {
        return Err(FloodError::invalid_tile("File too small for elevation data"));
    }

    let elevations = data[elev_start..elev_end]
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    let coverage_mask = if flags & FLAG_HAS_COVERAGE_MASK != 0 {
        let mask_end = elev_end.saturating_add(cell_count.div_ceil(8));
        if data.len() < mask_end {
            return Err(FloodError::invalid_tile("File too small for coverage mask"));
        }
        Some(data[elev_end..mask_end].to_vec())
    } else {
        None
    };

    let header = TerrainHeader {
        origin_lat,
        origin_lon,
        cell_size,
        width,
        height,
        min_elevation,
        max_elevation,
    };

    Ok(TerrainGrid::new(header, elevations, coverage_mask))
}

/// Encode a TerrainGrid as .fgrid bytes.
pub fn encode_fgrid(grid: &TerrainGrid) -> Vec<u8> {
    let h = &grid.header;
    let cell_count = (h.width as usize) * (h.height as usize);

    let mut flags: u16 = 0;
    if grid.coverage_mask.is_some() {
        flags |= FLAG_HAS_COVERAGE_MASK;
    }

    let mask_bytes = if grid.coverage_mask.is_some() {
        cell_count.div_ceil(8)
    } else {
        0
    };
    let mut buf = Vec::with_capacity(HEADER_SIZE + cell_count * 2 + mask_bytes);

    // Header (64 bytes)
    buf.extend_from_slice(&FGRID_MAGIC);
    buf.extend_from_slice(&FGRID_VERSION.to_le_bytes());
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&h.origin_lat.to_le_bytes());
    buf.extend_from_slice(&h.origin_lon.to_le_bytes());
    buf.extend_from_slice(&h.cell_size.to_le_bytes());
    buf.extend_from_slice(&h.width.to_le_bytes());
    buf.extend_from_slice(&h.height.to_le_bytes());
    buf.extend_from_slice(&h.min_elevation.to_le_bytes());
    buf.extend_from_slice(&h.max_elevation.to_le_bytes());
    buf.resize(buf.len() + HEADER_SIZE - HEADER_USED, 0);

    for &elev in &grid.elevations {
        buf.extend_from_slice(&elev.to_be_bytes());
    }

    if let Some(ref mask) = grid.coverage_mask {
        let take = mask.len().min(mask_bytes);
        buf.extend_from_slice(&mask[..take]);
        // Missing mask bytes read as uncovered.
        buf.resize(buf.len() + mask_bytes - take, 0);
    }

    buf
}
