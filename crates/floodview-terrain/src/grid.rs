//! TerrainGrid: loaded elevation grid with height queries.

use floodview_core::constants::{ARCSEC_PER_DEGREE, ELEVATION_VOID};
use floodview_core::types::GeoPosition;

/// Bilinear weights below this are treated as zero.
const NEGLIGIBLE_WEIGHT: f64 = 1e-9;

/// Terrain grid header metadata.
///
/// Samples sit on grid points: the grid spans `width - 1` by `height - 1`
/// cells, so a 1201×1201 grid at 3 arc-seconds covers exactly 1°×1°.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainHeader {
    /// Southwest corner latitude (degrees).
    pub origin_lat: f64,
    /// Southwest corner longitude (degrees).
    pub origin_lon: f64,
    /// Arc-seconds between adjacent samples.
    pub cell_size: f64,
    /// Number of columns (west to east).
    pub width: u32,
    /// Number of rows (north to south).
    pub height: u32,
    /// Minimum elevation in the grid (meters), voids excluded.
    pub min_elevation: i16,
    /// Maximum elevation in the grid (meters), voids excluded.
    pub max_elevation: i16,
}

impl TerrainHeader {
    /// Degrees between adjacent samples.
    pub fn cell_degrees(&self) -> f64 {
        self.cell_size / ARCSEC_PER_DEGREE
    }

    /// North edge latitude (degrees).
    pub fn north_lat(&self) -> f64 {
        self.origin_lat + self.height.saturating_sub(1) as f64 * self.cell_degrees()
    }

    /// East edge longitude (degrees).
    pub fn east_lon(&self) -> f64 {
        self.origin_lon + self.width.saturating_sub(1) as f64 * self.cell_degrees()
    }

    pub fn contains(&self, position: &GeoPosition) -> bool {
        position.lat >= self.origin_lat
            && position.lat <= self.north_lat()
            && position.lon >= self.origin_lon
            && position.lon <= self.east_lon()
    }
}

/// Loaded elevation grid.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub header: TerrainHeader,
    /// Elevation values in meters, row-major (north-to-south, west-to-east).
    /// `ELEVATION_VOID` marks a sample with no data.
    pub elevations: Vec<i16>,
    /// Packed coverage mask: bit 1 = covered, bit 0 = uncovered (ocean under a
    /// land-only dataset). One bit per sample. `None` means fully covered.
    pub coverage_mask: Option<Vec<u8>>,
}

impl TerrainGrid {
    /// Create a TerrainGrid from pre-loaded data.
    pub fn new(header: TerrainHeader, elevations: Vec<i16>, coverage_mask: Option<Vec<u8>>) -> Self {
        Self {
            header,
            elevations,
            coverage_mask,
        }
    }

    /// Convert lat/lon to grid row/col (fractional).
    /// Returns None if outside grid bounds.
    fn geo_to_grid(&self, position: &GeoPosition) -> Option<(f64, f64)> {
        let h = &self.header;
        if !h.contains(position) {
            return None;
        }

        // Column: west-to-east
        let col = (position.lon - h.origin_lon) / h.cell_degrees();
        // Row: north-to-south (row 0 = north edge)
        let row = (h.north_lat() - position.lat) / h.cell_degrees();

        let max_row = h.height.saturating_sub(1) as f64;
        let max_col = h.width.saturating_sub(1) as f64;
        Some((row.clamp(0.0, max_row), col.clamp(0.0, max_col)))
    }

    /// Raw sample at integer grid coordinates, or None when void, uncovered,
    /// or out of range.
    fn raw_elevation(&self, row: usize, col: usize) -> Option<i16> {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return None;
        }
        let idx = row * h.width as usize + col;
        if !self.is_covered_index(idx) {
            return None;
        }
        match self.elevations.get(idx).copied() {
            Some(ELEVATION_VOID) | None => None,
            Some(v) => Some(v),
        }
    }

    fn is_covered_index(&self, idx: usize) -> bool {
        match self.coverage_mask {
            Some(ref mask) => mask
                .get(idx / 8)
                .is_some_and(|byte| byte & (1 << (idx % 8)) != 0),
            None => true,
        }
    }

    /// Whether the sample nearest to `position` is covered by this grid's data.
    pub fn is_covered(&self, position: &GeoPosition) -> bool {
        self.geo_to_grid(position).is_some_and(|(row, col)| {
            let idx = row.round() as usize * self.header.width as usize + col.round() as usize;
            self.is_covered_index(idx)
        })
    }

    /// Elevation at a geographic position with bilinear interpolation.
    ///
    /// Returns None if the position is outside the grid or any contributing
    /// sample is void or uncovered.
    pub fn elevation_at(&self, position: &GeoPosition) -> Option<f64> {
        let (row, col) = self.geo_to_grid(position)?;
        self.bilinear(row, col)
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> Option<f64> {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let corners = [
            (r0, c0, (1.0 - fr) * (1.0 - fc)),
            (r0, c1, (1.0 - fr) * fc),
            (r1, c0, fr * (1.0 - fc)),
            (r1, c1, fr * fc),
        ];

        let mut val = 0.0;
        let mut total = 0.0;
        for (r, c, weight) in corners {
            // A corner without weight never contributes, even if it is void.
            if weight < NEGLIGIBLE_WEIGHT {
                continue;
            }
            val += self.raw_elevation(r, c)? as f64 * weight;
            total += weight;
        }
        if total <= 0.0 {
            return None;
        }
        Some(val / total)
    }

    /// Recompute min/max elevation from the samples, ignoring voids.
    pub fn refresh_elevation_range(&mut self) {
        let valid = self.elevations.iter().copied().filter(|&e| e != ELEVATION_VOID);
        let (min, max) = valid.fold((i16::MAX, i16::MIN), |(lo, hi), e| (lo.min(e), hi.max(e)));
        if min <= max {
            self.header.min_elevation = min;
            self.header.max_elevation = max;
        } else {
            self.header.min_elevation = 0;
            self.header.max_elevation = 0;
        }
    }
}
