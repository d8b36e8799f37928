//! Local/offline provider: a directory of elevation tiles loaded at startup.

use std::path::{Path, PathBuf};

use log::{info, warn};

use floodview_core::error::{FloodError, FloodResult};
use floodview_core::types::{GeoPosition, TerrainSample};

use crate::fgrid::load_fgrid;
use crate::grid::TerrainGrid;
use crate::hgt::load_hgt;
use crate::mosaic::TileMosaic;
use crate::provider::TerrainHeightSource;

pub const LOCAL_GRID_PROVIDER: &str = "local-grid";

pub struct LocalGridProvider {
    tile_dir: PathBuf,
    mosaic: TileMosaic,
}

impl LocalGridProvider {
    /// Load every `.hgt` and `.fgrid` tile in `tile_dir`.
    ///
    /// Unreadable tiles are skipped with a warning. A missing directory or a
    /// directory with no loadable tile is a provider failure.
    pub fn open(tile_dir: &Path) -> FloodResult<Self> {
        let entries = std::fs::read_dir(tile_dir).map_err(|e| {
            FloodError::provider_unavailable(
                LOCAL_GRID_PROVIDER,
                format!("cannot read tile directory {}: {e}", tile_dir.display()),
            )
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| tile_format(p).is_some())
            .collect();
        // Deterministic precedence where tiles overlap.
        paths.sort();

        let mut mosaic = TileMosaic::new();
        for path in &paths {
            match load_tile(path) {
                Ok(grid) => mosaic.insert(grid),
                Err(e) => warn!("Skipping terrain tile {}: {e}", path.display()),
            }
        }

        if mosaic.is_empty() {
            return Err(FloodError::provider_unavailable(
                LOCAL_GRID_PROVIDER,
                format!("no loadable .hgt or .fgrid tiles in {}", tile_dir.display()),
            ));
        }

        info!(
            "Loaded {} terrain tile(s) from {}",
            mosaic.len(),
            tile_dir.display()
        );

        Ok(Self {
            tile_dir: tile_dir.to_path_buf(),
            mosaic,
        })
    }

    /// Provider over grids already in memory.
    pub fn from_grids(grids: impl IntoIterator<Item = TerrainGrid>) -> Self {
        let mut mosaic = TileMosaic::new();
        for grid in grids {
            mosaic.insert(grid);
        }
        Self {
            tile_dir: PathBuf::new(),
            mosaic,
        }
    }

    pub fn tile_dir(&self) -> &Path {
        &self.tile_dir
    }

    pub fn tile_count(&self) -> usize {
        self.mosaic.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileFormat {
    Hgt,
    Fgrid,
}

fn tile_format(path: &Path) -> Option<TileFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "hgt" => Some(TileFormat::Hgt),
        "fgrid" => Some(TileFormat::Fgrid),
        _ => None,
    }
}

fn load_tile(path: &Path) -> FloodResult<TerrainGrid> {
    match tile_format(path) {
        Some(TileFormat::Hgt) => load_hgt(path),
        Some(TileFormat::Fgrid) => load_fgrid(path),
        None => Err(FloodError::invalid_tile(format!(
            "unknown tile format: {}",
            path.display()
        ))),
    }
}

impl TerrainHeightSource for LocalGridProvider {
    fn name(&self) -> &str {
        LOCAL_GRID_PROVIDER
    }

    fn height(&self, position: GeoPosition) -> TerrainSample {
        self.mosaic.height(&position.normalized())
    }
}
