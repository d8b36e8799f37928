//! Terrain data for floodview.
//!
//! Elevation grids, the `.hgt` and `.fgrid` tile formats, tile mosaics,
//! and the height providers the renderer queries.

pub use floodview_core as core;

pub mod config;
pub mod fetch;
pub mod fgrid;
pub mod grid;
pub mod hgt;
pub mod local;
pub mod mosaic;
pub mod provider;
pub mod remote;
pub mod token;

// Re-export key types for convenience.
pub use config::ProviderConfig;
pub use grid::{TerrainGrid, TerrainHeader};
pub use local::LocalGridProvider;
pub use mosaic::{TileKey, TileMosaic};
pub use provider::{TerrainHeightSource, TerrainProvider};
pub use remote::{RemoteSettings, RemoteTileProvider};
