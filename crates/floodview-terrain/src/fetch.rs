//! Tile fetching for the remote provider.

use std::time::Duration;

use floodview_core::error::{FloodError, FloodResult};

use crate::grid::TerrainGrid;
use crate::hgt::grid_from_hgt_bytes;
use crate::mosaic::TileKey;
use crate::token::AccessToken;

/// Per-request timeout for tile downloads.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What a fetch produced.
#[derive(Debug)]
pub enum FetchOutcome {
    Tile(TerrainGrid),
    /// The dataset has no tile here (e.g. open ocean). Not an error.
    Missing,
}

/// Downloads one tile. Runs on provider worker threads, never on the render path.
pub trait TileFetcher: Send + Sync {
    fn fetch(&self, key: TileKey) -> FloodResult<FetchOutcome>;
}

/// Fetches HGT tiles from `{endpoint}/{asset_id}/{tile}.hgt` with a bearer token.
pub struct HttpTileFetcher {
    client: reqwest::blocking::Client,
    endpoint: String,
    asset_id: String,
    token: AccessToken,
}

impl HttpTileFetcher {
    pub fn new(endpoint: &str, asset_id: &str, token: AccessToken) -> FloodResult<Self> {
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(FloodError::Config(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if asset_id.trim().is_empty() {
            return Err(FloodError::Config("asset id is empty".into()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FloodError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            asset_id: asset_id.trim().to_string(),
            token,
        })
    }

    pub fn tile_url(&self, key: TileKey) -> String {
        tile_url(&self.endpoint, &self.asset_id, key)
    }
}

fn tile_url(endpoint: &str, asset_id: &str, key: TileKey) -> String {
    format!("{endpoint}/{asset_id}/{}.hgt", key.name())
}

impl TileFetcher for HttpTileFetcher {
    fn fetch(&self, key: TileKey) -> FloodResult<FetchOutcome> {
        let response = self
            .client
            .get(self.tile_url(key))
            .bearer_auth(self.token.expose())
            .send()
            .map_err(|e| FloodError::Http(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::Missing);
        }
        if !response.status().is_success() {
            return Err(FloodError::Http(format!(
                "tile {key} request failed with status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FloodError::Http(e.to_string()))?;
        grid_from_hgt_bytes(key, &bytes).map(FetchOutcome::Tile)
    }
}
