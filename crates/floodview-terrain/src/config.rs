//! Provider selection.
//!
//! A single tagged value picks the terrain source; everything downstream only
//! sees [`TerrainProvider`] through [`crate::provider::TerrainHeightSource`].
//!
//! ```json
//! { "provider": "local-grid", "tile_dir": "terrain/" }
//! { "provider": "remote-hosted", "endpoint": "https://tiles.example.com", "asset_id": "world-1arcsec" }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use floodview_core::error::{FloodError, FloodResult};

use crate::fetch::HttpTileFetcher;
use crate::local::{LocalGridProvider, LOCAL_GRID_PROVIDER};
use crate::provider::TerrainProvider;
use crate::remote::{
    RemoteSettings, RemoteTileProvider, DEFAULT_CACHE_BUDGET_MB, REMOTE_HOSTED_PROVIDER,
};
use crate::token::{AccessToken, DEFAULT_TOKEN_FILE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum ProviderConfig {
    /// Tiles from a local directory, loaded at startup.
    LocalGrid { tile_dir: PathBuf },
    /// Tiles streamed from a hosted dataset.
    RemoteHosted {
        endpoint: String,
        asset_id: String,
        /// Secret file holding the access token.
        #[serde(default = "default_token_file")]
        token_file: PathBuf,
        #[serde(default = "default_workers")]
        workers: usize,
        #[serde(default = "default_stale_after")]
        stale_after_frames: u64,
        #[serde(default = "default_retry_after")]
        retry_after_frames: u64,
        /// Resident tile budget in MB.
        #[serde(default = "default_cache_budget_mb")]
        cache_budget_mb: u64,
    },
}

fn default_token_file() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_FILE)
}

fn default_workers() -> usize {
    RemoteSettings::default().workers
}

fn default_stale_after() -> u64 {
    RemoteSettings::default().stale_after_frames
}

fn default_retry_after() -> u64 {
    RemoteSettings::default().retry_after_frames
}

fn default_cache_budget_mb() -> u64 {
    DEFAULT_CACHE_BUDGET_MB
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::LocalGrid {
            tile_dir: PathBuf::from("terrain"),
        }
    }
}

impl ProviderConfig {
    pub fn load(path: &Path) -> FloodResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FloodError::Config(format!("cannot read provider config {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> FloodResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Selector name of the configured provider.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::LocalGrid { .. } => LOCAL_GRID_PROVIDER,
            ProviderConfig::RemoteHosted { .. } => REMOTE_HOSTED_PROVIDER,
        }
    }

    /// Construct the configured provider.
    ///
    /// Every failure is reported as `ProviderUnavailable` naming the provider.
    pub fn build(&self) -> FloodResult<TerrainProvider> {
        info!("Initializing terrain provider '{}'", self.name());
        let provider = match self {
            ProviderConfig::LocalGrid { tile_dir } => {
                LocalGridProvider::open(tile_dir).map(TerrainProvider::LocalGrid)
            }
            ProviderConfig::RemoteHosted {
                endpoint,
                asset_id,
                token_file,
                workers,
                stale_after_frames,
                retry_after_frames,
                cache_budget_mb,
            } => {
                let settings = RemoteSettings {
                    workers: *workers,
                    stale_after_frames: *stale_after_frames,
                    retry_after_frames: *retry_after_frames,
                    cache_budget_bytes: cache_budget_mb.saturating_mul(1024 * 1024),
                };
                AccessToken::load(token_file)
                    .and_then(|token| HttpTileFetcher::new(endpoint, asset_id, token))
                    .and_then(|fetcher| RemoteTileProvider::new(Arc::new(fetcher), settings))
                    .map(TerrainProvider::RemoteHosted)
            }
        };
        provider.map_err(|e| match e {
            FloodError::ProviderUnavailable { .. } => e,
            other => FloodError::provider_unavailable(self.name(), other),
        })
    }
}
