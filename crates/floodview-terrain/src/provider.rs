//! The terrain height source abstraction and the configured provider.

use std::sync::Arc;

use floodview_core::types::{GeoPosition, TerrainSample};

use crate::local::LocalGridProvider;
use crate::remote::RemoteTileProvider;

/// Answers terrain height queries for geographic positions.
///
/// Implementations are queried concurrently from every fragment of a frame
/// and must never block on I/O: data that is not available yet resolves to
/// [`TerrainSample::NoData`].
pub trait TerrainHeightSource: Send + Sync {
    /// Provider name, for logs and snapshots.
    fn name(&self) -> &str;

    fn height(&self, position: GeoPosition) -> TerrainSample;

    /// Called once at the start of each frame, before any `height` query.
    fn begin_frame(&self, _frame: u64) {}
}

impl<S: TerrainHeightSource + ?Sized> TerrainHeightSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn height(&self, position: GeoPosition) -> TerrainSample {
        (**self).height(position)
    }

    fn begin_frame(&self, frame: u64) {
        (**self).begin_frame(frame)
    }
}

impl<S: TerrainHeightSource + ?Sized> TerrainHeightSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn height(&self, position: GeoPosition) -> TerrainSample {
        (**self).height(position)
    }

    fn begin_frame(&self, frame: u64) {
        (**self).begin_frame(frame)
    }
}

/// The provider selected by a [`crate::config::ProviderConfig`].
pub enum TerrainProvider {
    LocalGrid(LocalGridProvider),
    RemoteHosted(RemoteTileProvider),
}

impl TerrainHeightSource for TerrainProvider {
    fn name(&self) -> &str {
        match self {
            TerrainProvider::LocalGrid(p) => p.name(),
            TerrainProvider::RemoteHosted(p) => p.name(),
        }
    }

    fn height(&self, position: GeoPosition) -> TerrainSample {
        match self {
            TerrainProvider::LocalGrid(p) => p.height(position),
            TerrainProvider::RemoteHosted(p) => p.height(position),
        }
    }

    fn begin_frame(&self, frame: u64) {
        match self {
            TerrainProvider::LocalGrid(p) => p.begin_frame(frame),
            TerrainProvider::RemoteHosted(p) => p.begin_frame(frame),
        }
    }
}
