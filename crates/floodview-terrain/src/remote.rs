//! Remote high-resolution provider with non-blocking tile loading.
//!
//! A height query for a tile that is not resident enqueues a fetch and
//! answers no data immediately. Worker threads download tiles; finished
//! downloads are integrated at the next `begin_frame`, so a frame never
//! waits on the network. Requests for tiles that have not been queried for
//! `stale_after_frames` frames are skipped or their results discarded.
//!
//! Resident tiles are held to a memory budget. When a load pushes the total
//! past it, the least recently queried tiles are evicted and fetched again if
//! the view returns to them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};

use log::{debug, info, warn};

use floodview_core::error::{FloodError, FloodResult};
use floodview_core::types::{GeoPosition, TerrainSample};

use crate::fetch::{FetchOutcome, TileFetcher};
use crate::grid::TerrainGrid;
use crate::mosaic::TileKey;
use crate::provider::TerrainHeightSource;

pub const REMOTE_HOSTED_PROVIDER: &str = "remote-hosted";

/// Tuning for the remote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Number of fetch worker threads.
    pub workers: usize,
    /// Frames without a query after which a pending tile is abandoned.
    pub stale_after_frames: u64,
    /// Frames to wait before retrying a failed fetch.
    pub retry_after_frames: u64,
    /// Ceiling on the elevation data kept resident, in bytes.
    pub cache_budget_bytes: u64,
}

/// Default resident tile budget in MB.
pub const DEFAULT_CACHE_BUDGET_MB: u64 = 512;

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            stale_after_frames: 120,
            retry_after_frames: 300,
            cache_budget_bytes: DEFAULT_CACHE_BUDGET_MB * 1024 * 1024,
        }
    }
}

/// Counters for remote tile traffic.
#[derive(Debug, Default)]
pub struct RemoteStats {
    pub requested: AtomicU64,
    pub loaded: AtomicU64,
    pub missing: AtomicU64,
    pub failed: AtomicU64,
    pub discarded: AtomicU64,
    pub evicted: AtomicU64,
    pub resident_bytes: AtomicU64,
}

impl RemoteStats {
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::Relaxed)
    }

    pub fn loaded(&self) -> u64 {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn missing(&self) -> u64 {
        self.missing.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Bytes of elevation data currently resident.
    pub fn resident_bytes(&self) -> u64 {
        self.resident_bytes.load(Ordering::Relaxed)
    }
}

enum TileState {
    Pending,
    Loaded {
        grid: Arc<TerrainGrid>,
        /// Last frame a query hit this tile.
        last_used: AtomicU64,
    },
    /// The dataset has no tile here.
    Missing,
    Failed {
        retry_at: u64,
    },
}

enum FetchReport {
    Done {
        key: TileKey,
        result: FloodResult<FetchOutcome>,
    },
    /// Abandoned before fetching because nobody asked for it recently.
    Skipped(TileKey),
}

/// State shared between the provider and its workers.
struct Shared {
    current_frame: AtomicU64,
    /// Last frame each pending tile was queried.
    last_wanted: Mutex<HashMap<TileKey, u64>>,
    stale_after_frames: u64,
}

impl Shared {
    fn touch(&self, key: TileKey, frame: u64) {
        if let Ok(mut wanted) = self.last_wanted.lock() {
            wanted.insert(key, frame);
        }
    }

    fn forget(&self, key: TileKey) {
        if let Ok(mut wanted) = self.last_wanted.lock() {
            wanted.remove(&key);
        }
    }

    fn is_stale(&self, key: TileKey) -> bool {
        let now = self.current_frame.load(Ordering::Relaxed);
        match self.last_wanted.lock() {
            Ok(wanted) => wanted
                .get(&key)
                .map_or(true, |&frame| now.saturating_sub(frame) > self.stale_after_frames),
            Err(_) => false,
        }
    }
}

pub struct RemoteTileProvider {
    tiles: RwLock<HashMap<TileKey, TileState>>,
    shared: Arc<Shared>,
    /// `mpsc::Sender` is wrapped so the provider is `Sync`.
    jobs: Mutex<mpsc::Sender<TileKey>>,
    reports: Mutex<mpsc::Receiver<FetchReport>>,
    settings: RemoteSettings,
    stats: RemoteStats,
}

impl RemoteTileProvider {
    /// Start the fetch workers. Fails only if a worker thread cannot be spawned.
    pub fn new(fetcher: Arc<dyn TileFetcher>, settings: RemoteSettings) -> FloodResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<TileKey>();
        let (report_tx, report_rx) = mpsc::channel::<FetchReport>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let shared = Arc::new(Shared {
            current_frame: AtomicU64::new(0),
            last_wanted: Mutex::new(HashMap::new()),
            stale_after_frames: settings.stale_after_frames,
        });

        let workers = settings.workers.max(1);
        for i in 0..workers {
            let fetcher = Arc::clone(&fetcher);
            let jobs = Arc::clone(&job_rx);
            let reports = report_tx.clone();
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(format!("floodview-tile-fetch-{i}"))
                .spawn(move || run_fetch_worker(fetcher.as_ref(), &jobs, &reports, &shared))
                .map_err(|e| {
                    FloodError::provider_unavailable(
                        REMOTE_HOSTED_PROVIDER,
                        format!("cannot spawn fetch worker: {e}"),
                    )
                })?;
        }

        info!("Remote terrain provider started with {workers} fetch worker(s)");

        Ok(Self {
            tiles: RwLock::new(HashMap::new()),
            shared,
            jobs: Mutex::new(job_tx),
            reports: Mutex::new(report_rx),
            settings,
            stats: RemoteStats::default(),
        })
    }

    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    pub fn stats(&self) -> &RemoteStats {
        &self.stats
    }

    /// Number of tiles currently resident.
    pub fn loaded_tiles(&self) -> usize {
        self.tiles.read().map_or(0, |tiles| {
            tiles
                .values()
                .filter(|s| matches!(s, TileState::Loaded { .. }))
                .count()
        })
    }

    /// Enqueue a fetch unless another query already did.
    fn request(&self, key: TileKey, frame: u64) {
        let Ok(mut tiles) = self.tiles.write() else {
            return;
        };
        match tiles.get(&key) {
            None => {}
            Some(TileState::Failed { retry_at }) if frame >= *retry_at => {}
            Some(_) => return,
        }
        tiles.insert(key, TileState::Pending);
        drop(tiles);

        self.shared.touch(key, frame);
        self.stats.requested.fetch_add(1, Ordering::Relaxed);

        let sent = self
            .jobs
            .lock()
            .map(|jobs| jobs.send(key).is_ok())
            .unwrap_or(false);
        if !sent {
            warn!("Tile fetch workers are gone; {key} will stay unavailable");
        }
    }

    fn apply_report(&self, tiles: &mut HashMap<TileKey, TileState>, report: FetchReport, frame: u64) {
        match report {
            FetchReport::Skipped(key) => {
                debug!("Skipped stale tile request {key}");
                tiles.remove(&key);
                self.shared.forget(key);
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            }
            FetchReport::Done { key, result } => {
                if self.shared.is_stale(key) {
                    debug!("Discarding stale tile load {key}");
                    tiles.remove(&key);
                    self.shared.forget(key);
                    self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                self.shared.forget(key);
                match result {
                    Ok(FetchOutcome::Tile(grid)) => {
                        debug!("Loaded tile {key}");
                        self.stats
                            .resident_bytes
                            .fetch_add(grid_bytes(&grid), Ordering::Relaxed);
                        tiles.insert(
                            key,
                            TileState::Loaded {
                                grid: Arc::new(grid),
                                last_used: AtomicU64::new(frame),
                            },
                        );
                        self.stats.loaded.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(FetchOutcome::Missing) => {
                        debug!("Tile {key} not in dataset");
                        tiles.insert(key, TileState::Missing);
                        self.stats.missing.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        warn!("Tile {key} fetch failed: {e}");
                        tiles.insert(
                            key,
                            TileState::Failed {
                                retry_at: frame + self.settings.retry_after_frames,
                            },
                        );
                        self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    }

    /// Drop least recently queried tiles until the resident data fits the budget.
    fn evict_to_budget(&self, tiles: &mut HashMap<TileKey, TileState>) {
        let budget = self.settings.cache_budget_bytes;
        let mut resident = self.stats.resident_bytes();
        if resident <= budget {
            return;
        }

        let mut loaded: Vec<(u64, TileKey, u64)> = tiles
            .iter()
            .filter_map(|(key, state)| match state {
                TileState::Loaded { grid, last_used } => {
                    Some((last_used.load(Ordering::Relaxed), *key, grid_bytes(grid)))
                }
                _ => None,
            })
            .collect();
        loaded.sort_unstable();

        for (_, key, bytes) in loaded {
            if resident <= budget {
                break;
            }
            tiles.remove(&key);
            resident = resident.saturating_sub(bytes);
            self.stats.evicted.fetch_add(1, Ordering::Relaxed);
            debug!("Evicted tile {key}");
        }
        self.stats.resident_bytes.store(resident, Ordering::Relaxed);
    }
}

/// Memory held by a resident grid.
fn grid_bytes(grid: &TerrainGrid) -> u64 {
    let samples = grid.elevations.len() * std::mem::size_of::<i16>();
    let mask = grid.coverage_mask.as_ref().map_or(0, Vec::len);
    (samples + mask) as u64
}

/// Worker loop. Runs until the provider (and with it the job sender) is dropped.
fn run_fetch_worker(
    fetcher: &dyn TileFetcher,
    jobs: &Mutex<mpsc::Receiver<TileKey>>,
    reports: &mpsc::Sender<FetchReport>,
    shared: &Shared,
) {
    loop {
        let key = {
            let Ok(rx) = jobs.lock() else {
                return;
            };
            match rx.recv() {
                Ok(key) => key,
                Err(_) => return,
            }
        };

        let report = if shared.is_stale(key) {
            FetchReport::Skipped(key)
        } else {
            FetchReport::Done {
                key,
                result: fetcher.fetch(key),
            }
        };

        if reports.send(report).is_err() {
            return;
        }
    }
}

impl TerrainHeightSource for RemoteTileProvider {
    fn name(&self) -> &str {
        REMOTE_HOSTED_PROVIDER
    }

    fn height(&self, position: GeoPosition) -> TerrainSample {
        let position = position.normalized();
        let key = TileKey::containing(&position);
        let frame = self.shared.current_frame.load(Ordering::Relaxed);

        {
            let Ok(tiles) = self.tiles.read() else {
                return TerrainSample::NoData;
            };
            match tiles.get(&key) {
                Some(TileState::Loaded { grid, last_used }) => {
                    last_used.fetch_max(frame, Ordering::Relaxed);
                    return TerrainSample::from(grid.elevation_at(&position));
                }
                Some(TileState::Missing) => return TerrainSample::NoData,
                Some(TileState::Pending) => {
                    self.shared.touch(key, frame);
                    return TerrainSample::NoData;
                }
                Some(TileState::Failed { retry_at }) if frame < *retry_at => {
                    return TerrainSample::NoData;
                }
                _ => {}
            }
        }

        self.request(key, frame);
        TerrainSample::NoData
    }

    fn begin_frame(&self, frame: u64) {
        self.shared.current_frame.store(frame, Ordering::Relaxed);

        let reports: Vec<FetchReport> = match self.reports.lock() {
            Ok(rx) => rx.try_iter().collect(),
            Err(_) => return,
        };
        if reports.is_empty() {
            return;
        }

        let Ok(mut tiles) = self.tiles.write() else {
            return;
        };
        for report in reports {
            self.apply_report(&mut tiles, report, frame);
        }
        self.evict_to_budget(&mut tiles);
    }
}
