//! Frame rendering: per-fragment flood shading over the globe.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;

use floodview_core::constants::{CENTER_BOX_SIZE, MAX_FRAME_SIDE};
use floodview_core::state::{FrameSnapshot, FrameStats};
use floodview_core::types::{CameraView, GeoPosition, RenderDecision, TerrainSample};
use floodview_core::units::meters_to_feet;
use floodview_terrain::provider::TerrainHeightSource;

use crate::camera::GlobeCamera;
use crate::ramp::ElevationRamp;
use crate::water_level::WaterLevel;

/// One shaded globe fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: GeoPosition,
    pub sample: TerrainSample,
    pub decision: RenderDecision,
}

/// Output of one render pass.
#[derive(Debug, Clone)]
pub struct Frame {
    pub number: u64,
    pub width: u32,
    pub height: u32,
    pub view: CameraView,
    /// Water level every fragment of this frame was shaded against.
    pub water_level_m: f64,
    pub provider: String,
    pub stats: FrameStats,
    /// Row-major; `None` where the pixel sees space.
    fragments: Vec<Option<Fragment>>,
}

impl Frame {
    pub fn fragment(&self, x: u32, y: u32) -> Option<&Fragment> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.fragments[y as usize * self.width as usize + x as usize].as_ref()
    }

    pub fn decision(&self, x: u32, y: u32) -> Option<RenderDecision> {
        self.fragment(x, y).map(|f| f.decision)
    }

    /// Counts within a `box_size` square centred on the frame, clipped to its edges.
    pub fn stats_in_center(&self, box_size: u32) -> FrameStats {
        let xs = centered_span(self.width, box_size);
        let ys = centered_span(self.height, box_size);

        let mut stats = FrameStats::default();
        for y in ys {
            for x in xs.clone() {
                if let Some(fragment) = self.fragment(x, y) {
                    accumulate(&mut stats, fragment);
                }
            }
        }
        stats
    }

    /// Alpha-blend the overlay over a uniform basemap color.
    pub fn composite_over(&self, base: [f32; 3]) -> Vec<[f32; 3]> {
        self.fragments
            .iter()
            .map(|f| match f {
                Some(fragment) => fragment.decision.over(base),
                None => base,
            })
            .collect()
    }

    /// Terrain height under the centre pixel, if known.
    pub fn center_height(&self) -> Option<f64> {
        self.fragment(self.width / 2, self.height / 2)
            .and_then(|f| f.sample.height())
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshot_with_center_box(CENTER_BOX_SIZE)
    }

    /// Snapshot whose `center` counts cover a `box_size` square.
    pub fn snapshot_with_center_box(&self, box_size: u32) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.number,
            width: self.width,
            height: self.height,
            view: self.view,
            water_level_m: self.water_level_m,
            water_level_ft: meters_to_feet(self.water_level_m),
            provider: self.provider.clone(),
            stats: self.stats,
            center: self.stats_in_center(box_size),
            center_height_m: self.center_height(),
        }
    }
}

/// `len` indices of `0..extent` centred on `extent / 2`, clipped to the extent.
fn centered_span(extent: u32, len: u32) -> std::ops::Range<u32> {
    let start = (extent / 2).saturating_sub(len / 2);
    start..start.saturating_add(len).min(extent)
}

fn accumulate(stats: &mut FrameStats, fragment: &Fragment) {
    stats.sampled += 1;
    if fragment.decision.is_flooded() {
        stats.flooded += 1;
    }
    if fragment.sample.is_no_data() {
        stats.no_data += 1;
    }
}

/// Drives the flood shading for every visible fragment.
///
/// Generic over the height source: swapping providers changes only the
/// type parameter.
pub struct FrameRenderer<S> {
    source: S,
    water_level: Arc<WaterLevel>,
    ramp: ElevationRamp,
    next_frame: AtomicU64,
}

impl<S: TerrainHeightSource> FrameRenderer<S> {
    pub fn new(source: S, water_level: Arc<WaterLevel>) -> Self {
        Self {
            source,
            water_level,
            ramp: ElevationRamp::default(),
            next_frame: AtomicU64::new(0),
        }
    }

    pub fn with_ramp(mut self, ramp: ElevationRamp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn water_level(&self) -> &Arc<WaterLevel> {
        &self.water_level
    }

    /// Render one frame. The water level is read once, before any fragment.
    ///
    /// Sides larger than `MAX_FRAME_SIDE` are clamped to it.
    pub fn render(&self, view: &CameraView, width: u32, height: u32) -> Frame {
        if width > MAX_FRAME_SIDE || height > MAX_FRAME_SIDE {
            warn!("Frame {width}x{height} exceeds {MAX_FRAME_SIDE} px per side; clamping");
        }
        let width = width.min(MAX_FRAME_SIDE);
        let height = height.min(MAX_FRAME_SIDE);
        let number = self.next_frame.fetch_add(1, Ordering::Relaxed);
        self.source.begin_frame(number);
        let water_level_m = self.water_level.get();

        let camera = GlobeCamera::new(view, width, height);
        let ramp = self.ramp;
        let source = &self.source;

        let mut fragments = vec![None; width as usize * height as usize];
        if width > 0 {
            fragments
                .par_chunks_mut(width as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, slot) in row.iter_mut().enumerate() {
                        *slot = camera.pick(x as u32, y as u32).map(|position| {
                            let sample = source.height(position);
                            Fragment {
                                position,
                                sample,
                                decision: ramp.evaluate(sample, water_level_m),
                            }
                        });
                    }
                });
        }

        let mut stats = FrameStats::default();
        for fragment in fragments.iter().flatten() {
            accumulate(&mut stats, fragment);
        }

        debug!(
            "Frame {number}: {}x{} at {water_level_m:.1} m, {} sampled, {:.1}% flooded, {} no data",
            width,
            height,
            stats.sampled,
            stats.flooded_fraction() * 100.0,
            stats.no_data
        );

        Frame {
            number,
            width,
            height,
            view: *view,
            water_level_m,
            provider: source.name().to_string(),
            stats,
            fragments,
        }
    }
}
