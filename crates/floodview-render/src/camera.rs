//! Globe camera: maps screen pixels to positions on a spherical Earth.
//!
//! World space is Earth-centred: x toward (0°, 0°), y toward (90°E, 0°),
//! z toward the north pole. The camera basis is built from the local
//! East/North/Up frame at the point under the camera.

use glam::DVec3;

use floodview_core::constants::EARTH_RADIUS_M;
use floodview_core::types::{CameraView, GeoPosition};

/// Ray caster for one view at one resolution.
#[derive(Debug, Clone)]
pub struct GlobeCamera {
    eye: DVec3,
    forward: DVec3,
    right: DVec3,
    up: DVec3,
    /// tan(fov/2) scaled by aspect ratio, and tan(fov/2).
    half_extent: (f64, f64),
    width: u32,
    height: u32,
}

impl GlobeCamera {
    pub fn new(view: &CameraView, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let under = GeoPosition::new(view.lon, view.lat);
        let normal = under.to_unit_vector();
        let (east, north) = east_north(&under);

        let (sin_heading, cos_heading) = view.heading_deg.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = view.pitch_deg.to_radians().sin_cos();

        let horizontal = north * cos_heading + east * sin_heading;
        let forward = (horizontal * cos_pitch + normal * sin_pitch).normalize();
        let right = (east * cos_heading - north * sin_heading).normalize();
        let up = right.cross(forward).normalize();

        let tan_half = (view.fov_deg.to_radians() * 0.5).tan();
        let aspect = width as f64 / height as f64;

        Self {
            eye: normal * (EARTH_RADIUS_M + view.height_m),
            forward,
            right,
            up,
            half_extent: (tan_half * aspect, tan_half),
            width,
            height,
        }
    }

    pub fn eye(&self) -> DVec3 {
        self.eye
    }

    /// Unit ray direction through the centre of pixel (x, y). y grows downward.
    pub fn ray_direction(&self, x: u32, y: u32) -> DVec3 {
        let ndc_x = 2.0 * (x as f64 + 0.5) / self.width as f64 - 1.0;
        let ndc_y = 1.0 - 2.0 * (y as f64 + 0.5) / self.height as f64;
        (self.forward
            + self.right * (ndc_x * self.half_extent.0)
            + self.up * (ndc_y * self.half_extent.1))
            .normalize()
    }

    /// Globe position seen through pixel (x, y), or `None` for space.
    pub fn pick(&self, x: u32, y: u32) -> Option<GeoPosition> {
        let dir = self.ray_direction(x, y);
        intersect_globe(self.eye, dir).map(GeoPosition::from_vector)
    }
}

/// Local East and North unit vectors at a position.
fn east_north(position: &GeoPosition) -> (DVec3, DVec3) {
    let (sin_lat, cos_lat) = position.lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = position.lon.to_radians().sin_cos();
    let east = DVec3::new(-sin_lon, cos_lon, 0.0);
    let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    (east, north)
}

/// Nearest intersection of a ray with the globe sphere.
fn intersect_globe(origin: DVec3, dir: DVec3) -> Option<DVec3> {
    let b = origin.dot(dir);
    let c = origin.length_squared() - EARTH_RADIUS_M * EARTH_RADIUS_M;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t_near = -b - sqrt_disc;
    let t = if t_near >= 0.0 { t_near } else { -b + sqrt_disc };
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}
