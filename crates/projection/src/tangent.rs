//! Local tangent-plane projection.
//!
//! Maps geographic coordinates onto a plane touching the oblate spheroid at
//! a configurable origin latitude/longitude. Distances are metres. The
//! approximation is good for regional domains a few degrees across, which is
//! the scale of the coastal meshes this pipeline feeds.
//!
//! The projection parameters are:
//! - Origin (lat0, lon0): the geographic point mapped to the planar offset
//! - Planar offset (x0, y0): where the origin lands in mesh coordinates
//!
//! The spheroid radius is evaluated at the origin latitude and then held
//! fixed, so a degree of longitude shrinks with cos(lat0) but does not vary
//! across the domain.

use std::f64::consts::PI;

/// WGS84 equatorial radius (metres).
const EQUATORIAL_RADIUS: f64 = 6_378_137.0;

/// WGS84 flattening.
const FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Local tangent-plane projection parameters.
///
/// Construct once per run; the spheroid radii at the origin latitude are
/// precomputed so the per-point transforms are a pair of multiplications.
#[derive(Debug, Clone, Copy)]
pub struct TangentPlane {
    /// Origin latitude in degrees
    pub lat0: f64,
    /// Origin longitude in degrees
    pub lon0: f64,
    /// Planar x of the origin (metres)
    pub x0: f64,
    /// Planar y of the origin (metres)
    pub y0: f64,
    /// Meridional spheroid radius at the origin latitude (metres)
    r_lat: f64,
    /// Radius of the latitude circle through the origin (metres)
    r_poleaxis: f64,
}

impl TangentPlane {
    /// Create a projection about the given origin with a planar offset.
    pub fn new(lat0: f64, lon0: f64, x0: f64, y0: f64) -> Self {
        let sin_lat = (lat0 * PI / 180.0).sin();
        let r_lat = EQUATORIAL_RADIUS * (1.0 - FLATTENING * sin_lat * sin_lat);
        let r_poleaxis = r_lat * (lat0 * PI / 180.0).cos();
        Self {
            lat0,
            lon0,
            x0,
            y0,
            r_lat,
            r_poleaxis,
        }
    }

    /// Create a projection with the origin at planar (0, 0).
    pub fn centered(lat0: f64, lon0: f64) -> Self {
        Self::new(lat0, lon0, 0.0, 0.0)
    }

    /// Project geographic coordinates (degrees) to planar metres.
    pub fn to_plane(&self, lat: f64, lon: f64) -> (f64, f64) {
        let y = 2.0 * PI * self.r_lat * (lat - self.lat0) / 360.0 + self.y0;
        let x = 2.0 * PI * self.r_poleaxis * (lon - self.lon0) / 360.0 + self.x0;
        (x, y)
    }

    /// Invert the planar transform back to geographic degrees.
    ///
    /// Exact algebraic inverse of [`to_plane`](Self::to_plane); the pair is
    /// still only an approximation of the true spheroid geometry.
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = self.lat0 + 360.0 * (y - self.y0) / (2.0 * PI * self.r_lat);
        let lon = self.lon0 + 360.0 * (x - self.x0) / (2.0 * PI * self.r_poleaxis);
        (lat, lon)
    }

    /// Metres of planar distance per degree of latitude at the origin.
    pub fn metres_per_degree_lat(&self) -> f64 {
        2.0 * PI * self.r_lat / 360.0
    }

    /// Metres of planar distance per degree of longitude at the origin.
    pub fn metres_per_degree_lon(&self) -> f64 {
        2.0 * PI * self.r_poleaxis / 360.0
    }
}
