//! Coordinate conversion utilities.
//!
//! Converts between longitude/latitude on the globe and Cartesian points.
//! The globe is Y-up: latitude rises along +Y and longitude 0 lies on +X.

use glam::DVec3;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Convert longitude, latitude (degrees) and radius to a Cartesian point.
///
/// `lift` is added to `radius`, floating the point above the surface so
/// overlays do not z-fight with the base shell.
#[must_use]
pub fn to_cartesian(lon_deg: f64, lat_deg: f64, radius: f64, lift: f64) -> DVec3 {
    let lon_rad = lon_deg.to_radians();
    let lat_rad = lat_deg.to_radians();
    let r = radius + lift;
    DVec3::new(
        r * lat_rad.cos() * lon_rad.cos(),
        r * lat_rad.sin(),
        r * lat_rad.cos() * lon_rad.sin(),
    )
}

/// Convert a Cartesian point to longitude and latitude (degrees).
///
/// The point's distance from the origin is ignored. The origin itself maps to
/// `(0, 0)`. Latitude uses `atan2` against the equatorial distance rather
/// than `asin`, which loses precision near the poles.
#[must_use]
pub fn to_spherical(point: DVec3) -> LonLat {
    let n = point.normalize_or_zero();
    let lat = n.y.atan2(n.x.hypot(n.z)).to_degrees();
    let lon = n.z.atan2(n.x).to_degrees();
    LonLat::new(normalize_longitude(lon), lat)
}

/// Wrap a longitude into `[-180, 180)`.
#[must_use]
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
