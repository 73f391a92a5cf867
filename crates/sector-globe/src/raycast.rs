//! Camera raycasting against the globe.
//!
//! Finds the point on the sphere the camera is looking at and maps it to the
//! sector and industry band under it.

use glam::DVec3;

use crate::coords::{normalize_longitude, to_spherical};
use crate::dataset::{Dataset, SECTOR_COUNT};
use crate::state::ActiveRegion;

/// Longitude width of a sector, in degrees.
pub const SECTOR_SPAN_DEGREES: f64 = 72.0;

/// Southward nudge, in degrees, applied before banding a latitude. A hit on
/// an edge comes back from the sphere a few ulps off; this keeps it south.
const BAND_EDGE_EPSILON: f64 = 1e-9;

/// Camera pose read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// World-space camera position. The globe is centered at the origin.
    pub position: DVec3,
    /// Direction the camera looks along. Need not be normalized.
    pub forward: DVec3,
}

impl CameraState {
    #[must_use]
    pub fn new(position: DVec3, forward: DVec3) -> Self {
        Self { position, forward }
    }

    /// A camera at `position` looking at the globe center.
    #[must_use]
    pub fn looking_at_origin(position: DVec3) -> Self {
        Self::new(position, -position)
    }

    /// Distance from the globe center.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.position.length()
    }
}

/// Intersect a ray with a sphere.
///
/// Returns the nearest hit in front of the ray origin, or `None` if the ray
/// misses, the sphere lies entirely behind the origin, or `direction` is
/// zero. `direction` does not need to be normalized.
#[must_use]
pub fn intersect_sphere(origin: DVec3, direction: DVec3, center: DVec3, radius: f64) -> Option<DVec3> {
    let a = direction.length_squared();
    if a <= 0.0 || !a.is_finite() {
        return None;
    }
    let oc = origin - center;
    let half_b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    let far = (-half_b + root) / a;
    let t = if near > 0.0 {
        near
    } else if far > 0.0 {
        far
    } else {
        return None;
    };
    Some(origin + direction * t)
}

/// Sector index (0..5) owning a longitude.
///
/// Longitudes are wrapped into `[-180, 180)` first, so -180 and 180 land in
/// the same sector.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sector_index_from_longitude(lon_deg: f64) -> usize {
    let lon = normalize_longitude(lon_deg);
    let index = ((lon + 180.0) / SECTOR_SPAN_DEGREES).floor();
    // NaN and negative values saturate to 0 in the cast.
    (index as usize) % SECTOR_COUNT
}

/// Industry band (north to south) owning a latitude, for a sector with
/// `count` industries. Points on a band edge belong to the band south of it.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn industry_index_from_latitude(lat_deg: f64, count: usize) -> Option<usize> {
    if count == 0 || lat_deg.is_nan() {
        return None;
    }
    let from_north = (90.0 - lat_deg.clamp(-90.0, 90.0) + BAND_EDGE_EPSILON) / 180.0;
    let index = (from_north * count as f64).floor() as usize;
    Some(index.min(count - 1))
}

/// Region under the camera's forward ray.
///
/// Returns `None` when the ray misses the globe; callers keep the previous
/// region in that case.
#[must_use]
pub fn locate_active_region(camera: &CameraState, radius: f64, dataset: &Dataset) -> Option<ActiveRegion> {
    let hit = intersect_sphere(camera.position, camera.forward, DVec3::ZERO, radius)?;
    let lonlat = to_spherical(hit);
    let sector_index = sector_index_from_longitude(lonlat.lon);
    let industry_index = dataset
        .sector(sector_index)
        .and_then(|s| industry_index_from_latitude(lonlat.lat, s.industries().len()));
    Some(ActiveRegion {
        sector_index,
        industry_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::to_cartesian;
    use proptest::prelude::*;

    #[test]
    fn test_hit_from_outside() {
        let hit = intersect_sphere(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z, DVec3::ZERO, 3.0).unwrap();
        assert!((hit - DVec3::new(0.0, 0.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn test_unnormalized_direction() {
        let hit = intersect_sphere(DVec3::new(0.0, 0.0, 10.0), DVec3::new(0.0, 0.0, -7.5), DVec3::ZERO, 3.0)
            .unwrap();
        assert!((hit.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_miss_and_behind() {
        assert!(intersect_sphere(DVec3::new(0.0, 5.0, 10.0), DVec3::NEG_Z, DVec3::ZERO, 3.0).is_none());
        assert!(intersect_sphere(DVec3::new(0.0, 0.0, 10.0), DVec3::Z, DVec3::ZERO, 3.0).is_none());
        assert!(intersect_sphere(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::ZERO, 3.0).is_none());
    }

    #[test]
    fn test_origin_inside_uses_far_root() {
        let hit = intersect_sphere(DVec3::ZERO, DVec3::X, DVec3::ZERO, 3.0).unwrap();
        assert!((hit - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_offset_center() {
        let center = DVec3::new(10.0, 0.0, 0.0);
        let hit = intersect_sphere(DVec3::ZERO, DVec3::X, center, 2.0).unwrap();
        assert!((hit.x - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_sector_bands() {
        assert_eq!(sector_index_from_longitude(-180.0), 0);
        assert_eq!(sector_index_from_longitude(180.0), 0);
        assert_eq!(sector_index_from_longitude(180.0 - 1e-9), 4);
        assert_eq!(sector_index_from_longitude(-108.0), 1);
        assert_eq!(sector_index_from_longitude(0.0), 2);
        assert_eq!(sector_index_from_longitude(107.9), 3);
        assert_eq!(sector_index_from_longitude(108.0), 4);
        assert_eq!(sector_index_from_longitude(540.0), 0);
    }

    #[test]
    fn test_industry_bands() {
        assert_eq!(industry_index_from_latitude(90.0, 5), Some(0));
        assert_eq!(industry_index_from_latitude(-90.0, 5), Some(4));
        assert_eq!(industry_index_from_latitude(0.0, 5), Some(2));
        assert_eq!(industry_index_from_latitude(50.0, 5), Some(1));
        assert_eq!(industry_index_from_latitude(54.0, 5), Some(1));
        assert_eq!(industry_index_from_latitude(54.0 + 1e-12, 5), Some(1));
        assert_eq!(industry_index_from_latitude(54.0 + 1e-6, 5), Some(0));
        assert_eq!(industry_index_from_latitude(0.0, 1), Some(0));
        assert_eq!(industry_index_from_latitude(0.0, 0), None);
        assert_eq!(industry_index_from_latitude(f64::NAN, 3), None);
    }

    #[test]
    fn test_locate_active_region() {
        let dataset = Dataset::builtin();
        // Longitude -150 is in sector 0, latitude 10 is the third of five bands.
        let target = to_cartesian(-150.0, 10.0, 3.0, 0.0);
        let camera = CameraState::looking_at_origin(target * 3.0);
        let region = locate_active_region(&camera, 3.0, &dataset).unwrap();
        assert_eq!(region.sector_index, 0);
        assert_eq!(region.industry_index, Some(2));

        let away = CameraState::new(DVec3::new(0.0, 0.0, 10.0), DVec3::Z);
        assert!(locate_active_region(&away, 3.0, &dataset).is_none());
    }

    #[test]
    fn test_ray_on_band_edge_goes_south() {
        let dataset = Dataset::builtin();
        for sector in 0..SECTOR_COUNT {
            #[allow(clippy::cast_precision_loss)]
            let lon = -180.0 + SECTOR_SPAN_DEGREES * (sector as f64 + 0.5);
            let count = dataset.sector(sector).unwrap().industries().len();
            for band in 1..count {
                #[allow(clippy::cast_precision_loss)]
                let edge = 90.0 - 180.0 * band as f64 / count as f64;
                let camera = CameraState::looking_at_origin(to_cartesian(lon, edge, 10.0, 0.0));
                let region = locate_active_region(&camera, 3.0, &dataset).unwrap();
                assert_eq!(region.industry_index, Some(band), "sector {sector} edge {edge}");
            }
        }
    }

    proptest! {
        #[test]
        fn prop_sector_index_in_range(lon in -10_000.0f64..10_000.0) {
            prop_assert!(sector_index_from_longitude(lon) < SECTOR_COUNT);
        }

        #[test]
        fn prop_sector_constant_within_band(sector in 0usize..5, frac in 0.0f64..0.999) {
            #[allow(clippy::cast_precision_loss)]
            let lon = -180.0 + SECTOR_SPAN_DEGREES * (sector as f64 + frac);
            prop_assert_eq!(sector_index_from_longitude(lon), sector);
        }

        #[test]
        fn prop_hit_lies_on_sphere(
            x in -20.0f64..20.0, y in -20.0f64..20.0, z in 5.0f64..20.0,
        ) {
            let origin = DVec3::new(x, y, z);
            if let Some(hit) = intersect_sphere(origin, -origin, DVec3::ZERO, 3.0) {
                prop_assert!((hit.length() - 3.0).abs() < 1e-9);
            }
        }
    }
}
