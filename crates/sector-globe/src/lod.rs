//! Distance-driven level of detail.
//!
//! The globe has three discrete levels. The level is re-evaluated from the
//! camera distance every frame, with a dead band around each threshold so a
//! camera resting near a boundary does not flip between levels.

use std::fmt;

use crate::raycast::CameraState;

/// Level of detail shown on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LodLevel {
    /// One tile per sector.
    #[default]
    Sectors,
    /// One tile per industry band.
    Industries,
    /// Industry bands, with the active industry split into sub-items.
    SubItems,
}

impl LodLevel {
    /// Numeric level, 0 to 2.
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            LodLevel::Sectors => 0,
            LodLevel::Industries => 1,
            LodLevel::SubItems => 2,
        }
    }
}

impl fmt::Display for LodLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LodLevel::Sectors => "sectors",
            LodLevel::Industries => "industries",
            LodLevel::SubItems => "sub-items",
        };
        write!(f, "LOD{} ({name})", self.index())
    }
}

/// Distances at which the level changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodThresholds {
    /// Below this distance industries are shown.
    pub mid_distance: f64,
    /// Below this distance the active industry is split into sub-items.
    pub near_distance: f64,
    /// Width of the dead band as a fraction of each threshold.
    pub hysteresis: f64,
}

impl LodThresholds {
    /// Default thresholds scaled to a globe radius.
    #[must_use]
    pub fn for_radius(radius: f64) -> Self {
        Self {
            mid_distance: radius * 2.3,
            near_distance: radius * 1.45,
            hysteresis: 0.05,
        }
    }

    fn enter(&self, threshold: f64) -> f64 {
        threshold * (1.0 - self.hysteresis)
    }

    fn leave(&self, threshold: f64) -> f64 {
        threshold * (1.0 + self.hysteresis)
    }
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self::for_radius(crate::walker::DEFAULT_RADIUS)
    }
}

/// Discrete level of detail with hysteresis.
#[derive(Debug, Clone, PartialEq)]
pub struct LodController {
    level: LodLevel,
    thresholds: LodThresholds,
}

impl LodController {
    #[must_use]
    pub fn new(thresholds: LodThresholds) -> Self {
        Self {
            level: LodLevel::Sectors,
            thresholds,
        }
    }

    /// The current level.
    #[must_use]
    pub fn level(&self) -> LodLevel {
        self.level
    }

    #[must_use]
    pub fn thresholds(&self) -> &LodThresholds {
        &self.thresholds
    }

    /// Feed the camera distance for this frame and return the new level.
    ///
    /// A finer level is entered once the distance drops below its threshold
    /// minus the dead band and left once it rises above the threshold plus the
    /// dead band. Non-finite distances keep the current level.
    pub fn update(&mut self, distance: f64) -> LodLevel {
        if !distance.is_finite() {
            return self.level;
        }
        let next = self.next_level(distance);
        if next != self.level {
            tracing::info!("LOD {} -> {} at distance {distance:.3}", self.level, next);
            self.level = next;
        }
        self.level
    }

    /// Evaluate the level for a camera pose.
    pub fn evaluate(&mut self, camera: &CameraState) -> LodLevel {
        self.update(camera.distance())
    }

    fn next_level(&self, d: f64) -> LodLevel {
        let t = &self.thresholds;
        let near_enter = d < t.enter(t.near_distance);
        let mid_enter = d < t.enter(t.mid_distance);
        match self.level {
            LodLevel::Sectors if near_enter => LodLevel::SubItems,
            LodLevel::Sectors if mid_enter => LodLevel::Industries,
            LodLevel::Sectors => LodLevel::Sectors,
            LodLevel::Industries if d > t.leave(t.mid_distance) => LodLevel::Sectors,
            LodLevel::Industries if near_enter => LodLevel::SubItems,
            LodLevel::Industries => LodLevel::Industries,
            LodLevel::SubItems if d > t.leave(t.mid_distance) => LodLevel::Sectors,
            LodLevel::SubItems if d > t.leave(t.near_distance) => LodLevel::Industries,
            LodLevel::SubItems => LodLevel::SubItems,
        }
    }
}

impl Default for LodController {
    fn default() -> Self {
        Self::new(LodThresholds::default())
    }
}

/// Hermite interpolation of `x` between edges `a` and `b`, clamped to `[0, 1]`.
///
/// Equal edges give a hard step at `a`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn smoothstep(a: f64, b: f64, x: f64) -> f64 {
    if a == b {
        return if x < a { 0.0 } else { 1.0 };
    }
    let t = ((x - a) / (b - a)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const R: f64 = 3.0;

    fn controller() -> LodController {
        LodController::new(LodThresholds::for_radius(R))
    }

    #[test]
    fn test_levels_by_distance() {
        let mut lod = controller();
        assert_eq!(lod.update(R * 5.0), LodLevel::Sectors);
        assert_eq!(lod.update(R * 1.8), LodLevel::Industries);
        assert_eq!(lod.update(R * 1.2), LodLevel::SubItems);
        assert_eq!(lod.update(R * 1.8), LodLevel::Industries);
        assert_eq!(lod.update(R * 5.0), LodLevel::Sectors);
    }

    #[test]
    fn test_jumps_straight_to_finest() {
        let mut lod = controller();
        assert_eq!(lod.update(R * 1.1), LodLevel::SubItems);
        assert_eq!(lod.update(R * 4.0), LodLevel::Sectors);
    }

    #[test]
    fn test_dead_band_holds_level() {
        let mut lod = controller();
        let mid = lod.thresholds().mid_distance;

        // Sitting inside the band from above keeps the coarse level.
        assert_eq!(lod.update(mid * 0.97), LodLevel::Sectors);
        assert_eq!(lod.update(mid * 1.03), LodLevel::Sectors);

        // Crossing the lower edge switches, and the band then holds the new level.
        assert_eq!(lod.update(mid * 0.94), LodLevel::Industries);
        assert_eq!(lod.update(mid * 1.04), LodLevel::Industries);
        assert_eq!(lod.update(mid * 1.06), LodLevel::Sectors);
    }

    #[test]
    fn test_no_flapping_inside_dead_band() {
        let mut lod = controller();
        let mid = lod.thresholds().mid_distance;
        lod.update(mid * 0.9);

        let mut changes = 0;
        let mut last = lod.level();
        for i in 0..200 {
            let wobble = (f64::from(i) * 0.7).sin() * 0.045;
            let level = lod.update(mid * (1.0 + wobble));
            if level != last {
                changes += 1;
                last = level;
            }
        }
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_one_change_per_crossing() {
        let mut lod = controller();
        let mid = lod.thresholds().mid_distance;
        let mut changes = 0;
        let mut last = lod.level();
        // Sweep down through the threshold then back up, with jitter.
        let path = (0..100)
            .map(|i| 1.2 - f64::from(i) * 0.004)
            .chain((0..100).map(|i| 0.8 + f64::from(i) * 0.004));
        for (i, scale) in path.enumerate() {
            let jitter = if i % 2 == 0 { 0.01 } else { -0.01 };
            let level = lod.update(mid * (scale + jitter));
            if level != last {
                changes += 1;
                last = level;
            }
        }
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_non_finite_distance_keeps_level() {
        let mut lod = controller();
        lod.update(R * 1.8);
        assert_eq!(lod.update(f64::NAN), LodLevel::Industries);
        assert_eq!(lod.update(f64::INFINITY), LodLevel::Industries);
    }

    #[test]
    fn test_evaluate_uses_camera_distance() {
        let mut lod = controller();
        let camera = CameraState::looking_at_origin(DVec3::new(0.0, R * 0.9, R * 1.5));
        assert_eq!(lod.evaluate(&camera), LodLevel::Industries);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LodLevel::SubItems.index(), 2);
        assert_eq!(LodLevel::Industries.to_string(), "LOD1 (industries)");
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(1.0, 2.0, 0.0), 0.0);
        assert_eq!(smoothstep(1.0, 2.0, 3.0), 1.0);
        assert!((smoothstep(1.0, 2.0, 1.5) - 0.5).abs() < 1e-12);
        assert!(smoothstep(1.0, 2.0, 1.25) < 0.25);
        assert_eq!(smoothstep(2.0, 2.0, 1.9), 0.0);
        assert_eq!(smoothstep(2.0, 2.0, 2.0), 1.0);
        // Reversed edges invert the curve.
        assert!((smoothstep(2.0, 1.0, 1.25) - (1.0 - smoothstep(1.0, 2.0, 1.25))).abs() < 1e-12);
    }
}
