//! Label visibility and orientation.
//!
//! Labels on the far hemisphere would read mirrored through the globe, so
//! they are hidden outright rather than left to depth testing. Visible labels
//! are billboarded to face the camera with text kept upright.

use glam::{DMat3, DQuat, DVec3};

use crate::walker::{LabelSpec, RegionKey};

/// Default cosine threshold for a label to count as front-facing.
pub const DEFAULT_FRONT_THRESHOLD: f64 = 0.02;

/// A label that passed the visibility test this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleLabel {
    /// Index into the frame plan's labels.
    pub index: usize,
    pub key: RegionKey,
    pub position: DVec3,
    /// Orientation with local +Z toward the camera and +Y upright.
    pub rotation: DQuat,
}

/// Whether a point on the globe faces the camera.
///
/// Compares the directions of the point and the camera from the globe
/// center. Zero-length inputs have no direction and count as hidden.
#[must_use]
pub fn is_front_facing(world_pos: DVec3, camera_pos: DVec3, threshold: f64) -> bool {
    let p = world_pos.normalize_or_zero();
    let c = camera_pos.normalize_or_zero();
    if p == DVec3::ZERO || c == DVec3::ZERO {
        return false;
    }
    p.dot(c) > threshold
}

/// Rotation that turns a label at `label_pos` toward `camera_pos`.
///
/// Local +Z points at the camera and local +Y is `world_up` projected onto
/// the label plane. When the camera looks straight along `world_up` the
/// projection vanishes and an arbitrary perpendicular axis is used instead.
#[must_use]
pub fn billboard_rotation(label_pos: DVec3, camera_pos: DVec3, world_up: DVec3) -> DQuat {
    let z = (camera_pos - label_pos).normalize_or_zero();
    if z == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    let projected = world_up - z * world_up.dot(z);
    let y = if projected.length_squared() > 1e-12 {
        projected.normalize()
    } else {
        z.any_orthonormal_vector()
    };
    let x = y.cross(z);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z))
}

/// Select and orient the labels visible from `camera_pos`.
#[must_use]
pub fn filter_labels(labels: &[LabelSpec], camera_pos: DVec3, threshold: f64) -> Vec<VisibleLabel> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| is_front_facing(label.position, camera_pos, threshold))
        .map(|(index, label)| VisibleLabel {
            index,
            key: label.key,
            position: label.position,
            rotation: billboard_rotation(label.position, camera_pos, DVec3::Y),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::lod::LodLevel;
    use crate::walker::{GlobeConfig, walk};
    use proptest::prelude::*;

    fn assert_vec_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn test_front_and_back() {
        let camera = DVec3::new(0.0, 0.0, 10.0);
        assert!(is_front_facing(DVec3::new(0.0, 0.0, 3.0), camera, DEFAULT_FRONT_THRESHOLD));
        assert!(!is_front_facing(DVec3::new(0.0, 0.0, -3.0), camera, DEFAULT_FRONT_THRESHOLD));
        // Exactly on the limb is below the threshold.
        assert!(!is_front_facing(DVec3::new(3.0, 0.0, 0.0), camera, DEFAULT_FRONT_THRESHOLD));
        assert!(is_front_facing(DVec3::new(3.0, 0.0, 0.1), camera, DEFAULT_FRONT_THRESHOLD));
    }

    #[test]
    fn test_zero_inputs_hidden() {
        assert!(!is_front_facing(DVec3::ZERO, DVec3::Z, -1.0));
        assert!(!is_front_facing(DVec3::Z, DVec3::ZERO, -1.0));
    }

    #[test]
    fn test_billboard_faces_camera_upright() {
        let label = DVec3::new(3.0, 0.5, 0.0);
        let camera = DVec3::new(5.0, 2.0, 6.0);
        let rotation = billboard_rotation(label, camera, DVec3::Y);

        assert_vec_close(rotation * DVec3::Z, (camera - label).normalize());
        let up = rotation * DVec3::Y;
        assert!(up.dot(DVec3::Y) > 0.0);
        assert!(up.dot(rotation * DVec3::Z).abs() < 1e-9);
        // Right stays horizontal, so text has no roll.
        assert!((rotation * DVec3::X).y.abs() < 1e-9);
    }

    #[test]
    fn test_billboard_degenerate_up() {
        let rotation = billboard_rotation(DVec3::ZERO, DVec3::new(0.0, 10.0, 0.0), DVec3::Y);
        assert_vec_close(rotation * DVec3::Z, DVec3::Y);
        assert!(rotation.is_normalized());

        assert_eq!(billboard_rotation(DVec3::ONE, DVec3::ONE, DVec3::Y), DQuat::IDENTITY);
    }

    #[test]
    fn test_filter_sector_labels() {
        let config = GlobeConfig::default();
        let plan = walk(&Dataset::builtin(), LodLevel::Sectors, None, &config);
        // Sector 2 spans -36..36 and is centered on +X.
        let visible = filter_labels(&plan.labels, DVec3::new(15.0, 0.0, 0.0), config.label_threshold);
        let sectors: Vec<_> = visible.iter().map(|v| v.key.sector()).collect();
        assert_eq!(sectors, [1, 2, 3]);
        assert_eq!(visible[1].index, 2);
    }

    proptest! {
        #[test]
        fn prop_symmetry(x in -10.0f64..10.0, y in -10.0f64..10.0, z in -10.0f64..10.0, scale in 0.1f64..5.0) {
            let dir = DVec3::new(x, y, z);
            prop_assume!(dir.length() > 1e-3);
            prop_assert!(is_front_facing(dir * scale, dir, DEFAULT_FRONT_THRESHOLD));
            prop_assert!(!is_front_facing(-dir * scale, dir, DEFAULT_FRONT_THRESHOLD));
        }
    }
}
