//! Translucent globe shell.
//!
//! A glassy sphere at the globe radius sits under the tiles. It fades out
//! as the camera closes in so the tiles read clearly up close.

use bevy::prelude::*;
use sector_globe::smoothstep;

use crate::globe::{GlobeEntity, GlobeSession, GlobeSet};

/// Shell opacity when the camera is close.
const NEAR_ALPHA: f32 = 0.12;
/// Shell opacity when the camera is far.
const FAR_ALPHA: f32 = 0.33;
/// Smallest opacity change worth touching the material for.
const ALPHA_EPSILON: f32 = 0.005;
/// Fade range, in globe radii.
const FADE_START: f64 = 1.1;
const FADE_END: f64 = 5.0;

/// Plugin for the globe shell.
pub struct ShellPlugin;

impl Plugin for ShellPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_shell.run_if(resource_added::<GlobeSession>),
                fade_shell.in_set(GlobeSet::Render),
            ),
        );
    }
}

#[derive(Component)]
struct GlobeShell;

/// Shell opacity for a camera distance.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn shell_alpha(distance: f64, radius: f64) -> f32 {
    let t = smoothstep(FADE_START * radius, FADE_END * radius, distance) as f32;
    NEAR_ALPHA + (FAR_ALPHA - NEAR_ALPHA) * t
}

#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn spawn_shell(
    mut commands: Commands,
    session: Res<GlobeSession>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let radius = session.config.radius as f32;
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(96, 48))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.93, 0.97, 1.0, FAR_ALPHA),
            emissive: LinearRgba::rgb(0.02, 0.03, 0.04),
            perceptual_roughness: 0.35,
            alpha_mode: AlphaMode::Blend,
            ..default()
        })),
        Transform::IDENTITY,
        GlobeShell,
        GlobeEntity,
    ));
    tracing::debug!("Spawned globe shell at radius {radius}");
}

#[allow(clippy::needless_pass_by_value)]
fn fade_shell(
    session: Res<GlobeSession>,
    shell: Query<&MeshMaterial3d<StandardMaterial>, With<GlobeShell>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let alpha = shell_alpha(session.distance, session.config.radius);
    for handle in &shell {
        let Some(current) = materials.get(&handle.0).map(|m| m.base_color.alpha()) else {
            continue;
        };
        if (current - alpha).abs() < ALPHA_EPSILON {
            continue;
        }
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color.set_alpha(alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_alpha_range() {
        let r = 3.0;
        assert!((shell_alpha(r, r) - NEAR_ALPHA).abs() < 1e-6);
        assert!((shell_alpha(10.0 * r, r) - FAR_ALPHA).abs() < 1e-6);
        let mid = shell_alpha(3.0 * r, r);
        assert!(mid > NEAR_ALPHA && mid < FAR_ALPHA);
    }

    #[test]
    fn test_shell_alpha_monotonic() {
        let r = 3.0;
        let mut last = 0.0;
        for i in 0..=60 {
            let alpha = shell_alpha(r + f64::from(i) * 0.3, r);
            assert!(alpha >= last);
            last = alpha;
        }
    }
}
