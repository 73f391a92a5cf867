//! Label markers and screen placement.
//!
//! Front-facing labels are picked once per frame for the whole plan. Each
//! visible label gets a small billboarded marker disc in the scene; its text
//! is drawn by the UI pass at the marker's projected screen position.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use sector_globe::{LodLevel, RegionKey, filter_labels};

use crate::camera::OrbitCamera;
use crate::globe::{GlobeEntity, GlobeSession, GlobeSet};

/// Radius of a label marker disc.
const MARKER_RADIUS: f32 = 0.018;

/// Plugin that places label markers for front-facing labels.
pub struct LabelsPlugin;

impl Plugin for LabelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisibleLabels>()
            .init_resource::<LabelEntities>()
            .add_systems(Startup, setup_marker_assets)
            .add_systems(Update, sync_labels.in_set(GlobeSet::Render))
            .add_systems(
                PostUpdate,
                clear_labels.run_if(resource_removed::<GlobeSession>),
            );
    }
}

/// A label to draw this frame.
#[derive(Debug, Clone)]
pub struct ScreenLabel {
    pub text: String,
    pub anchor: Vec3,
    pub level: LodLevel,
}

/// Labels that passed the front-facing test this frame.
#[derive(Resource, Default, Debug)]
pub struct VisibleLabels {
    pub labels: Vec<ScreenLabel>,
}

#[derive(Resource, Default)]
struct LabelEntities {
    entities: HashMap<RegionKey, Entity>,
}

#[derive(Resource)]
struct MarkerAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

#[derive(Component)]
struct LabelMarker;

fn setup_marker_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(MarkerAssets {
        mesh: meshes.add(Circle::new(MARKER_RADIUS)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.07, 0.07, 0.07),
            unlit: true,
            ..default()
        }),
    });
}

/// Filter the plan's labels and orient a marker toward the camera for each.
#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn sync_labels(
    mut commands: Commands,
    session: Res<GlobeSession>,
    assets: Res<MarkerAssets>,
    camera: Query<&Transform, (With<OrbitCamera>, Without<LabelMarker>)>,
    mut markers: Query<&mut Transform, With<LabelMarker>>,
    mut label_entities: ResMut<LabelEntities>,
    mut visible: ResMut<VisibleLabels>,
) {
    let Ok(camera) = camera.single() else {
        return;
    };
    let camera_pos = camera.translation.as_dvec3();
    let plan = &session.plan;
    let shown = filter_labels(&plan.labels, camera_pos, session.config.label_threshold);

    let keys: HashSet<RegionKey> = shown.iter().map(|l| l.key).collect();
    label_entities.entities.retain(|key, entity| {
        let keep = keys.contains(key);
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });

    visible.labels.clear();
    for label in shown {
        let spec = &plan.labels[label.index];
        let rotation = label.rotation;
        let transform = Transform {
            translation: label.position.as_vec3(),
            rotation: Quat::from_xyzw(
                rotation.x as f32,
                rotation.y as f32,
                rotation.z as f32,
                rotation.w as f32,
            ),
            scale: Vec3::ONE,
        };

        if let Some(&entity) = label_entities.entities.get(&label.key) {
            if let Ok(mut marker) = markers.get_mut(entity) {
                *marker = transform;
            }
        } else {
            let entity = commands
                .spawn((
                    Mesh3d(assets.mesh.clone()),
                    MeshMaterial3d(assets.material.clone()),
                    transform,
                    LabelMarker,
                    GlobeEntity,
                ))
                .id();
            label_entities.entities.insert(label.key, entity);
        }

        visible.labels.push(ScreenLabel {
            text: spec.text.clone(),
            anchor: transform.translation,
            level: spec.level,
        });
    }
}

fn clear_labels(mut label_entities: ResMut<LabelEntities>, mut visible: ResMut<VisibleLabels>) {
    label_entities.entities.clear();
    visible.labels.clear();
}
