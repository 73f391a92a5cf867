//! Globe session and per-frame planning.
//!
//! The globe exists while a [`GlobeSession`] resource does. Every globe
//! system is gated on it, so removing the session stops the frame work, and
//! a teardown system then despawns everything tagged [`GlobeEntity`].
//!
//! Each frame runs in three chained sets after the camera has moved:
//! input (hover and clicks against last frame's tiles), plan (level of
//! detail, active region and frame plan) and render (entity sync).

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use sector_globe::{Dataset, FramePlan, GlobeConfig, GlobeState, Selection};

use crate::camera::{OrbitCamera, OrbitCameraSet, camera_state};

/// Plugin that owns the globe session lifecycle and frame planning.
pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SelectionChanged>()
            .configure_sets(
                Update,
                (GlobeSet::Input, GlobeSet::Plan, GlobeSet::Render)
                    .chain()
                    .after(OrbitCameraSet),
            )
            .configure_sets(Update, GlobeSet::Input.run_if(resource_exists::<GlobeSession>))
            .configure_sets(Update, GlobeSet::Plan.run_if(resource_exists::<GlobeSession>))
            .configure_sets(Update, GlobeSet::Render.run_if(resource_exists::<GlobeSession>))
            .add_systems(Update, plan_frame.in_set(GlobeSet::Plan))
            .add_systems(Update, log_selection_changes)
            .add_systems(
                PostUpdate,
                teardown_globe.run_if(resource_removed::<GlobeSession>),
            );
    }
}

/// Ordered stages of the globe frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobeSet {
    Input,
    Plan,
    Render,
}

/// Dataset and configuration a session is opened from.
///
/// Kept after the session closes so it can be reopened.
#[derive(Resource, Debug, Clone)]
pub struct GlobeSource {
    pub dataset: Dataset,
    pub config: GlobeConfig,
}

impl GlobeSource {
    /// Open a fresh session.
    #[must_use]
    pub fn open(&self) -> GlobeSession {
        GlobeSession {
            dataset: self.dataset.clone(),
            state: GlobeState::new(&self.config),
            config: self.config.clone(),
            plan: FramePlan::default(),
            distance: 0.0,
        }
    }
}

/// A live globe.
#[derive(Resource, Debug)]
pub struct GlobeSession {
    pub dataset: Dataset,
    pub config: GlobeConfig,
    pub state: GlobeState,
    /// The plan produced this frame.
    pub plan: FramePlan,
    /// Camera distance from the globe center this frame.
    pub distance: f64,
}

/// Tags entities that belong to the globe session.
#[derive(Component)]
pub struct GlobeEntity;

/// Emitted when the selection is set or cleared.
#[derive(Message, Debug, Clone)]
pub struct SelectionChanged(pub Option<Selection>);

/// Advance the globe state from the camera pose.
fn plan_frame(mut session: ResMut<GlobeSession>, camera: Query<&Transform, With<OrbitCamera>>) {
    let Ok(transform) = camera.single() else {
        return;
    };
    let camera = camera_state(transform);
    let session = &mut *session;
    session.plan = session.state.tick(&camera, &session.dataset, &session.config);
    session.distance = camera.distance();
}

/// Report every selection change to the host as JSON.
fn log_selection_changes(mut changes: MessageReader<SelectionChanged>) {
    for SelectionChanged(selection) in changes.read() {
        match selection {
            Some(selection) => match serde_json::to_string(selection) {
                Ok(json) => tracing::info!("Selection: {json}"),
                Err(e) => tracing::warn!("Failed to serialize selection: {e}"),
            },
            None => tracing::info!("Selection cleared"),
        }
    }
}

/// Despawn everything the session spawned once it is removed.
fn teardown_globe(mut commands: Commands, entities: Query<Entity, With<GlobeEntity>>) {
    let mut count = 0;
    for entity in &entities {
        commands.entity(entity).despawn();
        count += 1;
    }
    tracing::info!("Globe closed, despawned {count} entities");
}
