//! Pointer hover and click picking.
//!
//! The cursor ray is intersected analytically with the sphere the current
//! tiles float on, and the hit's lon/lat is looked up in last frame's plan.
//! A press and release close together is a click; anything further is an
//! orbit drag and never selects.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::input::egui_wants_any_pointer_input;
use glam::DVec3;
use sector_globe::{RegionKey, intersect_sphere, locate_tile, to_spherical};

use crate::camera::OrbitCamera;
use crate::globe::{GlobeSession, GlobeSet, SelectionChanged};

/// Largest cursor travel in logical pixels that still counts as a click.
const CLICK_SLOP: f32 = 5.0;

/// Plugin for tile hover and click selection.
pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>().add_systems(
            Update,
            (
                (update_hover, handle_clicks)
                    .chain()
                    .run_if(not(egui_wants_any_pointer_input)),
                clear_hover.run_if(egui_wants_any_pointer_input),
            )
                .in_set(GlobeSet::Input),
        );
    }
}

/// Pointer tracking between press and release.
#[derive(Resource, Default, Debug)]
pub struct PointerState {
    /// Where the left button went down, if it is held.
    press: Option<Vec2>,
    /// Furthest the cursor has moved from the press position.
    travel: f32,
}

impl PointerState {
    fn pressed(&mut self, at: Vec2) {
        self.press = Some(at);
        self.travel = 0.0;
    }

    fn moved(&mut self, to: Vec2) {
        if let Some(press) = self.press {
            self.travel = self.travel.max(press.distance(to));
        }
    }

    /// Finish a press. Returns whether it was a click.
    fn released(&mut self) -> bool {
        self.press.take().is_some() && self.travel <= CLICK_SLOP
    }
}

/// Region under the cursor, if any.
fn region_under_cursor(
    session: &GlobeSession,
    window: &Window,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<RegionKey> {
    let cursor = window.cursor_position()?;
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    let radius = session
        .plan
        .tiles
        .iter()
        .map(|t| t.radius)
        .fold(session.config.radius, f64::max);
    let hit = intersect_sphere(
        ray.origin.as_dvec3(),
        ray.direction.as_vec3().as_dvec3(),
        DVec3::ZERO,
        radius,
    )?;
    let lonlat = to_spherical(hit);
    locate_tile(&session.plan.tiles, lonlat.lon, lonlat.lat).map(|t| t.key)
}

#[allow(clippy::needless_pass_by_value)]
fn update_hover(
    mut session: ResMut<GlobeSession>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<OrbitCamera>>,
) {
    let (camera, camera_transform) = *camera;
    let hover = region_under_cursor(&session, &window, camera, camera_transform);
    if session.state.set_hover(hover) {
        tracing::debug!("Hover: {hover:?}");
    }
}

/// The pointer is over the UI, so nothing on the globe is hovered.
fn clear_hover(mut session: ResMut<GlobeSession>) {
    session.state.set_hover(None);
}

#[allow(clippy::needless_pass_by_value)]
fn handle_clicks(
    mouse: Res<ButtonInput<MouseButton>>,
    mut pointer: ResMut<PointerState>,
    mut session: ResMut<GlobeSession>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut changes: MessageWriter<SelectionChanged>,
) {
    let cursor = window.cursor_position();
    if mouse.just_pressed(MouseButton::Left)
        && let Some(at) = cursor
    {
        pointer.pressed(at);
    }
    if let Some(at) = cursor {
        pointer.moved(at);
    }
    if !mouse.just_released(MouseButton::Left) || !pointer.released() {
        return;
    }

    let Some(region) = session.state.hover() else {
        return;
    };
    let session = &mut *session;
    if let Some(selection) = session.state.select(&session.dataset, region) {
        changes.write(SelectionChanged(Some(selection)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_within_slop() {
        let mut pointer = PointerState::default();
        pointer.pressed(Vec2::new(100.0, 100.0));
        pointer.moved(Vec2::new(103.0, 101.0));
        assert!(pointer.released());
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut pointer = PointerState::default();
        pointer.pressed(Vec2::new(100.0, 100.0));
        pointer.moved(Vec2::new(160.0, 100.0));
        // Returning to the start does not undo the drag.
        pointer.moved(Vec2::new(100.0, 100.0));
        assert!(!pointer.released());
    }

    #[test]
    fn test_release_without_press() {
        let mut pointer = PointerState::default();
        assert!(!pointer.released());
        pointer.pressed(Vec2::ZERO);
        assert!(pointer.released());
        assert!(!pointer.released());
    }
}
