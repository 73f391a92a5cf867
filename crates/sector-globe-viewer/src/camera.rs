//! Orbit camera around the globe.
//!
//! Dragging rotates the camera around the globe center and the scroll wheel
//! zooms. Inputs move a target pose; the camera eases toward it every frame.
//! There is no panning: the camera always looks at the center.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::input::egui_wants_any_pointer_input;
use sector_globe::CameraState;

/// Pitch limit, short of the poles so the up vector stays defined.
const MAX_PITCH: f32 = 1.5;

/// Plugin for orbit camera controls.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (orbit_input.run_if(not(egui_wants_any_pointer_input)), apply_orbit)
                .chain()
                .in_set(OrbitCameraSet),
        );
    }
}

/// Systems that move the camera. Globe systems run after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrbitCameraSet;

/// Orbit controller state.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    /// Rotation around the Y axis, radians. Zero looks down -Z.
    pub yaw: f32,
    /// Elevation above the equator, radians.
    pub pitch: f32,
    pub distance: f32,
    pub target_yaw: f32,
    pub target_pitch: f32,
    pub target_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Zoom factor per scroll line.
    pub zoom_speed: f32,
    /// Fraction of the remaining distance to the target covered per 60 Hz frame.
    pub damping: f32,
}

impl OrbitCamera {
    /// An orbit camera at `position`, zoom limited to `[min, max]`.
    #[must_use]
    pub fn from_position(position: Vec3, min_distance: f32, max_distance: f32) -> Self {
        let distance = position.length().clamp(min_distance, max_distance);
        let yaw = position.x.atan2(position.z);
        let pitch = (position.y / position.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-MAX_PITCH, MAX_PITCH);
        Self {
            yaw,
            pitch,
            distance,
            target_yaw: yaw,
            target_pitch: pitch,
            target_distance: distance,
            min_distance,
            max_distance,
            rotate_speed: 0.004,
            zoom_speed: 0.8,
            damping: 0.08,
        }
    }

    /// Camera position for the current pose.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * self.distance
    }

    /// Rotate the target pose by a drag of `delta` pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.target_yaw -= delta.x * self.rotate_speed;
        self.target_pitch = (self.target_pitch + delta.y * self.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Zoom the target pose by `lines` scroll lines. Positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - 0.1 * self.zoom_speed).powf(lines);
        self.target_distance = (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Ease the pose toward the target over `dt` seconds.
    pub fn ease(&mut self, dt: f32) {
        let t = 1.0 - (1.0 - self.damping).powf(dt * 60.0);
        self.yaw += (self.target_yaw - self.yaw) * t;
        self.pitch += (self.target_pitch - self.pitch) * t;
        self.distance += (self.target_distance - self.distance) * t;
    }
}

/// Read the camera pose for globe evaluation.
#[must_use]
pub fn camera_state(transform: &Transform) -> CameraState {
    CameraState::new(transform.translation.as_dvec3(), transform.forward().as_vec3().as_dvec3())
}

/// Accumulate drag and scroll input into the target pose.
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut scroll: MessageReader<MouseWheel>,
    mut query: Query<&mut OrbitCamera>,
) {
    let dragging = mouse.pressed(MouseButton::Left) || mouse.pressed(MouseButton::Right);
    let mut delta = Vec2::ZERO;
    for event in motion.read() {
        delta += event.delta;
    }
    let mut lines = 0.0;
    for event in scroll.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        lines += match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
    }

    for mut orbit in &mut query {
        if dragging && delta != Vec2::ZERO {
            orbit.drag(delta);
        }
        if lines != 0.0 {
            orbit.zoom(lines);
        }
    }
}

/// Move the camera transform toward its target pose.
fn apply_orbit(time: Res<Time>, mut query: Query<(&mut OrbitCamera, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut orbit, mut transform) in &mut query {
        orbit.ease(dt);
        *transform = Transform::from_translation(orbit.position()).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_position_round_trip() {
        let start = Vec3::new(0.0, 2.7, 7.8);
        let orbit = OrbitCamera::from_position(start, 3.15, 18.0);
        assert!((orbit.position() - start).length() < 1e-4);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut orbit = OrbitCamera::from_position(Vec3::new(0.0, 0.0, 9.0), 3.15, 18.0);
        orbit.zoom(100.0);
        assert!((orbit.target_distance - 3.15).abs() < 1e-6);
        orbit.zoom(-1000.0);
        assert!((orbit.target_distance - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut orbit = OrbitCamera::from_position(Vec3::new(0.0, 0.0, 9.0), 3.15, 18.0);
        orbit.drag(Vec2::new(0.0, 100_000.0));
        assert!((orbit.target_pitch - MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn test_ease_converges() {
        let mut orbit = OrbitCamera::from_position(Vec3::new(0.0, 0.0, 9.0), 3.15, 18.0);
        orbit.zoom(3.0);
        let target = orbit.target_distance;
        let mut last_gap = (orbit.distance - target).abs();
        for _ in 0..300 {
            orbit.ease(1.0 / 60.0);
            let gap = (orbit.distance - target).abs();
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 1e-3);
    }

    #[test]
    fn test_camera_state_looks_at_center() {
        let transform = Transform::from_xyz(0.0, 0.0, 9.0).looking_at(Vec3::ZERO, Vec3::Y);
        let state = camera_state(&transform);
        assert!((state.distance() - 9.0).abs() < 1e-6);
        assert!((state.forward.normalize() - glam::DVec3::NEG_Z).length() < 1e-6);
    }
}
