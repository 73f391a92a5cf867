//! Interactive sector globe viewer using Bevy.
//!
//! Five economic sectors are drawn as longitude wedges on a globe. Zooming
//! in subdivides the sector facing the camera into industry bands and then
//! the facing industry into sub-items. Clicking a region selects it; the
//! selection can also be driven by polling an HTTP endpoint.

mod async_runtime;
mod camera;
mod globe;
mod labels;
mod launch_params;
mod picking;
mod shell;
mod sync;
mod tiles;
mod ui;

use std::process::ExitCode;

use async_runtime::AsyncRuntimePlugin;
use bevy::prelude::*;
use camera::{OrbitCamera, OrbitCameraPlugin};
use globe::{GlobePlugin, GlobeSource};
use labels::LabelsPlugin;
use launch_params::LaunchParams;
use picking::PickingPlugin;
use sector_globe::{Dataset, GlobeConfig};
use shell::ShellPlugin;
use sync::SelectionSyncPlugin;
use tiles::TilesPlugin;
use ui::PanelUiPlugin;

/// Nearest the camera may zoom, in globe radii.
const MIN_DISTANCE: f32 = 1.05;
/// Furthest the camera may zoom, in globe radii.
const MAX_DISTANCE: f32 = 6.0;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            OrbitCameraPlugin,
            GlobePlugin,
            TilesPlugin,
            LabelsPlugin,
            PickingPlugin,
            SelectionSyncPlugin,
            ShellPlugin,
            PanelUiPlugin,
        ))
        .add_systems(Startup, setup_scene);
    }
}

/// Set up the camera, lights and the initial globe session.
#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn setup_scene(mut commands: Commands, params: Res<LaunchParams>, source: Res<GlobeSource>) {
    let radius = source.config.radius as f32;
    let start = Vec3::new(0.0, 0.9, 2.6).normalize() * params.distance as f32 * radius;

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: bevy::camera::ClearColorConfig::Custom(Color::srgb(0.96, 0.97, 0.98)),
            ..default()
        },
        Transform::from_translation(start).looking_at(Vec3::ZERO, Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            ..Default::default()
        }),
        OrbitCamera::from_position(start, MIN_DISTANCE * radius, MAX_DISTANCE * radius),
    ));

    // Key light plus a dimmer fill from the opposite side.
    commands.spawn((
        DirectionalLight {
            illuminance: 9_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            ..default()
        },
        Transform::from_xyz(-4.0, -2.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(source.open());

    tracing::info!("Scene setup complete - drag to orbit, scroll to zoom, click to select");
}

fn main() -> ExitCode {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let dataset = match &params.dataset {
        Some(path) => match Dataset::load(path) {
            Ok(dataset) => {
                tracing::info!("Loaded dataset from {}", path.display());
                dataset
            }
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Dataset::builtin(),
    };
    let source = GlobeSource {
        dataset,
        config: GlobeConfig::default(),
    };

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "sector-globe".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }))
    .add_plugins(AsyncRuntimePlugin)
    .insert_resource(params)
    .insert_resource(source)
    .add_plugins(AppPlugin)
    .run();

    ExitCode::SUCCESS
}
