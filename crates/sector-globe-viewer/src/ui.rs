//! Side panel and label text.
//!
//! The panel shows the selection, level of detail, active region and a few
//! performance numbers. Label text for the markers placed by the labels
//! plugin is painted on the egui background layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use sector_globe::{Dataset, LodLevel, RegionKey, Selection, resolve_selection};

use crate::camera::OrbitCamera;
use crate::globe::{GlobeSession, GlobeSource, SelectionChanged};
use crate::labels::VisibleLabels;
use crate::launch_params::LaunchParams;
use crate::tiles::TileAssets;

/// Fonts tried, in order, when no font is given on the command line.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\msjh.ttc",
];

const LABEL_FONT: &str = "label-font";

/// Plugin for the side panel and label text.
pub struct PanelUiPlugin;

impl Plugin for PanelUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(
                EguiPrimaryContextPass,
                (setup_fonts, draw_labels, panel_ui).chain(),
            );
    }
}

/// Text size for a label's level.
fn label_size(level: LodLevel) -> f32 {
    match level {
        LodLevel::Sectors => 20.0,
        LodLevel::Industries => 15.0,
        LodLevel::SubItems => 12.0,
    }
}

/// Display name of a region.
fn region_name(dataset: &Dataset, region: RegionKey) -> Option<String> {
    resolve_selection(dataset, region).map(|s| s.name().to_owned())
}

/// Font file to load, if any.
fn font_path(params: &LaunchParams) -> Option<PathBuf> {
    params.font.clone().or_else(|| {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    })
}

fn load_font(path: &Path) -> Result<egui::FontDefinitions, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(LABEL_FONT.to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(LABEL_FONT.to_owned());
    }
    Ok(fonts)
}

/// Install a font with CJK glyphs once, as a fallback after egui's own.
#[allow(clippy::needless_pass_by_value)]
fn setup_fonts(mut contexts: EguiContexts, params: Res<LaunchParams>, mut done: Local<bool>) -> Result {
    if *done {
        return Ok(());
    }
    let ctx = contexts.ctx_mut()?;
    *done = true;

    let Some(path) = font_path(&params) else {
        tracing::warn!("No font with CJK glyphs found, labels may not render; pass --font");
        return Ok(());
    };
    match load_font(&path) {
        Ok(fonts) => {
            ctx.set_fonts(fonts);
            tracing::info!("Loaded label font from {}", path.display());
        }
        Err(e) => tracing::warn!("{e}"),
    }
    Ok(())
}

/// Paint visible label text at each marker's screen position.
#[allow(clippy::needless_pass_by_value)]
fn draw_labels(
    mut contexts: EguiContexts,
    session: Option<Res<GlobeSession>>,
    labels: Res<VisibleLabels>,
    camera: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    if session.is_none() {
        return Ok(());
    }
    let Ok((camera, camera_transform)) = camera.single() else {
        return Ok(());
    };

    let painter = ctx.layer_painter(egui::LayerId::background());
    let outline = egui::Color32::from_rgba_unmultiplied(255, 255, 255, 200);
    let fill = egui::Color32::from_rgb(0x11, 0x11, 0x11);
    for label in &labels.labels {
        let Ok(screen) = camera.world_to_viewport(camera_transform, label.anchor) else {
            continue;
        };
        let pos = egui::pos2(screen.x, screen.y - 4.0);
        let font = egui::FontId::proportional(label_size(label.level));
        for offset in [
            egui::vec2(-1.0, 0.0),
            egui::vec2(1.0, 0.0),
            egui::vec2(0.0, -1.0),
            egui::vec2(0.0, 1.0),
        ] {
            painter.text(
                pos + offset,
                egui::Align2::CENTER_BOTTOM,
                &label.text,
                font.clone(),
                outline,
            );
        }
        painter.text(pos, egui::Align2::CENTER_BOTTOM, &label.text, font, fill);
    }
    Ok(())
}

fn selection_details(ui: &mut egui::Ui, selection: &Selection) {
    match selection {
        Selection::Sector { key, name } => {
            ui.label(format!("Sector: {name}"));
            ui.label(format!("Key: {key}"));
        }
        Selection::Industry {
            parent_key,
            parent_name,
            name,
        } => {
            ui.label(format!("Industry: {name}"));
            ui.label(format!("Sector: {parent_name} ({parent_key})"));
        }
        Selection::SubItem {
            parent_sector,
            parent_industry,
            name,
        } => {
            ui.label(format!("Item: {name}"));
            ui.label(format!("Industry: {parent_industry}"));
            ui.label(format!("Sector: {parent_sector}"));
        }
    }
}

/// Render the side panel.
#[allow(clippy::needless_pass_by_value)]
fn panel_ui(
    mut commands: Commands,
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    source: Res<GlobeSource>,
    assets: Res<TileAssets>,
    mut session: Option<ResMut<GlobeSession>>,
    mut changes: MessageWriter<SelectionChanged>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    if session.as_ref().is_some_and(|s| s.state.hover().is_some()) {
        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    egui::SidePanel::right("globe_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Sector Globe");
            ui.separator();

            let Some(session) = session.as_mut() else {
                ui.label("Globe closed.");
                if ui.button("Open globe").clicked() {
                    commands.insert_resource(source.open());
                    tracing::info!("Globe opened");
                }
                return;
            };

            ui.label("Selection");
            match session.state.selection().cloned() {
                Some(selection) => {
                    selection_details(ui, &selection);
                    if ui.button("Clear").clicked() && session.state.clear_selection() {
                        changes.write(SelectionChanged(None));
                    }
                }
                None => {
                    ui.label("Nothing selected. Click a region.");
                }
            }
            ui.separator();

            let dataset = &session.dataset;
            ui.label(format!("Detail: {}", session.state.level()));
            if let Some(active) = session.state.active() {
                if let Some(sector) = dataset.sector(active.sector_index) {
                    ui.label(format!("Facing: {}", sector.name));
                }
                if let Some(industry) = active
                    .industry_index
                    .and_then(|i| dataset.sector(active.sector_index)?.industry(i))
                {
                    ui.label(format!("Industry: {}", industry.name));
                }
            }
            if let Some(name) = session
                .state
                .hover()
                .and_then(|region| region_name(dataset, region))
            {
                ui.label(format!("Hover: {name}"));
            }
            ui.label(format!(
                "Distance: {:.2} R",
                session.distance / session.config.radius
            ));
            ui.separator();

            ui.label(format!("FPS: {fps:.0}"));
            ui.label(format!(
                "Tiles: {}, labels: {}",
                session.plan.tiles.len(),
                session.plan.labels.len()
            ));
            ui.label(format!(
                "Mesh cache: {} meshes, {} hits, {} misses",
                assets.meshes.len(),
                assets.meshes.hits(),
                assets.meshes.misses()
            ));
            ui.separator();

            if ui.button("Close globe").clicked() {
                commands.remove_resource::<GlobeSession>();
            }
            ui.separator();

            ui.label("Controls:");
            ui.label("  Drag - Orbit");
            ui.label("  Scroll - Zoom");
            ui.label("  Click - Select");
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_size_shrinks_with_detail() {
        assert!(label_size(LodLevel::Sectors) > label_size(LodLevel::Industries));
        assert!(label_size(LodLevel::Industries) > label_size(LodLevel::SubItems));
    }

    #[test]
    fn test_region_name() {
        let dataset = Dataset::builtin();
        assert_eq!(
            region_name(&dataset, RegionKey::Sector { sector: 0 }).as_deref(),
            Some("農業")
        );
        assert_eq!(
            region_name(&dataset, RegionKey::Industry { sector: 0, industry: 2 }).as_deref(),
            Some("漁業與水產")
        );
        assert_eq!(region_name(&dataset, RegionKey::Sector { sector: 9 }), None);
    }

    #[test]
    fn test_explicit_font_wins() {
        let params = LaunchParams {
            font: Some(PathBuf::from("custom.ttf")),
            ..LaunchParams::default()
        };
        assert_eq!(font_path(&params), Some(PathBuf::from("custom.ttf")));
    }

    #[test]
    fn test_missing_font_file() {
        assert!(load_font(Path::new("/nonexistent/font.ttf")).is_err());
    }
}
