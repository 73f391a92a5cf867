//! Tile entities.
//!
//! Keeps one mesh entity per tile in the frame plan. Meshes and materials
//! come from keyed caches, so a tile that reappears reuses the handles built
//! the first time it was seen.

use std::collections::{HashMap, HashSet};

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use sector_globe::{KeyedCache, PatchKey, RegionKey, Rgb, TilePatch, build_tile_patch};

use crate::globe::{GlobeEntity, GlobeSession, GlobeSet};

/// Plugin that turns frame plan tiles into mesh entities.
pub struct TilesPlugin;

impl Plugin for TilesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileAssets>()
            .init_resource::<TileEntities>()
            .add_systems(Update, sync_tiles.in_set(GlobeSet::Render))
            .add_systems(
                PostUpdate,
                clear_tile_entities.run_if(resource_removed::<GlobeSession>),
            );
    }
}

/// How a tile is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileStyle {
    Normal,
    Selected,
    Hovered,
}

/// Cached tile meshes and materials.
#[derive(Resource, Default)]
pub struct TileAssets {
    pub meshes: KeyedCache<PatchKey, Handle<Mesh>>,
    pub materials: KeyedCache<(Rgb, TileStyle), Handle<StandardMaterial>>,
}

/// Spawned tile entities by region.
#[derive(Resource, Default)]
pub struct TileEntities {
    entities: HashMap<RegionKey, Entity>,
}

/// Marks a tile entity.
#[derive(Component, Debug)]
pub struct GlobeTile {
    pub key: RegionKey,
}

/// Convert a tessellated patch to a Bevy mesh.
#[must_use]
pub fn patch_to_mesh(patch: TilePatch) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, patch.positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, patch.normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, patch.uvs);
    mesh.insert_indices(Indices::U32(patch.indices));
    mesh
}

/// Material for a tile color and style.
#[must_use]
pub fn tile_material(color: Rgb, style: TileStyle) -> StandardMaterial {
    let color = match style {
        TileStyle::Normal => color,
        TileStyle::Selected => color.lerp(Rgb::new(0x9c, 0xd3, 0xff), 0.5),
        TileStyle::Hovered => color.lerp(Rgb::WHITE, 0.5),
    };
    let emissive = match style {
        TileStyle::Normal => LinearRgba::BLACK,
        TileStyle::Selected => LinearRgba::rgb(0.05, 0.12, 0.2),
        TileStyle::Hovered => LinearRgba::rgb(0.08, 0.08, 0.08),
    };
    StandardMaterial {
        base_color: Color::srgb_u8(color.r, color.g, color.b),
        emissive,
        perceptual_roughness: 0.8,
        metallic: 0.0,
        ..default()
    }
}

/// Spawn, update and despawn tile entities to match the frame plan.
#[allow(clippy::needless_pass_by_value)]
fn sync_tiles(
    mut commands: Commands,
    session: Res<GlobeSession>,
    mut assets: ResMut<TileAssets>,
    mut tile_entities: ResMut<TileEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut tiles: Query<(&mut Mesh3d, &mut MeshMaterial3d<StandardMaterial>), With<GlobeTile>>,
) {
    let hover = session.state.hover();
    let selected = session.state.selected_region(&session.dataset);

    let planned: HashSet<RegionKey> = session.plan.tiles.iter().map(|t| t.key).collect();
    tile_entities.entities.retain(|key, entity| {
        let keep = planned.contains(key);
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });

    for tile in &session.plan.tiles {
        let style = if hover == Some(tile.key) {
            TileStyle::Hovered
        } else if selected == Some(tile.key) {
            TileStyle::Selected
        } else {
            TileStyle::Normal
        };
        let radius = if style == TileStyle::Hovered {
            tile.radius + session.config.hover_lift
        } else {
            tile.radius
        };

        let params = tile.patch_params(radius);
        let mesh = assets
            .meshes
            .get_or_insert_with(params.key(), || meshes.add(patch_to_mesh(build_tile_patch(&params))))
            .clone();
        let material = assets
            .materials
            .get_or_insert_with((tile.color, style), || materials.add(tile_material(tile.color, style)))
            .clone();

        if let Some(&entity) = tile_entities.entities.get(&tile.key) {
            if let Ok((mut mesh3d, mut material3d)) = tiles.get_mut(entity) {
                if mesh3d.0 != mesh {
                    mesh3d.0 = mesh;
                }
                if material3d.0 != material {
                    material3d.0 = material;
                }
            }
            continue;
        }

        let entity = commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                GlobeTile { key: tile.key },
                GlobeEntity,
            ))
            .id();
        tile_entities.entities.insert(tile.key, entity);
    }
}

/// Forget tile entities once the session's teardown has despawned them.
fn clear_tile_entities(mut tile_entities: ResMut<TileEntities>) {
    tile_entities.entities.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::mesh::VertexAttributeValues;
    use sector_globe::PatchParams;

    #[test]
    fn test_patch_to_mesh() {
        let patch = build_tile_patch(&PatchParams {
            lat0: 0.0,
            lat1: 36.0,
            lon0: 0.0,
            lon1: 72.0,
            radius: 3.0,
            segments: 4,
        });
        let mesh = patch_to_mesh(patch);
        assert_eq!(mesh.count_vertices(), 25);
        assert_eq!(mesh.indices().map(Indices::len), Some(96));
        assert!(matches!(
            mesh.attribute(Mesh::ATTRIBUTE_NORMAL),
            Some(VertexAttributeValues::Float32x3(normals)) if normals.len() == 25
        ));
    }

    #[test]
    fn test_styles_differ() {
        let color = Rgb::new(0xdb, 0xea, 0xf0);
        let normal = tile_material(color, TileStyle::Normal);
        let hovered = tile_material(color, TileStyle::Hovered);
        let selected = tile_material(color, TileStyle::Selected);
        assert_ne!(normal.base_color, hovered.base_color);
        assert_ne!(normal.base_color, selected.base_color);
        assert_eq!(normal.base_color, Color::srgb_u8(0xdb, 0xea, 0xf0));
    }
}
