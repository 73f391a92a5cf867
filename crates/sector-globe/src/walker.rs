//! Per-frame tile and label planning.
//!
//! Walks the dataset for the current level of detail and active region and
//! emits the tiles to draw and the labels to place. At every level the tiles
//! partition the sphere exactly: each split divides its parent's angular
//! range with shared edge values, so neighbouring tiles meet without gaps or
//! overlap.
//!
//! Only the active region is refined. Other sectors keep their industry
//! bands for coverage but are drawn unlabeled.

use glam::DVec3;

use crate::coords::{LonLat, lerp, to_cartesian};
use crate::dataset::{Dataset, Rgb, SUB_ITEM_COUNT, Sector, sub_item_name};
use crate::lod::{LodLevel, LodThresholds};
use crate::patch::{PatchParams, segments_for_span};
use crate::raycast::SECTOR_SPAN_DEGREES;
use crate::state::ActiveRegion;

/// Globe radius used when none is configured.
pub const DEFAULT_RADIUS: f64 = 3.0;

/// Globe layout and presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConfig {
    /// Radius of the base shell.
    pub radius: f64,
    /// Height of sector tiles above the shell.
    pub sector_lift: f64,
    /// Height of industry tiles above the shell.
    pub industry_lift: f64,
    /// Height of sub-item tiles above the shell.
    pub sub_item_lift: f64,
    /// Extra height of a label above its tile.
    pub label_lift: f64,
    /// Extra height of a hovered tile.
    pub hover_lift: f64,
    /// Minimum cosine between label and camera directions for a label to show.
    pub label_threshold: f64,
    /// How far industry colors blend toward white.
    pub industry_tint: f32,
    /// How far sub-item colors blend toward white.
    pub sub_item_tint: f32,
    /// Level of detail switching distances.
    pub lod: LodThresholds,
}

impl GlobeConfig {
    /// Default settings for a globe of the given radius.
    #[must_use]
    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius,
            lod: LodThresholds::for_radius(radius),
            ..Self::default()
        }
    }

    /// Height above the shell at which tiles of a level float.
    #[must_use]
    pub fn lift(&self, level: LodLevel) -> f64 {
        match level {
            LodLevel::Sectors => self.sector_lift,
            LodLevel::Industries => self.industry_lift,
            LodLevel::SubItems => self.sub_item_lift,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            sector_lift: 0.01,
            industry_lift: 0.08,
            sub_item_lift: 0.13,
            label_lift: 0.03,
            hover_lift: 0.03,
            label_threshold: crate::labels::DEFAULT_FRONT_THRESHOLD,
            industry_tint: 0.3,
            sub_item_tint: 0.55,
            lod: LodThresholds::for_radius(DEFAULT_RADIUS),
        }
    }
}

/// Identifies the data region a tile or label represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionKey {
    Sector {
        sector: usize,
    },
    Industry {
        sector: usize,
        industry: usize,
    },
    SubItem {
        sector: usize,
        industry: usize,
        item: usize,
    },
}

impl RegionKey {
    #[must_use]
    pub fn sector(self) -> usize {
        match self {
            RegionKey::Sector { sector }
            | RegionKey::Industry { sector, .. }
            | RegionKey::SubItem { sector, .. } => sector,
        }
    }

    /// The level of detail this kind of region belongs to.
    #[must_use]
    pub fn level(self) -> LodLevel {
        match self {
            RegionKey::Sector { .. } => LodLevel::Sectors,
            RegionKey::Industry { .. } => LodLevel::Industries,
            RegionKey::SubItem { .. } => LodLevel::SubItems,
        }
    }
}

/// A lon/lat rectangle to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub key: RegionKey,
    /// Southern edge.
    pub lat0: f64,
    /// Northern edge.
    pub lat1: f64,
    /// Western edge.
    pub lon0: f64,
    /// Eastern edge.
    pub lon1: f64,
    pub radius: f64,
    pub level: LodLevel,
    pub segments: u32,
    pub color: Rgb,
}

impl Tile {
    /// Tessellation parameters for this tile at a given radius.
    #[must_use]
    pub fn patch_params(&self, radius: f64) -> PatchParams {
        PatchParams {
            lat0: self.lat0,
            lat1: self.lat1,
            lon0: self.lon0,
            lon1: self.lon1,
            radius,
            segments: self.segments,
        }
    }

    /// Center of the tile in lon/lat.
    #[must_use]
    pub fn center(&self) -> LonLat {
        LonLat::new((self.lon0 + self.lon1) * 0.5, (self.lat0 + self.lat1) * 0.5)
    }

    /// Whether the tile covers a point. Edges are half-open toward the east
    /// and north, except at the north pole.
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let in_lon = lon >= self.lon0 && lon < self.lon1;
        let in_lat = lat >= self.lat0 && (lat < self.lat1 || (self.lat1 >= 90.0 && lat <= 90.0));
        in_lon && in_lat
    }
}

/// A label to place this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub key: RegionKey,
    pub text: String,
    /// Label anchor in world space.
    pub position: DVec3,
    pub level: LodLevel,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramePlan {
    pub level: LodLevel,
    pub active: Option<ActiveRegion>,
    pub tiles: Vec<Tile>,
    pub labels: Vec<LabelSpec>,
}

/// Longitude range `[west, east)` of a sector.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sector_longitudes(sector: usize) -> (f64, f64) {
    let west = -180.0 + SECTOR_SPAN_DEGREES * sector as f64;
    (west, west + SECTOR_SPAN_DEGREES)
}

/// Latitude range `(south, north)` of band `index` out of `count`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn industry_latitudes(index: usize, count: usize) -> (f64, f64) {
    let n = count.max(1) as f64;
    let north = lerp(90.0, -90.0, index as f64 / n);
    let south = lerp(90.0, -90.0, (index + 1) as f64 / n);
    (south, north)
}

/// Plan the tiles and labels for a level and active region.
#[must_use]
pub fn walk(dataset: &Dataset, level: LodLevel, active: Option<ActiveRegion>, config: &GlobeConfig) -> FramePlan {
    let mut walker = Walker {
        config,
        tiles: Vec::new(),
        labels: Vec::new(),
    };

    for (index, sector) in dataset.sectors().iter().enumerate() {
        if level == LodLevel::Sectors {
            walker.sector(index, sector, LodLevel::Sectors, true);
            continue;
        }

        let is_active = active.is_some_and(|a| a.sector_index == index);
        let count = sector.industries().len();
        if count == 0 {
            // Nothing to split into; keep the sector whole so the sphere stays covered.
            walker.sector(index, sector, LodLevel::Industries, false);
            continue;
        }

        let expanded = active
            .filter(|_| is_active && level == LodLevel::SubItems)
            .and_then(|a| a.industry_index);
        for k in 0..count {
            if expanded == Some(k) {
                walker.sub_items(index, sector, k);
            } else {
                walker.industry(index, sector, k, is_active);
            }
        }
    }

    FramePlan {
        level,
        active,
        tiles: walker.tiles,
        labels: walker.labels,
    }
}

struct Walker<'a> {
    config: &'a GlobeConfig,
    tiles: Vec<Tile>,
    labels: Vec<LabelSpec>,
}

impl Walker<'_> {
    /// Emit a whole-sector tile, floated at the height of `layer`.
    fn sector(&mut self, index: usize, sector: &Sector, layer: LodLevel, labeled: bool) {
        let (lon0, lon1) = sector_longitudes(index);
        let key = RegionKey::Sector { sector: index };
        self.push(key, layer, (-90.0, 90.0), (lon0, lon1), sector.color);
        if labeled {
            self.label(key, layer, &sector.name);
        }
    }

    fn industry(&mut self, index: usize, sector: &Sector, k: usize, labeled: bool) {
        let (lon0, lon1) = sector_longitudes(index);
        let lats = industry_latitudes(k, sector.industries().len());
        let key = RegionKey::Industry {
            sector: index,
            industry: k,
        };
        let color = sector.color.lerp(Rgb::WHITE, self.config.industry_tint);
        self.push(key, LodLevel::Industries, lats, (lon0, lon1), color);
        if labeled && let Some(industry) = sector.industry(k) {
            self.label(key, LodLevel::Industries, &industry.name);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn sub_items(&mut self, index: usize, sector: &Sector, k: usize) {
        let (lon0, lon1) = sector_longitudes(index);
        let lats = industry_latitudes(k, sector.industries().len());
        let color = sector.color.lerp(Rgb::WHITE, self.config.sub_item_tint);
        let Some(industry) = sector.industry(k) else {
            return;
        };
        let parts = SUB_ITEM_COUNT as f64;
        for item in 0..SUB_ITEM_COUNT {
            let west = lerp(lon0, lon1, item as f64 / parts);
            let east = lerp(lon0, lon1, (item + 1) as f64 / parts);
            let key = RegionKey::SubItem {
                sector: index,
                industry: k,
                item,
            };
            self.push(key, LodLevel::SubItems, lats, (west, east), color);
            self.label(key, LodLevel::SubItems, &sub_item_name(&industry.name, item));
        }
    }

    fn push(&mut self, key: RegionKey, layer: LodLevel, lats: (f64, f64), lons: (f64, f64), color: Rgb) {
        let (lat0, lat1) = lats;
        let (lon0, lon1) = lons;
        self.tiles.push(Tile {
            key,
            lat0,
            lat1,
            lon0,
            lon1,
            radius: self.config.radius + self.config.lift(layer),
            level: layer,
            segments: segments_for_span(lat1 - lat0, lon1 - lon0),
            color,
        });
    }

    /// Label the most recently pushed tile.
    fn label(&mut self, key: RegionKey, level: LodLevel, text: &str) {
        let Some(tile) = self.tiles.last() else {
            return;
        };
        let center = tile.center();
        let position = to_cartesian(center.lon, center.lat, tile.radius, self.config.label_lift);
        self.labels.push(LabelSpec {
            key,
            text: text.to_owned(),
            position,
            level,
        });
    }
}
