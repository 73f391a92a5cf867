//! Selection records emitted when a tile is picked.

use serde::{Deserialize, Serialize};

use crate::coords::normalize_longitude;
use crate::dataset::{Dataset, SUB_ITEM_COUNT, sub_item_name};
use crate::walker::{RegionKey, Tile};

/// The region the user picked.
///
/// Serializes with a `type` tag and camelCase fields, the shape host
/// applications consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selection {
    Sector {
        key: String,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Industry {
        parent_key: String,
        parent_name: String,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    SubItem {
        parent_sector: String,
        parent_industry: String,
        name: String,
    },
}

impl Selection {
    /// Display name of the selected region.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Selection::Sector { name, .. }
            | Selection::Industry { name, .. }
            | Selection::SubItem { name, .. } => name,
        }
    }

    /// Find the region this selection refers to.
    #[must_use]
    pub fn region(&self, dataset: &Dataset) -> Option<RegionKey> {
        match self {
            Selection::Sector { key, .. } => dataset
                .find_sector(key)
                .map(|sector| RegionKey::Sector { sector }),
            Selection::Industry {
                parent_key, name, ..
            } => {
                let sector = dataset.find_sector(parent_key)?;
                let industry = dataset
                    .sector(sector)?
                    .industries()
                    .iter()
                    .position(|i| &i.name == name)?;
                Some(RegionKey::Industry { sector, industry })
            }
            Selection::SubItem {
                parent_sector,
                parent_industry,
                name,
            } => {
                let sector = dataset.find_sector(parent_sector)?;
                let industry = dataset
                    .sector(sector)?
                    .industries()
                    .iter()
                    .position(|i| &i.name == parent_industry)?;
                let item = (0..SUB_ITEM_COUNT).find(|&m| sub_item_name(parent_industry, m) == *name)?;
                Some(RegionKey::SubItem {
                    sector,
                    industry,
                    item,
                })
            }
        }
    }
}

/// Payload served by an external selection source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalSelection {
    /// Sector key or display name, or `None` for no selection.
    #[serde(default)]
    pub selection: Option<String>,
}

/// Build the selection record for a region.
///
/// Returns `None` if the region does not exist in the dataset.
#[must_use]
pub fn resolve_selection(dataset: &Dataset, region: RegionKey) -> Option<Selection> {
    let sector = dataset.sector(region.sector())?;
    let selection = match region {
        RegionKey::Sector { .. } => Selection::Sector {
            key: sector.key.clone(),
            name: sector.name.clone(),
        },
        RegionKey::Industry { industry, .. } => Selection::Industry {
            parent_key: sector.key.clone(),
            parent_name: sector.name.clone(),
            name: sector.industry(industry)?.name.clone(),
        },
        RegionKey::SubItem { industry, item, .. } => {
            if item >= SUB_ITEM_COUNT {
                return None;
            }
            let industry = sector.industry(industry)?;
            Selection::SubItem {
                parent_sector: sector.name.clone(),
                parent_industry: industry.name.clone(),
                name: sub_item_name(&industry.name, item),
            }
        }
    };
    Some(selection)
}

/// Find the tile under a picked lon/lat.
#[must_use]
pub fn locate_tile(tiles: &[Tile], lon: f64, lat: f64) -> Option<&Tile> {
    let lon = normalize_longitude(lon);
    tiles.iter().find(|t| t.contains(lon, lat))
}
