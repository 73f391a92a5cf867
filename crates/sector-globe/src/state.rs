//! Globe state carried between frames.
//!
//! Everything that persists across frames lives in [`GlobeState`] and
//! changes only through its methods: the per-frame [`GlobeState::tick`] and
//! the input reducers for hover, click and external selection.

use crate::dataset::Dataset;
use crate::lod::{LodController, LodLevel};
use crate::raycast::{CameraState, locate_active_region};
use crate::selection::{Selection, resolve_selection};
use crate::walker::{FramePlan, GlobeConfig, RegionKey, walk};

/// The region under the camera's forward ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveRegion {
    pub sector_index: usize,
    /// Industry band under the ray, if the sector has any industries.
    pub industry_index: Option<usize>,
}

/// Frame-to-frame globe state.
#[derive(Debug, Clone)]
pub struct GlobeState {
    active: Option<ActiveRegion>,
    lod: LodController,
    hover: Option<RegionKey>,
    selection: Option<Selection>,
    /// Last value seen from the external selection source.
    last_external: Option<String>,
}

impl GlobeState {
    #[must_use]
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            active: None,
            lod: LodController::new(config.lod),
            hover: None,
            selection: None,
            last_external: None,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<ActiveRegion> {
        self.active
    }

    #[must_use]
    pub fn level(&self) -> LodLevel {
        self.lod.level()
    }

    #[must_use]
    pub fn hover(&self) -> Option<RegionKey> {
        self.hover
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Advance one frame and plan what to draw.
    ///
    /// Updates the level of detail from the camera distance and the active
    /// region from the camera's forward ray. A ray that misses the globe
    /// leaves the previous active region in place.
    pub fn tick(&mut self, camera: &CameraState, dataset: &Dataset, config: &GlobeConfig) -> FramePlan {
        let level = self.lod.evaluate(camera);
        if let Some(region) = locate_active_region(camera, config.radius, dataset)
            && self.active != Some(region)
        {
            tracing::debug!(
                "Active region: sector {} industry {:?}",
                region.sector_index,
                region.industry_index
            );
            self.active = Some(region);
        }
        walk(dataset, level, self.active, config)
    }

    /// Set the hovered region. Returns whether it changed.
    pub fn set_hover(&mut self, hover: Option<RegionKey>) -> bool {
        if self.hover == hover {
            return false;
        }
        self.hover = hover;
        true
    }

    /// Select a picked region and return the new selection.
    pub fn select(&mut self, dataset: &Dataset, region: RegionKey) -> Option<Selection> {
        let selection = resolve_selection(dataset, region)?;
        tracing::debug!("Selected {:?}", region);
        self.selection = Some(selection.clone());
        Some(selection)
    }

    /// Clear the current selection. Returns whether there was one.
    pub fn clear_selection(&mut self) -> bool {
        self.selection.take().is_some()
    }

    /// Apply a value read from the external selection source.
    ///
    /// Only a name different from the last one observed has any effect, so
    /// polling the same value repeatedly selects once. A known sector key or
    /// name selects that sector as if it had been clicked; unknown names
    /// leave the selection alone. `None` is not an observation at all.
    pub fn apply_external_selection(&mut self, dataset: &Dataset, value: Option<&str>) -> Option<Selection> {
        let name = value?;
        if self.last_external.as_deref() == Some(name) {
            return None;
        }
        self.last_external = Some(name.to_owned());

        let Some(sector) = dataset.find_sector(name) else {
            tracing::warn!("Ignoring external selection of unknown sector '{name}'");
            return None;
        };
        tracing::info!("External selection: {name}");
        self.select(dataset, RegionKey::Sector { sector })
    }

    /// Region of the current selection, if it is still in the dataset.
    #[must_use]
    pub fn selected_region(&self, dataset: &Dataset) -> Option<RegionKey> {
        self.selection.as_ref()?.region(dataset)
    }
}

impl Default for GlobeState {
    fn default() -> Self {
        Self::new(&GlobeConfig::default())
    }
}
