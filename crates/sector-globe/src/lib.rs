//! Spherical level-of-detail tiling and region selection for a sector globe.
//!
//! The globe is split into five sectors by longitude, each sector into
//! industry bands by latitude, and the industry under the camera into three
//! sub-items by longitude. This crate decides, once per frame, which of those
//! tiles to draw, which labels to show and which region the viewer is looking
//! at. It has no dependency on a rendering framework; the viewer crate turns
//! its output into meshes and entities.
//!
//! # Design principles
//!
//! - **Pure per-frame evaluation**: every frame is `CameraState -> FramePlan`,
//!   with the only carried state held in [`GlobeState`]
//! - **Exact coverage**: at every level the emitted tiles partition the sphere
//! - **Cache by key**: tile geometry is deterministic from its bounds, so
//!   callers cache built meshes with [`PatchKey`]
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use sector_globe::{CameraState, Dataset, GlobeConfig, GlobeState};
//!
//! let dataset = Dataset::builtin();
//! let config = GlobeConfig::default();
//! let mut state = GlobeState::new(&config);
//!
//! let camera = CameraState::looking_at_origin(DVec3::new(0.0, 0.0, config.radius * 5.0));
//! let plan = state.tick(&camera, &dataset, &config);
//! assert_eq!(plan.tiles.len(), 5);
//! ```

pub mod cache;
pub mod coords;
pub mod dataset;
mod error;
pub mod labels;
pub mod lod;
pub mod patch;
pub mod raycast;
pub mod selection;
pub mod state;
pub mod walker;

pub use cache::KeyedCache;
pub use coords::{LonLat, to_cartesian, to_spherical};
pub use dataset::{Dataset, Industry, Rgb, Sector, SubItem};
pub use error::{DatasetError, Result};
pub use labels::{VisibleLabel, billboard_rotation, filter_labels, is_front_facing};
pub use lod::{LodController, LodLevel, LodThresholds, smoothstep};
pub use patch::{PatchKey, PatchParams, TilePatch, build_tile_patch};
pub use raycast::{CameraState, intersect_sphere, sector_index_from_longitude};
pub use selection::{ExternalSelection, Selection, locate_tile, resolve_selection};
pub use state::{ActiveRegion, GlobeState};
pub use walker::{FramePlan, GlobeConfig, LabelSpec, RegionKey, Tile, walk};
