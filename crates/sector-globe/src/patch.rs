//! Tile tessellation.
//!
//! Turns a longitude/latitude rectangle into a curved patch lying on the
//! sphere. Output is plain vertex arrays in `f32` so any renderer can upload
//! them directly.

use crate::coords::{lerp, to_cartesian};

/// Fewest segments per side a tile is tessellated with.
pub const MIN_SEGMENTS: u32 = 6;
/// Most segments per side a tile is tessellated with.
pub const MAX_SEGMENTS: u32 = 64;
/// Segments used for a tile spanning half the globe.
const SEGMENTS_PER_180_DEGREES: f64 = 48.0;

/// Parameters of a tile patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchParams {
    pub lat0: f64,
    pub lat1: f64,
    pub lon0: f64,
    pub lon1: f64,
    pub radius: f64,
    pub segments: u32,
}

impl PatchParams {
    /// Key identifying the geometry these parameters produce.
    #[must_use]
    pub fn key(&self) -> PatchKey {
        PatchKey::new(self)
    }
}

/// Cache key for built tile geometry.
///
/// Tile geometry is fully determined by its bounds, radius and segment count,
/// so the exact bit patterns of those values identify it. Bounds are
/// normalized first so reversed inputs share a key with their ordered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchKey {
    lat0: u64,
    lat1: u64,
    lon0: u64,
    lon1: u64,
    radius: u64,
    segments: u32,
}

impl PatchKey {
    #[must_use]
    pub fn new(params: &PatchParams) -> Self {
        let (lat0, lat1) = ordered(params.lat0, params.lat1);
        let (lon0, lon1) = ordered(params.lon0, params.lon1);
        Self {
            lat0: lat0.to_bits(),
            lat1: lat1.to_bits(),
            lon0: lon0.to_bits(),
            lon1: lon1.to_bits(),
            radius: params.radius.to_bits(),
            segments: params.segments.max(1),
        }
    }
}

/// Tessellated patch geometry.
#[derive(Debug, Clone, Default)]
pub struct TilePatch {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit radial normals, one per vertex.
    pub normals: Vec<[f32; 3]>,
    /// Longitude and latitude fractions across the tile.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl TilePatch {
    /// Number of triangles in the patch.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the curved patch covering a tile.
///
/// Produces a `(segments + 1)²` vertex grid by bilinear interpolation of
/// latitude (rows, south to north) and longitude (columns, west to east).
/// Each cell is split into two triangles wound counter-clockwise when seen
/// from outside the sphere, so back-face culling removes the far side.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn build_tile_patch(params: &PatchParams) -> TilePatch {
    let (lat0, lat1) = ordered(params.lat0, params.lat1);
    let (lon0, lon1) = ordered(params.lon0, params.lon1);
    let seg = params.segments.max(1);
    let row = seg + 1;
    let vertex_count = (row * row) as usize;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..=seg {
        let t = f64::from(i) / f64::from(seg);
        let lat = lerp(lat0, lat1, t);
        for j in 0..=seg {
            let s = f64::from(j) / f64::from(seg);
            let lon = lerp(lon0, lon1, s);

            let p = to_cartesian(lon, lat, params.radius, 0.0);
            let n = p.normalize_or_zero();
            positions.push(p.as_vec3().to_array());
            normals.push(n.as_vec3().to_array());
            // Image rows run top-down, so north is v = 0.
            uvs.push([s as f32, (1.0 - t) as f32]);
        }
    }

    let mut indices = Vec::with_capacity((seg * seg * 6) as usize);
    for i in 0..seg {
        for j in 0..seg {
            let a = i * row + j;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            indices.extend([a, c, b, b, c, d]);
        }
    }

    TilePatch {
        positions,
        normals,
        uvs,
        indices,
    }
}

/// Pick a segment count for a tile from its angular extent.
///
/// Half-globe tiles get 48 segments; smaller tiles scale down to
/// [`MIN_SEGMENTS`], where extra smoothness is not visible.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn segments_for_span(lat_span: f64, lon_span: f64) -> u32 {
    let span = lat_span.abs().max(lon_span.abs());
    let wanted = (span / 180.0 * SEGMENTS_PER_180_DEGREES).round();
    if wanted.is_nan() {
        return MIN_SEGMENTS;
    }
    (wanted.max(0.0) as u32).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn params(segments: u32) -> PatchParams {
        PatchParams {
            lat0: -30.0,
            lat1: 30.0,
            lon0: -36.0,
            lon1: 36.0,
            radius: 3.0,
            segments,
        }
    }

    #[test]
    fn test_counts() {
        for seg in [1, 2, 6, 48] {
            let patch = build_tile_patch(&params(seg));
            let row = (seg + 1) as usize;
            assert_eq!(patch.positions.len(), row * row);
            assert_eq!(patch.normals.len(), row * row);
            assert_eq!(patch.uvs.len(), row * row);
            assert_eq!(patch.indices.len(), 6 * (seg * seg) as usize);
            assert_eq!(patch.triangle_count(), 2 * (seg * seg) as usize);
        }
    }

    #[test]
    fn test_zero_segments_clamped() {
        let patch = build_tile_patch(&params(0));
        assert_eq!(patch.positions.len(), 4);
        assert_eq!(patch.indices.len(), 6);
    }

    #[test]
    fn test_indices_in_range() {
        let patch = build_tile_patch(&params(7));
        let n = patch.positions.len() as u32;
        assert!(patch.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_vertices_on_sphere_with_radial_normals() {
        let patch = build_tile_patch(&params(8));
        for (p, n) in patch.positions.iter().zip(&patch.normals) {
            let p = Vec3::from_array(*p);
            let n = Vec3::from_array(*n);
            assert!((p.length() - 3.0).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(p.normalize().dot(n) > 0.9999);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        let patch = build_tile_patch(&params(5));
        for tri in patch.indices.chunks_exact(3) {
            let a = Vec3::from_array(patch.positions[tri[0] as usize]);
            let b = Vec3::from_array(patch.positions[tri[1] as usize]);
            let c = Vec3::from_array(patch.positions[tri[2] as usize]);
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn test_reversed_bounds_match_ordered() {
        let ordered = params(4);
        let reversed = PatchParams {
            lat0: ordered.lat1,
            lat1: ordered.lat0,
            lon0: ordered.lon1,
            lon1: ordered.lon0,
            ..ordered
        };
        let a = build_tile_patch(&ordered);
        let b = build_tile_patch(&reversed);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.indices, b.indices);
        assert_eq!(ordered.key(), reversed.key());
    }

    #[test]
    fn test_key_distinguishes_segments_and_radius() {
        let base = params(8);
        assert_ne!(base.key(), params(9).key());
        assert_ne!(
            base.key(),
            PatchParams {
                radius: 3.01,
                ..base
            }
            .key()
        );
    }

    #[test]
    fn test_segments_for_span() {
        assert_eq!(segments_for_span(180.0, 72.0), 48);
        assert_eq!(segments_for_span(360.0, 0.0), MAX_SEGMENTS);
        assert_eq!(segments_for_span(1.0, 1.0), MIN_SEGMENTS);
        assert_eq!(segments_for_span(36.0, 72.0), 19);
        assert_eq!(segments_for_span(f64::NAN, f64::NAN), MIN_SEGMENTS);
    }

    #[test]
    fn test_uvs_span_unit_square() {
        let patch = build_tile_patch(&params(3));
        let first = patch.uvs[0];
        let last = patch.uvs[patch.uvs.len() - 1];
        assert_eq!(first, [0.0, 1.0]);
        assert_eq!(last, [1.0, 0.0]);
    }
}
