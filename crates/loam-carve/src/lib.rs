//! Spatial-hash accelerated terrain carving along path curves.
//!
//! Pulls terrain vertices towards nearby path sample points for a carved
//! road-bed effect. All drawn path points go into one flat lookup table; a
//! fixed-dimension grid over the terrain extent buckets the table indices so
//! each vertex only scans its own cell instead of the whole table.
//!
//! The hash also re-inserts every point into the cells reached by stepping a
//! fixed radius in 8 directions around it, to catch near-neighbor matches
//! across cell boundaries. This is a known approximation: points close to a
//! cell corner can still be missed when the check radius is below the cell
//! diagonal. Downstream carving tolerates the imprecision, so the behavior is
//! kept as is.

use glam::{UVec2, Vec2, Vec3};
use loam_mesh::Mesh;

/// Number of radial directions checked when inserting a point.
const RADIAL_CHECK_STEPS: usize = 8;

/// Distance stepped along each radial direction.
const RADIAL_CHECK_RADIUS: f32 = 1.0;

/// Distance reported by a nearest query that found no candidate.
pub const NO_CANDIDATE_DISTANCE: f32 = f32::MAX;

/// Configuration for a carving pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarveConfig {
    /// Cells per axis of the spatial hash.
    pub hash_dimensions: UVec2,
    /// Vertices farther than this from any path point are untouched.
    pub max_distance: f32,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            hash_dimensions: UVec2::new(10, 10),
            max_distance: 1.0,
        }
    }
}

/// Spatial hash over the drawn path points, rebuilt per carving pass.
#[derive(Debug)]
pub struct PathHash {
    dimensions: UVec2,
    cell_size: Vec2,
    /// Per-cell indices into the lookup table, row-major.
    cells: Vec<Vec<usize>>,
    /// Flat lookup table of path sample points.
    lookup: Vec<Vec3>,
    /// Translation from world space into the grid's positive quadrant.
    offset: Vec3,
}

impl PathHash {
    /// Builds the hash from drawn path polylines.
    ///
    /// Each polyline contributes all its points except the last, which other
    /// paths sharing the endpoint already provide. `terrain_extent` is the
    /// terrain size in world units and `offset` the translation that maps
    /// terrain positions into `[0, extent]`.
    pub fn build(
        polylines: &[&[Vec3]],
        terrain_extent: Vec2,
        offset: Vec3,
        dimensions: UVec2,
    ) -> Self {
        let dimensions = dimensions.max(UVec2::ONE);
        let mut hash = Self {
            dimensions,
            cell_size: terrain_extent / Vec2::new(dimensions.x as f32, dimensions.y as f32),
            cells: vec![Vec::new(); (dimensions.x * dimensions.y) as usize],
            lookup: Vec::new(),
            offset,
        };

        for polyline in polylines {
            let keep = polyline.len().saturating_sub(1);
            hash.lookup.extend_from_slice(&polyline[..keep]);
        }

        for index in 0..hash.lookup.len() {
            let position = hash.lookup[index] + hash.offset;
            hash.insert(index, position);

            // Points near a cell border belong to the neighbor cells too.
            for step in 0..RADIAL_CHECK_STEPS {
                let angle = std::f32::consts::TAU * step as f32 / RADIAL_CHECK_STEPS as f32;
                let probe =
                    position + Vec3::new(angle.cos(), 0.0, angle.sin()) * RADIAL_CHECK_RADIUS;
                hash.insert(index, probe);
            }
        }

        hash
    }

    /// Number of points in the lookup table.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Returns `true` if no path points were inserted.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    fn insert(&mut self, index: usize, position: Vec3) {
        let cell = self.cell_of(position);
        let slot = (cell.y * self.dimensions.x + cell.x) as usize;
        // Radial probes can land in the home cell again.
        if self.cells[slot].last() != Some(&index) {
            self.cells[slot].push(index);
        }
    }

    /// Grid cell of a position already translated into hash space, clamped to
    /// the grid.
    fn cell_of(&self, position: Vec3) -> UVec2 {
        let x = (position.x / self.cell_size.x).floor().max(0.0) as u32;
        let y = (position.z / self.cell_size.y).floor().max(0.0) as u32;

        UVec2::new(x.min(self.dimensions.x - 1), y.min(self.dimensions.y - 1))
    }

    /// Nearest path point to a world position by planar (XZ) distance,
    /// scanning only the containing cell's candidates.
    ///
    /// Returns the point and its distance. When the cell holds no candidate
    /// the distance is [`NO_CANDIDATE_DISTANCE`], distinguishing "nothing
    /// found" from "found but too far".
    pub fn nearest(&self, position: Vec3) -> (Vec3, f32) {
        let hash_position = position + self.offset;
        let cell = self.cell_of(hash_position);
        let slot = (cell.y * self.dimensions.x + cell.x) as usize;

        let planar = Vec2::new(position.x, position.z);
        let mut closest = position;
        let mut closest_distance = NO_CANDIDATE_DISTANCE;

        for &index in &self.cells[slot] {
            let candidate = self.lookup[index];
            let distance = planar.distance(Vec2::new(candidate.x, candidate.z));
            if distance < closest_distance {
                closest_distance = distance;
                closest = candidate;
            }
        }

        (closest, closest_distance)
    }
}

/// Nearest path point by exhaustive scan over the whole lookup table.
///
/// Reference fallback for validating the spatial hash; O(n) per query.
pub fn nearest_linear(points: &[Vec3], position: Vec3) -> (Vec3, f32) {
    let planar = Vec2::new(position.x, position.z);
    let mut closest = position;
    let mut closest_distance = NO_CANDIDATE_DISTANCE;

    for &candidate in points {
        let distance = planar.distance(Vec2::new(candidate.x, candidate.z));
        if distance < closest_distance {
            closest_distance = distance;
            closest = candidate;
        }
    }

    (closest, closest_distance)
}

/// Carves the terrain mesh towards the drawn paths, in place.
///
/// `grid_size` is the terrain's vertex dimensions; the mesh must hold exactly
/// `grid_size.x * grid_size.y` vertices laid out row-major and centered on
/// the origin. For every vertex the nearest path point is looked up in the
/// hash; if it lies within `config.max_distance`, the vertex height blends
/// towards the path height by `influence(1 - d / max_distance)` — full
/// influence at distance 0, none at or beyond the maximum.
///
/// A non-positive `max_distance` or an empty path set leaves the mesh
/// untouched.
pub fn carve_paths(
    mesh: &mut Mesh,
    grid_size: UVec2,
    polylines: &[&[Vec3]],
    influence: impl Fn(f32) -> f32,
    config: &CarveConfig,
) {
    if config.max_distance <= 0.0 {
        return;
    }

    assert_eq!(
        mesh.positions.len(),
        (grid_size.x * grid_size.y) as usize,
        "terrain mesh does not match its grid size"
    );

    let extent = Vec2::new(
        grid_size.x.saturating_sub(1) as f32,
        grid_size.y.saturating_sub(1) as f32,
    );
    let offset = Vec3::new(grid_size.x as f32 / 2.0, 0.0, grid_size.y as f32 / 2.0);

    let hash = PathHash::build(polylines, extent, offset, config.hash_dimensions);
    if hash.is_empty() {
        return;
    }

    for vertex in &mut mesh.positions {
        let (closest, distance) = hash.nearest(*vertex);
        let proportion = distance / config.max_distance;

        if proportion <= 1.0 {
            let weight = influence(1.0 - proportion);
            vertex.y = vertex.y + (closest.y - vertex.y) * weight;
        }
    }

    mesh.compute_smooth_normals();
}
