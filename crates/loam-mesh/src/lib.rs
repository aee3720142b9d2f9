//! Indexed terrain meshes from heightmaps, with chunked generation.
//!
//! Converts a [`HeightMap`] into an indexed triangle mesh, either as one
//! mesh or partitioned into non-overlapping chunks of bounded size. Heights
//! pass through a caller-supplied remap curve before the height multiplier is
//! applied, so the curve evaluator stays an external collaborator.
//!
//! # Example
//!
//! ```
//! use loam_mesh::height_map_to_mesh;
//! use loam_noise::{HeightMapConfig, generate_height_map};
//!
//! let map = generate_height_map(&HeightMapConfig::new(11, 11).seed(1));
//! let mesh = height_map_to_mesh(&map, 5.0, |h| h);
//!
//! assert_eq!(mesh.vertex_count(), 11 * 11);
//! assert_eq!(mesh.indices.len(), 10 * 10 * 6);
//! ```

use glam::{UVec2, Vec2, Vec3};
use loam_noise::HeightMap;

/// A 3D mesh with indexed triangle topology.
///
/// For a `w x h` quad grid the mesh holds `(w + 1) * (h + 1)` vertices and
/// `6 * w * h` indices. Vertices are mutable in place during carving; the
/// source heightmap is not.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (per-vertex, averaged from faces).
    pub normals: Vec<Vec3>,
    /// Texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Triangle indices (every 3 indices form a triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Adds a triangle from three vertex indices.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    /// Computes smooth normals by averaging adjacent face normals.
    pub fn compute_smooth_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);

        for tri in self.indices.chunks(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let v0 = self.positions[i0];
            let v1 = self.positions[i1];
            let v2 = self.positions[i2];

            let normal = (v1 - v0).cross(v2 - v0); // unnormalized = area-weighted

            self.normals[i0] += normal;
            self.normals[i1] += normal;
            self.normals[i2] += normal;
        }

        for normal in &mut self.normals {
            *normal = normal.normalize_or_zero();
        }
    }
}

/// A rectangular sub-region of the terrain with its own mesh.
///
/// Chunks partition the terrain exhaustively and without overlap. Boundary
/// vertices are duplicated between neighbors; each chunk owns an independent
/// vertex buffer.
#[derive(Debug, Clone)]
pub struct TerrainChunk {
    /// Chunk size in quads.
    pub size: UVec2,
    /// Grid-cell coordinate of this chunk in the chunk lattice.
    pub cell: UVec2,
    /// Offset of this chunk into the parent heightmap, in quads.
    pub map_origin: UVec2,
    /// The chunk's mesh.
    pub mesh: Mesh,
    /// Opaque handle of the texture assigned by the host, if any.
    pub texture: Option<u64>,
}

/// Converts a full heightmap into a single terrain mesh.
///
/// Heights are remapped through `remap` and scaled by `height_multiplier`.
/// The mesh is centered on the origin in the XZ plane.
pub fn height_map_to_mesh(
    height_map: &HeightMap,
    height_multiplier: f32,
    remap: impl Fn(f32) -> f32,
) -> Mesh {
    let quads = UVec2::new(
        height_map.width().saturating_sub(1) as u32,
        height_map.height().saturating_sub(1) as u32,
    );
    let position = Vec3::new(
        -(height_map.width() as f32) / 2.0,
        0.0,
        -(height_map.height() as f32) / 2.0,
    );

    build_region_mesh(height_map, UVec2::ZERO, quads, position, height_multiplier, &remap)
}

/// Partitions a heightmap into chunks no larger than `max_chunk_quads` per
/// axis and builds each chunk's mesh.
///
/// The trailing chunks along each axis shrink to whatever remains, so the
/// chunks cover the map exactly once.
pub fn generate_terrain_chunks(
    height_map: &HeightMap,
    max_chunk_quads: UVec2,
    height_multiplier: f32,
    remap: impl Fn(f32) -> f32,
) -> Vec<TerrainChunk> {
    let map_quads = UVec2::new(
        height_map.width().saturating_sub(1) as u32,
        height_map.height().saturating_sub(1) as u32,
    );
    if map_quads.x == 0 || map_quads.y == 0 || max_chunk_quads.x == 0 || max_chunk_quads.y == 0 {
        return Vec::new();
    }

    let mid = Vec2::new(
        height_map.width() as f32 / 2.0,
        height_map.height() as f32 / 2.0,
    );
    let cells = UVec2::new(
        map_quads.x.div_ceil(max_chunk_quads.x),
        map_quads.y.div_ceil(max_chunk_quads.y),
    );

    let mut chunks = Vec::with_capacity((cells.x * cells.y) as usize);

    for j in 0..cells.y {
        for i in 0..cells.x {
            let cell = UVec2::new(i, j);
            let map_origin = max_chunk_quads * cell;
            let size = (map_quads - map_origin).min(max_chunk_quads);
            let position = Vec3::new(
                map_origin.x as f32 - mid.x,
                0.0,
                map_origin.y as f32 - mid.y,
            );

            let mesh = build_region_mesh(
                height_map,
                map_origin,
                size,
                position,
                height_multiplier,
                &remap,
            );

            chunks.push(TerrainChunk {
                size,
                cell,
                map_origin,
                mesh,
                texture: None,
            });
        }
    }

    chunks
}

/// Builds the mesh of one rectangular heightmap region.
///
/// `region_quads` is the region size in quads; vertices span one more sample
/// per axis. UVs are normalized within the region.
fn build_region_mesh(
    height_map: &HeightMap,
    region_origin: UVec2,
    region_quads: UVec2,
    position: Vec3,
    height_multiplier: f32,
    remap: &impl Fn(f32) -> f32,
) -> Mesh {
    let width = region_quads.x as usize;
    let height = region_quads.y as usize;

    let mut mesh = Mesh::with_capacity((width + 1) * (height + 1), width * height * 2);

    for y in 0..=height {
        for x in 0..=width {
            let raw = height_map.get(region_origin.x as usize + x, region_origin.y as usize + y);
            let elevation = remap(raw) * height_multiplier;

            mesh.positions
                .push(Vec3::new(x as f32, elevation, y as f32) + position);
            mesh.uvs.push(Vec2::new(
                x as f32 / width.max(1) as f32,
                y as f32 / height.max(1) as f32,
            ));
        }
    }

    for y in 0..height {
        for x in 0..width {
            let vertex = (y * (width + 1) + x) as u32;
            let down = vertex + width as u32 + 1;
            let right = vertex + 1;
            let down_right = down + 1;

            mesh.add_triangle(vertex, down, down_right);
            mesh.add_triangle(vertex, down_right, right);
        }
    }

    mesh.compute_smooth_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_noise::{generate_height_map, HeightMapConfig};

    fn flat_map(width: usize, height: usize, value: f32) -> HeightMap {
        HeightMap::from_values(vec![value; width * height], width, height)
    }

    #[test]
    fn test_mesh_counts_match_quad_grid() {
        let map = flat_map(11, 11, 0.0);
        let mesh = height_map_to_mesh(&map, 1.0, |h| h);

        assert_eq!(mesh.vertex_count(), 11 * 11);
        assert_eq!(mesh.uvs.len(), 11 * 11);
        assert_eq!(mesh.indices.len(), 6 * 10 * 10);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
    }

    #[test]
    fn test_constant_height_with_multiplier() {
        // A flat 10x10 quad map at height 0.5 with multiplier 2 sits at y = 1.
        let map = flat_map(11, 11, 0.5);
        let mesh = height_map_to_mesh(&map, 2.0, |h| h);

        for p in &mesh.positions {
            assert!((p.y - 1.0).abs() < 1e-6, "vertex {:?} not at y = 1", p);
        }
    }

    #[test]
    fn test_remap_curve_is_applied() {
        let map = flat_map(5, 5, 0.25);
        let mesh = height_map_to_mesh(&map, 1.0, |h| h * h);

        for p in &mesh.positions {
            assert!((p.y - 0.0625).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mesh_is_centered() {
        let map = flat_map(11, 11, 0.0);
        let mesh = height_map_to_mesh(&map, 1.0, |h| h);

        let min_x = mesh.positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = mesh
            .positions
            .iter()
            .map(|p| p.x)
            .fold(f32::NEG_INFINITY, f32::max);

        assert!((min_x + 5.5).abs() < 1e-5);
        assert!((max_x - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_flat_mesh_normals_point_up() {
        let map = flat_map(6, 6, 0.3);
        let mesh = height_map_to_mesh(&map, 1.0, |h| h);

        for n in &mesh.normals {
            assert!(n.y > 0.99, "flat terrain normal should point up, got {:?}", n);
        }
    }

    #[test]
    fn test_chunks_partition_exhaustively() {
        // 10x10 quads with max chunk 4x4 -> 3x3 chunks of sizes 4, 4, 2.
        let map = flat_map(11, 11, 0.0);
        let chunks = generate_terrain_chunks(&map, UVec2::new(4, 4), 1.0, |h| h);

        assert_eq!(chunks.len(), 9);

        let total_quads: u32 = chunks.iter().map(|c| c.size.x * c.size.y).sum();
        assert_eq!(total_quads, 100);

        for chunk in &chunks {
            assert!(chunk.size.x <= 4 && chunk.size.y <= 4);
            assert_eq!(chunk.map_origin, chunk.cell * UVec2::new(4, 4));
            assert_eq!(
                chunk.mesh.vertex_count() as u32,
                (chunk.size.x + 1) * (chunk.size.y + 1)
            );
            assert_eq!(
                chunk.mesh.indices.len() as u32,
                6 * chunk.size.x * chunk.size.y
            );
            assert!(chunk.texture.is_none());
        }
    }

    #[test]
    fn test_chunk_seams_share_positions() {
        let map = generate_height_map(&HeightMapConfig::new(9, 9).seed(5));
        let chunks = generate_terrain_chunks(&map, UVec2::new(4, 4), 3.0, |h| h);
        let full = height_map_to_mesh(&map, 3.0, |h| h);

        // Every chunk vertex coincides with a vertex of the full mesh.
        for chunk in &chunks {
            for p in &chunk.mesh.positions {
                let found = full
                    .positions
                    .iter()
                    .any(|q| (*q - *p).length_squared() < 1e-8);
                assert!(found, "chunk vertex {:?} missing from full mesh", p);
            }
        }
    }

    #[test]
    fn test_chunk_uvs_normalized() {
        let map = flat_map(11, 11, 0.0);
        let chunks = generate_terrain_chunks(&map, UVec2::new(4, 4), 1.0, |h| h);

        for chunk in &chunks {
            for uv in &chunk.mesh.uvs {
                assert!((0.0..=1.0).contains(&uv.x));
                assert!((0.0..=1.0).contains(&uv.y));
            }
        }
    }

    #[test]
    fn test_empty_inputs() {
        let map = flat_map(1, 1, 0.0);
        assert!(generate_terrain_chunks(&map, UVec2::new(4, 4), 1.0, |h| h).is_empty());

        let mesh = height_map_to_mesh(&map, 1.0, |h| h);
        assert_eq!(mesh.vertex_count(), 1);
        assert!(mesh.indices.is_empty());
    }
}
