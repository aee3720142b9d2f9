//! Host-engine collaborator traits.
//!
//! The generator never creates or destroys engine objects itself. It asks a
//! [`Scene`] to clear what previous passes produced and to instantiate new
//! objects, keeping only opaque handles; ground snapping goes through a
//! [`GroundProbe`]. Both are supplied by the caller.

use glam::{Vec2, Vec3};
use loam_mesh::Mesh;
use loam_noise::HeightMap;

/// Opaque handle of an object created by the host scene.
pub type SceneHandle = u64;

/// An object the generator asks the host to create.
#[derive(Debug, Clone, Copy)]
pub enum SceneObject<'a> {
    /// A marker for one node point.
    NodeMarker,
    /// A renderable polyline for one path.
    PathLine(&'a [Vec3]),
    /// A terrain chunk mesh.
    TerrainChunk(&'a Mesh),
}

/// Mutation interface to the host scene.
pub trait Scene {
    /// Removes every object created by earlier generation passes.
    fn clear_generated(&mut self);

    /// Creates an object near the given position and returns its handle.
    fn instantiate(&mut self, object: SceneObject<'_>, position: Vec3) -> SceneHandle;
}

/// Ground-height oracle for a horizontal position, equivalent to casting a
/// ray downward at `(x, z)` against the spawned terrain.
pub trait GroundProbe {
    /// Returns the ground height at `position`, or `None` when nothing is hit.
    fn ground_height(&self, position: Vec2) -> Option<f32>;
}

/// Scene implementation that only counts instantiations.
///
/// Useful for tests and for running the pipeline without a host engine.
#[derive(Debug, Default)]
pub struct NullScene {
    /// How often the scene was cleared.
    pub cleared: usize,
    /// Node markers created since the last clear.
    pub node_markers: usize,
    /// Path lines created since the last clear.
    pub path_lines: usize,
    /// Terrain chunks created since the last clear.
    pub chunks: usize,
    next_handle: SceneHandle,
}

impl Scene for NullScene {
    fn clear_generated(&mut self) {
        self.cleared += 1;
        self.node_markers = 0;
        self.path_lines = 0;
        self.chunks = 0;
    }

    fn instantiate(&mut self, object: SceneObject<'_>, _position: Vec3) -> SceneHandle {
        match object {
            SceneObject::NodeMarker => self.node_markers += 1,
            SceneObject::PathLine(_) => self.path_lines += 1,
            SceneObject::TerrainChunk(_) => self.chunks += 1,
        }

        self.next_handle += 1;
        self.next_handle
    }
}

/// Probe that samples a heightmap the same way the mesh builder places
/// vertices, standing in for a physics raycast.
pub struct HeightMapProbe<'a, F> {
    map: &'a HeightMap,
    height_multiplier: f32,
    remap: F,
}

impl<'a, F: Fn(f32) -> f32> HeightMapProbe<'a, F> {
    /// Creates a probe over `map` with the mesh builder's height mapping.
    pub fn new(map: &'a HeightMap, height_multiplier: f32, remap: F) -> Self {
        Self {
            map,
            height_multiplier,
            remap,
        }
    }
}

impl<F: Fn(f32) -> f32> GroundProbe for HeightMapProbe<'_, F> {
    fn ground_height(&self, position: Vec2) -> Option<f32> {
        if self.map.width() < 2 || self.map.height() < 2 {
            return None;
        }

        // The mesh centers vertex (gx, gy) at world (gx - w / 2, gy - h / 2).
        let grid_x = position.x + self.map.width() as f32 / 2.0;
        let grid_y = position.y + self.map.height() as f32 / 2.0;

        let max_x = (self.map.width() - 1) as f32;
        let max_y = (self.map.height() - 1) as f32;
        if grid_x < 0.0 || grid_x > max_x || grid_y < 0.0 || grid_y > max_y {
            return None;
        }

        let raw = self.map.sample(grid_x / max_x, grid_y / max_y);
        Some((self.remap)(raw) * self.height_multiplier)
    }
}
