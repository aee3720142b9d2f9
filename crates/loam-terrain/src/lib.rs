//! Full terrain and path-network generation pipeline.
//!
//! Sequences the generation stages: layered noise into a heightmap, heightmap
//! into a full mesh plus terrain chunks, Poisson-disc node placement snapped
//! to the ground, Delaunay-derived path topology, tangent-continuous curve
//! drawing, and optional terrain carving along the drawn paths.
//!
//! Host-engine concerns stay behind the [`Scene`] and [`GroundProbe`] traits;
//! the height remap and carving influence curves are supplied by the caller.
//! A full regeneration with an unchanged seed reproduces identical noise,
//! point placement, and curve geometry.
//!
//! # Example
//!
//! ```
//! use loam_terrain::{Generator, HeightMapProbe, NullScene, TerrainConfig};
//! use loam_noise::generate_height_map;
//!
//! let config = TerrainConfig::default();
//! let height_map = generate_height_map(&config.noise_config());
//! let probe = HeightMapProbe::new(&height_map, config.height_multiplier, |h| h);
//!
//! let mut scene = NullScene::default();
//! let map = Generator::new(config).generate(&mut scene, &probe);
//! assert!(!map.mesh.positions.is_empty());
//! ```

use glam::{UVec2, Vec2, Vec3};
use log::warn;

use loam_carve::{carve_paths, CarveConfig};
use loam_delaunay::shorter_edges;
use loam_mesh::{generate_terrain_chunks, height_map_to_mesh, Mesh, TerrainChunk};
use loam_noise::{generate_height_map, HeightMap, HeightMapConfig};
use loam_paths::{DrawConfig, PathGraph, PathStyle, TangentConfig};
use loam_scatter::{poisson_disc, DEFAULT_MAX_ATTEMPTS};

mod error;
mod scene;

pub use error::ConfigError;
pub use scene::{GroundProbe, HeightMapProbe, NullScene, Scene, SceneHandle, SceneObject};

/// Configuration of a full generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainConfig {
    /// Terrain size in quads.
    pub map_size: UVec2,
    /// Maximum chunk size in quads per axis.
    pub chunk_size: UVec2,
    /// Seed for every seeded stage of the pass.
    pub seed: u64,
    /// Noise zoom.
    pub noise_scale: f32,
    /// Noise layers to composite.
    pub octaves: u32,
    /// Amplitude falloff between octaves.
    pub persistence: f32,
    /// Frequency growth between octaves.
    pub lacunarity: f32,
    /// World-space height of a normalized height of 1.
    pub height_multiplier: f32,
    /// Minimum distance between node points.
    pub node_radius: f32,
    /// Normalized height band (0..1) where nodes may be placed.
    pub node_height_range: Vec2,
    /// How much longer than average a triangulation edge may be to become a
    /// path.
    pub max_edge_proportion: f32,
    /// Tangent-continuity parameters.
    pub tangents: TangentConfig,
    /// Path drawing parameters.
    pub draw: DrawConfig,
    /// Carving parameters; `None` disables carving.
    pub carve: Option<CarveConfig>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map_size: UVec2::new(100, 100),
            chunk_size: UVec2::new(100, 100),
            seed: 0,
            noise_scale: 10.0,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            height_multiplier: 1.0,
            node_radius: 8.0,
            node_height_range: Vec2::new(0.05, 0.8),
            max_edge_proportion: 0.6,
            tangents: TangentConfig::default(),
            draw: DrawConfig::default(),
            carve: None,
        }
    }
}

impl TerrainConfig {
    /// The noise configuration of this pass: one height sample per vertex of
    /// the quad grid.
    pub fn noise_config(&self) -> HeightMapConfig {
        HeightMapConfig::new(self.map_size.x as usize + 1, self.map_size.y as usize + 1)
            .seed(self.seed)
            .scale(self.noise_scale)
            .octaves(self.octaves)
            .persistence(self.persistence)
            .lacunarity(self.lacunarity)
    }

    /// Checks that the terrain stage can run.
    pub fn validate_terrain(&self) -> Result<(), ConfigError> {
        if self.map_size.x == 0 || self.map_size.y == 0 {
            return Err(ConfigError::EmptyMap {
                width: self.map_size.x,
                height: self.map_size.y,
            });
        }
        Ok(())
    }

    /// Checks that the node placement stage can run.
    pub fn validate_nodes(&self) -> Result<(), ConfigError> {
        if self.node_radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.node_radius));
        }
        Ok(())
    }
}

/// Everything one generation pass produced.
///
/// All artifacts are rebuilt from scratch on each pass; a skipped sub-step
/// leaves its artifacts empty rather than stale.
#[derive(Debug)]
pub struct GeneratedMap {
    /// The normalized heightmap.
    pub height_map: HeightMap,
    /// The full terrain mesh (carved when carving ran).
    pub mesh: Mesh,
    /// The terrain partitioned into chunks.
    pub chunks: Vec<TerrainChunk>,
    /// Node points and drawn paths.
    pub graph: PathGraph,
    /// Scene handles of the node markers, in node order.
    pub node_handles: Vec<SceneHandle>,
    /// Scene handles of the path lines, in path order.
    pub path_handles: Vec<SceneHandle>,
}

impl GeneratedMap {
    fn empty() -> Self {
        Self {
            height_map: HeightMap::from_values(Vec::new(), 0, 0),
            mesh: Mesh::new(),
            chunks: Vec::new(),
            graph: PathGraph::new(),
            node_handles: Vec::new(),
            path_handles: Vec::new(),
        }
    }
}

/// Runs full generation passes for one configuration.
///
/// The height remap and carving influence curves default to identity and can
/// be replaced with arbitrary evaluators.
pub struct Generator {
    config: TerrainConfig,
    height_remap: Box<dyn Fn(f32) -> f32>,
    carve_influence: Box<dyn Fn(f32) -> f32>,
}

impl Generator {
    /// Creates a generator with identity remap and influence curves.
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            height_remap: Box::new(|h| h),
            carve_influence: Box::new(|t| t),
        }
    }

    /// Replaces the height remap curve applied before the height multiplier.
    pub fn with_height_remap(mut self, remap: impl Fn(f32) -> f32 + 'static) -> Self {
        self.height_remap = Box::new(remap);
        self
    }

    /// Replaces the carving influence curve, evaluated at `1 - d / max`.
    pub fn with_carve_influence(mut self, influence: impl Fn(f32) -> f32 + 'static) -> Self {
        self.carve_influence = Box::new(influence);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Runs one full regeneration pass.
    ///
    /// Previously generated scene objects are cleared first. Sub-steps with
    /// invalid configuration are logged and skipped, leaving their artifacts
    /// empty; the terrain built so far is still returned.
    pub fn generate(&self, scene: &mut impl Scene, probe: &impl GroundProbe) -> GeneratedMap {
        let config = &self.config;
        scene.clear_generated();

        if let Err(err) = config.validate_terrain() {
            warn!("{err}; skipping generation");
            return GeneratedMap::empty();
        }

        // 1. Noise into a heightmap, one sample per grid vertex.
        let height_map = generate_height_map(&config.noise_config());

        // 2. Full mesh plus chunks.
        let mut mesh = height_map_to_mesh(&height_map, config.height_multiplier, |h| {
            (self.height_remap)(h)
        });
        let mut chunks = generate_terrain_chunks(
            &height_map,
            config.chunk_size,
            config.height_multiplier,
            |h| (self.height_remap)(h),
        );
        for chunk in &mut chunks {
            let position = chunk.mesh.positions.first().copied().unwrap_or(Vec3::ZERO);
            let handle = scene.instantiate(SceneObject::TerrainChunk(&chunk.mesh), position);
            chunk.texture = Some(handle);
        }

        let mut map = GeneratedMap {
            height_map,
            mesh: Mesh::new(),
            chunks,
            graph: PathGraph::new(),
            node_handles: Vec::new(),
            path_handles: Vec::new(),
        };

        // 3. Node placement: Poisson-disc points snapped to the ground and
        // filtered by the allowed height band.
        if let Err(err) = config.validate_nodes() {
            warn!("{err}; skipping paths");
            map.mesh = mesh;
            return map;
        }

        let points = poisson_disc(
            config.node_radius,
            Vec2::ZERO,
            Vec2::new(config.map_size.x as f32, config.map_size.y as f32),
            config.seed,
            DEFAULT_MAX_ATTEMPTS,
        );

        let height_band = config.node_height_range * config.height_multiplier;
        for point in points {
            let Some(elevation) = probe.ground_height(point) else {
                continue;
            };
            if elevation > height_band.x && elevation < height_band.y {
                let node = map.graph.add_node(point, elevation);
                let world = map.graph.nodes()[node].world_position();
                map.node_handles
                    .push(scene.instantiate(SceneObject::NodeMarker, world));
            }
        }

        // 4. Path topology from the pruned Delaunay edges.
        if map.graph.node_count() < 2 {
            warn!(
                "{}; skipping paths",
                ConfigError::TooFewNodes(map.graph.node_count())
            );
            map.mesh = mesh;
            return map;
        }

        let positions: Vec<Vec2> = map.graph.nodes().iter().map(|n| n.position).collect();
        let edges = shorter_edges(&positions, config.max_edge_proportion);
        map.graph.connect_edges(&edges);

        // 5. Curve preparation and drawing.
        if matches!(
            config.draw.style,
            PathStyle::ContinuousSimple | PathStyle::ContinuousSectioned
        ) {
            map.graph.prepare_continuous_curves(&config.tangents, config.seed);
        }
        map.graph.draw(&config.draw, config.seed);

        for path in map.graph.paths() {
            let position = path.polyline.first().copied().unwrap_or(Vec3::ZERO);
            map.path_handles
                .push(scene.instantiate(SceneObject::PathLine(&path.polyline), position));
        }

        // 6. Carving along the drawn paths.
        if let Some(carve) = &config.carve {
            let polylines = map.graph.drawn_polylines();
            if polylines.is_empty() {
                warn!("no drawn paths to carve; skipping carving");
            } else {
                let grid_size = UVec2::new(config.map_size.x + 1, config.map_size.y + 1);
                carve_paths(
                    &mut mesh,
                    grid_size,
                    &polylines,
                    |t| (self.carve_influence)(t),
                    carve,
                );
            }
        }

        map.mesh = mesh;
        map
    }
}
