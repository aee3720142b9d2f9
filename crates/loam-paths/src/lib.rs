//! Node/path topology with tangent-continuous curve drawing.
//!
//! A [`PathGraph`] is an arena of node points and the paths connecting them,
//! addressed by integer handles, so neither side owns the other and the
//! point/path back-reference cycle is broken. Paths are materialized from
//! triangulation edges, prepared for tangent continuity across shared nodes,
//! and drawn into per-path polylines in one of four styles.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use loam_paths::{DrawConfig, PathGraph, PathStyle};
//!
//! let mut graph = PathGraph::new();
//! let a = graph.add_node(Vec2::new(0.0, 0.0), 1.0);
//! let b = graph.add_node(Vec2::new(10.0, 0.0), 2.0);
//! graph.connect(a, b);
//!
//! graph.draw(&DrawConfig::default().style(PathStyle::StraightLine), 42);
//! assert_eq!(graph.paths()[0].polyline.len(), 2);
//! ```

use glam::{Vec2, Vec3};
use loam_delaunay::Edge;
use loam_spline::{sample_even, PathSection, SectionConfig, DEFAULT_SECTION_SUBDIVISIONS};

/// Selects one endpoint of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEnd {
    /// The `p1` endpoint.
    First,
    /// The `p2` endpoint.
    Second,
}

/// How path curves are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStyle {
    /// Two-point straight segments.
    StraightLine,
    /// Bezier curves with randomly placed tangent controls.
    RandomCurve,
    /// Single Bezier per path using the prepared continuous tangents.
    #[default]
    ContinuousSimple,
    /// Prepared tangents plus recursive subsectioning for extra detail.
    ContinuousSectioned,
}

/// A sampled node with its planar position and ground elevation.
///
/// The paths list holds handles into the owning graph and is used only for
/// adjacency queries.
#[derive(Debug, Clone)]
pub struct NodePoint {
    /// Planar position.
    pub position: Vec2,
    /// Ground height at this node.
    pub elevation: f32,
    /// Handles of the paths incident to this node.
    pub paths: Vec<usize>,
}

impl NodePoint {
    /// The ground-anchored 3D position of this node.
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.position.x, self.elevation, self.position.y)
    }
}

/// An unordered connection between two nodes, with its curve state.
#[derive(Debug, Clone)]
pub struct NodePath {
    /// Handle of the first endpoint.
    pub p1: usize,
    /// Handle of the second endpoint.
    pub p2: usize,
    /// Planar tangent control at `p1`.
    pub m1: Vec2,
    /// Planar tangent control at `p2`.
    pub m2: Vec2,
    /// Rendered sample points, empty until drawn.
    pub polyline: Vec<Vec3>,
    /// Section tree for the sectioned style, rebuilt on every draw.
    pub sections: Option<PathSection>,
}

/// Compares two paths by their unordered endpoint pair.
///
/// Two paths are the same connection iff they join the same two nodes,
/// regardless of direction.
pub fn same_endpoints(a: &NodePath, b: &NodePath) -> bool {
    (a.p1 == b.p1 && a.p2 == b.p2) || (a.p1 == b.p2 && a.p2 == b.p1)
}

/// Parameters for tangent-continuity preparation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TangentConfig {
    /// Direction paths lean towards when no opposite path provides a tangent.
    /// Zero disables the projection.
    pub preferred_direction: Vec2,
    /// Maximum angular perturbation (radians) of fallback tangents.
    pub angle_variation: f32,
    /// Minimum tangent magnitude.
    pub min_magnitude: f32,
    /// Maximum tangent magnitude.
    pub max_magnitude: f32,
}

impl Default for TangentConfig {
    fn default() -> Self {
        Self {
            preferred_direction: Vec2::ZERO,
            angle_variation: 15f32.to_radians(),
            min_magnitude: 0.5,
            max_magnitude: 1.0,
        }
    }
}

/// Parameters for drawing path curves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawConfig {
    /// Drawing style.
    pub style: PathStyle,
    /// Curve subdivisions for the non-sectioned styles.
    pub subdivisions: usize,
    /// Control point radius for the random style.
    pub max_random_radius: f32,
    /// Section tree shape for the sectioned style.
    pub sections: SectionConfig,
    /// Per-leaf subdivisions for the sectioned style.
    pub section_subdivisions: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            style: PathStyle::default(),
            subdivisions: DEFAULT_SECTION_SUBDIVISIONS,
            max_random_radius: 1.0,
            sections: SectionConfig::default(),
            section_subdivisions: 5,
        }
    }
}

impl DrawConfig {
    /// Sets the drawing style.
    pub fn style(mut self, style: PathStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the curve subdivisions.
    pub fn subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }
}

/// Arena of node points and paths.
#[derive(Debug, Clone, Default)]
pub struct PathGraph {
    nodes: Vec<NodePoint>,
    paths: Vec<NodePath>,
}

impl PathGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its handle.
    pub fn add_node(&mut self, position: Vec2, elevation: f32) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodePoint {
            position,
            elevation,
            paths: Vec::new(),
        });
        id
    }

    /// Returns all nodes.
    pub fn nodes(&self) -> &[NodePoint] {
        &self.nodes
    }

    /// Returns all paths.
    pub fn paths(&self) -> &[NodePath] {
        &self.paths
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of paths.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Connects two nodes, starting as a straight segment.
    ///
    /// Returns `None` (and creates nothing) for unknown handles, self loops,
    /// or endpoints that are already connected, so duplicated triangulation
    /// edges collapse to a single path.
    pub fn connect(&mut self, a: usize, b: usize) -> Option<usize> {
        if a == b || a >= self.nodes.len() || b >= self.nodes.len() {
            return None;
        }
        if self.are_connected(a, b) {
            return None;
        }

        let id = self.paths.len();
        self.paths.push(NodePath {
            p1: a,
            p2: b,
            m1: self.nodes[a].position,
            m2: self.nodes[b].position,
            polyline: Vec::new(),
            sections: None,
        });
        self.nodes[a].paths.push(id);
        self.nodes[b].paths.push(id);

        Some(id)
    }

    /// Checks if two nodes are already connected.
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        self.nodes[a]
            .paths
            .iter()
            .any(|&id| self.paths[id].p1 == b || self.paths[id].p2 == b)
    }

    /// Materializes triangulation edges into paths.
    ///
    /// Edges whose endpoints do not match a node are dropped silently, as are
    /// duplicates. Returns how many paths were created.
    pub fn connect_edges(&mut self, edges: &[Edge]) -> usize {
        edges
            .iter()
            .filter(|edge| self.connect(edge.a, edge.b).is_some())
            .count()
    }

    /// Direction of a path leaving `node_id`, or `None` if the node is not an
    /// endpoint of the path.
    pub fn direction_from(&self, path_id: usize, node_id: usize) -> Option<Vec2> {
        let path = self.paths.get(path_id)?;
        if path.p1 == node_id {
            Some(self.nodes[path.p2].position - self.nodes[path.p1].position)
        } else if path.p2 == node_id {
            Some(self.nodes[path.p1].position - self.nodes[path.p2].position)
        } else {
            None
        }
    }

    /// The tangent of a path at one endpoint, if its control point has been
    /// moved away from the endpoint.
    pub fn tangent_at(&self, path_id: usize, end: PathEnd) -> Option<Vec2> {
        let path = self.paths.get(path_id)?;
        let (modifier, position) = match end {
            PathEnd::First => (path.m1, self.nodes[path.p1].position),
            PathEnd::Second => (path.m2, self.nodes[path.p2].position),
        };

        if modifier != position {
            Some(modifier - position)
        } else {
            None
        }
    }

    /// Which end of a path sits at `node_id`, if any.
    pub fn end_at_node(&self, path_id: usize, node_id: usize) -> Option<PathEnd> {
        let path = self.paths.get(path_id)?;
        if path.p1 == node_id {
            Some(PathEnd::First)
        } else if path.p2 == node_id {
            Some(PathEnd::Second)
        } else {
            None
        }
    }

    /// Finds the path at `node_id` most opposite to `path_id`: its direction
    /// from the node must form an angle above 90 degrees with the current
    /// path's direction, as close to 180 as available.
    ///
    /// Returns the found path handle and its direction from the node. When no
    /// candidate qualifies the original handle is returned with a zero
    /// direction.
    pub fn opposite_path_to(&self, node_id: usize, path_id: usize) -> (usize, Vec2) {
        let mut best = (path_id, Vec2::ZERO);

        let Some(node) = self.nodes.get(node_id) else {
            return best;
        };
        let Some(current_direction) = self.direction_from(path_id, node_id) else {
            return best;
        };

        let mut max_angle = 0.0f32;
        for &candidate in &node.paths {
            if candidate == path_id {
                continue;
            }
            let Some(candidate_direction) = self.direction_from(candidate, node_id) else {
                continue;
            };

            let angle = angle_between(candidate_direction, current_direction);
            if angle > std::f32::consts::FRAC_PI_2 && angle > max_angle {
                max_angle = angle;
                best = (candidate, candidate_direction);
            }
        }

        best
    }

    /// Prepares every path's tangent controls for curve continuity across
    /// shared nodes.
    ///
    /// All controls are first reset to their endpoints (straight lines). Then,
    /// per path endpoint: if the opposite path at that node already has a
    /// tangent, it is mirrored (negated, magnitude re-randomized within the
    /// configured range); otherwise the path's own direction — projected onto
    /// the preferred direction when one is set — is perturbed within the
    /// angular variation and scaled into the magnitude range. Deterministic
    /// for a fixed seed.
    pub fn prepare_continuous_curves(&mut self, config: &TangentConfig, seed: u64) {
        let mut rng = Rng::new(seed);

        for i in 0..self.paths.len() {
            self.paths[i].m1 = self.nodes[self.paths[i].p1].position;
            self.paths[i].m2 = self.nodes[self.paths[i].p2].position;
        }

        for i in 0..self.paths.len() {
            self.prepare_path_end(i, PathEnd::First, config, &mut rng);
            self.prepare_path_end(i, PathEnd::Second, config, &mut rng);
        }
    }

    fn prepare_path_end(
        &mut self,
        path_id: usize,
        end: PathEnd,
        config: &TangentConfig,
        rng: &mut Rng,
    ) {
        let node_id = match end {
            PathEnd::First => self.paths[path_id].p1,
            PathEnd::Second => self.paths[path_id].p2,
        };
        let node_position = self.nodes[node_id].position;
        let magnitude = rng.range(config.min_magnitude, config.max_magnitude);

        let (opposite_id, opposite_direction) = self.opposite_path_to(node_id, path_id);

        let mirrored = if opposite_direction != Vec2::ZERO {
            self.end_at_node(opposite_id, node_id)
                .and_then(|opposite_end| self.tangent_at(opposite_id, opposite_end))
                .map(|tangent| node_position - tangent.normalize_or_zero() * magnitude)
        } else {
            None
        };

        let modifier = mirrored.unwrap_or_else(|| {
            let own = self
                .direction_from(path_id, node_id)
                .unwrap_or(Vec2::ZERO);

            let mut direction = own;
            if config.preferred_direction.length_squared() > 1e-12 {
                let projected = own.project_onto(config.preferred_direction);
                if projected.length_squared() > 1e-12 {
                    direction = projected;
                }
            }

            let jitter = rng.range(-config.angle_variation / 2.0, config.angle_variation / 2.0);
            node_position + rotate(direction.normalize_or_zero(), jitter) * magnitude
        });

        match end {
            PathEnd::First => self.paths[path_id].m1 = modifier,
            PathEnd::Second => self.paths[path_id].m2 = modifier,
        }
    }

    /// Draws every path into its polyline using the given style.
    ///
    /// Previous polylines and section trees are discarded. The continuous
    /// styles expect [`PathGraph::prepare_continuous_curves`] to have run;
    /// without it they degenerate to straight curves.
    pub fn draw(&mut self, config: &DrawConfig, seed: u64) {
        let mut rng = Rng::new(seed);

        for i in 0..self.paths.len() {
            let w1 = self.nodes[self.paths[i].p1].world_position();
            let w2 = self.nodes[self.paths[i].p2].world_position();

            self.paths[i].sections = None;

            match config.style {
                PathStyle::StraightLine => {
                    self.paths[i].polyline = vec![w1, w2];
                }
                PathStyle::RandomCurve => {
                    let m1 = random_in_disc(w1, config.max_random_radius, &mut rng);
                    let m2 = random_in_disc(w2, config.max_random_radius, &mut rng);
                    self.paths[i].polyline = sample_even(w1, w2, m1, m2, config.subdivisions);
                }
                PathStyle::ContinuousSimple => {
                    let (m1, m2) = self.lifted_modifiers(i, w1, w2);
                    self.paths[i].polyline = sample_even(w1, w2, m1, m2, config.subdivisions);
                }
                PathStyle::ContinuousSectioned => {
                    let (m1, m2) = self.lifted_modifiers(i, w1, w2);
                    let root = PathSection::subdivide(
                        w1,
                        w2,
                        m1,
                        m2,
                        &config.sections,
                        rng.next_u64(),
                    );
                    self.paths[i].polyline = root.flatten(config.section_subdivisions);
                    self.paths[i].sections = Some(root);
                }
            }
        }
    }

    /// Lifts a path's planar tangent controls to the elevation of their
    /// endpoints.
    fn lifted_modifiers(&self, path_id: usize, w1: Vec3, w2: Vec3) -> (Vec3, Vec3) {
        let path = &self.paths[path_id];
        (
            Vec3::new(path.m1.x, w1.y, path.m1.y),
            Vec3::new(path.m2.x, w2.y, path.m2.y),
        )
    }

    /// Returns the drawn polylines of all paths, skipping undrawn ones.
    pub fn drawn_polylines(&self) -> Vec<&[Vec3]> {
        self.paths
            .iter()
            .filter(|p| !p.polyline.is_empty())
            .map(|p| p.polyline.as_slice())
            .collect()
    }
}

/// Unsigned angle between two vectors, in radians.
fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let lengths = a.length() * b.length();
    if lengths <= 1e-12 {
        return 0.0;
    }
    (a.dot(b) / lengths).clamp(-1.0, 1.0).acos()
}

/// Rotates a planar vector by an angle.
fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Random point in the horizontal disc around `origin`.
fn random_in_disc(origin: Vec3, max_radius: f32, rng: &mut Rng) -> Vec3 {
    let angle = rng.range(0.0, std::f32::consts::TAU);
    let radius = max_radius * rng.next_f32().sqrt();
    origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
}

/// Simple LCG random number generator for deterministic drawing.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn junction(angle_degrees: f32) -> (PathGraph, usize, usize) {
        // A center node with one path along +X and a second one at the given
        // angle from +X.
        let mut graph = PathGraph::new();
        let center = graph.add_node(Vec2::ZERO, 0.0);
        let along_x = graph.add_node(Vec2::new(1.0, 0.0), 0.0);
        let radians = angle_degrees.to_radians();
        let other = graph.add_node(Vec2::new(radians.cos(), radians.sin()), 0.0);

        let first = graph.connect(center, along_x).unwrap();
        let second = graph.connect(center, other).unwrap();
        (graph, first, second)
    }

    #[test]
    fn test_opposite_path_found_at_170_degrees() {
        let (graph, first, second) = junction(170.0);

        let (opposite, direction) = graph.opposite_path_to(0, first);
        assert_eq!(opposite, second);
        assert!(direction != Vec2::ZERO);
    }

    #[test]
    fn test_no_opposite_at_45_degrees() {
        let (graph, first, _) = junction(45.0);

        let (opposite, direction) = graph.opposite_path_to(0, first);
        assert_eq!(opposite, first, "the original path signals no opposite");
        assert_eq!(direction, Vec2::ZERO);
    }

    #[test]
    fn test_opposite_prefers_closest_to_180() {
        let mut graph = PathGraph::new();
        let center = graph.add_node(Vec2::ZERO, 0.0);
        let along_x = graph.add_node(Vec2::new(1.0, 0.0), 0.0);
        let at_120 = graph.add_node(
            Vec2::new(120f32.to_radians().cos(), 120f32.to_radians().sin()),
            0.0,
        );
        let at_175 = graph.add_node(
            Vec2::new(175f32.to_radians().cos(), 175f32.to_radians().sin()),
            0.0,
        );

        let current = graph.connect(center, along_x).unwrap();
        graph.connect(center, at_120).unwrap();
        let best = graph.connect(center, at_175).unwrap();

        let (opposite, _) = graph.opposite_path_to(center, current);
        assert_eq!(opposite, best);
    }

    #[test]
    fn test_connect_deduplicates_unordered_pairs() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::ONE, 0.0);

        assert!(graph.connect(a, b).is_some());
        assert!(graph.connect(a, b).is_none());
        assert!(graph.connect(b, a).is_none(), "reversed edge is the same path");
        assert_eq!(graph.path_count(), 1);
    }

    #[test]
    fn test_connect_rejects_invalid_handles() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);

        assert!(graph.connect(a, a).is_none());
        assert!(graph.connect(a, 99).is_none());
        assert_eq!(graph.path_count(), 0);
    }

    #[test]
    fn test_connect_edges_drops_unmatched_endpoints() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::ONE, 0.0);

        let edges = vec![Edge::new(a, b), Edge::new(a, 7), Edge::new(b, a)];
        let created = graph.connect_edges(&edges);

        assert_eq!(created, 1);
        assert_eq!(graph.path_count(), 1);
    }

    #[test]
    fn test_same_endpoints_ignores_direction() {
        let make = |p1, p2| NodePath {
            p1,
            p2,
            m1: Vec2::ZERO,
            m2: Vec2::ZERO,
            polyline: Vec::new(),
            sections: None,
        };

        assert!(same_endpoints(&make(0, 1), &make(1, 0)));
        assert!(!same_endpoints(&make(0, 1), &make(0, 2)));
    }

    #[test]
    fn test_direction_from_either_endpoint() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::new(2.0, 0.0), 0.0);
        let path = graph.connect(a, b).unwrap();

        assert_eq!(graph.direction_from(path, a), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(graph.direction_from(path, b), Some(Vec2::new(-2.0, 0.0)));
        assert_eq!(graph.direction_from(path, 99), None);
    }

    #[test]
    fn test_tangent_undefined_until_prepared() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::new(2.0, 0.0), 0.0);
        let path = graph.connect(a, b).unwrap();

        assert!(graph.tangent_at(path, PathEnd::First).is_none());

        graph.prepare_continuous_curves(&TangentConfig::default(), 42);
        assert!(graph.tangent_at(path, PathEnd::First).is_some());
    }

    #[test]
    fn test_prepared_tangents_mirror_across_junction() {
        // Three collinear nodes; the second path should continue the first
        // one's tangent through the middle node.
        let mut graph = PathGraph::new();
        let left = graph.add_node(Vec2::new(-1.0, 0.0), 0.0);
        let middle = graph.add_node(Vec2::ZERO, 0.0);
        let right = graph.add_node(Vec2::new(1.0, 0.0), 0.0);

        let first = graph.connect(left, middle).unwrap();
        let second = graph.connect(middle, right).unwrap();

        let config = TangentConfig {
            angle_variation: 0.0,
            min_magnitude: 1.0,
            max_magnitude: 1.0,
            ..Default::default()
        };
        graph.prepare_continuous_curves(&config, 42);

        let incoming = graph.tangent_at(first, PathEnd::Second).unwrap();
        let outgoing = graph.tangent_at(second, PathEnd::First).unwrap();

        assert!(
            (incoming + outgoing).length() < 1e-4,
            "tangents at the junction should be mirrored: {:?} vs {:?}",
            incoming,
            outgoing
        );
    }

    #[test]
    fn test_fallback_uses_preferred_direction() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::new(3.0, 1.0), 0.0);
        let path = graph.connect(a, b).unwrap();

        let config = TangentConfig {
            preferred_direction: Vec2::new(1.0, 0.0),
            angle_variation: 0.0,
            min_magnitude: 1.0,
            max_magnitude: 1.0,
            ..Default::default()
        };
        graph.prepare_continuous_curves(&config, 42);

        // The projection of the path direction onto +X is along +X.
        let tangent = graph.tangent_at(path, PathEnd::First).unwrap();
        assert!(tangent.x > 0.99 && tangent.y.abs() < 1e-4, "got {:?}", tangent);
    }

    #[test]
    fn test_draw_straight_line() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 1.5);
        let b = graph.add_node(Vec2::new(4.0, 0.0), 2.5);
        graph.connect(a, b);

        graph.draw(&DrawConfig::default().style(PathStyle::StraightLine), 1);

        let polyline = &graph.paths()[0].polyline;
        assert_eq!(polyline.len(), 2);
        assert_eq!(polyline[0], Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(polyline[1], Vec3::new(4.0, 2.5, 0.0));
    }

    #[test]
    fn test_draw_continuous_simple() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 1.0);
        let b = graph.add_node(Vec2::new(8.0, 2.0), 2.0);
        graph.connect(a, b);

        graph.prepare_continuous_curves(&TangentConfig::default(), 7);
        graph.draw(&DrawConfig::default().subdivisions(10), 7);

        let polyline = &graph.paths()[0].polyline;
        assert_eq!(polyline.len(), 11);
        assert!((polyline[0] - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);
        assert!((polyline[10] - Vec3::new(8.0, 2.0, 2.0)).length() < 1e-2);
    }

    #[test]
    fn test_draw_sectioned_builds_tree() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::new(10.0, 5.0), 0.0);
        graph.connect(a, b);

        graph.prepare_continuous_curves(&TangentConfig::default(), 3);
        graph.draw(
            &DrawConfig::default().style(PathStyle::ContinuousSectioned),
            3,
        );

        let path = &graph.paths()[0];
        let sections = path.sections.as_ref().expect("section tree should exist");
        assert_eq!(sections.leaf_count(), 3);
        assert!(!path.polyline.is_empty());
    }

    #[test]
    fn test_draw_deterministic() {
        let build = || {
            let mut graph = PathGraph::new();
            let a = graph.add_node(Vec2::ZERO, 0.0);
            let b = graph.add_node(Vec2::new(5.0, 5.0), 0.0);
            let c = graph.add_node(Vec2::new(10.0, 0.0), 0.0);
            graph.connect(a, b);
            graph.connect(b, c);
            graph.prepare_continuous_curves(&TangentConfig::default(), 11);
            graph.draw(&DrawConfig::default().style(PathStyle::RandomCurve), 11);
            graph
        };

        let g1 = build();
        let g2 = build();

        for (p1, p2) in g1.paths().iter().zip(g2.paths().iter()) {
            assert_eq!(p1.polyline, p2.polyline);
        }
    }

    #[test]
    fn test_drawn_polylines_skips_undrawn() {
        let mut graph = PathGraph::new();
        let a = graph.add_node(Vec2::ZERO, 0.0);
        let b = graph.add_node(Vec2::ONE, 0.0);
        graph.connect(a, b);

        assert!(graph.drawn_polylines().is_empty());

        graph.draw(&DrawConfig::default().style(PathStyle::StraightLine), 1);
        assert_eq!(graph.drawn_polylines().len(), 1);
    }
}
