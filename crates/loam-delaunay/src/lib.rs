//! Delaunay triangulation and pruned edge extraction.
//!
//! Implements the Bowyer-Watson algorithm (insert points one by one, retriangulate
//! the cavity of circumcircle violations) and derives from the triangulation the
//! set of undirected edges used as path topology, discarding edges much longer
//! than the average.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use loam_delaunay::{shorter_edges, triangulate};
//!
//! let points = vec![
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(1.0, 0.0),
//!     Vec2::new(0.5, 1.0),
//!     Vec2::new(0.5, 0.5),
//! ];
//!
//! let triangles = triangulate(&points);
//! let edges = shorter_edges(&points, 0.6);
//! assert!(!edges.is_empty());
//! ```

use glam::Vec2;
use std::collections::HashSet;

/// A triangle defined by three vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// First vertex index.
    pub a: usize,
    /// Second vertex index.
    pub b: usize,
    /// Third vertex index.
    pub c: usize,
}

impl Triangle {
    /// Creates a new triangle.
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    /// Returns the vertices as an array.
    pub fn vertices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// Returns the edges as normalized undirected pairs.
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.c, self.a),
        ]
    }

    /// Checks if the triangle contains a vertex index.
    pub fn contains_vertex(&self, v: usize) -> bool {
        self.a == v || self.b == v || self.c == v
    }
}

/// An undirected edge between two point indices.
///
/// The endpoints are stored sorted, so an edge and its reverse compare equal
/// and collapse to one entry in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Smaller vertex index.
    pub a: usize,
    /// Larger vertex index.
    pub b: usize,
}

impl Edge {
    /// Creates an edge, normalizing the endpoint order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a: a.min(b),
            b: a.max(b),
        }
    }

    /// Returns the length of this edge over the given point set.
    pub fn length(&self, points: &[Vec2]) -> f32 {
        points[self.a].distance(points[self.b])
    }
}

/// Computes the Delaunay triangulation of a set of points.
///
/// Input coordinates are first normalized to the unit square for numeric
/// stability; the returned triangles index into the original slice, so no
/// un-normalization of positions is needed. Returns an empty list for fewer
/// than three points.
pub fn triangulate(points: &[Vec2]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    let normalized = normalize(points);

    // Super-triangle that contains every normalized point.
    let super_tri = create_super_triangle(&normalized);

    let n = normalized.len();
    let mut all_points = normalized;
    all_points.extend_from_slice(&super_tri);

    let mut triangles = vec![TriangleInternal {
        a: n,
        b: n + 1,
        c: n + 2,
    }];

    // Insert each point, carving out the cavity of violated circumcircles.
    for i in 0..n {
        let point = all_points[i];

        let mut bad_triangles = Vec::new();
        for (ti, tri) in triangles.iter().enumerate() {
            let (center, radius_sq) = circumcircle(&all_points, tri);
            if (point - center).length_squared() <= radius_sq + 1e-9 {
                bad_triangles.push(ti);
            }
        }

        // Boundary of the polygonal hole: edges not shared by two bad triangles.
        let mut polygon = Vec::new();
        for &ti in &bad_triangles {
            let tri = &triangles[ti];
            let edges = [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)];

            for edge in edges {
                let is_shared = bad_triangles.iter().any(|&other_ti| {
                    if other_ti == ti {
                        return false;
                    }
                    let other = &triangles[other_ti];
                    let other_edges = [(other.a, other.b), (other.b, other.c), (other.c, other.a)];
                    other_edges.contains(&edge) || other_edges.contains(&(edge.1, edge.0))
                });

                if !is_shared {
                    polygon.push(edge);
                }
            }
        }

        bad_triangles.sort_unstable();
        for ti in bad_triangles.into_iter().rev() {
            triangles.swap_remove(ti);
        }

        for (e1, e2) in polygon {
            triangles.push(TriangleInternal { a: e1, b: e2, c: i });
        }
    }

    // Drop everything still attached to the super-triangle.
    triangles.retain(|tri| tri.a < n && tri.b < n && tri.c < n);

    triangles
        .into_iter()
        .map(|t| Triangle::new(t.a, t.b, t.c))
        .collect()
}

/// Returns the unique undirected edges of the triangulation of `points`.
pub fn triangulation_edges(points: &[Vec2]) -> Vec<Edge> {
    let triangles = triangulate(points);

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for tri in &triangles {
        for edge in tri.edges() {
            if seen.insert(edge) {
                edges.push(edge);
            }
        }
    }

    edges
}

/// Returns the triangulation edges no longer than `(1 + max_length_proportion)`
/// times the mean edge length.
///
/// A raw triangulation connects every point into a planar mesh that includes
/// long hull-spanning edges; the length filter removes those implausible
/// connections while keeping local ones. Returns an empty list for fewer than
/// three points.
pub fn shorter_edges(points: &[Vec2], max_length_proportion: f32) -> Vec<Edge> {
    let mut edges = triangulation_edges(points);
    if edges.is_empty() {
        return edges;
    }

    let average: f32 =
        edges.iter().map(|e| e.length(points)).sum::<f32>() / edges.len() as f32;
    let max_length = average * (1.0 + max_length_proportion);

    edges.retain(|e| e.length(points) <= max_length);
    edges
}

/// Internal triangle representation (may reference super-triangle vertices).
#[derive(Clone, Copy)]
struct TriangleInternal {
    a: usize,
    b: usize,
    c: usize,
}

/// Rescales points into the unit square.
fn normalize(points: &[Vec2]) -> Vec<Vec2> {
    let mut min = points[0];
    let mut max = points[0];
    for &p in points {
        min = min.min(p);
        max = max.max(p);
    }

    let extent = (max - min).max_element().max(1e-6);
    points.iter().map(|&p| (p - min) / extent).collect()
}

/// Creates a super-triangle that contains all points.
fn create_super_triangle(points: &[Vec2]) -> [Vec2; 3] {
    let mut min = points[0];
    let mut max = points[0];
    for &p in points {
        min = min.min(p);
        max = max.max(p);
    }

    let delta_max = (max - min).max_element().max(1.0);
    let mid = (min + max) / 2.0;

    [
        Vec2::new(mid.x - 20.0 * delta_max, mid.y - delta_max),
        Vec2::new(mid.x, mid.y + 20.0 * delta_max),
        Vec2::new(mid.x + 20.0 * delta_max, mid.y - delta_max),
    ]
}

/// Computes circumcircle center and squared radius.
fn circumcircle(points: &[Vec2], tri: &TriangleInternal) -> (Vec2, f32) {
    let a = points[tri.a];
    let b = points[tri.b];
    let c = points[tri.c];

    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));

    if d.abs() < 1e-10 {
        // Degenerate triangle (collinear points).
        let center = (a + b + c) / 3.0;
        let radius_sq = (a - center)
            .length_squared()
            .max((b - center).length_squared());
        return (center, radius_sq);
    }

    let a_sq = a.x * a.x + a.y * a.y;
    let b_sq = b.x * b.x + b.y * b.y;
    let c_sq = c.x * c.x + c.y * c.y;

    let ux = (a_sq * (b.y - c.y) + b_sq * (c.y - a.y) + c_sq * (a.y - b.y)) / d;
    let uy = (a_sq * (c.x - b.x) + b_sq * (a.x - c.x) + c_sq * (b.x - a.x)) / d;

    let center = Vec2::new(ux, uy);
    let radius_sq = (a - center).length_squared();

    (center, radius_sq)
}
