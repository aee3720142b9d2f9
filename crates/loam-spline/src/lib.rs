//! Cubic Bezier evaluation, arclength-uniform resampling, and recursive
//! path sectioning.
//!
//! Curves are sampled at parameter values remapped from uniform arclength
//! fractions, so output points are evenly spaced by distance traveled rather
//! than by the raw curve parameter. [`PathSection`] splits a curve into a tree
//! of tangent-continuous subsections to add higher-frequency detail.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use loam_spline::sample_even;
//!
//! let points = sample_even(
//!     Vec3::ZERO,
//!     Vec3::new(10.0, 0.0, 0.0),
//!     Vec3::new(2.0, 0.0, 4.0),
//!     Vec3::new(8.0, 0.0, -4.0),
//!     20,
//! );
//! assert_eq!(points.len(), 21);
//! ```

use glam::Vec3;

/// Default number of segments a curve section is sampled into.
pub const DEFAULT_SECTION_SUBDIVISIONS: usize = 20;

/// Number of uniform-parameter steps used to estimate curve length.
const LENGTH_ESTIMATE_STEPS: usize = 20;

/// Reference ceiling for recursion depth when scaling subsection tangents.
const MAX_RECURSION_WEIGHT: f32 = 4.0;

/// Trait for types that can be interpolated along a curve.
pub trait Interpolatable:
    Clone
    + Copy
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<f32, Output = Self>
{
}

impl Interpolatable for f32 {}
impl Interpolatable for glam::Vec2 {}
impl Interpolatable for Vec3 {}

/// Linear interpolation between two values.
#[inline]
pub fn lerp<T: Interpolatable>(a: T, b: T, t: f32) -> T {
    a * (1.0 - t) + b * t
}

/// A cubic Bezier curve segment.
///
/// Defined by 4 control points: start (P0), control 1 (P1), control 2 (P2),
/// end (P3). The curve passes through P0 and P3, and is influenced by P1 and P2.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBezier<T: Interpolatable> {
    /// Start point.
    pub p0: T,
    /// First control point.
    pub p1: T,
    /// Second control point.
    pub p2: T,
    /// End point.
    pub p3: T,
}

impl<T: Interpolatable> CubicBezier<T> {
    /// Creates a new cubic Bezier curve.
    pub fn new(p0: T, p1: T, p2: T, p3: T) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluates the curve at parameter t (0 to 1).
    pub fn evaluate(&self, t: f32) -> T {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        // B(t) = (1-t)³P0 + 3(1-t)²tP1 + 3(1-t)t²P2 + t³P3
        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }

    /// Evaluates the derivative (tangent) at parameter t.
    pub fn derivative(&self, t: f32) -> T {
        let t2 = t * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;

        // B'(t) = 3(1-t)²(P1-P0) + 6(1-t)t(P2-P1) + 3t²(P3-P2)
        (self.p1 - self.p0) * (3.0 * mt2)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t2)
    }

    /// Splits the curve at parameter t into two curves.
    pub fn split(&self, t: f32) -> (Self, Self) {
        // De Casteljau's algorithm
        let p01 = lerp(self.p0, self.p1, t);
        let p12 = lerp(self.p1, self.p2, t);
        let p23 = lerp(self.p2, self.p3, t);

        let p012 = lerp(p01, p12, t);
        let p123 = lerp(p12, p23, t);

        let p0123 = lerp(p012, p123, t);

        (
            Self::new(self.p0, p01, p012, p0123),
            Self::new(p0123, p123, p23, self.p3),
        )
    }
}

// ============================================================================
// Arclength parameterization
// ============================================================================

/// Builds a section curve from endpoints and tangent modifiers.
fn section_curve(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3) -> CubicBezier<Vec3> {
    CubicBezier::new(p1, m1, m2, p2)
}

/// Estimates the length of a curve by summing a uniform-parameter polyline.
pub fn arc_length(curve: &CubicBezier<Vec3>, steps: usize) -> f32 {
    *cumulative_distances(curve, steps.max(1)).last().unwrap()
}

/// Accumulated distances at `steps + 1` uniform parameter values.
fn cumulative_distances(curve: &CubicBezier<Vec3>, steps: usize) -> Vec<f32> {
    let mut distances = Vec::with_capacity(steps + 1);
    distances.push(0.0);

    let mut previous = curve.evaluate(0.0);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let point = curve.evaluate(t);
        let travelled = distances[i - 1] + previous.distance(point);
        distances.push(travelled);
        previous = point;
    }

    distances
}

/// Inverts the distance table: parameter t at which `distance` has been
/// travelled, interpolated between table entries.
fn t_at_distance(distances: &[f32], distance: f32) -> f32 {
    let total = *distances.last().unwrap();
    if total <= 0.0 || distance <= 0.0 {
        return 0.0;
    }
    if distance >= total {
        return 1.0;
    }

    let segments = distances.len() - 1;
    let upper = distances.partition_point(|&d| d < distance).max(1);
    let d0 = distances[upper - 1];
    let d1 = distances[upper];
    let within = if d1 > d0 { (distance - d0) / (d1 - d0) } else { 0.0 };

    ((upper - 1) as f32 + within) / segments as f32
}

/// Samples a curve section into `subdivisions + 1` points evenly spaced by
/// arclength.
///
/// `p1`/`p2` are the endpoints, `m1`/`m2` the tangent control points. The
/// curve length is first estimated from a uniform-parameter polyline, then
/// each output point looks up the parameter that reaches its distance along
/// the curve. Passing 0 subdivisions uses [`DEFAULT_SECTION_SUBDIVISIONS`].
pub fn sample_even(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3, subdivisions: usize) -> Vec<Vec3> {
    let steps = if subdivisions == 0 {
        DEFAULT_SECTION_SUBDIVISIONS
    } else {
        subdivisions
    };

    let curve = section_curve(p1, p2, m1, m2);
    let distances = cumulative_distances(&curve, LENGTH_ESTIMATE_STEPS);
    let total = *distances.last().unwrap();
    let step = total / steps as f32;

    (0..=steps)
        .map(|i| curve.evaluate(t_at_distance(&distances, i as f32 * step)))
        .collect()
}

/// Samples a curve section at uniform parameter values (for comparison with
/// the arclength-uniform sampler).
pub fn sample_uniform_t(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3, subdivisions: usize) -> Vec<Vec3> {
    let steps = subdivisions.max(1);
    let curve = section_curve(p1, p2, m1, m2);

    (0..=steps)
        .map(|i| curve.evaluate(i as f32 / steps as f32))
        .collect()
}

/// Returns the curve point and (unnormalized) tangent at parameter t.
pub fn point_and_tangent(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3, t: f32) -> (Vec3, Vec3) {
    let curve = section_curve(p1, p2, m1, m2);
    (curve.evaluate(t), curve.derivative(t))
}

// ============================================================================
// Recursive path sectioning
// ============================================================================

/// Configuration for recursive curve sectioning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionConfig {
    /// Number of subsections a curve is split into at each level.
    pub sections_per_level: usize,
    /// How many levels of subsections to create.
    pub recursion_levels: u32,
    /// Maximum angular jitter (radians) applied to subsection tangents,
    /// scaled down at deeper levels.
    pub max_angle_variation: f32,
    /// Extra scale on subsection tangent magnitudes.
    pub tangent_multiplier: f32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            sections_per_level: 3,
            recursion_levels: 1,
            max_angle_variation: 120f32.to_radians(),
            tangent_multiplier: 2.0,
        }
    }
}

/// A recursive curve section: endpoints, tangent modifiers, and child
/// subsections (empty at the deepest level).
///
/// The tree is built once per path and discarded wholesale when the path is
/// regenerated.
#[derive(Debug, Clone)]
pub struct PathSection {
    /// Section start point.
    pub p1: Vec3,
    /// Section end point.
    pub p2: Vec3,
    /// Tangent control at the start.
    pub m1: Vec3,
    /// Tangent control at the end.
    pub m2: Vec3,
    /// Child subsections, in curve order.
    pub children: Vec<PathSection>,
}

impl PathSection {
    /// Builds a section tree over the given curve, splitting recursively for
    /// `config.recursion_levels` levels. Deterministic for a fixed seed.
    pub fn subdivide(
        p1: Vec3,
        p2: Vec3,
        m1: Vec3,
        m2: Vec3,
        config: &SectionConfig,
        seed: u64,
    ) -> Self {
        let mut rng = Rng::new(seed);
        Self::build(p1, p2, m1, m2, config, config.recursion_levels, &mut rng)
    }

    fn build(
        p1: Vec3,
        p2: Vec3,
        m1: Vec3,
        m2: Vec3,
        config: &SectionConfig,
        depth: u32,
        rng: &mut Rng,
    ) -> Self {
        let mut section = Self {
            p1,
            p2,
            m1,
            m2,
            children: Vec::new(),
        };

        if depth > 0 && config.sections_per_level > 1 {
            section.split(config, depth, rng);
        }

        section
    }

    /// Splits this section into `config.sections_per_level` children of
    /// tentatively equal arclength, keeping tangent continuity at the cuts.
    fn split(&mut self, config: &SectionConfig, depth: u32, rng: &mut Rng) {
        let count = config.sections_per_level;
        let time_increment = 1.0 / count as f32;

        // Subsection tangents shrink with the section count and with depth.
        let count_weight = 1.0 / count as f32;
        let average_parent_tangent =
            (self.p1.distance(self.m1) + self.p2.distance(self.m2)) / 2.0;
        let depth_weight = (depth as f32 + 1.0) / MAX_RECURSION_WEIGHT;
        let angle_range = config.max_angle_variation * depth_weight;

        let mut section_p1 = self.p1;
        let mut section_m1 =
            self.p1 + (self.m1 - self.p1) * count_weight * config.tangent_multiplier;

        let child_depth = depth - 1;
        let mut time = time_increment;

        for i in 0..count {
            if i != count - 1 {
                let (section_p2, tangent_direction) =
                    point_and_tangent(self.p1, self.p2, self.m1, self.m2, time);

                // Match the parent's tangent magnitude, jitter the direction,
                // then shrink for this level.
                let mut tangent =
                    tangent_direction.normalize_or_zero() * average_parent_tangent;
                tangent = rotate_about_y(tangent, rng.range(-angle_range / 2.0, angle_range / 2.0))
                    * config.tangent_multiplier;
                tangent *= count_weight * depth_weight;

                let section_m2 = section_p2 - tangent;

                self.children.push(Self::build(
                    section_p1,
                    section_p2,
                    section_m1,
                    section_m2,
                    config,
                    child_depth,
                    rng,
                ));

                section_p1 = section_p2;
                section_m1 = section_p2 + tangent;
            } else {
                // The last child inherits the parent's end tangent, shortened.
                let section_m2 = self.p2
                    + (self.m2 - self.p2) * config.tangent_multiplier * count_weight * depth_weight;

                self.children.push(Self::build(
                    section_p1,
                    self.p2,
                    section_m1,
                    section_m2,
                    config,
                    child_depth,
                    rng,
                ));
            }

            time += time_increment;
        }
    }

    /// Returns true if this section has no subsections.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of leaf sections in this tree.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(PathSection::leaf_count).sum()
        }
    }

    /// Flattens the leaf sections into one renderable polyline.
    ///
    /// Each leaf is sampled with `points_per_section` subdivisions; every
    /// section after the first drops its first point so shared joints are not
    /// duplicated.
    pub fn flatten(&self, points_per_section: usize) -> Vec<Vec3> {
        let mut points = Vec::new();
        self.collect_points(points_per_section, &mut points);
        points
    }

    fn collect_points(&self, points_per_section: usize, points: &mut Vec<Vec3>) {
        if !self.is_leaf() {
            for child in &self.children {
                child.collect_points(points_per_section, points);
            }
        } else {
            let section_points =
                sample_even(self.p1, self.p2, self.m1, self.m2, points_per_section);
            if points.is_empty() {
                points.extend(section_points);
            } else {
                points.extend(section_points.into_iter().skip(1));
            }
        }
    }
}

/// Rotates a vector around the vertical (Y) axis.
fn rotate_about_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

/// Simple LCG random number generator for deterministic jitter.
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

    fn curvy() -> (Vec3, Vec3, Vec3, Vec3) {
        (
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 8.0),
            Vec3::new(9.0, 0.0, -8.0),
        )
    }

    #[test]
    fn test_cubic_bezier_endpoints() {
        let curve = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );

        assert!((curve.evaluate(0.0) - Vec3::ZERO).length() < 0.001);
        assert!((curve.evaluate(1.0) - Vec3::new(1.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_cubic_bezier_straight_midpoint() {
        let curve = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(0.333, 0.0, 0.0),
            Vec3::new(0.666, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );

        let mid = curve.evaluate(0.5);
        assert!((mid.x - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_cubic_bezier_split() {
        let curve = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );

        let (left, right) = curve.split(0.5);

        let split_point = curve.evaluate(0.5);
        assert!((left.evaluate(1.0) - split_point).length() < 0.001);
        assert!((right.evaluate(0.0) - split_point).length() < 0.001);
    }

    #[test]
    fn test_f32_interpolation() {
        let curve = CubicBezier::new(0.0_f32, 0.25, 0.75, 1.0);

        assert!((curve.evaluate(0.0) - 0.0).abs() < 0.001);
        assert!((curve.evaluate(1.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_even_count_and_endpoints() {
        let (p1, p2, m1, m2) = curvy();
        let points = sample_even(p1, p2, m1, m2, 15);

        assert_eq!(points.len(), 16);
        assert!((points[0] - p1).length() < 0.001);
        assert!((points[15] - p2).length() < 0.01);
    }

    #[test]
    fn test_sample_even_zero_uses_default() {
        let (p1, p2, m1, m2) = curvy();
        let points = sample_even(p1, p2, m1, m2, 0);

        assert_eq!(points.len(), DEFAULT_SECTION_SUBDIVISIONS + 1);
    }

    fn spacing_variance(points: &[Vec3]) -> f32 {
        let spacings: Vec<f32> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
        let mean = spacings.iter().sum::<f32>() / spacings.len() as f32;
        spacings.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / spacings.len() as f32
    }

    #[test]
    fn test_arclength_sampling_is_more_even_than_uniform_t() {
        let (p1, p2, m1, m2) = curvy();

        let even = sample_even(p1, p2, m1, m2, 20);
        let naive = sample_uniform_t(p1, p2, m1, m2, 20);

        assert!(
            spacing_variance(&even) < spacing_variance(&naive),
            "arclength sampling should space points more evenly: {} vs {}",
            spacing_variance(&even),
            spacing_variance(&naive)
        );
    }

    #[test]
    fn test_t_at_distance_monotonic() {
        let (p1, p2, m1, m2) = curvy();
        let curve = CubicBezier::new(p1, m1, m2, p2);
        let distances = cumulative_distances(&curve, 20);
        let total = *distances.last().unwrap();

        let mut previous = -1.0;
        for i in 0..=40 {
            let t = t_at_distance(&distances, total * i as f32 / 40.0);
            assert!(t >= previous, "t must not decrease along the curve");
            assert!((0.0..=1.0).contains(&t));
            previous = t;
        }
    }

    #[test]
    fn test_arc_length_of_straight_line() {
        let curve = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        );

        assert!((arc_length(&curve, 20) - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_subdivide_leaf_count() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig {
            sections_per_level: 3,
            recursion_levels: 2,
            ..Default::default()
        };

        let root = PathSection::subdivide(p1, p2, m1, m2, &config, 42);
        assert_eq!(root.leaf_count(), 9);
        assert_eq!(root.children.len(), 3);
    }

    #[test]
    fn test_subdivide_zero_depth_is_leaf() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig {
            recursion_levels: 0,
            ..Default::default()
        };

        let root = PathSection::subdivide(p1, p2, m1, m2, &config, 42);
        assert!(root.is_leaf());
    }

    #[test]
    fn test_subdivide_children_are_contiguous() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig::default();

        let root = PathSection::subdivide(p1, p2, m1, m2, &config, 7);

        assert!((root.children[0].p1 - p1).length() < 1e-4);
        assert!((root.children.last().unwrap().p2 - p2).length() < 1e-4);
        for pair in root.children.windows(2) {
            assert!(
                (pair[0].p2 - pair[1].p1).length() < 1e-4,
                "adjacent sections must share their joint"
            );
        }
    }

    #[test]
    fn test_subdivide_tangent_continuity_at_joints() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig::default();

        let root = PathSection::subdivide(p1, p2, m1, m2, &config, 7);

        // At each interior joint the outgoing tangent mirrors the incoming one.
        for pair in root.children.windows(2) {
            let incoming = pair[0].p2 - pair[0].m2;
            let outgoing = pair[1].m1 - pair[1].p1;
            assert!(
                (incoming - outgoing).length() < 1e-4,
                "joint tangents should be mirrored: {:?} vs {:?}",
                incoming,
                outgoing
            );
        }
    }

    #[test]
    fn test_flatten_point_count_and_joints() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig {
            sections_per_level: 3,
            recursion_levels: 1,
            ..Default::default()
        };

        let root = PathSection::subdivide(p1, p2, m1, m2, &config, 3);
        let points = root.flatten(5);

        // First section keeps all 6 points, the remaining two skip their first.
        assert_eq!(points.len(), 6 + 5 + 5);
        assert!((points[0] - p1).length() < 1e-3);
        assert!((*points.last().unwrap() - p2).length() < 1e-2);
    }

    #[test]
    fn test_subdivide_deterministic() {
        let (p1, p2, m1, m2) = curvy();
        let config = SectionConfig::default();

        let a = PathSection::subdivide(p1, p2, m1, m2, &config, 99).flatten(5);
        let b = PathSection::subdivide(p1, p2, m1, m2, &config, 99).flatten(5);

        assert_eq!(a, b);
    }

    #[test]
    fn test_rotate_about_y_preserves_length() {
        let v = Vec3::new(3.0, 1.0, -2.0);
        let rotated = rotate_about_y(v, 1.2);

        assert!((rotated.length() - v.length()).abs() < 1e-4);
        assert!((rotated.y - v.y).abs() < 1e-6);
    }
}
