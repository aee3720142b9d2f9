//! Poisson-disc point distribution in a rectangular zone.
//!
//! Generates points that are never closer than a minimum radius while
//! approximating uniform density, using a background grid for rejection
//! testing (each grid cell can hold at most one accepted point).
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use loam_scatter::poisson_disc;
//!
//! let points = poisson_disc(5.0, Vec2::ZERO, Vec2::splat(50.0), 42, 30);
//!
//! for (i, a) in points.iter().enumerate() {
//!     for b in &points[i + 1..] {
//!         assert!(a.distance(*b) >= 5.0 * 0.999);
//!     }
//! }
//! ```

use glam::Vec2;

/// Default number of failed candidates before an active point is retired.
pub const DEFAULT_MAX_ATTEMPTS: usize = 30;

/// Configuration for Poisson-disc sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoissonConfig {
    /// Minimum distance between any two accepted points.
    pub radius: f32,
    /// Center of the rectangular sampling zone.
    pub origin: Vec2,
    /// Dimensions of the sampling zone.
    pub zone_size: Vec2,
    /// Random seed.
    pub seed: u64,
    /// Failed candidates per active point before it is retired.
    pub max_attempts: usize,
}

impl PoissonConfig {
    /// Creates a configuration centered on `origin`.
    pub fn new(radius: f32, origin: Vec2, zone_size: Vec2) -> Self {
        Self {
            radius,
            origin,
            zone_size,
            seed: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the rejection attempt count.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Runs the sampler with this configuration.
    pub fn sample(&self) -> Vec<Vec2> {
        poisson_disc(
            self.radius,
            self.origin,
            self.zone_size,
            self.seed,
            self.max_attempts,
        )
    }
}

/// Generates Poisson-disc points in a rectangular zone centered on `origin`.
///
/// No two returned points are closer than `radius`. Sampling starts from the
/// zone center and grows outwards: each iteration picks a random active point,
/// proposes up to `max_attempts` candidates at a random angle and a distance
/// in `[radius, 2 * radius]`, and accepts the first candidate that stays in
/// the zone and clears the minimum distance against its grid neighborhood.
/// An active point is retired once all its attempts fail; sampling stops when
/// no active points remain.
///
/// Returns an empty list for a non-positive radius or an empty zone.
/// Deterministic for a fixed seed.
pub fn poisson_disc(
    radius: f32,
    origin: Vec2,
    zone_size: Vec2,
    seed: u64,
    max_attempts: usize,
) -> Vec<Vec2> {
    if radius <= 0.0 || zone_size.x <= 0.0 || zone_size.y <= 0.0 {
        return Vec::new();
    }

    let mut rng = Rng::new(seed);

    // The radius is the hypotenuse of the cell diagonal, so a cell can never
    // hold two valid points.
    let cell_size = radius / std::f32::consts::SQRT_2;
    let grid_width = (zone_size.x / cell_size).ceil() as usize + 1;
    let grid_height = (zone_size.y / cell_size).ceil() as usize + 1;
    let mut grid: Vec<Option<usize>> = vec![None; grid_width * grid_height];

    let cell_of = |p: Vec2| -> (usize, usize) {
        (
            ((p.x / cell_size) as usize).min(grid_width - 1),
            ((p.y / cell_size) as usize).min(grid_height - 1),
        )
    };

    let mut points: Vec<Vec2> = Vec::new();
    // Candidate spawn centers, indices into `points` plus the zone center.
    let mut active: Vec<Vec2> = vec![zone_size / 2.0];

    while !active.is_empty() {
        let active_index = (rng.next_u64() as usize) % active.len();
        let spawn_center = active[active_index];

        let mut accepted = false;

        for _ in 0..max_attempts {
            let angle = rng.range(0.0, std::f32::consts::TAU);
            let distance = rng.range(radius, radius * 2.0);
            let candidate = spawn_center + distance * Vec2::new(angle.cos(), angle.sin());

            if candidate.x < 0.0
                || candidate.x >= zone_size.x
                || candidate.y < 0.0
                || candidate.y >= zone_size.y
            {
                continue;
            }

            let (cx, cy) = cell_of(candidate);

            // A conflicting point can be at most two cells away.
            let mut valid = true;
            'neighborhood: for dy in -2i32..=2 {
                for dx in -2i32..=2 {
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;

                    if nx < 0 || ny < 0 || nx >= grid_width as i32 || ny >= grid_height as i32 {
                        continue;
                    }

                    if let Some(index) = grid[ny as usize * grid_width + nx as usize] {
                        if candidate.distance_squared(points[index]) < radius * radius {
                            valid = false;
                            break 'neighborhood;
                        }
                    }
                }
            }

            if valid {
                let (cx, cy) = cell_of(candidate);
                grid[cy * grid_width + cx] = Some(points.len());
                points.push(candidate);
                active.push(candidate);
                accepted = true;
                break;
            }
        }

        if !accepted {
            active.swap_remove(active_index);
        }
    }

    // Re-center the zone on the requested origin.
    let translation = origin - zone_size / 2.0;
    for point in &mut points {
        *point += translation;
    }

    points
}

/// Simple LCG random number generator for deterministic sampling.
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
