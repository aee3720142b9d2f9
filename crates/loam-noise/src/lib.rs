//! Perlin noise and layered heightmap synthesis.
//!
//! Provides classic gradient noise plus the octave-composited heightmap
//! generation used as the first stage of terrain generation.
//!
//! # Example
//!
//! ```
//! use loam_noise::{HeightMapConfig, generate_height_map};
//!
//! let config = HeightMapConfig::new(65, 65)
//!     .seed(42)
//!     .scale(25.0)
//!     .octaves(4);
//!
//! let map = generate_height_map(&config);
//! assert!(map.values().iter().all(|h| (0.0..=1.0).contains(h)));
//! ```

use glam::Vec2;

// =============================================================================
// Noise trait
// =============================================================================

/// Trait for 2D noise functions.
pub trait Noise2D {
    /// Samples the noise at position (x, y). Returns a value in [0, 1].
    fn sample(&self, x: f32, y: f32) -> f32;

    /// Samples the noise at position p.
    fn sample_vec(&self, p: Vec2) -> f32 {
        self.sample(p.x, p.y)
    }

    /// Samples the noise, returning a value in [-1, 1].
    fn sample_signed(&self, x: f32, y: f32) -> f32 {
        self.sample(x, y) * 2.0 - 1.0
    }
}

// =============================================================================
// Internal: permutation table and helpers
// =============================================================================

/// Permutation table for noise functions.
/// Classic permutation from Ken Perlin's reference implementation.
const PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn perm(x: i32, seed: i32) -> u8 {
    PERM[((x.wrapping_add(seed)) & 255) as usize]
}

#[inline]
fn grad2(hash: u8, x: f32, y: f32) -> f32 {
    let h = hash & 7;
    let u = if h < 4 { x } else { y };
    let v = if h < 4 { y } else { x };
    (if h & 1 != 0 { -u } else { u }) + (if h & 2 != 0 { -2.0 * v } else { 2.0 * v })
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

// =============================================================================
// Perlin noise
// =============================================================================

/// 2D Perlin (gradient) noise.
///
/// Classic gradient noise with smooth interpolation.
/// Returns values in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Perlin2D {
    /// Random seed for the noise.
    pub seed: i32,
}

impl Perlin2D {
    /// Creates a new Perlin noise with default seed (0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Perlin noise with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self { seed }
    }
}

impl Noise2D for Perlin2D {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let xi = x.floor() as i32;
        let yi = y.floor() as i32;

        let xf = x - x.floor();
        let yf = y - y.floor();

        let u = fade(xf);
        let v = fade(yf);

        let aa = perm(perm(xi, self.seed) as i32 + yi, self.seed);
        let ab = perm(perm(xi, self.seed) as i32 + yi + 1, self.seed);
        let ba = perm(perm(xi + 1, self.seed) as i32 + yi, self.seed);
        let bb = perm(perm(xi + 1, self.seed) as i32 + yi + 1, self.seed);

        let x1 = lerp(grad2(aa, xf, yf), grad2(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad2(ab, xf, yf - 1.0), grad2(bb, xf - 1.0, yf - 1.0), u);

        (lerp(x1, x2, v) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

// =============================================================================
// Heightmap
// =============================================================================

/// A normalized heightmap produced by layered noise sampling.
///
/// Stores one value in [0, 1] per grid vertex, row-major. A map of
/// `(w + 1) x (h + 1)` vertices describes a `w x h` quad grid. The map is
/// created once per generation pass and not mutated afterwards; carving
/// operates on the derived mesh instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightMap {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl HeightMap {
    /// Creates a heightmap from raw values (row-major, `width * height` long).
    pub fn from_values(values: Vec<f32>, width: usize, height: usize) -> Self {
        assert_eq!(values.len(), width * height);
        Self {
            values,
            width,
            height,
        }
    }

    /// Width in vertices.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in vertices.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the value at (x, y), or 0.0 outside the grid.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.values[y * self.width + x]
        } else {
            0.0
        }
    }

    /// Returns the raw values, row-major.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Samples the map with bilinear interpolation at normalized (u, v).
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = u.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let y = v.clamp(0.0, 1.0) * (self.height - 1) as f32;

        let x0 = (x.floor() as usize).min(self.width - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y0 = (y.floor() as usize).min(self.height - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x.floor();
        let fy = y - y.floor();

        let h00 = self.get(x0, y0);
        let h10 = self.get(x1, y0);
        let h01 = self.get(x0, y1);
        let h11 = self.get(x1, y1);

        let h0 = h00 + (h10 - h00) * fx;
        let h1 = h01 + (h11 - h01) * fx;

        h0 + (h1 - h0) * fy
    }
}

// =============================================================================
// Layered heightmap generation
// =============================================================================

/// Configuration for layered heightmap generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightMapConfig {
    /// Width of the map in vertices.
    pub width: usize,
    /// Height of the map in vertices.
    pub height: usize,
    /// Random seed driving octave offsets and gradients.
    pub seed: u64,
    /// Zoom of the noise. Larger values give smoother terrain.
    pub scale: f32,
    /// Number of noise layers to composite.
    pub octaves: u32,
    /// Amplitude multiplier per octave, in (0, 1].
    pub persistence: f32,
    /// Frequency multiplier per octave, >= 1.
    pub lacunarity: f32,
}

impl HeightMapConfig {
    /// Creates a configuration with default noise parameters.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            seed: 0,
            scale: 10.0,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the noise scale.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the octave count.
    pub fn octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    /// Sets the per-octave amplitude multiplier.
    pub fn persistence(mut self, persistence: f32) -> Self {
        self.persistence = persistence;
        self
    }

    /// Sets the per-octave frequency multiplier.
    pub fn lacunarity(mut self, lacunarity: f32) -> Self {
        self.lacunarity = lacunarity;
        self
    }
}

/// Range of the random per-octave sample offsets.
const MAX_OCTAVE_OFFSET: f32 = 100_000.0;

/// Generates a normalized heightmap by compositing octaves of Perlin noise.
///
/// Each octave samples at a frequency scaled by `lacunarity` and an amplitude
/// scaled by `persistence`, with a random offset derived from the seed so the
/// octaves decorrelate. Sampling is centered on the map so the pattern is
/// stable when the map is resized. After accumulation every cell is remapped
/// to [0, 1] with an inverse lerp over the observed min/max.
///
/// A non-positive `scale` is clamped to a small epsilon. The same seed always
/// reproduces the same map.
pub fn generate_height_map(config: &HeightMapConfig) -> HeightMap {
    let width = config.width;
    let height = config.height;
    let mut values = vec![0.0f32; width * height];

    if width == 0 || height == 0 {
        return HeightMap::from_values(values, width, height);
    }

    // Avoid a division by zero below.
    let scale = if config.scale <= 0.0 {
        1e-4
    } else {
        config.scale
    };

    let mut rng = Rng::new(config.seed);
    let noise = Perlin2D::with_seed(config.seed as i32);

    let offsets: Vec<Vec2> = (0..config.octaves)
        .map(|_| {
            Vec2::new(
                rng.range(-MAX_OCTAVE_OFFSET, MAX_OCTAVE_OFFSET),
                rng.range(-MAX_OCTAVE_OFFSET, MAX_OCTAVE_OFFSET),
            )
        })
        .collect();

    // Center the sample coordinates so resizing grows the map outwards.
    let half = Vec2::new(width as f32, height as f32) / 2.0;

    let mut min_value = f32::INFINITY;
    let mut max_value = f32::NEG_INFINITY;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut total = 0.0;

            for offset in &offsets {
                let sample_x = (x as f32 - half.x) / scale * frequency + offset.x;
                let sample_y = (y as f32 - half.y) / scale * frequency + offset.y;

                total += noise.sample_signed(sample_x, sample_y) * amplitude;

                frequency *= config.lacunarity;
                amplitude *= config.persistence;
            }

            values[y * width + x] = total;
            min_value = min_value.min(total);
            max_value = max_value.max(total);
        }
    }

    if max_value > min_value {
        for v in &mut values {
            *v = inverse_lerp(min_value, max_value, *v);
        }
    }

    HeightMap::from_values(values, width, height)
}

/// Simple LCG random number generator for deterministic offsets.
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

    #[test]
    fn test_perlin2d_range() {
        let noise = Perlin2D::new();
        for i in 0..100 {
            for j in 0..100 {
                let x = i as f32 * 0.1;
                let y = j as f32 * 0.1;
                let v = noise.sample(x, y);
                assert!(
                    (0.0..=1.0).contains(&v),
                    "perlin2d({}, {}) = {} out of range",
                    x,
                    y,
                    v
                );
            }
        }
    }

    #[test]
    fn test_perlin_deterministic() {
        let noise = Perlin2D::with_seed(7);
        assert_eq!(noise.sample(3.14, 2.71), noise.sample(3.14, 2.71));
    }

    #[test]
    fn test_seed_changes_output() {
        let n1 = Perlin2D::with_seed(0);
        let n2 = Perlin2D::with_seed(42);
        assert_ne!(
            n1.sample(1.5, 2.5),
            n2.sample(1.5, 2.5),
            "different seeds should produce different output"
        );
    }

    #[test]
    fn test_height_map_within_unit_range() {
        let config = HeightMapConfig::new(33, 33).seed(42).scale(12.0).octaves(4);
        let map = generate_height_map(&config);

        assert!(map.values().iter().all(|h| (0.0..=1.0).contains(h)));
    }

    #[test]
    fn test_height_map_normalization_spans_full_range() {
        let config = HeightMapConfig::new(65, 65).seed(9).scale(20.0).octaves(4);
        let map = generate_height_map(&config);

        let min = map.values().iter().copied().fold(f32::INFINITY, f32::min);
        let max = map
            .values()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);

        assert!((min - 0.0).abs() < 1e-6, "min should normalize to 0, got {}", min);
        assert!((max - 1.0).abs() < 1e-6, "max should normalize to 1, got {}", max);
    }

    #[test]
    fn test_height_map_deterministic() {
        let config = HeightMapConfig::new(33, 33).seed(1234).octaves(3);

        let a = generate_height_map(&config);
        let b = generate_height_map(&config);

        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_height_map_seed_changes_map() {
        let a = generate_height_map(&HeightMapConfig::new(17, 17).seed(1));
        let b = generate_height_map(&HeightMapConfig::new(17, 17).seed(2));

        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn test_non_positive_scale_is_clamped() {
        let config = HeightMapConfig::new(9, 9).scale(0.0);
        let map = generate_height_map(&config);

        assert!(map.values().iter().all(|h| h.is_finite()));
    }

    #[test]
    fn test_bilinear_sample() {
        let map = HeightMap::from_values(vec![0.0, 1.0, 0.0, 1.0], 2, 2);

        assert!((map.sample(0.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((map.sample(1.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((map.sample(0.5, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_map() {
        let map = generate_height_map(&HeightMapConfig::new(0, 0));
        assert!(map.values().is_empty());
    }
}
