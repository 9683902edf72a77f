//! Gradient (Perlin) noise with lazily generated lattice gradients.
//!
//! Each integer lattice point receives a random unit vector the first time
//! it is visited; from then on it never changes, so re-sampling the same
//! point always yields the same value. Sampled values are memoized by their
//! exact coordinate bits.

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Integer lattice coordinate owning one gradient vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct LatticePoint {
    x: i64,
    y: i64,
}

/// Exact bit pattern of a sample coordinate, used as the memo key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SampleKey {
    x: u64,
    y: u64,
}

impl SampleKey {
    fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.to_bits(),
            y: y.to_bits(),
        }
    }
}

/// `6t^5 - 15t^4 + 10t^3`
#[inline]
fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// 2D gradient noise field returning values in roughly `[-1, 1]`.
pub struct NoiseField {
    seed: u64,
    rng: ChaCha8Rng,
    gradients: HashMap<LatticePoint, DVec2>,
    value_cache: HashMap<SampleKey, f64>,
}

impl NoiseField {
    /// Create an empty field. Gradients are drawn from a ChaCha stream
    /// seeded with `seed`, so two fields with the same seed sampled in the
    /// same order are identical.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            gradients: HashMap::new(),
            value_cache: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Forget every gradient and cached value and rewind the random stream.
    pub fn reset(&mut self) {
        self.gradients.clear();
        self.value_cache.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Drop memoized samples but keep the lattice gradients.
    pub fn clear_cache(&mut self) {
        self.value_cache.clear();
    }

    /// Number of lattice points that have been assigned a gradient.
    pub fn gradient_count(&self) -> usize {
        self.gradients.len()
    }

    /// Number of memoized sample values.
    pub fn cached_values(&self) -> usize {
        self.value_cache.len()
    }

    /// Unit gradient for a lattice cell, generated on first access.
    pub fn gradient_at(&mut self, cell_x: i64, cell_y: i64) -> DVec2 {
        let rng = &mut self.rng;
        *self
            .gradients
            .entry(LatticePoint { x: cell_x, y: cell_y })
            .or_insert_with(|| {
                let theta = rng.gen_range(0.0..TAU);
                DVec2::new(theta.cos(), theta.sin())
            })
    }

    fn corner_dot(&mut self, cell_x: i64, cell_y: i64, x: f64, y: f64) -> f64 {
        let gradient = self.gradient_at(cell_x, cell_y);
        let offset = DVec2::new(x - cell_x as f64, y - cell_y as f64);
        gradient.dot(offset)
    }

    /// Sample the field at a continuous position.
    pub fn sample(&mut self, x: f64, y: f64) -> f64 {
        let key = SampleKey::new(x, y);
        if let Some(&value) = self.value_cache.get(&key) {
            return value;
        }

        let xf = x.floor();
        let yf = y.floor();
        let x0 = xf as i64;
        let y0 = yf as i64;

        let top_left = self.corner_dot(x0, y0, x, y);
        let top_right = self.corner_dot(x0 + 1, y0, x, y);
        let bottom_left = self.corner_dot(x0, y0 + 1, x, y);
        let bottom_right = self.corner_dot(x0 + 1, y0 + 1, x, y);

        let sx = smootherstep(x - xf);
        let sy = smootherstep(y - yf);
        let top = lerp(top_left, top_right, sx);
        let bottom = lerp(bottom_left, bottom_right, sx);
        let value = lerp(top, bottom, sy);

        self.value_cache.insert(key, value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smootherstep_endpoints() {
        assert_eq!(smootherstep(0.0), 0.0);
        assert_eq!(smootherstep(1.0), 1.0);
        assert!((smootherstep(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_noise_bounded() {
        let mut noise = NoiseField::new(42);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10_000 {
            let x = rng.gen_range(-500.0..500.0);
            let y = rng.gen_range(-500.0..500.0);
            let v = noise.sample(x, y);
            assert!(v.is_finite());
            assert!((-1.1..=1.1).contains(&v), "sample {} out of range", v);
        }
    }

    #[test]
    fn test_gradients_are_unit_and_stable() {
        let mut noise = NoiseField::new(3);
        let g = noise.gradient_at(5, -2);
        assert!((g.length() - 1.0).abs() < 1e-12);
        noise.gradient_at(6, -2);
        assert_eq!(noise.gradient_at(5, -2), g);
        assert_eq!(noise.gradient_count(), 2);
    }

    #[test]
    fn test_noise_memoization() {
        let mut noise = NoiseField::new(11);
        let first = noise.sample(3.7, -1.25);
        let gradients = noise.gradient_count();
        assert_eq!(gradients, 4);

        let second = noise.sample(3.7, -1.25);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(noise.gradient_count(), gradients);
        assert_eq!(noise.cached_values(), 1);

        // Same cell, different point: shares the four lattice gradients
        noise.sample(3.2, -1.9);
        assert_eq!(noise.gradient_count(), gradients);
    }

    #[test]
    fn test_sampling_is_stable_without_cache() {
        let mut noise = NoiseField::new(5);
        let before = noise.sample(10.3, 4.6);
        noise.clear_cache();
        let after = noise.sample(10.3, 4.6);
        assert_eq!(before.to_bits(), after.to_bits());
    }

    #[test]
    fn test_zero_at_lattice_points() {
        let mut noise = NoiseField::new(8);
        for i in -3..3 {
            assert_eq!(noise.sample(i as f64, (i * 2) as f64), 0.0);
        }
    }

    #[test]
    fn test_reset_replays_same_field() {
        let mut noise = NoiseField::new(21);
        let a = noise.sample(1.5, 2.5);
        noise.reset();
        assert_eq!(noise.gradient_count(), 0);
        assert_eq!(noise.cached_values(), 0);
        let b = noise.sample(1.5, 2.5);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_seed_changes_field() {
        let mut a = NoiseField::new(1);
        let mut b = NoiseField::new(2);
        let differs = (0..16).any(|i| {
            let x = i as f64 * 0.37 + 0.1;
            a.sample(x, 0.5) != b.sample(x, 0.5)
        });
        assert!(differs);
    }
}
