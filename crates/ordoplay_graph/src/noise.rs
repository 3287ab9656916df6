// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tileable 2D gradient noise with fractal sums.
//!
//! Gradients come from a fixed table of unit vectors generated once from a
//! constant seed, so every function here is a pure function of its
//! arguments. Results are not clamped; fractal sums grow past `[-1, 1]`.

use glam::Vec2;
use ordoplay_curves::Interpolation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::sync::OnceLock;

const GRADIENT_COUNT: usize = 1753;
const GRADIENT_SEED: u64 = 7_852_384;

fn gradients() -> &'static [Vec2] {
    static TABLE: OnceLock<Vec<Vec2>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(GRADIENT_SEED);
        (0..GRADIENT_COUNT)
            .map(|_| Vec2::from_angle(rng.gen_range(0.0..TAU)))
            .collect()
    })
}

fn gradient(x: i32, y: i32, dx: f32, dy: f32, seed: i32) -> f32 {
    let hash = ((x ^ (y << 7)) ^ seed) & i32::MAX;
    let g = gradients()[hash as usize % GRADIENT_COUNT];
    g.x * dx + g.y * dy
}

/// Single octave of gradient noise
///
/// Lattice cells wrap every `repeat` cells; a `repeat` of zero disables
/// tiling.
pub fn perlin(x: f32, y: f32, repeat: i32, seed: i32) -> f32 {
    let ix0 = x as i32;
    let iy0 = y as i32;
    let fx0 = x - ix0 as f32;
    let fy0 = y - iy0 as f32;
    let fx1 = fx0 - 1.0;
    let fy1 = fy0 - 1.0;
    let xs = Interpolation::smooth(fx0);
    let ys = Interpolation::smooth(fy0);

    let wrap = |cell: i32| cell.checked_rem(repeat).unwrap_or(cell);
    let (ix1, iy1) = (wrap(ix0.wrapping_add(1)), wrap(iy0.wrapping_add(1)));
    let (ix0, iy0) = (wrap(ix0), wrap(iy0));

    let p00 = gradient(ix0, iy0, fx0, fy0, seed);
    let p10 = gradient(ix1, iy0, fx1, fy0, seed);
    let p01 = gradient(ix0, iy1, fx0, fy1, seed);
    let p11 = gradient(ix1, iy1, fx1, fy1, seed);

    Interpolation::lerp(Interpolation::lerp(p00, p10, xs), Interpolation::lerp(p01, p11, xs), ys)
}

/// Fractal parameters shared by the sums below
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fractal {
    /// Number of layers, at least one is always sampled
    pub octaves: i32,
    /// Frequency multiplier per octave
    pub lacunarity: i32,
    /// Amplitude multiplier per octave
    pub gain: f32,
    /// Tiling period of the first octave
    pub repeat: i32,
    /// Seed of the first octave
    pub seed: i32,
}

impl Default for Fractal {
    fn default() -> Self {
        Self {
            octaves: 1,
            lacunarity: 2,
            gain: 0.5,
            repeat: 0,
            seed: 0,
        }
    }
}

impl Fractal {
    /// Sum octaves; `layer` shapes each sample and `shift` decorrelates octaves
    fn sum(&self, mut x: f32, mut y: f32, shift_octaves: bool, layer: impl Fn(f32) -> f32) -> f32 {
        let mut sum = layer(perlin(x, y, self.repeat, self.seed));
        let mut amp = 1.0;
        let mut shift = 0.5;
        let mut repeat = self.repeat;
        let mut seed = self.seed;
        let lacunarity = self.lacunarity as f32;
        for _ in 1..self.octaves {
            x *= lacunarity;
            y *= lacunarity;
            if shift_octaves {
                x += shift;
                y += shift;
                shift *= 0.5;
            }
            repeat = repeat.wrapping_mul(self.lacunarity);
            seed = seed.wrapping_add(1);
            amp *= self.gain;
            sum += layer(perlin(x, y, repeat, seed)) * amp;
        }
        sum
    }
}

/// Fractal Brownian motion
pub fn fbm(x: f32, y: f32, fractal: &Fractal) -> f32 {
    fractal.sum(x, y, true, |n| n)
}

/// Billowed sum of `2|n| - 1` layers
pub fn billow(x: f32, y: f32, fractal: &Fractal) -> f32 {
    fractal.sum(x, y, false, |n| n.abs() * 2.0 - 1.0)
}

/// Ridged multifractal of `(1 - |n|)^2` layers
pub fn ridged(x: f32, y: f32, fractal: &Fractal) -> f32 {
    fractal.sum(x, y, true, |n| {
        let ridge = 1.0 - n.abs();
        ridge * ridge
    })
}

/// Single octave remapped towards `[0, 1]`
pub fn sample01(x: f32, y: f32) -> f32 {
    perlin(x, y, 0, 0) * 0.5 + 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_unit_length() {
        assert_eq!(gradients().len(), GRADIENT_COUNT);
        assert!(gradients().iter().all(|g| (g.length() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_deterministic() {
        let fractal = Fractal {
            octaves: 4,
            repeat: 8,
            seed: 3,
            ..Fractal::default()
        };
        let a = fbm(3.7, -1.25, &fractal);
        let b = fbm(3.7, -1.25, &fractal);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(perlin(0.3, 0.6, 0, 9).to_bits(), perlin(0.3, 0.6, 0, 9).to_bits());
    }

    #[test]
    fn test_zero_on_lattice() {
        assert_eq!(perlin(2.0, 5.0, 0, 1), 0.0);
        assert_eq!(perlin(0.0, 0.0, 4, 1), 0.0);
    }

    #[test]
    fn test_cell_center_blends_corners() {
        let corners = gradient(2, 5, 0.5, 0.5, 1)
            + gradient(3, 5, -0.5, 0.5, 1)
            + gradient(2, 6, 0.5, -0.5, 1)
            + gradient(3, 6, -0.5, -0.5, 1);
        assert!((perlin(2.5, 5.5, 0, 1) - corners / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_repeat_tiles() {
        let a = perlin(0.25, 0.75, 4, 2);
        let b = perlin(4.25, 0.75, 4, 2);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_single_octave_matches_perlin() {
        let fractal = Fractal::default();
        assert_eq!(fbm(1.3, 2.7, &fractal), perlin(1.3, 2.7, 0, 0));
        let r = ridged(1.3, 2.7, &fractal);
        assert!((0.0..=1.0).contains(&r));
        assert!(billow(1.3, 2.7, &fractal) >= -1.0);
    }
}
