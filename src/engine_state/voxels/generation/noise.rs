//! # Noise Library
//!
//! Pure, deterministic noise helpers used by the terrain generator: hash-based
//! pseudo-random values, value noise, fractal Brownian motion, Worley cell
//! noise and surflet-based gradient noise in two and three dimensions.
//!
//! Every function here is a pure function of its inputs. The hashes are the
//! classic `fract(sin(dot(p, k)) * 43758.5453)` family, so results depend on
//! `f32` `sin` precision and are stable for a given platform.
//!
//! Seeded gradient noise (the lattice noise used for heights and climate) is
//! provided by [`noise::Perlin`] and wrapped by [`LatticeNoise`].

use cgmath::{InnerSpace, Vector2, Vector3};
use ::noise::{NoiseFn, Perlin};

/// GLSL-style fractional part; always in `[0, 1)`.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between `edge0` and `edge1`, clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Hashes a 2D point to a value in `[0, 1)`.
#[inline]
pub fn random1(p: Vector2<f32>) -> f32 {
    fract((p.dot(Vector2::new(12.9898, 78.233))).sin() * 43758.547)
}

/// Hashes a scalar to a value in `[0, 1)`.
#[inline]
pub fn random1_scalar(n: f32) -> f32 {
    fract((n * 127.1).sin() * 43758.547)
}

/// Hashes a 2D point to a vector with both components in `[0, 1)`.
#[inline]
pub fn random2(p: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(
        fract(p.dot(Vector2::new(127.1, 311.7)).sin() * 43758.547),
        fract(p.dot(Vector2::new(269.5, 183.3)).sin() * 43758.547),
    )
}

/// Hashes a 3D point to a vector with every component in `[0, 1)`.
#[inline]
pub fn random3(p: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        fract(p.dot(Vector3::new(127.1, 311.7, 489.61)).sin() * 43758.547),
        fract(p.dot(Vector3::new(777.7, 444.4, 333.3)).sin() * 43758.547),
        fract(p.dot(Vector3::new(269.5, 183.3, 914.5)).sin() * 43758.547),
    )
}

/// Linearly maps `val` from `[low1, hi1]` to `[low2, hi2]`. Does not clamp.
#[inline]
pub fn remap(val: f32, low1: f32, hi1: f32, low2: f32, hi2: f32) -> f32 {
    (val - low1) / (hi1 - low1) * (hi2 - low2) + low2
}

/// 1D value noise, linearly interpolated between integer lattice hashes.
pub fn interp_noise_1d(x: f32) -> f32 {
    let int_x = x.floor();
    let fract_x = fract(x);

    let v1 = random1_scalar(int_x);
    let v2 = random1_scalar(int_x + 1.0);
    mix(v1, v2, fract_x)
}

/// 2D value noise with smoothstep-weighted bilinear interpolation.
pub fn interp_noise_2d(p: Vector2<f32>) -> f32 {
    let i = Vector2::new(p.x.floor(), p.y.floor());
    let f = Vector2::new(fract(p.x), fract(p.y));

    let a = random1(i);
    let b = random1(i + Vector2::new(1.0, 0.0));
    let c = random1(i + Vector2::new(0.0, 1.0));
    let d = random1(i + Vector2::new(1.0, 1.0));

    let ux = f.x * f.x * (3.0 - 2.0 * f.x);
    let uy = f.y * f.y * (3.0 - 2.0 * f.y);

    mix(mix(a, b, ux), mix(c, d, ux), uy)
}

/// Fractal Brownian motion over [`interp_noise_1d`].
///
/// Amplitude starts at 0.5 and halves each octave, frequency doubles.
pub fn fbm_1d(mut n: f32, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amp = 0.5;
    for _ in 0..octaves {
        value += interp_noise_1d(n) * amp;
        n *= 2.0;
        amp *= 0.5;
    }
    value
}

/// Fractal Brownian motion over [`interp_noise_2d`].
///
/// Amplitude starts at 0.5 and halves each octave, frequency triples.
pub fn fbm_2d(mut p: Vector2<f32>, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amp = 0.5;
    for _ in 0..octaves {
        value += amp * interp_noise_2d(p);
        p *= 3.0;
        amp *= 0.5;
    }
    value
}

/// Worley cell noise: distance to the second-closest feature point minus the
/// distance to the closest, over the 3 x 3 surrounding cells.
pub fn worley(p: Vector2<f32>) -> f32 {
    let cell = Vector2::new(p.x.floor(), p.y.floor());
    let local = Vector2::new(fract(p.x), fract(p.y));

    let mut min_dist = 1.0_f32;
    let mut second_min_dist = 1.0_f32;

    for y in -1..=1 {
        for x in -1..=1 {
            let neighbor = Vector2::new(x as f32, y as f32);
            let point = random2(cell + neighbor);
            let dist = (neighbor + point - local).magnitude();

            if dist < min_dist {
                second_min_dist = min_dist;
                min_dist = dist;
            } else if dist < second_min_dist {
                second_min_dist = dist;
            }
        }
    }

    second_min_dist - min_dist
}

/// Quintic falloff `1 - 6t^5 + 15t^4 - 10t^3`; 1 at `t = 0`, 0 at `t = 1`.
#[inline]
pub fn quintic_falloff(t: f32) -> f32 {
    1.0 - 6.0 * t.powi(5) + 15.0 * t.powi(4) - 10.0 * t.powi(3)
}

fn surflet_2d(p: Vector2<f32>, grid_point: Vector2<f32>) -> f32 {
    let t_x = quintic_falloff((p.x - grid_point.x).abs());
    let t_y = quintic_falloff((p.y - grid_point.y).abs());
    let gradient = random2(grid_point) * 2.0 - Vector2::new(1.0, 1.0);
    (p - grid_point).dot(gradient) * t_x * t_y
}

fn surflet_3d(p: Vector3<f32>, grid_point: Vector3<f32>) -> f32 {
    let dist = p - grid_point;
    let falloff = quintic_falloff(dist.x.abs())
        * quintic_falloff(dist.y.abs())
        * quintic_falloff(dist.z.abs());
    let gradient = (random3(grid_point) * 2.0 - Vector3::new(1.0, 1.0, 1.0)).normalize();
    dist.dot(gradient) * falloff
}

/// 2D gradient noise as a sum of surflets from the four surrounding lattice corners.
///
/// Zero at every integer lattice point.
pub fn perlin_2d(p: Vector2<f32>) -> f32 {
    let base = Vector2::new(p.x.floor(), p.y.floor());
    let mut sum = 0.0;
    for dx in 0..=1 {
        for dy in 0..=1 {
            sum += surflet_2d(p, base + Vector2::new(dx as f32, dy as f32));
        }
    }
    sum
}

/// 3D gradient noise as a sum of surflets from the eight surrounding lattice corners.
///
/// Zero at every integer lattice point. Used to carve caves.
pub fn perlin_3d(p: Vector3<f32>) -> f32 {
    let base = Vector3::new(p.x.floor(), p.y.floor(), p.z.floor());
    let mut sum = 0.0;
    for dx in 0..=1 {
        for dy in 0..=1 {
            for dz in 0..=1 {
                sum += surflet_3d(p, base + Vector3::new(dx as f32, dy as f32, dz as f32));
            }
        }
    }
    sum
}

/// Seeded lattice gradient noise remapped to `[0, 1]`.
///
/// Wraps [`noise::Perlin`]; the seed selects the permutation table.
#[derive(Clone, Copy, Debug)]
pub struct LatticeNoise {
    perlin: Perlin,
}

impl LatticeNoise {
    /// Creates a lattice noise source with the given permutation seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Samples the noise field at `p`, returning a value in `[0, 1]`.
    pub fn sample(&self, p: Vector2<f32>) -> f32 {
        let raw = self.perlin.get([p.x as f64, p.y as f64]);
        (((raw + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_in_unit_range() {
        for i in -50..50 {
            let p = Vector2::new(i as f32 * 3.7, i as f32 * -1.3);
            let r = random1(p);
            assert!((0.0..1.0).contains(&r));

            let r2 = random2(p);
            assert!((0.0..1.0).contains(&r2.x) && (0.0..1.0).contains(&r2.y));

            let r3 = random3(Vector3::new(p.x, p.y, i as f32));
            assert!((0.0..1.0).contains(&r3.x));
            assert!((0.0..1.0).contains(&r3.y));
            assert!((0.0..1.0).contains(&r3.z));
        }
    }

    #[test]
    fn hashes_are_deterministic() {
        let p = Vector2::new(12.0, -7.0);
        assert_eq!(random1(p), random1(p));
        assert_eq!(random2(p), random2(p));
        assert_eq!(fbm_2d(p, 3), fbm_2d(p, 3));
    }

    #[test]
    fn remap_and_falloff_endpoints() {
        assert_eq!(remap(0.5, 0.0, 1.0, 10.0, 20.0), 15.0);
        assert_eq!(remap(0.0, 0.0, 0.3, 131.0, 244.0), 131.0);
        assert_eq!(quintic_falloff(0.0), 1.0);
        assert!(quintic_falloff(1.0).abs() < 1e-6);
        assert_eq!(smoothstep(0.45, 0.55, 0.2), 0.0);
        assert_eq!(smoothstep(0.45, 0.55, 0.9), 1.0);
    }

    #[test]
    fn gradient_noise_vanishes_on_the_lattice() {
        assert!(perlin_2d(Vector2::new(3.0, -4.0)).abs() < 1e-6);
        assert!(perlin_3d(Vector3::new(1.0, 2.0, -3.0)).abs() < 1e-6);
    }

    #[test]
    fn worley_is_non_negative() {
        for i in 0..100 {
            let p = Vector2::new(i as f32 * 0.37, i as f32 * 0.11);
            assert!(worley(p) >= 0.0);
        }
    }

    #[test]
    fn lattice_noise_is_normalized_and_seeded() {
        let a = LatticeNoise::new(1);
        let b = LatticeNoise::new(1);
        for i in 0..64 {
            let p = Vector2::new(i as f32 * 0.173, i as f32 * 0.291);
            let v = a.sample(p);
            assert!((0.0..=1.0).contains(&v));
            assert_eq!(v, b.sample(p));
        }
    }
}
