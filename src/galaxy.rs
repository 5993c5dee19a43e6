//! Spiral galaxy point field generation.
//!
//! Each point sits on one of `branches` evenly spaced arms. Its angle
//! grows linearly with a uniformly sampled radius (`spin` radians per
//! unit), then a power-law jitter is added per axis:
//!
//! ```text
//! r      = U(0,1) * radius
//! angle  = branch_angle(i) + r * spin
//! jitter = U(0,1)^randomness_power * (±1) * randomness
//! pos    = (cos(angle) * r + jx, jy, sin(angle) * r + jz)
//! color  = lerp(inside, outside, r / radius)
//! ```
//!
//! Arm membership is by index (`i % branches`), so it never depends on
//! the random source.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::params::{Color, GalaxyParameters};

/// GPU vertex for one point: position followed by color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Generated positions and colors, index-aligned.
///
/// A field is never edited after generation; regeneration builds a new
/// one and the old one is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointField {
    positions: Vec<Vec3>,
    colors: Vec<Color>,
}

impl PointField {
    /// A field with no points.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Iterate `(position, color)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Vec3, Color)> + '_ {
        self.positions.iter().copied().zip(self.colors.iter().copied())
    }

    /// Interleaved vertex data ready for upload.
    pub fn vertices(&self) -> Vec<PointVertex> {
        self.iter()
            .map(|(p, c)| PointVertex {
                position: p.to_array(),
                color: c.to_array(),
            })
            .collect()
    }

    /// Largest distance of any point from the Y axis.
    pub fn bounds_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| (p.x * p.x + p.z * p.z).sqrt())
            .fold(0.0, f32::max)
    }
}

/// Angle of the arm that point `index` belongs to.
///
/// `branches == 0` is treated as a single arm at angle zero.
#[inline]
pub fn branch_angle(index: u32, branches: u32) -> f32 {
    match index.checked_rem(branches) {
        Some(arm) => arm as f32 / branches as f32 * TAU,
        None => 0.0,
    }
}

/// One axis of jitter: `U(0,1)^power` with a random sign, scaled by `magnitude`.
#[inline]
fn jitter<R: Rng + ?Sized>(rng: &mut R, power: f32, magnitude: f32) -> f32 {
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    rng.gen::<f32>().powf(power) * sign * magnitude
}

/// Generate a field of exactly `params.count` points from `rng`.
pub fn generate<R: Rng + ?Sized>(params: &GalaxyParameters, rng: &mut R) -> PointField {
    let count = params.count as usize;
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    for i in 0..params.count {
        let radius = rng.gen::<f32>() * params.radius;
        let spin_angle = radius * params.spin;
        let angle = branch_angle(i, params.branches) + spin_angle;

        let jx = jitter(rng, params.randomness_power, params.randomness);
        let jy = jitter(rng, params.randomness_power, params.randomness);
        let jz = jitter(rng, params.randomness_power, params.randomness);

        positions.push(Vec3::new(
            angle.cos() * radius + jx,
            jy,
            angle.sin() * radius + jz,
        ));

        // 0/0 when radius is zero; every point is then at the center
        let t = if params.radius == 0.0 {
            0.0
        } else {
            radius / params.radius
        };
        colors.push(params.inside_color.lerp(params.outside_color, t));
    }

    PointField { positions, colors }
}

/// Generate with a fresh `SmallRng` seeded from `seed`.
///
/// The same parameters and seed always produce the same field.
pub fn generate_seeded(params: &GalaxyParameters, seed: u64) -> PointField {
    let mut rng = SmallRng::seed_from_u64(seed);
    generate(params, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(count: u32) -> GalaxyParameters {
        GalaxyParameters {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_count() {
        for count in [0, 1, 7, 1000] {
            let field = generate_seeded(&params(count), 1);
            assert_eq!(field.len(), count as usize);
            assert_eq!(field.colors().len(), count as usize);
        }
    }

    #[test]
    fn test_empty_field() {
        let field = generate_seeded(&params(0), 9);
        assert!(field.is_empty());
        assert!(field.vertices().is_empty());
        assert_eq!(field.bounds_radius(), 0.0);
    }

    #[test]
    fn test_branch_angle_by_index() {
        assert_eq!(branch_angle(0, 4), 0.0);
        assert!((branch_angle(1, 4) - TAU / 4.0).abs() < 1e-6);
        assert!((branch_angle(6, 4) - TAU / 2.0).abs() < 1e-6);
        assert_eq!(branch_angle(5, 5), 0.0);
        assert_eq!(branch_angle(3, 0), 0.0);
    }

    #[test]
    fn test_zero_radius_is_jitter_only_inside_color() {
        let p = GalaxyParameters {
            count: 200,
            radius: 0.0,
            randomness: 0.5,
            ..Default::default()
        };
        let field = generate_seeded(&p, 3);
        for (pos, color) in field.iter() {
            assert_eq!(color, p.inside_color);
            assert!(pos.x.abs() <= 0.5 && pos.y.abs() <= 0.5 && pos.z.abs() <= 0.5);
        }
    }

    #[test]
    fn test_jitter_bounded_by_randomness() {
        let p = GalaxyParameters {
            count: 2000,
            randomness: 0.25,
            randomness_power: 1.0,
            ..Default::default()
        };
        let field = generate_seeded(&p, 11);
        assert!(field.positions().iter().all(|v| v.y.abs() <= 0.25));
        assert!(field.bounds_radius() <= p.radius + 0.25 * std::f32::consts::SQRT_2);
    }

    #[test]
    fn test_vertices_interleave() {
        let field = generate_seeded(&params(3), 5);
        let verts = field.vertices();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[2].position, field.positions()[2].to_array());
        assert_eq!(verts[2].color, field.colors()[2].to_array());
        assert_eq!(std::mem::size_of::<PointVertex>(), 24);
    }

    #[test]
    fn test_negative_radius_does_not_panic() {
        let p = GalaxyParameters {
            count: 100,
            radius: -3.0,
            ..Default::default()
        };
        let field = generate_seeded(&p, 2);
        assert_eq!(field.len(), 100);
        // t = r / radius is still within [0, 1]
        for c in field.colors() {
            assert!((0.0..=1.0).contains(&c.r));
        }
    }
}
