use super::{GalaxyConfigError, GalaxyParams};
use bevy::color::Mix;
use bevy::prelude::*;
use rand::prelude::*;
use std::f32::consts::TAU;

/// Point positions and colors from one generation pass, index aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratedGalaxy {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl GeneratedGalaxy {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, position: Vec3, color: Srgba) {
        self.positions.push(position.to_array());
        self.colors.push([color.red, color.green, color.blue]);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `x0, y0, z0, x1, ...`
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// sRGB `r0, g0, b0, r1, ...`, index aligned with the positions
    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}

/// Samples `params.count` points along `params.branches` spiral arms.
///
/// Each point draws a distance from the center, is assigned an arm round-robin by index,
/// is twisted by `distance * spin` and then jittered independently on every axis.
/// The color only depends on the distance.
pub fn generate<R: Rng + ?Sized>(
    params: &GalaxyParams,
    rng: &mut R,
) -> Result<GeneratedGalaxy, GalaxyConfigError> {
    params.check_generatable()?;

    let mut galaxy = GeneratedGalaxy::with_capacity(params.count as usize);
    for index in 0..params.count {
        let radius_sample = rng.random::<f32>() * params.radius;
        let jitter = vec3(
            sample_jitter(params, rng),
            sample_jitter(params, rng),
            sample_jitter(params, rng),
        );

        galaxy.push(
            spiral_position(params, index, radius_sample) + jitter,
            blend_color(params, radius_sample),
        );
    }

    Ok(galaxy)
}

pub fn branch_of(index: u32, branches: u32) -> u32 {
    index % branches
}

pub fn branch_angle(index: u32, branches: u32) -> f32 {
    branch_of(index, branches) as f32 / branches as f32 * TAU
}

/// Position on the flat disk (y = 0) before jitter.
pub fn spiral_position(params: &GalaxyParams, index: u32, radius_sample: f32) -> Vec3 {
    let angle = branch_angle(index, params.branches) + radius_sample * params.spin;

    vec3(angle.cos() * radius_sample, 0.0, angle.sin() * radius_sample)
}

/// Blends from the inside to the outside color by `radius_sample / radius`.
/// A zero radius always yields the inside color.
pub fn blend_color(params: &GalaxyParams, radius_sample: f32) -> Srgba {
    let t = if params.radius == 0.0 {
        0.0
    } else {
        (radius_sample / params.radius).clamp(0.0, 1.0)
    };

    params.inside_color.mix(&params.outside_color, t)
}

// Power shaping pulls most samples towards zero and leaves a few outliers.
fn sample_jitter<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> f32 {
    let magnitude = rng.random::<f32>().powf(params.randomness_power);
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

    magnitude * sign * params.randomness
}
