//! Direction sampling and frame conversion helpers
//!
//! All sampling takes an explicit generator so a seeded instance replays the
//! same sparks. Helpers that normalize a vector fall back to [`Vec3::Y`] when
//! the input is degenerate, so a single bad sample never produces NaN state.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat4, Vec3};
use rand::Rng;

/// Golden angle in radians, `π(3 − √5)`
pub const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

/// Exponent applied to the polar angle of hemisphere samples
///
/// Values below one push samples away from the pole toward the horizon.
pub const HEMISPHERE_BIAS: f32 = 0.7;

/// Fallback used when a direction cannot be normalized
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Y;

/// Normalize `v`, or return [`FALLBACK_DIRECTION`] if it has no usable length
#[inline]
pub fn normalize_or_up(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(FALLBACK_DIRECTION)
}

/// Uniformly distributed unit vector on the full sphere
pub fn uniform_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    spherical(theta, phi)
}

/// Unit vector in the upper hemisphere, biased toward the horizon
pub fn biased_hemisphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi = rng.random::<f32>().powf(HEMISPHERE_BIAS) * FRAC_PI_2;
    spherical(theta, phi)
}

/// Add symmetric jitter of total width `amount` per axis and renormalize
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, direction: Vec3, amount: f32) -> Vec3 {
    let offset = Vec3::new(
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
    ) * amount;
    normalize_or_up(direction + offset)
}

/// Jitter sideways by `lateral` and only upward by up to `lift`, then renormalize
pub fn jitter_upward<R: Rng + ?Sized>(
    rng: &mut R,
    direction: Vec3,
    lateral: f32,
    lift: f32,
) -> Vec3 {
    let offset = Vec3::new(
        (rng.random::<f32>() - 0.5) * lateral,
        rng.random::<f32>() * lift,
        (rng.random::<f32>() - 0.5) * lateral,
    );
    normalize_or_up(direction + offset)
}

/// Direction tilted `spread` radians off `heading`, rotated `twist` radians around it
///
/// Successive `twist` values stepped by [`GOLDEN_ANGLE`] cover the cone evenly.
pub fn cone_direction(heading: Vec3, twist: f32, spread: f32) -> Vec3 {
    let heading = normalize_or_up(heading);
    let (side, up) = perpendicular_basis(heading);
    let ring = side * twist.cos() + up * twist.sin();
    normalize_or_up(heading * spread.cos() + ring * spread.sin())
}

/// Two unit vectors perpendicular to `heading` and to each other
pub fn perpendicular_basis(heading: Vec3) -> (Vec3, Vec3) {
    let side = if heading.y.abs() < 0.9 {
        Vec3::new(-heading.z, 0.0, heading.x)
    } else {
        Vec3::X
    };
    let side = side.try_normalize().unwrap_or(Vec3::X);
    let up = heading.cross(side);
    (side, up)
}

/// Transform a model-space point into world space
#[inline]
pub fn to_world_point(model_to_world: &Mat4, point: Vec3) -> Vec3 {
    model_to_world.transform_point3(point)
}

/// Rotate a model-space vector into world space, ignoring translation
#[inline]
pub fn to_world_vector(model_to_world: &Mat4, vector: Vec3) -> Vec3 {
    model_to_world.transform_vector3(vector)
}

/// Rotate a model-space direction into world space and renormalize
#[inline]
pub fn to_world_direction(model_to_world: &Mat4, direction: Vec3) -> Vec3 {
    normalize_or_up(model_to_world.transform_vector3(direction))
}

#[inline]
fn spherical(theta: f32, phi: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(theta.cos() * sin_phi, cos_phi, theta.sin() * sin_phi)
}
