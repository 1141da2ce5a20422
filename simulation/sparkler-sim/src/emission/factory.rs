//! Per-type cascade spark factories
//!
//! Every factory samples a full-sphere direction in model space, perturbs it
//! slightly, scatters the spawn point around the stick axis and converts both
//! into world space before building the spark.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::particles::{CascadeSpark, CascadeType};
use crate::sampling::{jitter, to_world_point, to_world_vector, uniform_sphere};

/// How spawn points are spread around the stick axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scatter {
    /// Uniform in a square of this side length on the XZ plane
    Square(f32),
    /// On a circle of this radius on the XZ plane
    Ring(f32),
}

impl Scatter {
    fn offset<R: Rng + ?Sized>(self, rng: &mut R) -> Vec3 {
        match self {
            Self::Square(side) => Vec3::new(
                (rng.random::<f32>() - 0.5) * side,
                0.0,
                (rng.random::<f32>() - 0.5) * side,
            ),
            Self::Ring(radius) => {
                let angle = rng.random::<f32>() * TAU;
                Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
            }
        }
    }
}

/// Sampling ranges for one kind of emitted cascade spark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkProfile {
    /// Launch speed range, units per second
    pub speed: (f32, f32),
    /// Lifetime range in seconds
    pub lifetime: (f32, f32),
    /// Trail length range
    pub length: (f32, f32),
    pub brightness: f32,
    /// Width of the direction perturbation, zero for none
    pub jitter: f32,
    pub scatter: Scatter,
}

impl SparkProfile {
    /// Continuous emission profile for a spark type
    pub fn for_type(kind: CascadeType) -> Self {
        match kind {
            CascadeType::Core => Self {
                speed: (3.5, 6.0),
                lifetime: (0.15, 0.35),
                length: (0.03, 0.07),
                brightness: 3.0,
                jitter: 0.15,
                scatter: Scatter::Square(0.006),
            },
            CascadeType::Inner => Self {
                speed: (2.5, 4.5),
                lifetime: (0.25, 0.6),
                length: (0.04, 0.10),
                brightness: 2.2,
                jitter: 0.2,
                scatter: Scatter::Square(0.008),
            },
            CascadeType::Outer => Self {
                speed: (4.0, 7.5),
                lifetime: (0.4, 0.9),
                length: (0.06, 0.14),
                brightness: 1.8,
                jitter: 0.25,
                scatter: Scatter::Ring(0.01),
            },
            CascadeType::Hair => Self {
                speed: (1.5, 5.5),
                lifetime: (0.1, 0.35),
                length: (0.02, 0.05),
                brightness: 1.5,
                jitter: 0.0,
                scatter: Scatter::Square(0.006),
            },
        }
    }

    /// Profile shared by every type in an emission point burst
    pub fn burst() -> Self {
        Self {
            speed: (2.5, 6.5),
            lifetime: (0.2, 0.6),
            length: (0.05, 0.15),
            brightness: 1.5,
            jitter: 0.2,
            scatter: Scatter::Ring(0.015),
        }
    }

    /// Build a spark of `kind` around the model-space `origin`
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        kind: CascadeType,
        origin: Vec3,
        model_to_world: &Mat4,
        rng: &mut R,
    ) -> CascadeSpark {
        let mut direction = uniform_sphere(rng);
        if self.jitter > 0.0 {
            direction = jitter(rng, direction, self.jitter);
        }
        let speed = sample(rng, self.speed);
        let max_age = sample(rng, self.lifetime);
        let length = sample(rng, self.length);
        let position = origin + self.scatter.offset(rng);

        CascadeSpark::new(
            to_world_point(model_to_world, position),
            to_world_vector(model_to_world, direction * speed),
            max_age,
            length,
            self.brightness,
            kind,
            rng,
        )
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` for an empty range
#[inline]
fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Continuous-emission spark of `kind` at the model-space burn point
pub fn spawn_cascade<R: Rng + ?Sized>(
    kind: CascadeType,
    burn_point: Vec3,
    model_to_world: &Mat4,
    rng: &mut R,
) -> CascadeSpark {
    SparkProfile::for_type(kind).spawn(kind, burn_point, model_to_world, rng)
}

/// Burst-type roll: 15% core, 20% inner, 35% outer, 30% hair
pub fn roll_burst_type<R: Rng + ?Sized>(rng: &mut R) -> CascadeType {
    let roll = rng.random::<f32>();
    if roll < 0.15 {
        CascadeType::Core
    } else if roll < 0.35 {
        CascadeType::Inner
    } else if roll < 0.7 {
        CascadeType::Outer
    } else {
        CascadeType::Hair
    }
}
