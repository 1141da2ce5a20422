//! Rate-driven emission of ballistic primaries

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::particles::{BallisticSpark, SparkPopulation};
use crate::sampling::{biased_hemisphere, jitter_upward, to_world_direction, to_world_point};

/// Intensity floor used when deriving the spawn interval
const MIN_INTENSITY: f32 = 0.1;
/// Side of the square spawn points are scattered in around the burn point
const SPAWN_SCATTER: f32 = 0.01;
const PRIMARY_SPEED: (f32, f32) = (0.8, 1.4);

/// Accumulates frame time and spends it on primaries at a fixed interval
///
/// The interval shrinks as intensity grows: `base / max(0.1, intensity)`.
/// Time that cannot be spent because the population is full is dropped,
/// so a ceiling that clears does not release a backlog in one frame.
#[derive(Debug, Clone)]
pub struct RateEmitter {
    base_interval: f32,
    timer: f32,
}

impl RateEmitter {
    pub fn new(base_interval: f32) -> Self {
        Self {
            base_interval,
            timer: 0.0,
        }
    }

    /// Seconds between spawns at `intensity`
    pub fn interval(&self, intensity: f32) -> f32 {
        self.base_interval / intensity.max(MIN_INTENSITY)
    }

    /// Unspent accumulated time
    pub fn pending(&self) -> f32 {
        self.timer
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
    }

    /// Spawn primaries for `dt` seconds at the model-space `burn_point`
    ///
    /// Returns the number of primaries added.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        intensity: f32,
        burn_point: Vec3,
        model_to_world: &Mat4,
        population: &mut SparkPopulation<BallisticSpark>,
        rng: &mut R,
    ) -> usize {
        if intensity.is_nan() || intensity <= 0.0 {
            self.timer = 0.0;
            return 0;
        }

        self.timer += dt;
        let interval = self.interval(intensity);

        let mut spawned = 0;
        while self.timer >= interval && population.has_room() {
            self.timer -= interval;
            population.try_push(spawn_primary(burn_point, model_to_world, rng));
            spawned += 1;
        }
        self.timer = self.timer.min(interval);

        spawned
    }
}

/// A primary leaving the burn point into the upper hemisphere
pub fn spawn_primary<R: Rng + ?Sized>(
    burn_point: Vec3,
    model_to_world: &Mat4,
    rng: &mut R,
) -> BallisticSpark {
    let offset = Vec3::new(
        (rng.random::<f32>() - 0.5) * SPAWN_SCATTER,
        0.0,
        (rng.random::<f32>() - 0.5) * SPAWN_SCATTER,
    );
    let heading = biased_hemisphere(rng);
    let direction = jitter_upward(rng, heading, 0.1, 0.05);
    let speed = rng.random_range(PRIMARY_SPEED.0..PRIMARY_SPEED.1);

    BallisticSpark::primary(
        to_world_point(model_to_world, burn_point + offset),
        to_world_direction(model_to_world, direction),
        speed,
        rng,
    )
}
