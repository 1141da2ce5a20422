//! One-shot bursts at fixed points along the stick

use glam::Mat4;
use rand::Rng;

use super::factory::{SparkProfile, roll_burst_type};
use crate::config::StickGeometry;
use crate::particles::{CascadeSpark, SparkPopulation};

const BURST_BASE: u32 = 40;
const BURST_EXTRA: u32 = 30;

/// Evenly spaced points along the stick, each firing once per lifetime
///
/// Point `i` of `n` sits at burn progress `i / n` and fires the first time
/// progress reaches it. Progress jumping over several points fires all of
/// them in the same frame.
#[derive(Debug, Clone)]
pub struct EmissionPoints {
    fired: Vec<bool>,
}

impl EmissionPoints {
    pub fn new(count: usize) -> Self {
        Self {
            fired: vec![false; count],
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// Progress at which point `index` fires
    pub fn position(&self, index: usize) -> f32 {
        index as f32 / self.fired.len() as f32
    }

    pub fn has_fired(&self, index: usize) -> bool {
        self.fired.get(index).copied().unwrap_or(false)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.iter().filter(|fired| **fired).count()
    }

    /// Re-arm every point
    pub fn reset(&mut self) {
        self.fired.fill(false);
    }

    /// Fire every point that `progress` has reached; returns sparks added
    ///
    /// Each burst holds `(40 + rand(30)) * fade` mixed-type sparks; a burst
    /// that rounds down to zero still marks its point as fired.
    pub fn fire<R: Rng + ?Sized>(
        &mut self,
        progress: f32,
        fade: f32,
        stick: &StickGeometry,
        model_to_world: &Mat4,
        population: &mut SparkPopulation<CascadeSpark>,
        rng: &mut R,
    ) -> usize {
        let profile = SparkProfile::burst();
        let mut spawned = 0;

        for index in 0..self.fired.len() {
            let position = self.position(index);
            if self.fired[index] || progress < position {
                continue;
            }
            self.fired[index] = true;

            let raw = BURST_BASE + rng.random_range(0..BURST_EXTRA);
            let count = (raw as f32 * fade) as usize;
            let origin = stick.point_along(position);
            for _ in 0..count {
                if !population.has_room() {
                    break;
                }
                let kind = roll_burst_type(rng);
                population.try_push(profile.spawn(kind, origin, model_to_world, rng));
                spawned += 1;
            }
            log::trace!("Emission point {index} fired {count} sparks");
        }

        spawned
    }
}
