//! Per-frame layered bursts of cascade sparks

use glam::{Mat4, Vec3};
use rand::Rng;

use super::factory::spawn_cascade;
use crate::particles::{CascadeSpark, CascadeType, SparkPopulation};

/// One layer of the burst: type, minimum count and random extra
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub kind: CascadeType,
    pub base: u32,
    /// Exclusive upper bound of the random extra
    pub extra: u32,
}

/// Core through hair, in spawn order
pub const LAYERS: [Layer; 4] = [
    Layer {
        kind: CascadeType::Core,
        base: 8,
        extra: 6,
    },
    Layer {
        kind: CascadeType::Inner,
        base: 15,
        extra: 10,
    },
    Layer {
        kind: CascadeType::Outer,
        base: 20,
        extra: 15,
    },
    Layer {
        kind: CascadeType::Hair,
        base: 30,
        extra: 20,
    },
];

/// Spawns every layer once per frame, scaled by intensity
///
/// Layers fill in order, so once the population ceiling is reached the later
/// (finer) layers lose out first.
#[derive(Debug, Clone, Default)]
pub struct LayeredEmitter;

impl LayeredEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Spawn one frame's worth of sparks; returns how many were added
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        intensity: f32,
        burn_point: Vec3,
        model_to_world: &Mat4,
        population: &mut SparkPopulation<CascadeSpark>,
        rng: &mut R,
    ) -> usize {
        let mut spawned = 0;
        for layer in &LAYERS {
            let count = layer_count(layer, intensity, rng);
            for _ in 0..count {
                if !population.has_room() {
                    return spawned;
                }
                population.try_push(spawn_cascade(layer.kind, burn_point, model_to_world, rng));
                spawned += 1;
            }
        }
        spawned
    }
}

/// Sparks a layer asks for this frame; non-positive intensity asks for none
fn layer_count<R: Rng + ?Sized>(layer: &Layer, intensity: f32, rng: &mut R) -> usize {
    let raw = layer.base + rng.random_range(0..layer.extra);
    // Saturating cast: NaN and negatives become zero
    (raw as f32 * intensity) as usize
}
