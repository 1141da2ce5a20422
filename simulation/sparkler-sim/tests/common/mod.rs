//! Common test utilities and fixtures

#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use sparkler_sim::{EmissionLayers, FrameInput, Sparkler, SparklerConfig};

/// 60 Hz frame step
pub const FRAME: f32 = 1.0 / 60.0;

/// Deterministic generator for a test
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Default configuration with a fixed seed and the given layers
pub fn config(seed: u64, layers: EmissionLayers) -> SparklerConfig {
    let mut config = SparklerConfig::default().with_seed(seed);
    config.emission.layers = layers;
    config
}

/// Unlit sparkler with a fixed seed and the given layers
pub fn sparkler(seed: u64, layers: EmissionLayers) -> Sparkler {
    Sparkler::new(config(seed, layers)).expect("default config is valid")
}

/// Drive `sparkler` for `frames` frames, progress rising at `rate` per second
pub fn burn(sparkler: &mut Sparkler, frames: usize, start: f32, rate: f32) -> f32 {
    let mut progress = start;
    for _ in 0..frames {
        sparkler.simulate_frame(FrameInput::burning(FRAME, progress));
        progress += rate * FRAME;
    }
    progress
}

/// Angles spread evenly around the stick
pub fn probe_angles(count: usize) -> Vec<f32> {
    (0..count)
        .map(|i| i as f32 / count as f32 * std::f32::consts::TAU)
        .collect()
}
