//! Color curves over a spark's life
//!
//! All curves are pure functions of life fraction in `[0, 1]`, returning
//! linear RGBA in `[0, 1]`. Flicker only scales RGB.

use super::{CascadeType, SparkKind};

/// Twinkle multiplier from two sines keyed by the spark's seed
///
/// Stays within `[0.84, 1.0]`.
pub fn flicker(phase: f32, seed: u64) -> f32 {
    let offset = (seed % 10_000) as f32 * 0.001;
    0.92 + 0.05 * (phase * 15.0 + offset).sin() + 0.03 * (phase * 23.0 + offset * 2.0).sin()
}

#[inline]
fn with_flicker(rgb: [f32; 3], alpha: f32, flicker: f32) -> [f32; 4] {
    [
        (rgb[0] * flicker).clamp(0.0, 1.0),
        (rgb[1] * flicker).clamp(0.0, 1.0),
        (rgb[2] * flicker).clamp(0.0, 1.0),
        alpha.clamp(0.0, 1.0),
    ]
}

/// Full until `start`, then linear to zero at the end of life
#[inline]
fn linear_fade(life: f32, start: f32) -> f32 {
    if life < start {
        1.0
    } else {
        1.0 - (life - start) / (1.0 - start)
    }
}

/// White-hot to amber curve of the two-stage ballistic sparks
///
/// Secondaries are drawn at 90% alpha.
pub fn ballistic_color(kind: SparkKind, life: f32, flicker: f32) -> [f32; 4] {
    let life = life.clamp(0.0, 1.0);

    let rgb = if life < 0.15 {
        [1.0, 1.0, 1.0]
    } else if life < 0.35 {
        let t = (life - 0.15) / 0.2;
        [1.0, 1.0, 1.0 - t * 0.15]
    } else if life < 0.55 {
        let t = (life - 0.35) / 0.2;
        [1.0, 1.0 - t * 0.08, 0.85 - t * 0.35]
    } else if life < 0.75 {
        let t = (life - 0.55) / 0.2;
        [1.0, 0.92 - t * 0.12, 0.5 - t * 0.25]
    } else {
        let t = (life - 0.75) / 0.25;
        [1.0 - t * 0.1, 0.8 - t * 0.3, 0.25 - t * 0.2]
    };

    let mut alpha = if life < 0.6 {
        1.0
    } else {
        let a = 1.0 - (life - 0.6) / 0.4;
        a * a
    };
    if kind == SparkKind::Secondary {
        alpha *= 0.9;
    }

    with_flicker(rgb, alpha, flicker)
}

/// Per-type white body with warm tips for phase-cascade sparks
pub fn cascade_color(kind: CascadeType, life: f32, flicker: f32) -> [f32; 4] {
    let life = life.clamp(0.0, 1.0);

    let (rgb, alpha) = match kind {
        CascadeType::Core => {
            let rgb = if life < 0.85 {
                [1.0, 1.0, 1.0]
            } else {
                let p = (life - 0.85) / 0.15;
                [1.0, 1.0 - 0.059 * p, 1.0 - 0.098 * p]
            };
            (rgb, linear_fade(life, 0.7))
        }
        CascadeType::Inner => {
            let rgb = if life < 0.75 {
                [1.0, 1.0, 1.0]
            } else {
                let p = (life - 0.75) / 0.25;
                [1.0, 1.0 - 0.157 * p, 1.0 - 0.314 * p]
            };
            (rgb, linear_fade(life, 0.6))
        }
        CascadeType::Outer => {
            let rgb = if life < 0.65 {
                [1.0, 1.0, 1.0]
            } else if life < 0.85 {
                let p = (life - 0.65) / 0.2;
                [1.0, 1.0 - 0.118 * p, 1.0 - 0.392 * p]
            } else {
                let p = (life - 0.85) / 0.15;
                [1.0, 0.882 - 0.294 * p, 0.608 - 0.412 * p]
            };
            (rgb, linear_fade(life, 0.5))
        }
        CascadeType::Hair => {
            let rgb = if life < 0.6 {
                [1.0, 1.0, 0.98]
            } else {
                let p = (life - 0.6) / 0.4;
                [1.0, 1.0 - 0.196 * p, 0.98 - 0.471 * p]
            };
            (rgb, linear_fade(life, 0.4))
        }
    };

    with_flicker(rgb, alpha, flicker)
}

/// Orange chunk shed during fragmentation
pub fn fragment_color(life: f32) -> [f32; 4] {
    let life = life.clamp(0.0, 1.0);
    [
        1.0,
        1.0 - 0.392 * life,
        0.392 * (1.0 - life),
        linear_fade(life, 0.7),
    ]
}

/// Dim droplet shed in flight
pub fn micro_color(life: f32) -> [f32; 4] {
    let life = life.clamp(0.0, 1.0);
    [
        1.0,
        0.784 - 0.588 * life,
        0.196 * (1.0 - life),
        0.784 * (1.0 - life),
    ]
}
