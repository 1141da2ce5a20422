//! Light emitted by a burning sparkler
//!
//! While the coating burns the light sits at the burn point at full
//! intensity. Once the coating is consumed it holds for [`BURNOUT_HOLD`]
//! seconds, fades linearly over [`BURNOUT_FADE`] seconds and goes out. Young,
//! bright cascade sparks add small short-lived lights of their own.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::particles::{CascadeSpark, CascadeType};

/// Seconds the light stays at full intensity after burn-out
pub const BURNOUT_HOLD: f32 = 10.0;
/// Seconds of linear fade after the hold
pub const BURNOUT_FADE: f32 = 1.0;

/// Brightest light level hosts map intensity 1 to
pub const MAX_LIGHT_LEVEL: f32 = 14.0;

/// A point light in world space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightSample {
    pub position: Vec3,
    /// Intensity in `[0, 1]`
    pub intensity: f32,
}

impl LightSample {
    /// Intensity scaled to a whole host light level, rounded down
    pub fn level(&self) -> u8 {
        (self.intensity.clamp(0.0, 1.0) * MAX_LIGHT_LEVEL) as u8
    }
}

/// Light state of one sparkler
#[derive(Debug, Clone, Default)]
pub struct BurnLight {
    burned_out_for: Option<f32>,
    current: Option<LightSample>,
}

impl BurnLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Light at the burn point, if any
    pub fn current(&self) -> Option<LightSample> {
        self.current
    }

    /// Seconds since burn-out, if burnt out
    pub fn burned_out_for(&self) -> Option<f32> {
        self.burned_out_for
    }

    /// Still burning: full light at `position`
    pub fn burning(&mut self, position: Vec3) {
        self.burned_out_for = None;
        self.current = Some(LightSample {
            position,
            intensity: 1.0,
        });
    }

    /// Coating consumed: advance the hold and fade sequence by `dt`
    pub fn burned_out(&mut self, dt: f32, position: Vec3) {
        let elapsed = self.burned_out_for.map_or(0.0, |t| t + dt);
        if self.burned_out_for.is_none() {
            log::debug!("Burn light holding for {BURNOUT_HOLD}s");
        }
        self.burned_out_for = Some(elapsed);

        let intensity = burnout_intensity(elapsed);
        self.current = (intensity > 0.0).then_some(LightSample {
            position,
            intensity,
        });
    }

    /// Unlit: no light at all
    pub fn extinguish(&mut self) {
        self.burned_out_for = None;
        self.current = None;
    }

    /// Hold and fade sequence has finished
    pub fn is_out(&self) -> bool {
        self.burned_out_for
            .is_some_and(|t| t >= BURNOUT_HOLD + BURNOUT_FADE)
    }
}

/// Intensity `elapsed` seconds after burn-out
pub fn burnout_intensity(elapsed: f32) -> f32 {
    if elapsed < BURNOUT_HOLD {
        1.0
    } else if elapsed < BURNOUT_HOLD + BURNOUT_FADE {
        1.0 - (elapsed - BURNOUT_HOLD) / BURNOUT_FADE
    } else {
        0.0
    }
}

/// Lights thrown by young, bright cascade sparks, at most `max` of them
///
/// Only sparks in the first half of their life with brightness above one
/// qualify; intensity falls off with age.
pub fn spark_lights<'a>(
    sparks: impl IntoIterator<Item = &'a CascadeSpark>,
    max: usize,
) -> Vec<LightSample> {
    let mut lights = Vec::new();
    for spark in sparks {
        if lights.len() >= max {
            break;
        }
        let life = spark.body.life_fraction();
        if life >= 0.5 || spark.brightness <= 1.0 || spark.body.is_expired() {
            continue;
        }
        let base = match spark.kind {
            CascadeType::Core => 10.0,
            CascadeType::Inner => 7.0,
            CascadeType::Outer | CascadeType::Hair => 5.0,
        };
        let level = base * (1.0 - life * 1.5);
        if level >= 1.0 {
            lights.push(LightSample {
                position: spark.body.position,
                intensity: level / MAX_LIGHT_LEVEL,
            });
        }
    }
    lights
}
