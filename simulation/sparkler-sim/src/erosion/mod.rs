//! Monotonic erosion front around the stick circumference
//!
//! The front is tracked as a ring of angular columns, each holding how far the
//! coating has burnt down from the tip. Columns advance at a nearly uniform
//! rate with a little noise, are pulled back toward the ring average, and are
//! smoothed against their neighbours. Drips occasionally run ahead of the
//! front.
//!
//! Every stage re-clamps against the heights from before the call, so no
//! column ever moves backward. On top of that a render-resolution ratchet
//! keeps the largest combined height ever sampled at each angle, which makes
//! [`Erosion::height_at_angle`] non-decreasing at any fixed angle even though
//! spline sampling of a rising ring can locally dip.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use sparkler_sim::{Erosion, ErosionConfig};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut erosion = Erosion::new(ErosionConfig::default(), &mut rng)?;
//!
//! let before = erosion.height_at_angle(1.0);
//! erosion.advance(0.016, &mut rng);
//! assert!(erosion.height_at_angle(1.0) >= before);
//! # Ok::<(), sparkler_sim::SparklerError>(())
//! ```

mod drip;
mod interpolation;

pub use drip::{DRIP_FADE_RATE, Drip, MAX_DRIP_LENGTH, MIN_DRIP_WIDTH};
pub use interpolation::{angular_distance, catmull_rom_clamped, gaussian_falloff, wrap_angle};

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ErosionConfig;
use crate::error::Result;
use crate::noise::NoiseTable;

/// Weight of the per-column burn rate bias
///
/// Kept small so the ring stays flat; the bias only nudges columns apart.
const BURN_RATE_WEIGHT: f32 = 0.02;

/// Noise jitter band around the base rate (±3%)
const RATE_JITTER: f32 = 0.06;

/// Share of the blended value taken from the column itself while smoothing
const SMOOTH_SELF_WEIGHT: f32 = 0.3;

/// Columns either side that take part in smoothing
const SMOOTH_RADIUS: isize = 5;

/// Drips only start where the front is strictly between these shares of the cap
const DRIP_START_BAND: (f32, f32) = (0.1, 0.9);

/// Drips stop growing once the base front passes this share of the cap
const DRIP_STOP_SHARE: f32 = 0.9;

/// One render sample of the ratcheted surface
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfileSample {
    /// Angle of the sample in radians
    pub angle: f32,
    /// Part of the height coming from the melt front
    pub melt: f32,
    /// Part of the height coming from drips
    pub drip: f32,
}

impl ProfileSample {
    /// Total rendered height
    #[inline]
    pub fn height(&self) -> f32 {
        self.melt + self.drip
    }
}

/// Per-instance erosion state
#[derive(Debug, Clone)]
pub struct Erosion {
    config: ErosionConfig,
    noise: Arc<NoiseTable>,
    heights: Vec<f32>,
    burn_rate: Vec<f32>,
    drips: Vec<Drip>,
    /// Largest combined height ever produced per render sample, plus the wrap sample
    max_rendered: Vec<f32>,
    /// Base height at each render sample as of the last refresh
    rendered_melt: Vec<f32>,
    previous: Vec<f32>,
    scratch: Vec<f32>,
    elapsed: f32,
}

impl Erosion {
    /// Create a fresh, unburnt ring with its own noise table drawn from `rng`
    pub fn new<R: Rng + ?Sized>(config: ErosionConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        Self::with_noise(config, Arc::new(NoiseTable::new(rng)))
    }

    /// Create a fresh, unburnt ring reading from a shared noise table
    pub fn with_noise(config: ErosionConfig, noise: Arc<NoiseTable>) -> Result<Self> {
        config.validate()?;

        let columns = config.columns;
        let samples = config.render_samples + 1;
        let mut erosion = Self {
            noise,
            heights: vec![0.0; columns],
            burn_rate: vec![1.0; columns],
            drips: vec![Drip::default(); config.drip_slots],
            max_rendered: vec![0.0; samples],
            rendered_melt: vec![0.0; samples],
            previous: vec![0.0; columns],
            scratch: vec![0.0; columns],
            elapsed: 0.0,
            config,
        };
        erosion.seed_burn_rates();
        Ok(erosion)
    }

    /// Return to the unburnt state; the noise table is kept
    pub fn reset(&mut self) {
        self.heights.fill(0.0);
        self.drips.fill(Drip::default());
        self.max_rendered.fill(0.0);
        self.rendered_melt.fill(0.0);
        self.elapsed = 0.0;
        self.seed_burn_rates();
        log::debug!("Erosion reset ({} columns)", self.heights.len());
    }

    fn seed_burn_rates(&mut self) {
        for (i, rate) in self.burn_rate.iter_mut().enumerate() {
            *rate = 0.6 + self.noise.sample(i as f32 * 2.0) * 0.8;
        }
    }

    pub fn noise(&self) -> &Arc<NoiseTable> {
        &self.noise
    }

    /// Configuration this model runs with
    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Height cap
    #[inline]
    pub fn max_progress(&self) -> f32 {
        self.config.max_progress
    }

    /// Current per-column heights
    pub fn column_heights(&self) -> &[f32] {
        &self.heights
    }

    /// Per-column burn rate multipliers
    pub fn column_burn_rates(&self) -> &[f32] {
        &self.burn_rate
    }

    /// Drip slots, active or not
    pub fn drips(&self) -> &[Drip] {
        &self.drips
    }

    /// Seconds of burning simulated since the last reset
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the front by `dt` seconds on its own clock
    ///
    /// Negative, zero or non-finite steps leave the state untouched. No column
    /// height and no value of [`Erosion::height_at_angle`] decreases.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.step(dt, None, rng);
    }

    /// Advance by `dt` seconds while following an externally driven `target`
    ///
    /// Columns keep their own noisy rate but stay within `max_deviation` of the
    /// target: lagging columns are pulled up to the band and leading ones wait
    /// for it. Columns that already passed the band stay where they are.
    pub fn advance_toward<R: Rng + ?Sized>(&mut self, dt: f32, target: f32, rng: &mut R) {
        let cap = self.config.max_progress;
        let target = if target.is_finite() {
            target.clamp(0.0, cap)
        } else {
            0.0
        };
        let band = self.config.max_deviation;
        self.step(dt, Some((target - band, target + band)), rng);
    }

    fn step<R: Rng + ?Sized>(&mut self, dt: f32, band: Option<(f32, f32)>, rng: &mut R) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.elapsed += dt;

        self.previous.copy_from_slice(&self.heights);
        self.advance_columns(dt);
        for _ in 0..self.config.smoothing_passes {
            self.smooth();
        }
        if let Some((low, high)) = band {
            let cap = self.config.max_progress;
            for (height, &previous) in self.heights.iter_mut().zip(&self.previous) {
                *height = height.min(high).max(low).min(cap).max(previous);
            }
        }
        self.maybe_start_drip(dt, rng);
        self.advance_drips(dt);

        for (height, &previous) in self.heights.iter_mut().zip(&self.previous) {
            *height = height.max(previous);
        }

        self.refresh_profile();
    }

    fn advance_columns(&mut self, dt: f32) {
        let cap = self.config.max_progress;
        let base_speed = 1.0 / self.config.burn_duration;
        let max_deviation = self.config.max_deviation;
        let progress = self.elapsed / self.config.burn_duration;
        let average = self.average_height();

        for (i, height) in self.heights.iter_mut().enumerate() {
            let previous = self.previous[i];
            if previous >= cap {
                continue;
            }

            let noise = self.noise.sample(i as f32 * 0.3 + progress * 5.0);
            let mut rate = base_speed * (1.0 - RATE_JITTER * 0.5 + noise * RATE_JITTER);
            rate *= 1.0 + (self.burn_rate[i] - 1.0) * BURN_RATE_WEIGHT;

            let deviation = previous - average;
            if deviation.abs() > max_deviation * 0.5 {
                let correction = (deviation.abs() / max_deviation).min(1.0);
                if deviation > 0.0 {
                    rate *= 1.0 - correction * 0.3;
                } else {
                    rate *= 1.0 + correction * 0.5;
                }
            }
            let rate = rate.max(0.01 * base_speed);

            *height = previous.max((previous + rate * dt).min(cap));
        }
    }

    fn smooth(&mut self) {
        let cap = self.config.max_progress;
        let columns = self.heights.len() as isize;
        self.scratch.copy_from_slice(&self.heights);

        for i in 0..columns {
            let idx = i as usize;
            if self.scratch[idx] >= cap {
                continue;
            }

            let mut sum = 0.0;
            let mut weight_sum = 0.0;
            for offset in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
                let neighbour = (i + offset).rem_euclid(columns) as usize;
                let weight = 1.0 / (1.0 + offset.unsigned_abs() as f32 * 0.3);
                sum += self.scratch[neighbour] * weight;
                weight_sum += weight;
            }
            let neighbourhood = sum / weight_sum;
            let blended =
                self.scratch[idx] * SMOOTH_SELF_WEIGHT + neighbourhood * (1.0 - SMOOTH_SELF_WEIGHT);

            self.heights[idx] = self.previous[idx].max(blended.min(cap));
        }
    }

    fn maybe_start_drip<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if rng.random::<f32>() >= self.config.drip_probability * dt {
            return;
        }

        let cap = self.config.max_progress;
        let columns = self.heights.len();
        let column = rng.random_range(0..columns);
        let height = self.heights[column];
        if height <= cap * DRIP_START_BAND.0 || height >= cap * DRIP_START_BAND.1 {
            return;
        }

        if let Some(slot) = self.drips.iter_mut().find(|d| d.is_free()) {
            slot.start(column, columns, rng);
            log::trace!("Drip started at column {column}");
        }
    }

    fn advance_drips(&mut self, dt: f32) {
        let limit = self.config.max_progress * DRIP_STOP_SHARE;
        for i in 0..self.drips.len() {
            let front = self.base_height_at_angle(self.drips[i].angle);
            self.drips[i].advance(dt, front, limit);
        }
    }

    fn refresh_profile(&mut self) {
        let samples = self.config.render_samples;
        for j in 0..=samples {
            let angle = j as f32 / samples as f32 * TAU;
            let melt = self.base_height_at_angle(angle);
            let combined = melt + self.drip_extension_at_angle(angle);
            if !combined.is_finite() {
                continue;
            }
            if combined > self.max_rendered[j] {
                self.max_rendered[j] = combined;
            }
            self.rendered_melt[j] = melt.min(self.max_rendered[j]);
        }
    }

    /// Melt front height at `angle`, without drips or the render ratchet
    ///
    /// Clamped Catmull-Rom over the four surrounding columns, limited to `[0, 1]`.
    pub fn base_height_at_angle(&self, angle: f32) -> f32 {
        let columns = self.heights.len();
        let position = wrap_angle(angle) / TAU * columns as f32;
        let col0 = (position as usize) % columns;
        let t = position - position.floor();

        let col_m1 = (col0 + columns - 1) % columns;
        let col1 = (col0 + 1) % columns;
        let col2 = (col0 + 2) % columns;

        let height = catmull_rom_clamped(
            self.heights[col_m1],
            self.heights[col0],
            self.heights[col1],
            self.heights[col2],
            t,
        );
        height.clamp(0.0, 1.0)
    }

    /// Largest visible drip extension at `angle`
    pub fn drip_extension_at_angle(&self, angle: f32) -> f32 {
        self.drips
            .iter()
            .map(|drip| drip.extension_at(angle))
            .fold(0.0, f32::max)
    }

    /// Rendered surface height at `angle`
    ///
    /// Linear blend of the two ratcheted render samples around `angle`, so the
    /// value at any fixed angle never decreases between advances.
    pub fn height_at_angle(&self, angle: f32) -> f32 {
        let samples = self.config.render_samples;
        let position = wrap_angle(angle) / TAU * samples as f32;
        let j0 = (position as usize).min(samples - 1);
        let t = (position - j0 as f32).clamp(0.0, 1.0);
        let a = self.max_rendered[j0];
        let b = self.max_rendered[j0 + 1];
        a + (b - a) * t
    }

    /// Ratcheted surface at render resolution, split into melt and drip parts
    ///
    /// Includes the wrap sample at `2π`, so it has `render_samples + 1` entries.
    pub fn rendered_profile(&self) -> Vec<ProfileSample> {
        let samples = self.config.render_samples;
        self.max_rendered
            .iter()
            .zip(&self.rendered_melt)
            .enumerate()
            .map(|(j, (&height, &melt))| ProfileSample {
                angle: j as f32 / samples as f32 * TAU,
                melt,
                drip: (height - melt).max(0.0),
            })
            .collect()
    }

    /// Mean column height, capped columns included
    pub fn average_height(&self) -> f32 {
        self.heights.iter().sum::<f32>() / self.heights.len() as f32
    }

    /// Finish the burn: every column jumps to the cap and drips are cleared
    ///
    /// The render ratchet is kept, so [`Erosion::height_at_angle`] still never
    /// decreases.
    pub fn burn_out(&mut self) {
        self.heights.fill(self.config.max_progress);
        self.drips.fill(Drip::default());
        self.refresh_profile();
        log::debug!("Erosion burnt out after {:.2}s", self.elapsed);
    }

    /// Every column sits at the cap and no drip is still showing
    pub fn is_fully_burned(&self) -> bool {
        let cap = self.config.max_progress;
        self.heights.iter().all(|&h| h >= cap) && self.drips.iter().all(|d| !d.is_visible())
    }
}
