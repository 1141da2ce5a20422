//! Tunable parameters for the erosion model, emitters and driver
//!
//! Every struct here implements [`Default`] with the values a real sparkler is
//! tuned to, plus a `validate` method that rejects values the simulation
//! cannot run with. With the `serde` feature enabled all of them can be read
//! from JSON; missing fields fall back to their defaults.

use std::time::Duration;

use bitflags::bitflags;
use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SparklerError};

bitflags! {
    /// Spark emission strategies a sparkler runs while burning
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct EmissionLayers: u8 {
        /// Continuous layered bursts of phase-cascade sparks
        const CASCADE = 0x01;
        /// Rate-driven two-stage ballistic sparks
        const BALLISTIC = 0x02;
        /// One-shot bursts as the burn front crosses fixed points
        const BURST_POINTS = 0x04;
    }
}

impl Default for EmissionLayers {
    fn default() -> Self {
        Self::BALLISTIC | Self::BURST_POINTS
    }
}

/// Erosion front parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ErosionConfig {
    /// Angular columns around the circumference
    pub columns: usize,
    /// Render-resolution samples (one extra wrap sample is kept internally)
    pub render_samples: usize,
    /// Concurrent drip slots
    pub drip_slots: usize,
    /// Height cap; the remainder of the stick is the handle
    pub max_progress: f32,
    /// Seconds for the front to travel the full stick length
    ///
    /// The default matches the default [`BurnClock`](crate::BurnClock) span.
    pub burn_duration: f32,
    /// Deviation from the ring average that triggers full cohesion correction
    pub max_deviation: f32,
    /// Drip start probability per second
    pub drip_probability: f32,
    /// Neighbourhood smoothing passes per advance
    pub smoothing_passes: usize,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            columns: 128,
            render_samples: 256,
            drip_slots: 8,
            max_progress: 0.75,
            burn_duration: 30.0,
            max_deviation: 0.004,
            drip_probability: 0.02,
            smoothing_passes: 2,
        }
    }
}

impl ErosionConfig {
    /// Check that the model can run with these values
    pub fn validate(&self) -> Result<()> {
        if self.columns < 4 {
            return Err(SparklerError::invalid(
                "erosion.columns",
                format!("must be at least 4, got {}", self.columns),
            ));
        }
        if self.render_samples == 0 {
            return Err(SparklerError::invalid(
                "erosion.render_samples",
                "must be positive",
            ));
        }
        if !(self.max_progress > 0.0 && self.max_progress <= 1.0) {
            return Err(SparklerError::invalid(
                "erosion.max_progress",
                format!("must be in (0, 1], got {}", self.max_progress),
            ));
        }
        if !(self.burn_duration.is_finite() && self.burn_duration > 0.0) {
            return Err(SparklerError::invalid(
                "erosion.burn_duration",
                format!("must be a positive number of seconds, got {}", self.burn_duration),
            ));
        }
        if !(self.max_deviation.is_finite() && self.max_deviation > 0.0) {
            return Err(SparklerError::invalid(
                "erosion.max_deviation",
                "must be positive",
            ));
        }
        if !(self.drip_probability.is_finite() && self.drip_probability >= 0.0) {
            return Err(SparklerError::invalid(
                "erosion.drip_probability",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Spawn-rate and population parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmissionConfig {
    /// Which emission strategies run while burning
    pub layers: EmissionLayers,
    /// Seconds between ballistic spawns at intensity 1
    pub spawn_interval: f32,
    /// Ceiling on top-level ballistic sparks
    pub max_primary_sparks: usize,
    /// Ceiling on top-level cascade sparks
    pub max_cascade_sparks: usize,
    /// Number of one-shot burst points along the burn range
    pub emission_points: usize,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            layers: EmissionLayers::default(),
            spawn_interval: 0.016,
            max_primary_sparks: 100,
            max_cascade_sparks: 600,
            emission_points: 60,
        }
    }
}

impl EmissionConfig {
    /// Check that the emitters can run with these values
    pub fn validate(&self) -> Result<()> {
        if !(self.spawn_interval.is_finite() && self.spawn_interval > 0.0) {
            return Err(SparklerError::invalid(
                "emission.spawn_interval",
                format!("must be positive, got {}", self.spawn_interval),
            ));
        }
        Ok(())
    }
}

/// Model-space geometry of the stick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StickGeometry {
    /// Y of the unburnt tip
    pub tip_y: f32,
    /// Y where the handle begins
    pub base_y: f32,
    /// Stick axis X
    pub center_x: f32,
    /// Stick axis Z
    pub center_z: f32,
}

impl Default for StickGeometry {
    fn default() -> Self {
        Self {
            tip_y: 0.9,
            base_y: 0.1,
            center_x: 0.5,
            center_z: 0.5,
        }
    }
}

impl StickGeometry {
    /// Model-space point on the stick axis at `fraction` of the length from the tip
    pub fn point_along(&self, fraction: f32) -> Vec3 {
        let y = self.tip_y - fraction * (self.tip_y - self.base_y);
        Vec3::new(self.center_x, y, self.center_z)
    }

    /// Model-space burn point for an average melt height
    #[inline]
    pub fn burn_point(&self, average_height: f32) -> Vec3 {
        self.point_along(average_height)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tip_y.is_finite() && self.base_y.is_finite() && self.tip_y > self.base_y) {
            return Err(SparklerError::invalid(
                "stick",
                format!("tip_y ({}) must be above base_y ({})", self.tip_y, self.base_y),
            ));
        }
        Ok(())
    }
}

/// Full configuration of one simulated sparkler
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SparklerConfig {
    pub erosion: ErosionConfig,
    pub emission: EmissionConfig,
    pub stick: StickGeometry,
    /// Largest frame step the driver will simulate, in seconds
    pub max_frame_delta: f32,
    /// Seed for the instance's random generator
    pub seed: u64,
}

impl Default for SparklerConfig {
    fn default() -> Self {
        Self {
            erosion: ErosionConfig::default(),
            emission: EmissionConfig::default(),
            stick: StickGeometry::default(),
            max_frame_delta: 0.05,
            seed: 0,
        }
    }
}

impl SparklerConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.erosion.validate()?;
        self.emission.validate()?;
        self.stick.validate()?;
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(SparklerError::invalid(
                "max_frame_delta",
                format!("must be positive, got {}", self.max_frame_delta),
            ));
        }
        Ok(())
    }

    /// Same configuration with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Registry-wide settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Template for newly created instances
    pub sparkler: SparklerConfig,
    /// Instances not touched for this long are evicted
    pub idle_timeout: Duration,
    /// Per-instance seeds are derived from this and the instance id
    pub base_seed: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sparkler: SparklerConfig::default(),
            idle_timeout: Duration::from_secs(10),
            base_seed: 0x5EED_5A7C,
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        self.sparkler.validate()?;
        if self.idle_timeout.is_zero() {
            return Err(SparklerError::invalid(
                "idle_timeout",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}
