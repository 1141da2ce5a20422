//! Per-instance simulation driver
//!
//! A [`Sparkler`] owns everything one sparkler needs between frames: the
//! erosion front, both spark populations, the emitters, the burn light and a
//! seeded random generator. Each call to [`Sparkler::simulate_frame`] takes a
//! [`FrameInput`], sanitizes it and runs one step of the lifecycle:
//!
//! - unlit: all state is cleared synchronously
//! - burning: erosion follows the host's burn progress, emitters spawn at the
//!   burn point, every spark is updated and the dead ones are pruned
//! - burnt out: the erosion ring is completed, nothing new is spawned,
//!   existing sparks play out and the light runs its hold and fade sequence
//!
//! Lighting a sparkler that was unlit or already burnt out starts from a
//! fresh, unburnt state. The noise table is drawn once and survives relights.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{EmissionLayers, SparklerConfig};
use crate::emission::{EmissionPoints, LayeredEmitter, RateEmitter};
use crate::erosion::{Erosion, ProfileSample};
use crate::error::Result;
use crate::lighting::{BurnLight, LightSample, spark_lights};
use crate::noise::NoiseTable;
use crate::particles::{BallisticSpark, CascadeSpark, RenderSpark, SparkPopulation};
use crate::sampling::to_world_point;

/// Most spark lights reported per frame
pub const MAX_SPARK_LIGHTS: usize = 8;

/// Host-provided state for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Burn progress in `[0, max_progress]`
    pub burn_progress: f32,
    /// Emission intensity in `[0, 1]`
    pub fade: f32,
    pub lit: bool,
    /// Model to world transform of the stick
    pub transform: Mat4,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            dt: 0.0,
            burn_progress: 0.0,
            fade: 1.0,
            lit: false,
            transform: Mat4::IDENTITY,
        }
    }
}

impl FrameInput {
    /// A lit frame at full intensity with the identity transform
    pub fn burning(dt: f32, burn_progress: f32) -> Self {
        Self {
            dt,
            burn_progress,
            lit: true,
            ..Self::default()
        }
    }

    /// An unlit frame
    pub fn unlit(dt: f32) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    pub fn with_fade(mut self, fade: f32) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Clamp every field into the range the simulation runs with
    ///
    /// `dt` to `[0, max_dt]`, progress to `[0, max_progress]`, fade to
    /// `[0, 1]`. NaN becomes zero and a non-finite transform becomes the
    /// identity.
    pub fn sanitized(&self, max_dt: f32, max_progress: f32) -> Self {
        Self {
            dt: finite_or_zero(self.dt).clamp(0.0, max_dt),
            burn_progress: finite_or_zero(self.burn_progress).clamp(0.0, max_progress),
            fade: finite_or_zero(self.fade).clamp(0.0, 1.0),
            lit: self.lit,
            transform: if self.transform.is_finite() {
                self.transform
            } else {
                Mat4::IDENTITY
            },
        }
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v }
}

/// Where a sparkler is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BurnState {
    #[default]
    Unlit,
    Burning,
    BurnedOut,
}

/// Owned copy of everything a renderer needs from one frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameSnapshot {
    pub state: BurnState,
    /// Simulated frames since creation
    pub frame: u64,
    /// Every visible spark, flattened
    pub sparks: Vec<RenderSpark>,
    /// Top-level ballistic primaries
    pub primary_count: usize,
    /// Top-level cascade sparks
    pub cascade_count: usize,
    /// All live particles including descendants
    pub total_particles: usize,
    /// Host burn progress as of the last lit frame
    pub burn_progress: f32,
    /// Mean melt height of the erosion ring
    pub average_height: f32,
    /// World-space burn point
    pub burn_point: Vec3,
    pub light: Option<LightSample>,
    pub spark_lights: Vec<LightSample>,
    /// Ratcheted surface at render resolution
    pub profile: Vec<ProfileSample>,
    /// Every erosion column at the cap with no drip showing
    pub fully_burned: bool,
    /// Emission points that have fired
    pub points_fired: usize,
}

/// Simulation state of one sparkler
#[derive(Debug, Clone)]
pub struct Sparkler {
    config: SparklerConfig,
    rng: StdRng,
    erosion: Erosion,
    primaries: SparkPopulation<BallisticSpark>,
    cascades: SparkPopulation<CascadeSpark>,
    rate: RateEmitter,
    layered: LayeredEmitter,
    points: EmissionPoints,
    light: BurnLight,
    state: BurnState,
    transform: Mat4,
    burn_progress: f32,
    frame: u64,
}

impl Sparkler {
    /// Validate `config` and build an unlit sparkler with its own noise table
    pub fn new(config: SparklerConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let noise = Arc::new(NoiseTable::new(&mut rng));
        Self::build(config, rng, noise)
    }

    /// Validate `config` and build an unlit sparkler reading a shared noise table
    pub fn with_noise(config: SparklerConfig, noise: Arc<NoiseTable>) -> Result<Self> {
        config.validate()?;

        let rng = StdRng::seed_from_u64(config.seed);
        Self::build(config, rng, noise)
    }

    fn build(config: SparklerConfig, rng: StdRng, noise: Arc<NoiseTable>) -> Result<Self> {
        let erosion = Erosion::with_noise(config.erosion.clone(), noise)?;
        let emission = &config.emission;

        Ok(Self {
            primaries: SparkPopulation::new(emission.max_primary_sparks),
            cascades: SparkPopulation::new(emission.max_cascade_sparks),
            rate: RateEmitter::new(emission.spawn_interval),
            layered: LayeredEmitter::new(),
            points: EmissionPoints::new(emission.emission_points),
            light: BurnLight::new(),
            state: BurnState::Unlit,
            transform: Mat4::IDENTITY,
            burn_progress: 0.0,
            frame: 0,
            erosion,
            rng,
            config,
        })
    }

    pub fn config(&self) -> &SparklerConfig {
        &self.config
    }

    pub fn state(&self) -> BurnState {
        self.state
    }

    pub fn erosion(&self) -> &Erosion {
        &self.erosion
    }

    /// Noise table shared by the erosion front and host-side placement
    pub fn noise(&self) -> &Arc<NoiseTable> {
        self.erosion.noise()
    }

    pub fn primaries(&self) -> &SparkPopulation<BallisticSpark> {
        &self.primaries
    }

    pub fn cascades(&self) -> &SparkPopulation<CascadeSpark> {
        &self.cascades
    }

    pub fn emission_points(&self) -> &EmissionPoints {
        &self.points
    }

    pub fn light(&self) -> Option<LightSample> {
        self.light.current()
    }

    /// Host burn progress as of the last lit frame
    pub fn burn_progress(&self) -> f32 {
        self.burn_progress
    }

    /// Frames simulated since creation
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Melt height at `angle`, non-decreasing over the life of a burn
    pub fn height_at_angle(&self, angle: f32) -> f32 {
        self.erosion.height_at_angle(angle)
    }

    pub fn drip_extension_at_angle(&self, angle: f32) -> f32 {
        self.erosion.drip_extension_at_angle(angle)
    }

    pub fn average_height(&self) -> f32 {
        self.erosion.average_height()
    }

    /// Model-space point on the stick axis at the average melt height
    pub fn burn_point(&self) -> Vec3 {
        self.config.stick.burn_point(self.erosion.average_height())
    }

    /// World-space burn point under the last frame's transform
    pub fn world_burn_point(&self) -> Vec3 {
        to_world_point(&self.transform, self.burn_point())
    }

    /// Run one frame
    pub fn simulate_frame(&mut self, input: FrameInput) -> BurnState {
        let input = input.sanitized(self.config.max_frame_delta, self.erosion.max_progress());
        self.frame += 1;
        self.transform = input.transform;

        if !input.lit {
            if self.state != BurnState::Unlit {
                log::debug!("Sparkler extinguished after {} frames", self.frame);
                self.reset();
            }
            self.state = BurnState::Unlit;
            return self.state;
        }

        let consumed = input.burn_progress >= self.erosion.max_progress();
        let relit = match self.state {
            BurnState::Unlit => true,
            BurnState::BurnedOut => !consumed,
            BurnState::Burning => false,
        };
        if relit {
            self.reset();
            log::info!("Sparkler lit (seed {})", self.config.seed);
        }
        self.burn_progress = input.burn_progress;

        if consumed {
            if self.state != BurnState::BurnedOut {
                log::info!("Sparkler burnt out after {} frames", self.frame);
                self.erosion.burn_out();
            }
            self.state = BurnState::BurnedOut;
            let light_point = self.world_burn_point();
            self.light.burned_out(input.dt, light_point);
            self.update_sparks(input.dt);
            return self.state;
        }

        self.state = BurnState::Burning;
        self.erosion
            .advance_toward(input.dt, input.burn_progress, &mut self.rng);
        let burn_point = self.burn_point();
        self.light.burning(to_world_point(&input.transform, burn_point));
        self.emit(&input, burn_point);
        self.update_sparks(input.dt);

        self.state
    }

    fn emit(&mut self, input: &FrameInput, burn_point: Vec3) {
        let layers = self.config.emission.layers;

        if layers.contains(EmissionLayers::BURST_POINTS) {
            self.points.fire(
                input.burn_progress,
                input.fade,
                &self.config.stick,
                &input.transform,
                &mut self.cascades,
                &mut self.rng,
            );
        }
        if layers.contains(EmissionLayers::CASCADE) {
            self.layered.emit(
                input.fade,
                burn_point,
                &input.transform,
                &mut self.cascades,
                &mut self.rng,
            );
        }
        if layers.contains(EmissionLayers::BALLISTIC) {
            self.rate.emit(
                input.dt,
                input.fade,
                burn_point,
                &input.transform,
                &mut self.primaries,
                &mut self.rng,
            );
        }
    }

    fn update_sparks(&mut self, dt: f32) {
        let pruned =
            self.primaries.update(dt, &mut self.rng) + self.cascades.update(dt, &mut self.rng);
        if pruned > 0 {
            log::trace!("Pruned {pruned} sparks");
        }
    }

    /// Back to a fresh, unburnt state; the random stream carries on
    fn reset(&mut self) {
        self.erosion.reset();
        self.primaries.clear();
        self.cascades.clear();
        self.rate.reset();
        self.points.reset();
        self.light.extinguish();
        self.burn_progress = 0.0;
    }

    /// Owned copy of the current state for rendering
    pub fn snapshot(&self) -> FrameSnapshot {
        let mut sparks = Vec::with_capacity(self.primaries.total_live() + self.cascades.total_live());
        self.primaries.collect_render(&mut sparks);
        self.cascades.collect_render(&mut sparks);

        let spark_lights = if self.state == BurnState::Unlit {
            Vec::new()
        } else {
            spark_lights(&self.cascades, MAX_SPARK_LIGHTS)
        };

        FrameSnapshot {
            state: self.state,
            frame: self.frame,
            sparks,
            primary_count: self.primaries.len(),
            cascade_count: self.cascades.len(),
            total_particles: self.primaries.total_live() + self.cascades.total_live(),
            burn_progress: self.burn_progress,
            average_height: self.erosion.average_height(),
            burn_point: self.world_burn_point(),
            light: self.light.current(),
            spark_lights,
            profile: self.erosion.rendered_profile(),
            fully_burned: self.erosion.is_fully_burned(),
            points_fired: self.points.fired_count(),
        }
    }
}
