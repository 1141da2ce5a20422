//! Phase-cascade sparks
//!
//! A cascade spark walks through eight phases mapped onto a nominal 25-frame
//! life: it is ejected, stretches, flies, becomes unstable, fragments twice,
//! blooms and finally falls as an ember. Each phase has its own physics, and
//! three phases fire a one-shot event on entry:
//!
//! - primary fragment: 3-5 fragments spread around the heading
//! - secondary fragment: every fragment splits into 2-3 pieces it owns
//! - bloom: up to [`MAX_BLOOM_RAYS`] fading rays sized by the descendant count
//!
//! Events are guarded by [`PhaseEvents`] flags and draw from a generator
//! seeded with `seed + phase`, so a spark replays the same fragments no matter
//! how its frames are sliced. A step that skips phases fires every skipped
//! entry in order.

use std::f32::consts::TAU;

use bitflags::bitflags;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::color::{cascade_color, flicker};
use super::fragment::{Fragment, MicroSpark};
use super::particle::ParticleBody;
use super::{RenderSpark, Spark};
use crate::sampling::{GOLDEN_ANGLE, cone_direction, normalize_or_up, uniform_sphere};

/// Positions kept for trail rendering
pub const TRAIL_HISTORY_SIZE: usize = 12;

/// Hard cap on bloom rays per spark
pub const MAX_BLOOM_RAYS: usize = 50;

/// Nominal frames a cascade spark's life is divided into
const NOMINAL_FRAMES: f32 = 25.0;

/// Gravity before the per-type multiplier
const BASE_GRAVITY: f32 = 2.5;

/// Lifecycle phase of a cascade spark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum CascadePhase {
    /// Frames 0-3: violent ejection of a molten blob
    Ejection = 0,
    /// Frames 3-7: blob stretches into a tadpole
    Stretch = 1,
    /// Frames 7-12: comet flight
    Flight = 2,
    /// Frames 12-16: wobbling, cracking, calving
    Instability = 3,
    /// Frames 16-19: main body ruptures
    PrimaryFragment = 4,
    /// Frames 19-22: chunks split again
    SecondaryFragment = 5,
    /// Frames 22-24: terminal bloom
    Bloom = 6,
    /// Frame 24 onward: ember fall
    Ember = 7,
}

impl CascadePhase {
    /// Every phase in lifecycle order
    pub const ALL: [Self; 8] = [
        Self::Ejection,
        Self::Stretch,
        Self::Flight,
        Self::Instability,
        Self::PrimaryFragment,
        Self::SecondaryFragment,
        Self::Bloom,
        Self::Ember,
    ];

    /// Phase for a life fraction in `[0, 1]`
    pub fn from_life(life: f32) -> Self {
        let frame = life * NOMINAL_FRAMES;
        if frame < 3.0 {
            Self::Ejection
        } else if frame < 7.0 {
            Self::Stretch
        } else if frame < 12.0 {
            Self::Flight
        } else if frame < 16.0 {
            Self::Instability
        } else if frame < 19.0 {
            Self::PrimaryFragment
        } else if frame < 22.0 {
            Self::SecondaryFragment
        } else if frame < 24.0 {
            Self::Bloom
        } else {
            Self::Ember
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Self::Ember
    }
}

bitflags! {
    /// One-shot events a cascade spark has already fired
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PhaseEvents: u8 {
        const FRAGMENTED = 0x01;
        const SECONDARY_FRAGMENTED = 0x02;
        const BLOOMED = 0x04;
    }
}

/// Visual category of a cascade spark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CascadeType {
    Core,
    Inner,
    Outer,
    Hair,
}

impl CascadeType {
    /// Share of base gravity this type feels
    pub fn gravity_multiplier(self) -> f32 {
        match self {
            Self::Core => 0.4,
            Self::Inner => 0.5,
            Self::Outer => 0.6,
            Self::Hair => 0.3,
        }
    }

    /// Linear drag coefficient
    pub fn drag(self) -> f32 {
        match self {
            Self::Core => 0.08,
            Self::Inner => 0.06,
            Self::Outer => 0.04,
            Self::Hair => 0.05,
        }
    }
}

/// Purely visual ray thrown out during bloom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomRay {
    pub direction: Vec3,
    /// Grows at 2 units per second
    pub length: f32,
    /// Decays at 4 per second, floored at zero
    pub fade: f32,
}

/// A spark driven by the eight-phase cascade
#[derive(Debug, Clone)]
pub struct CascadeSpark {
    pub body: ParticleBody,
    pub kind: CascadeType,
    /// Trail length
    pub length: f32,
    pub brightness: f32,
    pub seed: u64,
    phase: CascadePhase,
    phase_time: f32,
    wobble_phase: f32,
    wobble_speed: f32,
    rotation: f32,
    rotation_speed: f32,
    blob_stretch: f32,
    pulse_phase: f32,
    crack_progress: f32,
    events: PhaseEvents,
    events_fired: u32,
    fragments: Vec<Fragment>,
    micro_sparks: Vec<MicroSpark>,
    trail: [Vec3; TRAIL_HISTORY_SIZE],
    trail_head: usize,
    bloom_rays: Vec<BloomRay>,
}

impl CascadeSpark {
    /// Create a spark in the ejection phase
    pub fn new<R: Rng + ?Sized>(
        position: Vec3,
        velocity: Vec3,
        max_age: f32,
        length: f32,
        brightness: f32,
        kind: CascadeType,
        rng: &mut R,
    ) -> Self {
        Self {
            body: ParticleBody::new(position, velocity, max_age),
            kind,
            length,
            brightness,
            seed: rng.random(),
            phase: CascadePhase::Ejection,
            phase_time: 0.0,
            wobble_phase: rng.random::<f32>() * TAU,
            wobble_speed: rng.random_range(10.0..30.0),
            rotation: rng.random::<f32>() * TAU,
            rotation_speed: rng.random_range(15.0..40.0),
            blob_stretch: 0.0,
            pulse_phase: rng.random::<f32>() * TAU,
            crack_progress: 0.0,
            events: PhaseEvents::empty(),
            events_fired: 0,
            fragments: Vec::new(),
            micro_sparks: Vec::new(),
            trail: [position; TRAIL_HISTORY_SIZE],
            trail_head: 0,
            bloom_rays: Vec::new(),
        }
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    /// Seconds spent in the current phase
    pub fn phase_time(&self) -> f32 {
        self.phase_time
    }

    /// One-shot events already fired
    pub fn events(&self) -> PhaseEvents {
        self.events
    }

    /// How many one-shot events have fired over the spark's life
    pub fn events_fired(&self) -> u32 {
        self.events_fired
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn micro_sparks(&self) -> &[MicroSpark] {
        &self.micro_sparks
    }

    pub fn bloom_rays(&self) -> &[BloomRay] {
        &self.bloom_rays
    }

    /// Stretch from sphere (0) to full tadpole (1)
    pub fn blob_stretch(&self) -> f32 {
        self.blob_stretch
    }

    /// Surface cracking in `[0, 1]`
    pub fn crack_progress(&self) -> f32 {
        self.crack_progress
    }

    /// Spin angle in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Recent positions, oldest first
    pub fn trail(&self) -> impl Iterator<Item = Vec3> + '_ {
        (1..=TRAIL_HISTORY_SIZE).map(move |k| self.trail[(self.trail_head + k) % TRAIL_HISTORY_SIZE])
    }

    /// Current color including flicker
    pub fn color(&self) -> [f32; 4] {
        cascade_color(
            self.kind,
            self.body.life_fraction(),
            flicker(self.pulse_phase, self.seed),
        )
    }

    fn advance_phase(&mut self, dt: f32) {
        let target = CascadePhase::from_life(self.body.life_fraction());
        if target > self.phase {
            for phase in &CascadePhase::ALL[self.phase.index() + 1..=target.index()] {
                self.on_enter(*phase);
            }
            self.phase = target;
            self.phase_time = 0.0;
        } else {
            self.phase_time += dt;
        }
    }

    fn on_enter(&mut self, phase: CascadePhase) {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(phase as u64));

        match phase {
            CascadePhase::PrimaryFragment if !self.events.contains(PhaseEvents::FRAGMENTED) => {
                self.events.insert(PhaseEvents::FRAGMENTED);
                self.events_fired += 1;
                self.spawn_fragments(&mut rng);
            }
            CascadePhase::SecondaryFragment
                if !self.events.contains(PhaseEvents::SECONDARY_FRAGMENTED) =>
            {
                self.events.insert(PhaseEvents::SECONDARY_FRAGMENTED);
                self.events_fired += 1;
                self.split_fragments(&mut rng);
            }
            CascadePhase::Bloom if !self.events.contains(PhaseEvents::BLOOMED) => {
                self.events.insert(PhaseEvents::BLOOMED);
                self.events_fired += 1;
                self.spawn_bloom(&mut rng);
            }
            _ => {}
        }
    }

    fn spawn_fragments(&mut self, rng: &mut StdRng) {
        let heading = normalize_or_up(self.body.velocity);
        let speed = self.body.speed();
        let count = 3 + rng.random_range(0..3);

        for i in 0..count {
            let twist = GOLDEN_ANGLE * i as f32 + rng.random::<f32>() * 0.5;
            let spread = 0.3 + rng.random::<f32>() * 0.5;
            let direction = cone_direction(heading, twist, spread);
            let fragment_speed = speed * (0.4 + rng.random::<f32>() * 0.4);
            self.fragments.push(Fragment::new(
                self.body.position,
                direction * fragment_speed,
                rng.random_range(0.4..0.7),
                self.brightness * 0.7,
                self.seed.wrapping_add(i as u64 * 1000),
                rng.random::<f32>() * TAU,
            ));
        }
        log::trace!("Cascade spark fragmented into {count}");
    }

    fn split_fragments(&mut self, rng: &mut StdRng) {
        for fragment in &mut self.fragments {
            let splits = 2 + rng.random_range(0..2);
            for i in 0..splits {
                let angle = rng.random::<f32>() * TAU;
                let speed = 0.3 + rng.random::<f32>() * 0.5;
                let kick = Vec3::new(
                    angle.cos() * speed,
                    (rng.random::<f32>() - 0.5) * speed,
                    angle.sin() * speed,
                );
                fragment.children.push(Fragment::new(
                    fragment.body.position,
                    fragment.body.velocity + kick,
                    rng.random_range(0.2..0.4),
                    fragment.brightness * 0.6,
                    fragment.seed.wrapping_add(i as u64 * 100),
                    rng.random::<f32>() * TAU,
                ));
            }
        }
    }

    fn spawn_bloom(&mut self, rng: &mut StdRng) {
        let descendants: usize = self
            .fragments
            .iter()
            .map(|fragment| 1 + fragment.descendant_count())
            .sum();

        let mut total = 6 + rng.random_range(0..4);
        for _ in 0..descendants {
            total += 4 + rng.random_range(0..3);
            if total >= MAX_BLOOM_RAYS {
                break;
            }
        }
        let total = total.min(MAX_BLOOM_RAYS);

        self.bloom_rays = (0..total)
            .map(|_| BloomRay {
                direction: uniform_sphere(rng),
                length: 0.01,
                fade: 1.0,
            })
            .collect();
    }

    fn basic_physics(&mut self, dt: f32) {
        self.body.integrate(
            dt,
            BASE_GRAVITY * self.kind.gravity_multiplier(),
            self.kind.drag(),
        );
    }

    fn shed_micro(&mut self, position: Vec3, velocity: Vec3, max_age: f32) {
        self.micro_sparks.push(MicroSpark::new(position, velocity, max_age));
    }

    fn update_ejection<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let boost = 1.5 * (1.0 - self.phase_time * 3.0);
        let speed = self.body.speed();
        if boost > 0.0 && speed > 0.01 {
            self.body.velocity += self.body.velocity / speed * boost * dt;
        }

        if rng.random::<f32>() < 0.3 {
            let scatter = Vec3::new(
                rng.random::<f32>() - 0.5,
                rng.random::<f32>() - 0.5,
                rng.random::<f32>() - 0.5,
            ) * 0.5;
            let velocity = -self.body.velocity * 0.3 + scatter;
            let max_age = rng.random_range(0.1..0.2);
            self.shed_micro(self.body.position, velocity, max_age);
        }

        self.basic_physics(dt);
    }

    fn update_stretch<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.blob_stretch = (self.blob_stretch + dt * 3.0).min(1.0);

        if rng.random::<f32>() < 0.2 {
            let angle = rng.random::<f32>() * TAU;
            let velocity = Vec3::new(
                angle.cos() * 0.3,
                (rng.random::<f32>() - 0.5) * 0.2,
                angle.sin() * 0.3,
            );
            let max_age = rng.random_range(0.08..0.16);
            self.shed_micro(self.body.position, velocity, max_age);
        }

        self.basic_physics(dt);
    }

    fn update_flight<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let corkscrew = self.wobble_phase * 2.0;
        self.body.velocity.x += corkscrew.sin() * 0.15 * dt;
        self.body.velocity.z += corkscrew.cos() * 0.15 * dt;

        if rng.random::<f32>() < 0.4 {
            let position = self.body.position - self.body.velocity * 0.02;
            let velocity = Vec3::new(
                rng.random::<f32>() - 0.5,
                rng.random::<f32>() - 0.5,
                rng.random::<f32>() - 0.5,
            ) * 0.1;
            let max_age = rng.random_range(0.05..0.15);
            self.shed_micro(position, velocity, max_age);
        }

        self.basic_physics(dt);
    }

    fn update_instability<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.crack_progress = (self.crack_progress + dt * 2.0).min(1.0);

        let strength = 0.5 + self.crack_progress * 0.5;
        let w = self.wobble_phase;
        self.body.velocity += Vec3::new(
            (w * 3.0).sin() * strength,
            (w * 2.7).cos() * strength * 0.5,
            (w * 2.3).sin() * strength,
        ) * dt;

        if rng.random::<f32>() < 0.15 * self.crack_progress {
            let angle = rng.random::<f32>() * TAU;
            let velocity = self.body.velocity
                + Vec3::new(
                    angle.cos() * 0.4,
                    (rng.random::<f32>() - 0.3) * 0.3,
                    angle.sin() * 0.4,
                );
            let seed = self
                .seed
                .wrapping_add(self.fragments.len() as u64 * 77);
            self.fragments.push(Fragment::new(
                self.body.position,
                velocity,
                rng.random_range(0.15..0.3),
                self.brightness * 0.4,
                seed,
                rng.random::<f32>() * TAU,
            ));
        }

        self.basic_physics(dt);
    }

    fn update_ember(&mut self, dt: f32) {
        self.body.velocity.y -= dt;
        self.body.position += self.body.velocity * dt * 0.3;
    }

    fn push_trail(&mut self) {
        self.trail_head = (self.trail_head + 1) % TRAIL_HISTORY_SIZE;
        self.trail[self.trail_head] = self.body.position;
    }
}

impl Spark for CascadeSpark {
    fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.body.tick(dt);
        let expired = self.body.is_expired();
        self.advance_phase(dt);

        if !expired {
            self.rotation += self.rotation_speed * dt;
            self.pulse_phase += 20.0 * dt;
            self.wobble_phase += self.wobble_speed * dt;

            match self.phase {
                CascadePhase::Ejection => self.update_ejection(dt, rng),
                CascadePhase::Stretch => self.update_stretch(dt, rng),
                CascadePhase::Flight => self.update_flight(dt, rng),
                CascadePhase::Instability => self.update_instability(dt, rng),
                CascadePhase::PrimaryFragment => {
                    self.body.velocity *= 0.95;
                    self.basic_physics(dt);
                }
                CascadePhase::SecondaryFragment => {
                    self.body.velocity *= 0.9;
                    self.basic_physics(dt);
                }
                CascadePhase::Bloom => self.basic_physics(dt * 0.2),
                CascadePhase::Ember => self.update_ember(dt),
            }

            self.push_trail();
        }

        self.fragments.retain_mut(|fragment| fragment.update(dt, rng));
        self.micro_sparks.retain_mut(|micro| micro.update(dt, rng));
        for ray in &mut self.bloom_rays {
            ray.fade = (ray.fade - dt * 4.0).max(0.0);
            ray.length += dt * 2.0;
        }

        if expired {
            return !self.fragments.is_empty() || !self.micro_sparks.is_empty();
        }
        true
    }

    fn collect_render(&self, out: &mut Vec<RenderSpark>) {
        if !self.body.is_expired() {
            let heading = self.body.velocity.normalize_or_zero();
            out.push(RenderSpark {
                kind: self.kind.into(),
                position: self.body.position,
                tail: self.body.position - heading * self.length,
                velocity: self.body.velocity,
                color: self.color(),
                brightness: self.brightness,
                phase: Some(self.phase),
            });
        }
        for fragment in &self.fragments {
            fragment.collect_render(out);
        }
        for micro in &self.micro_sparks {
            micro.collect_render(out);
        }
    }

    fn live_descendants(&self) -> usize {
        self.fragments
            .iter()
            .map(|fragment| 1 + fragment.descendant_count())
            .sum::<usize>()
            + self.micro_sparks.len()
    }
}
