//! Child particles of phase-cascade sparks

use glam::Vec3;
use rand::Rng;

use super::color::{fragment_color, micro_color};
use super::particle::ParticleBody;
use super::{RenderSpark, Spark, SparkKind};

const FRAGMENT_GRAVITY: f32 = 3.5;
const FRAGMENT_DRAG: f32 = 0.12;
const FRAGMENT_SPIN: f32 = 10.0;
/// Seconds of travel drawn behind a fragment
const FRAGMENT_TAIL_TIME: f32 = 0.02;

const MICRO_GRAVITY: f32 = 5.0;
/// Per-update damping of micro-spark velocity (x, y, z)
const MICRO_DAMPING: Vec3 = Vec3::new(0.9, 0.95, 0.9);
const MICRO_TAIL_TIME: f32 = 0.01;

/// A chunk broken off a cascade spark
///
/// Fragments split again during secondary fragmentation; the pieces they
/// produce are owned here, so a fragment outlives its own lifetime until its
/// children are gone.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub body: ParticleBody,
    pub brightness: f32,
    pub seed: u64,
    pub rotation: f32,
    pub children: Vec<Fragment>,
}

impl Fragment {
    pub fn new(
        position: Vec3,
        velocity: Vec3,
        max_age: f32,
        brightness: f32,
        seed: u64,
        rotation: f32,
    ) -> Self {
        Self {
            body: ParticleBody::new(position, velocity, max_age),
            brightness,
            seed,
            rotation,
            children: Vec::new(),
        }
    }

    /// Total number of fragments below this one
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

impl Spark for Fragment {
    fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.body.tick(dt);
        self.children.retain_mut(|child| child.update(dt, rng));

        if self.body.is_expired() {
            return !self.children.is_empty();
        }

        self.body.integrate(dt, FRAGMENT_GRAVITY, FRAGMENT_DRAG);
        self.rotation += FRAGMENT_SPIN * dt;
        true
    }

    fn collect_render(&self, out: &mut Vec<RenderSpark>) {
        if !self.body.is_expired() {
            out.push(RenderSpark {
                kind: SparkKind::Fragment,
                position: self.body.position,
                tail: self.body.position - self.body.velocity * FRAGMENT_TAIL_TIME,
                velocity: self.body.velocity,
                color: fragment_color(self.body.life_fraction()),
                brightness: self.brightness,
                phase: None,
            });
        }
        for child in &self.children {
            child.collect_render(out);
        }
    }

    fn live_descendants(&self) -> usize {
        self.descendant_count()
    }
}

/// A tiny droplet shed while a cascade spark flies
#[derive(Debug, Clone)]
pub struct MicroSpark {
    pub body: ParticleBody,
}

impl MicroSpark {
    pub fn new(position: Vec3, velocity: Vec3, max_age: f32) -> Self {
        Self {
            body: ParticleBody::new(position, velocity, max_age),
        }
    }
}

impl Spark for MicroSpark {
    fn update<R: Rng + ?Sized>(&mut self, dt: f32, _rng: &mut R) -> bool {
        self.body.tick(dt);
        if self.body.is_expired() {
            return false;
        }

        self.body.advance_position(dt);
        self.body.apply_gravity(MICRO_GRAVITY, dt);
        self.body.velocity *= MICRO_DAMPING;
        true
    }

    fn collect_render(&self, out: &mut Vec<RenderSpark>) {
        if self.body.is_expired() {
            return;
        }
        out.push(RenderSpark {
            kind: SparkKind::Micro,
            position: self.body.position,
            tail: self.body.position - self.body.velocity * MICRO_TAIL_TIME,
            velocity: self.body.velocity,
            color: micro_color(self.body.life_fraction()),
            brightness: 0.5,
            phase: None,
        });
    }

    fn live_descendants(&self) -> usize {
        0
    }
}
