//! Two-stage ballistic sparks
//!
//! A primary flies straight out of the burn point under exponential drag and,
//! somewhere between 85% and 100% of its life, explodes into 3-5 secondaries
//! fanned around its heading. Secondaries never explode. Trails shrink once
//! a spark is past 40% of its life.

use glam::Vec3;
use rand::Rng;

use super::color::{ballistic_color, flicker};
use super::particle::ParticleBody;
use super::{RenderSpark, Spark, SparkKind};
use crate::sampling::{GOLDEN_ANGLE, cone_direction, normalize_or_up};

/// Share of speed a primary keeps per 60 Hz frame
const PRIMARY_DRAG: f32 = 0.92;
/// Share of speed a secondary keeps per 60 Hz frame
const SECONDARY_DRAG: f32 = 0.88;
/// Lowest y component allowed for a secondary's direction
const MIN_SECONDARY_Y: f32 = -0.3;
/// Life fraction after which trails start to shrink
const TRAIL_SHRINK_START: f32 = 0.4;

/// A primary or secondary ballistic spark
#[derive(Debug, Clone)]
pub struct BallisticSpark {
    pub body: ParticleBody,
    kind: SparkKind,
    /// Unit heading
    direction: Vec3,
    origin: Vec3,
    thickness: f32,
    trail_length: f32,
    current_trail: f32,
    seed: u64,
    explosion_age: Option<f32>,
    exploded: bool,
    children: Vec<BallisticSpark>,
}

impl BallisticSpark {
    /// A primary with a random lifetime of 0.25-0.6 s
    pub fn primary<R: Rng + ?Sized>(
        position: Vec3,
        direction: Vec3,
        speed: f32,
        rng: &mut R,
    ) -> Self {
        let max_age = rng.random_range(0.25..0.6);
        let explosion_age = max_age * rng.random_range(0.85..1.0);
        Self::primary_with_lifetime(position, direction, speed, max_age, explosion_age, rng)
    }

    /// A primary with an explicit lifetime and explosion age
    pub fn primary_with_lifetime<R: Rng + ?Sized>(
        position: Vec3,
        direction: Vec3,
        speed: f32,
        max_age: f32,
        explosion_age: f32,
        rng: &mut R,
    ) -> Self {
        let thickness = rng.random_range(0.008..0.014);
        let trail_length = rng.random_range(0.08..0.20);
        Self::build(
            SparkKind::Primary,
            position,
            direction,
            speed,
            max_age,
            Some(explosion_age),
            thickness,
            trail_length,
            rng.random(),
        )
    }

    /// A secondary with a random lifetime of 0.12-0.3 s
    pub fn secondary<R: Rng + ?Sized>(
        position: Vec3,
        direction: Vec3,
        speed: f32,
        rng: &mut R,
    ) -> Self {
        let max_age = rng.random_range(0.12..0.3);
        let thickness = rng.random_range(0.004..0.007);
        let trail_length = rng.random_range(0.04..0.10);
        Self::build(
            SparkKind::Secondary,
            position,
            direction,
            speed,
            max_age,
            None,
            thickness,
            trail_length,
            rng.random(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        kind: SparkKind,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        max_age: f32,
        explosion_age: Option<f32>,
        thickness: f32,
        trail_length: f32,
        seed: u64,
    ) -> Self {
        let direction = normalize_or_up(direction);
        Self {
            body: ParticleBody::new(position, direction * speed, max_age),
            kind,
            direction,
            origin: position,
            thickness,
            trail_length,
            current_trail: trail_length,
            seed,
            explosion_age,
            exploded: false,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> SparkKind {
        self.kind
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Where the spark was emitted
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Trail length after shrinking
    pub fn trail_length(&self) -> f32 {
        self.current_trail
    }

    pub fn speed(&self) -> f32 {
        self.body.speed()
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    pub fn explosion_age(&self) -> Option<f32> {
        self.explosion_age
    }

    pub fn children(&self) -> &[BallisticSpark] {
        &self.children
    }

    fn drag(&self) -> f32 {
        match self.kind {
            SparkKind::Primary => PRIMARY_DRAG,
            _ => SECONDARY_DRAG,
        }
    }

    fn shrink_trail(&mut self) {
        let life = self.body.life_fraction();
        if life <= TRAIL_SHRINK_START {
            return;
        }
        let s = (life - TRAIL_SHRINK_START) / (1.0 - TRAIL_SHRINK_START);
        let target = self.trail_length * (1.0 - s * s).max(0.0);
        self.current_trail = self.current_trail.min(target);
    }

    fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.exploded = true;

        let count = 3 + rng.random_range(0..3);
        let speed = self.body.speed();
        for i in 0..count {
            let twist = GOLDEN_ANGLE * i as f32 + rng.random::<f32>() * 0.5;
            let spread = 0.3 + rng.random::<f32>() * 0.5;
            let mut direction = cone_direction(self.direction, twist, spread);
            if direction.y < MIN_SECONDARY_Y {
                direction.y = MIN_SECONDARY_Y + rng.random::<f32>() * 0.2;
                direction = normalize_or_up(direction);
            }
            let secondary_speed = speed * rng.random_range(0.4..0.8);
            self.children.push(Self::secondary(
                self.body.position,
                direction,
                secondary_speed,
                rng,
            ));
        }
        log::trace!("Primary spark exploded into {count} secondaries");
    }
}

impl Spark for BallisticSpark {
    fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.body.tick(dt);
        self.children.retain_mut(|child| child.update(dt, rng));

        if self.exploded {
            return !self.children.is_empty();
        }

        let expired = self.body.is_expired();
        if !expired {
            self.body.advance_position(dt);
            self.body.apply_exponential_drag(self.drag(), dt);
            self.shrink_trail();
        }

        if let Some(explosion_age) = self.explosion_age
            && self.body.age >= explosion_age
        {
            self.explode(rng);
            return true;
        }

        !expired
    }

    fn collect_render(&self, out: &mut Vec<RenderSpark>) {
        if !self.exploded && !self.body.is_expired() {
            let color = ballistic_color(
                self.kind,
                self.body.life_fraction(),
                flicker(self.body.age * 20.0, self.seed),
            );
            out.push(RenderSpark {
                kind: self.kind,
                position: self.body.position,
                tail: self.body.position - self.direction * self.current_trail,
                velocity: self.body.velocity,
                color,
                brightness: 1.0,
                phase: None,
            });
        }
        for child in &self.children {
            child.collect_render(out);
        }
    }

    fn live_descendants(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.live_descendants())
            .sum()
    }
}
