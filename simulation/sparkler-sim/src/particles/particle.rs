//! Shared kinematic state for every spark type

use glam::Vec3;

/// Position, velocity and age of a single spark
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBody {
    /// World-space position
    pub position: Vec3,
    /// World-space velocity
    pub velocity: Vec3,
    /// Current age in seconds
    pub age: f32,
    /// Age at which the spark itself expires
    pub max_age: f32,
}

impl ParticleBody {
    /// Create a new body at age zero
    pub fn new(position: Vec3, velocity: Vec3, max_age: f32) -> Self {
        Self {
            position,
            velocity,
            age: 0.0,
            max_age,
        }
    }

    /// Add `dt` to the age
    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.age += dt;
    }

    /// Age has reached the lifetime
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }

    /// Age as a fraction of lifetime, clamped to `[0, 1]`
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.max_age > 0.0 {
            (self.age / self.max_age).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Current speed
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Move along the current velocity
    #[inline]
    pub fn advance_position(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Pull velocity down by `gravity` units per second squared
    #[inline]
    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.velocity.y -= gravity * dt;
    }

    /// Linear drag, `v *= 1 - drag * dt`, floored at a full stop
    #[inline]
    pub fn apply_linear_drag(&mut self, drag: f32, dt: f32) {
        self.velocity *= (1.0 - drag * dt).max(0.0);
    }

    /// Frame-rate independent drag, `v *= retain^(dt * 60)`
    ///
    /// `retain` is the share of speed kept per 60 Hz frame.
    #[inline]
    pub fn apply_exponential_drag(&mut self, retain: f32, dt: f32) {
        self.velocity *= retain.powf(dt * 60.0);
    }

    /// Integrate one step: move, then apply gravity and linear drag
    pub fn integrate(&mut self, dt: f32, gravity: f32, drag: f32) {
        self.advance_position(dt);
        self.apply_gravity(gravity, dt);
        self.apply_linear_drag(drag, dt);
    }
}
