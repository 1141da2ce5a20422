//! Drip tendrils that run ahead of the melt front

use std::f32::consts::TAU;

use rand::Rng;

use super::interpolation::{angular_distance, gaussian_falloff};

/// Longest a drip grows before it stops and starts fading
pub const MAX_DRIP_LENGTH: f32 = 0.05;

/// Width below which a drip stops growing
pub const MIN_DRIP_WIDTH: f32 = 0.001;

/// Fade lost per second once a drip stops growing
pub const DRIP_FADE_RATE: f32 = 3.0;

/// Width shrink rate per second
const WIDTH_DECAY: f32 = 0.8;

/// Converts drip width into angular standard deviation
const ANGULAR_WIDTH_SCALE: f32 = 10.0;

/// One drip slot
///
/// Length only grows while the drip is active, width only shrinks. Once
/// inactive the visible extent `length * fade` decays through `fade`, and the
/// length is cleared only after `fade` reaches zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drip {
    /// Angular position in radians
    pub angle: f32,
    /// Extent below the melt front
    pub length: f32,
    pub width: f32,
    /// Growth per second
    pub speed: f32,
    /// Still growing
    pub active: bool,
    /// Visibility multiplier in `[0, 1]`
    pub fade: f32,
}

impl Drip {
    /// Slot can take a new drip
    #[inline]
    pub fn is_free(&self) -> bool {
        !self.active && self.fade <= 0.0
    }

    /// Contributes to the rendered surface
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.active || self.fade > 0.0
    }

    /// Visible extent
    #[inline]
    pub fn visible_length(&self) -> f32 {
        self.length * self.fade
    }

    /// Start a new drip at `column` of `columns`
    pub(crate) fn start<R: Rng + ?Sized>(&mut self, column: usize, columns: usize, rng: &mut R) {
        self.active = true;
        self.angle = column as f32 * TAU / columns as f32;
        self.length = 0.0;
        self.width = rng.random_range(0.003..0.007);
        self.speed = rng.random_range(0.1..0.25);
        self.fade = 1.0;
    }

    /// Advance by `dt` given the base front height at the drip's angle
    pub(crate) fn advance(&mut self, dt: f32, front_height: f32, front_limit: f32) {
        if self.active {
            self.length = (self.length + self.speed * dt).min(MAX_DRIP_LENGTH);
            if self.length >= MAX_DRIP_LENGTH || front_height > front_limit {
                self.active = false;
            }

            self.width *= (1.0 - dt * WIDTH_DECAY).clamp(0.0, 1.0);
            if self.width < MIN_DRIP_WIDTH {
                self.active = false;
            }
        }

        if !self.active && self.fade > 0.0 {
            self.fade -= dt * DRIP_FADE_RATE;
            if self.fade <= 0.0 {
                self.fade = 0.0;
                self.length = 0.0;
            }
        }
    }

    /// Extension this drip adds at `angle`
    pub fn extension_at(&self, angle: f32) -> f32 {
        if !self.is_visible() {
            return 0.0;
        }
        let sigma = self.width * ANGULAR_WIDTH_SCALE;
        self.visible_length() * gaussian_falloff(angular_distance(angle, self.angle), sigma)
    }
}
