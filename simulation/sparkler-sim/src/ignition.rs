//! Tick-based burn clock
//!
//! Hosts that count time in fixed ticks record the tick a sparkler was lit at
//! and derive everything else from it: burn progress, the visual fade near the
//! end of the coating and the delayed fade and cut-off of the light. The
//! results feed [`FrameInput`](crate::FrameInput) directly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Host ticks per second
pub const TICKS_PER_SECOND: u32 = 20;

/// Burn progress derived from the tick a sparkler was lit at
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BurnClock {
    /// Ticks for progress to go from 0 to 1
    pub duration_ticks: u32,
    /// Progress at which the coating is consumed
    pub max_progress: f32,
    /// Progress at which the visual fade begins
    pub fade_start: f32,
    /// Ticks the light fade trails the visual fade
    pub light_fade_delay: u32,
    /// Ticks the light outlasts the coating
    pub light_off_delay: u32,
}

impl Default for BurnClock {
    fn default() -> Self {
        Self {
            duration_ticks: 600,
            max_progress: 0.75,
            fade_start: 0.65,
            light_fade_delay: 24,
            light_off_delay: 60,
        }
    }
}

impl BurnClock {
    /// Progress in `[0, max_progress]`
    ///
    /// Zero while unlit (`lit_at` is `None`) and for a non-positive `lit_at`,
    /// which hosts use for "lit before the clock started".
    pub fn burn_progress(&self, lit_at: Option<i64>, now: i64) -> f32 {
        let Some(lit_at) = lit_at else {
            return 0.0;
        };
        if lit_at <= 0 || self.duration_ticks == 0 {
            return 0.0;
        }
        let elapsed = now.saturating_sub(lit_at).max(0);
        let progress = elapsed as f32 / self.duration_ticks as f32;
        progress.min(self.max_progress)
    }

    /// Coating consumed
    pub fn is_fully_burned(&self, lit_at: Option<i64>, now: i64) -> bool {
        lit_at.is_some() && self.burn_progress(lit_at, now) >= self.max_progress
    }

    /// Visual intensity: 1 until `fade_start`, then linear to 0 at `max_progress`
    pub fn fade_factor(&self, lit_at: Option<i64>, now: i64) -> f32 {
        self.fade_for(self.burn_progress(lit_at, now))
    }

    /// Light intensity, trailing the visual fade by `light_fade_delay` ticks
    pub fn light_fade_factor(&self, lit_at: Option<i64>, now: i64) -> f32 {
        let delayed = now.saturating_sub(i64::from(self.light_fade_delay));
        self.fade_for(self.burn_progress(lit_at, delayed))
    }

    /// The light should be gone, `light_off_delay` ticks after the coating
    pub fn is_light_fully_burned(&self, lit_at: Option<i64>, now: i64) -> bool {
        let delayed = now.saturating_sub(i64::from(self.light_off_delay));
        lit_at.is_some() && self.burn_progress(lit_at, delayed) >= self.max_progress
    }

    fn fade_for(&self, progress: f32) -> f32 {
        if progress <= self.fade_start {
            return 1.0;
        }
        let span = self.max_progress - self.fade_start;
        if span <= 0.0 {
            return 0.0;
        }
        (1.0 - (progress - self.fade_start) / span).clamp(0.0, 1.0)
    }
}

/// Convert seconds to whole ticks, rounding down
pub fn seconds_to_ticks(seconds: f32) -> i64 {
    (seconds * TICKS_PER_SECOND as f32) as i64
}
