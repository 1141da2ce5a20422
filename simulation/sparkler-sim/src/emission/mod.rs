//! Spark emission strategies
//!
//! Three emitters feed the two spark populations of a sparkler:
//!
//! - [`RateEmitter`]: ballistic primaries at an interval that shrinks with
//!   intensity, bounded by the primary ceiling.
//! - [`LayeredEmitter`]: core, inner, outer and hair cascade sparks every
//!   frame, bounded by the cascade ceiling.
//! - [`EmissionPoints`]: one large mixed burst as the burn front crosses each
//!   of a fixed set of points along the stick.
//!
//! Emitters work in model space around the stick and convert positions and
//! velocities to world space with the frame's transform at spawn time, so a
//! spark keeps flying in the world after the sparkler moves.

mod factory;
mod layered;
mod points;
mod rate;

pub use factory::{Scatter, SparkProfile, roll_burst_type, spawn_cascade};
pub use layered::{LAYERS, Layer, LayeredEmitter};
pub use points::EmissionPoints;
pub use rate::{RateEmitter, spawn_primary};
