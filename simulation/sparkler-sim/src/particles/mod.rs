//! Spark particles and their lifecycles
//!
//! Two lifecycle models share the [`Spark`] interface:
//!
//! - [`CascadeSpark`]: an eight-phase state machine (ejection through ember)
//!   with per-phase physics and one-shot fragmentation and bloom events.
//! - [`BallisticSpark`]: a straight-line primary that explodes late in life
//!   into short-lived secondaries.
//!
//! # Architecture
//!
//! - `ParticleBody`: position, velocity and age shared by every spark type
//! - `SparkPopulation`: owned top-level sparks with a hard ceiling
//! - `RenderSpark`: flattened, read-only view of one visible spark
//!
//! Sparks own their children by value. A parent whose own life is over stays
//! in its population, invisible, for as long as any descendant is alive, and
//! is pruned on the first update after the last one dies.
//!
//! # Usage
//!
//! ```
//! use glam::Vec3;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use sparkler_sim::particles::{BallisticSpark, SparkPopulation};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut population = SparkPopulation::new(100);
//! population.try_push(BallisticSpark::primary(Vec3::ZERO, Vec3::Y, 1.0, &mut rng));
//!
//! population.update(0.016, &mut rng);
//! let mut visible = Vec::new();
//! population.collect_render(&mut visible);
//! assert_eq!(visible.len(), 1);
//! ```

mod ballistic;
mod cascade;
mod color;
mod fragment;
mod particle;

pub use ballistic::BallisticSpark;
pub use cascade::{
    BloomRay, CascadePhase, CascadeSpark, CascadeType, MAX_BLOOM_RAYS, PhaseEvents,
    TRAIL_HISTORY_SIZE,
};
pub use color::{ballistic_color, cascade_color, flicker, fragment_color, micro_color};
pub use fragment::{Fragment, MicroSpark};
pub use particle::ParticleBody;

use glam::Vec3;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Visual and physical category of a rendered spark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SparkKind {
    /// Short bright cascade spark at the center of the burst
    Core,
    /// Medium-range cascade spark
    Inner,
    /// Long radiating cascade spark
    Outer,
    /// Thin, dense cascade filler
    Hair,
    /// Piece broken off a cascade spark
    Fragment,
    /// Droplet shed by a cascade spark in flight
    Micro,
    /// Ballistic spark that has not exploded yet
    Primary,
    /// Ballistic spark produced by an explosion
    Secondary,
}

impl From<CascadeType> for SparkKind {
    fn from(value: CascadeType) -> Self {
        match value {
            CascadeType::Core => Self::Core,
            CascadeType::Inner => Self::Inner,
            CascadeType::Outer => Self::Outer,
            CascadeType::Hair => Self::Hair,
        }
    }
}

/// One visible spark, flattened out of the particle tree
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderSpark {
    pub kind: SparkKind,
    /// Head position in world space
    pub position: Vec3,
    /// End of the trail in world space
    pub tail: Vec3,
    pub velocity: Vec3,
    /// Linear RGBA in `[0, 1]`
    pub color: [f32; 4],
    /// Relative glow strength
    pub brightness: f32,
    /// Lifecycle phase, for cascade sparks
    pub phase: Option<CascadePhase>,
}

/// Common interface of every spark lifecycle model
pub trait Spark {
    /// Step the spark and its descendants by `dt` seconds
    ///
    /// Returns `false` once the spark and all of its descendants are dead; the
    /// owner drops it in the same frame.
    fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool;

    /// Append this spark (if still visible) and all live descendants
    fn collect_render(&self, out: &mut Vec<RenderSpark>);

    /// Number of live particles owned below this one
    fn live_descendants(&self) -> usize;
}

/// Top-level sparks of one emitter, bounded by a ceiling
///
/// Only top-level sparks count against the ceiling; children spawned by
/// fragmentation or explosion do not. Pushes beyond the ceiling are dropped.
#[derive(Debug, Clone)]
pub struct SparkPopulation<S> {
    sparks: Vec<S>,
    ceiling: usize,
}

impl<S: Spark> SparkPopulation<S> {
    pub fn new(ceiling: usize) -> Self {
        Self {
            sparks: Vec::with_capacity(ceiling.min(1024)),
            ceiling,
        }
    }

    /// Top-level spark count
    #[inline]
    pub fn len(&self) -> usize {
        self.sparks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }

    #[inline]
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Change the ceiling; sparks already above it are kept until they die
    pub fn set_ceiling(&mut self, ceiling: usize) {
        self.ceiling = ceiling;
    }

    /// Another top-level spark would fit
    #[inline]
    pub fn has_room(&self) -> bool {
        self.sparks.len() < self.ceiling
    }

    /// Add a spark if below the ceiling; returns whether it was kept
    pub fn try_push(&mut self, spark: S) -> bool {
        if !self.has_room() {
            return false;
        }
        self.sparks.push(spark);
        true
    }

    /// Step every spark and drop the dead ones; returns how many were dropped
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> usize {
        let before = self.sparks.len();
        self.sparks.retain_mut(|spark| spark.update(dt, rng));
        before - self.sparks.len()
    }

    /// Drop every spark
    pub fn clear(&mut self) {
        self.sparks.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.sparks.iter()
    }

    /// Top-level sparks plus all live descendants
    pub fn total_live(&self) -> usize {
        self.sparks
            .iter()
            .map(|spark| 1 + spark.live_descendants())
            .sum()
    }

    /// Flatten every visible spark into `out`
    pub fn collect_render(&self, out: &mut Vec<RenderSpark>) {
        for spark in &self.sparks {
            spark.collect_render(out);
        }
    }
}

impl<'a, S> IntoIterator for &'a SparkPopulation<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.sparks.iter()
    }
}
