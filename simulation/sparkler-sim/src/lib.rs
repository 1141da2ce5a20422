//! Frame-by-frame burn simulation for handheld sparklers.
//!
//! This crate simulates what a sparkler looks like while it burns: an erosion
//! front that eats down the coated part of the stick and can only move
//! forward, plus a population of hierarchical spark particles thrown off the
//! burn point. It produces data only; drawing it is left to the host.
//!
//! # Architecture
//!
//! - [`Erosion`]: ring of angular columns with noise, cohesion, smoothing and
//!   drips, ratcheted so the rendered surface never grows back
//! - [`particles`]: phase-cascade and two-stage ballistic sparks that own
//!   their fragments and secondaries
//! - [`emission`]: rate, layered and emission-point emitters
//! - [`Sparkler`]: per-instance driver that sanitizes [`FrameInput`], runs one
//!   frame and produces an owned [`FrameSnapshot`]
//! - [`SparklerRegistry`]: keyed instances with per-id seeds and idle eviction
//! - [`BurnClock`] and [`BurnLight`]: tick-based progress and the light
//!   sequence around burn-out
//!
//! # Examples
//!
//! ```
//! use sparkler_sim::{FrameInput, Sparkler, SparklerConfig};
//!
//! let mut sparkler = Sparkler::new(SparklerConfig::default().with_seed(7))?;
//! for frame in 0..60 {
//!     sparkler.simulate_frame(FrameInput::burning(1.0 / 60.0, frame as f32 * 0.002));
//! }
//!
//! let snapshot = sparkler.snapshot();
//! assert!(snapshot.average_height > 0.0);
//! assert!(!snapshot.sparks.is_empty());
//! # Ok::<(), sparkler_sim::SparklerError>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for configuration and snapshots

#![forbid(unsafe_code)]

pub mod config;
pub mod emission;
pub mod erosion;
pub mod error;
pub mod ignition;
pub mod lighting;
pub mod noise;
pub mod particles;
pub mod registry;
pub mod sampling;
pub mod sparkler;

pub use config::{
    EmissionConfig, EmissionLayers, ErosionConfig, RegistryConfig, SparklerConfig, StickGeometry,
};
pub use erosion::{Drip, Erosion, ProfileSample};
pub use error::{Result, SparklerError};
pub use ignition::{BurnClock, TICKS_PER_SECOND};
pub use lighting::{BurnLight, LightSample};
pub use particles::{
    BallisticSpark, CascadePhase, CascadeSpark, CascadeType, RenderSpark, Spark, SparkKind,
    SparkPopulation,
};
pub use registry::{SparklerId, SparklerRegistry};
pub use sparkler::{BurnState, FrameInput, FrameSnapshot, Sparkler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
