//! Keyed store of sparkler instances
//!
//! Hosts identify sparklers by an opaque [`SparklerId`]. The registry creates
//! an instance the first time an id is seen, records when each instance was
//! last touched and drops instances that have been idle for longer than the
//! configured timeout. Every instance gets its own seed, derived from the
//! registry's base seed and the id, so two ids never share a random stream
//! and the same id always replays the same sparks. All instances read one
//! noise table drawn from the base seed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;
use crate::error::{Result, SparklerError};
use crate::noise::NoiseTable;
use crate::sparkler::{BurnState, FrameInput, Sparkler};

/// Opaque identifier of one sparkler instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparklerId(pub u64);

impl fmt::Display for SparklerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for SparklerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug)]
struct Entry {
    sparkler: Sparkler,
    last_access: Instant,
}

/// All live sparkler instances
#[derive(Debug)]
pub struct SparklerRegistry {
    config: RegistryConfig,
    /// Drawn from the base seed, read by every instance
    noise: Arc<NoiseTable>,
    instances: HashMap<SparklerId, Entry>,
}

impl SparklerRegistry {
    /// Validate `config` and build an empty registry
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let noise = Arc::new(NoiseTable::new(&mut StdRng::seed_from_u64(config.base_seed)));
        Ok(Self {
            config,
            noise,
            instances: HashMap::new(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn noise(&self) -> &Arc<NoiseTable> {
        &self.noise
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: SparklerId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Ids of every live instance, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = SparklerId> + '_ {
        self.instances.keys().copied()
    }

    /// Seed an instance with this id is created with
    pub fn seed_for(&self, id: SparklerId) -> u64 {
        mix_seed(self.config.base_seed, id.0)
    }

    /// Instance for `id`, created unlit if missing; marks it accessed at `now`
    pub fn get_or_create(&mut self, id: SparklerId, now: Instant) -> Result<&mut Sparkler> {
        let seed = self.seed_for(id);
        let entry = match self.instances.entry(id) {
            std::collections::hash_map::Entry::Occupied(occupied) => occupied.into_mut(),
            std::collections::hash_map::Entry::Vacant(vacant) => {
                let config = self.config.sparkler.clone().with_seed(seed);
                let sparkler = Sparkler::with_noise(config, Arc::clone(&self.noise))?;
                log::debug!("Created sparkler {id}");
                vacant.insert(Entry {
                    sparkler,
                    last_access: now,
                })
            }
        };
        entry.last_access = now;
        Ok(&mut entry.sparkler)
    }

    /// Existing instance for `id`
    pub fn get(&self, id: SparklerId) -> Result<&Sparkler> {
        self.instances
            .get(&id)
            .map(|entry| &entry.sparkler)
            .ok_or(SparklerError::UnknownInstance(id))
    }

    /// Existing instance for `id`, without touching its access time
    pub fn get_mut(&mut self, id: SparklerId) -> Result<&mut Sparkler> {
        self.instances
            .get_mut(&id)
            .map(|entry| &mut entry.sparkler)
            .ok_or(SparklerError::UnknownInstance(id))
    }

    /// Remove the instance for `id` and hand it back
    pub fn destroy(&mut self, id: SparklerId) -> Result<Sparkler> {
        let entry = self
            .instances
            .remove(&id)
            .ok_or(SparklerError::UnknownInstance(id))?;
        log::debug!("Destroyed sparkler {id}");
        Ok(entry.sparkler)
    }

    /// Drop every instance idle for longer than the timeout; returns how many
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let timeout = self.config.idle_timeout;
        let before = self.instances.len();
        self.instances.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.last_access) <= timeout;
            if !keep {
                log::debug!("Evicting idle sparkler {id}");
            }
            keep
        });
        before - self.instances.len()
    }

    /// Run one frame for `id`, creating the instance if needed
    pub fn simulate_frame(
        &mut self,
        id: SparklerId,
        input: FrameInput,
        now: Instant,
    ) -> Result<BurnState> {
        Ok(self.get_or_create(id, now)?.simulate_frame(input))
    }
}

/// Spread `id` over all 64 bits before combining it with `base`
fn mix_seed(base: u64, id: u64) -> u64 {
    let mut z = id.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    base ^ z ^ (z >> 31)
}
