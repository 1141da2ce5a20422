//! Smooth value noise over a fixed lookup table

use rand::Rng;

/// Number of entries in the noise table
pub const NOISE_TABLE_SIZE: usize = 256;

/// Repeatable 1D value noise
///
/// The table is filled once from a seeded generator; sampling afterwards is a
/// pure function of the input coordinate. Neighbouring integer coordinates are
/// blended with a smoothstep so nearby columns get similar values.
///
/// Tables are read-only after construction and are shared behind an `Arc`
/// between the erosion model, host-side particle placement and every instance
/// of a registry.
#[derive(Debug, Clone)]
pub struct NoiseTable {
    values: [f32; NOISE_TABLE_SIZE],
}

impl NoiseTable {
    /// Fill a new table with uniform values in `[0, 1)`
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut values = [0.0; NOISE_TABLE_SIZE];
        for value in &mut values {
            *value = rng.random::<f32>();
        }
        Self { values }
    }

    /// Build a table from explicit values (used by tests and tooling)
    pub fn from_values(values: [f32; NOISE_TABLE_SIZE]) -> Self {
        Self { values }
    }

    /// Sample the noise at `x`, returning a value in `[0, 1]`
    ///
    /// Non-finite coordinates sample index 0.
    pub fn sample(&self, x: f32) -> f32 {
        if !x.is_finite() {
            return self.values[0];
        }

        let floor = x.floor();
        let i0 = (floor as i64).rem_euclid(NOISE_TABLE_SIZE as i64) as usize;
        let i1 = (i0 + 1) % NOISE_TABLE_SIZE;
        let t = x - floor;
        let t = t * t * (3.0 - 2.0 * t);

        self.values[i0] + (self.values[i1] - self.values[i0]) * t
    }
}
