//! Level 2: Component Integration Tests
//!
//! These tests verify that individual components hold their invariants over
//! many steps and random inputs.

pub mod emission;
pub mod erosion;
pub mod sparks;
