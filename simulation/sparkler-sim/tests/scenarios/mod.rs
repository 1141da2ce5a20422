//! Level 3: End-to-End Scenario Tests
//!
//! These tests drive whole sparklers and registries through full burns.

pub mod burn;
pub mod registry;
