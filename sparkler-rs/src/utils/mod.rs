//! Shared utilities for the sparkler-rs CLI

pub mod progress;
pub mod table;

pub use progress::*;
pub use table::*;
