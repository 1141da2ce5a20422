use thiserror::Error;

use crate::registry::SparklerId;

/// Error types for sparkler configuration and instance management
///
/// The per-frame simulation itself never fails: degenerate inputs are clamped
/// at the boundary and ceilings drop spawns silently. These errors only come
/// from setup and lookup operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparklerError {
    /// A configuration value is out of its valid range
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// No simulation state is registered under this id
    #[error("Unknown sparkler instance: {0}")]
    UnknownInstance(SparklerId),
}

impl SparklerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type using SparklerError
pub type Result<T> = std::result::Result<T, SparklerError>;
