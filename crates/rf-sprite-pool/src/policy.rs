//! What a pool does once it has created as many handles as its ceiling

use serde::{Deserialize, Serialize};

/// Behaviour at the capacity ceiling when nothing is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityPolicy {
    /// Refuse with `PoolError::Exhausted`
    HardCap,
    /// Log a warning and create anyway
    #[default]
    SoftCapWithWarning,
    /// Create silently
    Unbounded,
}

/// Ceiling for a pool created with `initial_size` handles
pub fn ceiling_for(initial_size: usize) -> usize {
    initial_size * 2
}
