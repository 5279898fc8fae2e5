//! Pool errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Pool '{0}' does not exist")]
    UnknownPool(String),

    /// Hard-capped pool at its ceiling with nothing available
    #[error("Pool '{pool}' exhausted at maximum size {max_size}")]
    Exhausted { pool: String, max_size: usize },

    #[error("Render group '{0}' does not exist")]
    UnknownGroup(String),
}
