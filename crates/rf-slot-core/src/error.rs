//! Error types for the reel engine, evaluator, configuration and assets

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SlotError>;

/// Errors raised by the slot core
#[derive(Debug, Error)]
pub enum SlotError {
    /// Column, row or reel position outside its valid range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Reel offsets no longer index their bands
    #[error("Invalid reel state at column {column}: {detail}")]
    InvalidState { column: usize, detail: String },

    /// Grid shape does not match the configured rows × columns
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl SlotError {
    pub(crate) fn invalid_column(column: usize, columns: usize) -> Self {
        SlotError::OutOfRange(format!("column {column} (columns: {columns})"))
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Boxed error returned by asset fetchers
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// A single asset failed; the whole batch is abandoned
    #[error("Asset loading failed: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: FetchError,
    },
}
