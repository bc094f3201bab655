//! Harness errors
//!
//! Normalization and comparison never fail; only loading harness
//! configuration can.

use std::path::PathBuf;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Attack catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate attack name: {0}")]
    DuplicateAttack(String),
}
