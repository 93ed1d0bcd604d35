//! Error types for the atrium CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, building or replaying snapshots.
#[derive(Debug, Error)]
pub enum Error {
    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] atrium_scene::Error),

    /// Authored room could not be built
    #[error("Build error: {0}")]
    Build(#[from] atrium_scene::BuildError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
