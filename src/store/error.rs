//! Store error types.

use crate::core::StateValue;
use thiserror::Error;

/// Errors that can occur while loading or saving machine state
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failed to produce the current state
    #[error("Failed to load state: {0}")]
    Load(String),

    /// Backend failed to commit a new state
    #[error("Failed to save state: {0}")]
    Save(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored record was written by an incompatible format version
    #[error("Unsupported state format version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Attempt to persist a value naming a synthetic node
    #[error("Refusing to persist synthetic state '{0}'")]
    SyntheticState(StateValue),
}
