//! Persistence of machine state between requests.
//!
//! The store holds one resting value plus the context guards are evaluated
//! against. Each request loads it, runs one event and, if the value changed,
//! saves the successor. Load and save are individually atomic; the pair is
//! not, so concurrent requests may lose updates (last writer wins).

use crate::core::{StateName, StateValue};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::InMemoryStore;

/// Version identifier for the persisted record format
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Persisted record of a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState<Ctx> {
    /// Record format version
    pub version: u32,

    /// Resting value; never names a synthetic node
    pub value: StateValue,

    /// Context guards are evaluated against
    pub context: Ctx,

    /// Number of committed changes since the record was seeded
    pub revision: u64,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl<Ctx> PersistedState<Ctx> {
    pub fn new(value: impl Into<StateValue>, context: Ctx) -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            value: value.into(),
            context,
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    /// Top-level state name of the persisted value.
    pub fn key(&self) -> StateName {
        self.value.key()
    }

    /// Successor record holding `value`, with the same context.
    pub fn advance(&self, value: StateValue) -> Self
    where
        Ctx: Clone,
    {
        Self {
            version: STATE_FORMAT_VERSION,
            value,
            context: self.context.clone(),
            revision: self.revision + 1,
            updated_at: Utc::now(),
        }
    }

    /// Reject records a store must never hold.
    pub fn ensure_storable(&self) -> Result<(), StoreError> {
        if self.version != STATE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                supported: STATE_FORMAT_VERSION,
            });
        }
        if self.value.contains_synthetic() {
            return Err(StoreError::SyntheticState(self.value.clone()));
        }
        Ok(())
    }
}

/// Loader and saver of a single machine's state.
#[async_trait]
pub trait StateStore<Ctx>: Send + Sync {
    /// Current persisted record.
    async fn load(&self) -> Result<PersistedState<Ctx>, StoreError>;

    /// Commit a new record, replacing the previous one.
    async fn save(&self, state: &PersistedState<Ctx>) -> Result<(), StoreError>;
}
