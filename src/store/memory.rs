//! In-memory state store.

use super::{PersistedState, StateStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local store, seeded with an initial record.
///
/// Keeps a count of committed saves for assertions.
pub struct InMemoryStore<Ctx> {
    state: RwLock<PersistedState<Ctx>>,
    saves: AtomicUsize,
}

impl<Ctx> InMemoryStore<Ctx> {
    pub fn new(seed: PersistedState<Ctx>) -> Self {
        Self {
            state: RwLock::new(seed),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the current record.
    pub async fn snapshot(&self) -> PersistedState<Ctx>
    where
        Ctx: Clone,
    {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl<Ctx> StateStore<Ctx> for InMemoryStore<Ctx>
where
    Ctx: Clone + Send + Sync,
{
    async fn load(&self) -> Result<PersistedState<Ctx>, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &PersistedState<Ctx>) -> Result<(), StoreError> {
        state.ensure_storable()?;
        *self.state.write().await = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
