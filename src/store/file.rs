//! JSON file state store.

use super::{PersistedState, StateStore, StoreError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Store keeping the record in a single JSON file.
///
/// Saves go through a temp file followed by a rename, so a reader never sees
/// a partially written record.
pub struct JsonFileStore<Ctx> {
    path: PathBuf,
    _context: PhantomData<fn() -> Ctx>,
}

impl<Ctx> JsonFileStore<Ctx>
where
    Ctx: Serialize + DeserializeOwned + Send + Sync,
{
    /// Use an existing record file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _context: PhantomData,
        }
    }

    /// Use `path`, writing `seed` first if the file does not exist yet.
    pub async fn open_or_seed(
        path: impl Into<PathBuf>,
        seed: &PersistedState<Ctx>,
    ) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if !fs::try_exists(&store.path).await? {
            write_record(&store.path, seed).await?;
            tracing::info!(path = ?store.path, state = %seed.value, "Seeded state file");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<Ctx> StateStore<Ctx> for JsonFileStore<Ctx>
where
    Ctx: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<PersistedState<Ctx>, StoreError> {
        let contents = fs::read_to_string(&self.path).await?;
        let state: PersistedState<Ctx> = serde_json::from_str(&contents)?;
        state.ensure_storable()?;
        Ok(state)
    }

    async fn save(&self, state: &PersistedState<Ctx>) -> Result<(), StoreError> {
        state.ensure_storable()?;
        write_record(&self.path, state).await?;
        tracing::debug!(
            path = ?self.path,
            state = %state.value,
            revision = state.revision,
            "Saved state"
        );
        Ok(())
    }
}

async fn write_record<Ctx: Serialize>(
    path: &Path,
    state: &PersistedState<Ctx>,
) -> Result<(), StoreError> {
    let contents = serde_json::to_string_pretty(state)?;
    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await?;
    Ok(())
}
