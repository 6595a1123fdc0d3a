//! Asynchronous persistence of the favorites snapshot
//!
//! Every write carries the revision of the in-memory list it was taken
//! from. Writes are serialized and a write older than the last committed
//! one is skipped, so tasks finishing out of order cannot roll the
//! snapshot back.
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::data::Character;
use super::storage::Storage;
use crate::error::StorageError;

/// Storage key of the favorites snapshot
pub const FAVORITES_KEY: &str = "favorites";

/// What happened to a requested write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Snapshot written (or deleted) at this revision
    Committed(u64),
    /// A newer revision was already committed
    Stale(u64),
}

/// Handle to the persisted favorites, cheap to clone into tasks
#[derive(Clone)]
pub struct FavoritesStore {
    storage: Arc<dyn Storage>,
    committed: Arc<Mutex<u64>>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            committed: Arc::new(Mutex::new(0)),
        }
    }

    /// Read the persisted list; a missing snapshot is an empty list
    pub async fn load(self) -> Result<Vec<Character>, StorageError> {
        let storage = Arc::clone(&self.storage);
        let raw = tokio::task::spawn_blocking(move || storage.get(FAVORITES_KEY)).await??;

        let list = match raw {
            Some(json) => serde_json::from_str::<Vec<Character>>(&json)?,
            None => Vec::new(),
        };
        info!(count = list.len(), "loaded persisted favorites");
        Ok(list)
    }

    /// Overwrite the snapshot with `list`
    pub async fn save(self, revision: u64, list: Vec<Character>) -> Result<WriteOutcome, StorageError> {
        let json = serde_json::to_string(&list)?;
        self.commit(revision, move |storage| storage.set(FAVORITES_KEY, &json))
            .await
    }

    /// Delete the snapshot
    pub async fn clear(self, revision: u64) -> Result<WriteOutcome, StorageError> {
        self.commit(revision, |storage| storage.remove(FAVORITES_KEY))
            .await
    }

    async fn commit<F>(self, revision: u64, write: F) -> Result<WriteOutcome, StorageError>
    where
        F: FnOnce(&dyn Storage) -> Result<(), StorageError> + Send + 'static,
    {
        let mut committed = self.committed.lock().await;
        if revision <= *committed {
            debug!(revision, committed = *committed, "skipping stale favorites write");
            return Ok(WriteOutcome::Stale(revision));
        }

        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || write(storage.as_ref())).await??;

        *committed = revision;
        debug!(revision, "favorites snapshot committed");
        Ok(WriteOutcome::Committed(revision))
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::sample;
    use crate::state::storage::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, FavoritesStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = FavoritesStore::new(storage.clone());
        (storage, store)
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_empty() {
        let (_, store) = store();

        let list = store.load().await.unwrap();

        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_save_writes_json_array_and_loads_back() {
        let (storage, store) = store();
        let list = vec![sample("2"), sample("1")];

        let outcome = store.clone().save(1, list.clone()).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Committed(1));
        let raw = storage.raw(FAVORITES_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "2");
        assert_eq!(value[1]["status"], "Alive");
        assert_eq!(store.load().await.unwrap(), list);
    }

    #[tokio::test]
    async fn test_stale_revision_does_not_overwrite() {
        let (storage, store) = store();

        store.clone().save(3, vec![sample("newest")]).await.unwrap();
        let outcome = store.clone().save(2, vec![sample("older")]).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Stale(2));
        assert_eq!(storage.writes(), 1);
        assert_eq!(store.load().await.unwrap(), vec![sample("newest")]);
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let (storage, store) = store();
        store.clone().save(1, vec![sample("a")]).await.unwrap();

        let outcome = store.clone().clear(2).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Committed(2));
        assert_eq!(storage.raw(FAVORITES_KEY), None);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let (storage, store) = store();
        storage.set(FAVORITES_KEY, "{not json").unwrap();

        let err = store.load().await.unwrap_err();

        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_revision_open() {
        let (storage, store) = store();
        storage.set_failing(true);

        assert!(store.clone().save(1, vec![sample("a")]).await.is_err());

        storage.set_failing(false);
        let outcome = store.clone().save(1, vec![sample("a")]).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Committed(1));
    }
}
