//! Cache store over a key-value backend.
//!
//! Batches larger than the backend limit are written as sequential chunks
//! with no rollback.

mod fs;
mod memory;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ZvError};
use crate::model::{ArchiveRecord, Entity, EntityKey, FileRecord};

/// Largest number of entities a backend accepts in one `put_multi` call.
pub const MAX_BATCH_SIZE: usize = 50;

/// Opaque key-value persistence.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>>;

    /// Write at most [`MAX_BATCH_SIZE`] entities.
    async fn put_multi(&self, entries: &[(EntityKey, Entity)]) -> Result<()>;
}

/// Typed access to archive and file records.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn KvBackend>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub async fn get_archive(&self, url: &str) -> Result<Option<ArchiveRecord>> {
        let key = EntityKey::archive(url);
        match self.backend.get(&key).await? {
            Some(Entity::Archive(record)) => Ok(Some(record)),
            Some(Entity::File(_)) => Err(unexpected_kind(&key)),
            None => Ok(None),
        }
    }

    pub async fn get_file(&self, url: &str, name: &str) -> Result<Option<FileRecord>> {
        let key = EntityKey::file(url, name);
        match self.backend.get(&key).await? {
            Some(Entity::File(record)) => Ok(Some(record)),
            Some(Entity::Archive(_)) => Err(unexpected_kind(&key)),
            None => Ok(None),
        }
    }

    /// Write every entity in order, [`MAX_BATCH_SIZE`] at a time.
    ///
    /// Stops at the first failing chunk. Chunks written before it stay written.
    pub async fn put_batch(&self, entries: &[(EntityKey, Entity)]) -> Result<()> {
        for chunk in entries.chunks(MAX_BATCH_SIZE) {
            self.backend.put_multi(chunk).await?;
            debug!("put {}", chunk.len());
        }
        Ok(())
    }
}

fn unexpected_kind(key: &EntityKey) -> ZvError {
    ZvError::Store(format!("unexpected entity kind stored under {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records every chunk and fails the call numbered `fail_on` (1-based).
    struct RecordingBackend {
        inner: MemoryBackend,
        calls: Mutex<Vec<usize>>,
        fail_on: Option<usize>,
    }

    impl RecordingBackend {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                inner: MemoryBackend::new(),
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KvBackend for RecordingBackend {
        async fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
            self.inner.get(key).await
        }

        async fn put_multi(&self, entries: &[(EntityKey, Entity)]) -> Result<()> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(entries.len());
                calls.len()
            };
            if self.fail_on == Some(call) {
                return Err(ZvError::Store("injected failure".to_string()));
            }
            self.inner.put_multi(entries).await
        }
    }

    fn file_entities(url: &str, count: usize) -> Vec<(EntityKey, Entity)> {
        (0..count)
            .map(|i| {
                let name = format!("f{i}.txt");
                (
                    EntityKey::file(url, &name),
                    Entity::File(FileRecord::with_content(name, vec![i as u8])),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_put_batch_chunks_by_fifty() {
        let backend = Arc::new(RecordingBackend::new(None));
        let store = CacheStore::new(backend.clone());

        store.put_batch(&file_entities("u", 120)).await.unwrap();

        assert_eq!(backend.calls(), vec![50, 50, 20]);
        assert!(store.get_file("u", "f119.txt").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_batch_stops_at_first_failure() {
        let backend = Arc::new(RecordingBackend::new(Some(2)));
        let store = CacheStore::new(backend.clone());

        let err = store.put_batch(&file_entities("u", 120)).await.unwrap_err();
        assert!(matches!(err, ZvError::Store(_)));

        // Third chunk never attempted
        assert_eq!(backend.calls(), vec![50, 50]);

        // First chunk stays committed, nothing after it landed
        assert!(store.get_file("u", "f0.txt").await.unwrap().is_some());
        assert!(store.get_file("u", "f49.txt").await.unwrap().is_some());
        assert!(store.get_file("u", "f50.txt").await.unwrap().is_none());
        assert!(store.get_file("u", "f119.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exact_multiple_and_empty_batches() {
        let backend = Arc::new(RecordingBackend::new(None));
        let store = CacheStore::new(backend.clone());

        store.put_batch(&file_entities("u", 100)).await.unwrap();
        store.put_batch(&[]).await.unwrap();

        assert_eq!(backend.calls(), vec![50, 50]);
    }

    #[tokio::test]
    async fn test_typed_gets() {
        let store = CacheStore::new(Arc::new(MemoryBackend::new()));
        let record = ArchiveRecord::new("u".to_string(), vec!["a".to_string()], Utc::now());

        store
            .put_batch(&[
                (EntityKey::archive("u"), Entity::Archive(record.clone())),
                (
                    EntityKey::file("u", "a"),
                    Entity::File(FileRecord::too_large("a".to_string())),
                ),
            ])
            .await
            .unwrap();

        assert_eq!(store.get_archive("u").await.unwrap(), Some(record));
        assert!(store.get_file("u", "a").await.unwrap().unwrap().too_large);
        assert!(store.get_archive("other").await.unwrap().is_none());
        assert!(store.get_file("other", "a").await.unwrap().is_none());
    }
}
