//! Filesystem backend: one JSON document per entity.
//!
//! Layout mirrors the key nesting: `<root>/<hash(url)>/archive.json` and
//! `<root>/<hash(url)>/files/<hash(name)>.json`.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{KvBackend, MAX_BATCH_SIZE};
use crate::error::{Result, ZvError};
use crate::model::{Entity, EntityKey};

/// Persistent backend rooted at a data directory
pub struct FsBackend {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl FsBackend {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document holding `key`.
    pub fn entity_path(&self, key: &EntityKey) -> PathBuf {
        let archive_dir = self.root.join(hashed(key.url()));
        match key {
            EntityKey::Archive { .. } => archive_dir.join("archive.json"),
            EntityKey::File { name, .. } => archive_dir
                .join("files")
                .join(format!("{}.json", hashed(name))),
        }
    }

    /// Write via a temp file and rename so readers never see a partial document.
    async fn write_entity(&self, key: &EntityKey, entity: &Entity) -> Result<()> {
        let path = self.entity_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec(entity)?;

        let seq = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let temp_path = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

#[async_trait]
impl KvBackend for FsBackend {
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
        let path = self.entity_path(key);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entity = serde_json::from_slice(&contents).map_err(|e| {
            ZvError::Store(format!("corrupt entry {}: {}", path.display(), e))
        })?;
        Ok(Some(entity))
    }

    async fn put_multi(&self, batch: &[(EntityKey, Entity)]) -> Result<()> {
        if batch.len() > MAX_BATCH_SIZE {
            return Err(ZvError::Store(format!(
                "batch of {} exceeds the limit of {}",
                batch.len(),
                MAX_BATCH_SIZE
            )));
        }

        for (key, entity) in batch {
            self.write_entity(key, entity).await?;
        }
        Ok(())
    }
}

/// Hex SHA-256 of a key component, safe as a single path segment.
fn hashed(component: &str) -> String {
    format!("{:x}", Sha256::digest(component.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArchiveRecord, FileRecord};
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let url = "https://example.com/a.zip?x=1";
        let archive = ArchiveRecord::new(url.to_string(), vec!["../a.txt".to_string()], Utc::now());
        let file = FileRecord::with_content("../a.txt".to_string(), b"hello".to_vec());

        {
            let backend = FsBackend::open(temp_dir.path()).await.unwrap();
            backend
                .put_multi(&[
                    (EntityKey::archive(url), Entity::Archive(archive.clone())),
                    (EntityKey::file(url, "../a.txt"), Entity::File(file.clone())),
                ])
                .await
                .unwrap();
        }

        let backend = FsBackend::open(temp_dir.path()).await.unwrap();
        assert_eq!(
            backend.get(&EntityKey::archive(url)).await.unwrap(),
            Some(Entity::Archive(archive))
        );
        assert_eq!(
            backend.get(&EntityKey::file(url, "../a.txt")).await.unwrap(),
            Some(Entity::File(file))
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FsBackend::open(temp_dir.path()).await.unwrap();

        assert!(backend.get(&EntityKey::archive("nope")).await.unwrap().is_none());
        assert!(backend.get(&EntityKey::file("nope", "a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_paths_stay_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FsBackend::open(temp_dir.path()).await.unwrap();

        let archive_path = backend.entity_path(&EntityKey::archive("u"));
        let file_path = backend.entity_path(&EntityKey::file("u", "../../etc/passwd"));

        assert!(archive_path.starts_with(backend.root()));
        assert!(file_path.starts_with(archive_path.parent().unwrap()));
        assert!(archive_path.ends_with("archive.json"));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_store_error() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FsBackend::open(temp_dir.path()).await.unwrap();
        let key = EntityKey::archive("u");

        let path = backend.entity_path(&key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        assert!(matches!(backend.get(&key).await, Err(ZvError::Store(_))));
    }
}
