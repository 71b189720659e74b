use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{KvBackend, MAX_BATCH_SIZE};
use crate::error::{Result, ZvError};
use crate::model::{Entity, EntityKey};

/// Process-local backend. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<EntityKey, Entity>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ZvError::Store("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn put_multi(&self, batch: &[(EntityKey, Entity)]) -> Result<()> {
        if batch.len() > MAX_BATCH_SIZE {
            return Err(ZvError::Store(format!(
                "batch of {} exceeds the limit of {}",
                batch.len(),
                MAX_BATCH_SIZE
            )));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| ZvError::Store("memory store lock poisoned".to_string()))?;
        for (key, entity) in batch {
            entries.insert(key.clone(), entity.clone());
        }
        Ok(())
    }
}
