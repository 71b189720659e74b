//! Request-level operations: serve a listing, serve a file, force a refresh.
//!
//! A [`ZipService`] carries everything a request needs (store, fetcher,
//! clock) and is handed to the HTTP layer explicitly.

use chrono::{DateTime, Utc};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, ZvError};
use crate::io::Fetcher;
use crate::model::{ArchiveRecord, Entity, EntityKey, FileRecord};
use crate::store::CacheStore;
use crate::zip::ZipExtractor;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where a cached listing stands relative to its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    NoRecord,
    Expired,
    Fresh,
}

#[derive(Clone)]
pub struct ZipService {
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
}

impl ZipService {
    pub fn new(store: CacheStore, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_clock(store, fetcher, Arc::new(SystemClock))
    }

    pub fn with_clock(store: CacheStore, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            fetcher,
            clock,
        }
    }

    /// Serve the cached listing when fresh, otherwise refresh it first.
    pub async fn serve_listing(&self, url: &str) -> Result<ArchiveRecord> {
        let url = parse_source_url(url)?;
        let cached = self.store.get_archive(url.as_str()).await?;

        let freshness = match &cached {
            None => Freshness::NoRecord,
            Some(record) if record.is_fresh(self.clock.now()) => Freshness::Fresh,
            Some(_) => Freshness::Expired,
        };
        debug!(url = %url, ?freshness, "listing lookup");

        match cached {
            Some(record) if freshness == Freshness::Fresh => Ok(record),
            _ => self.refresh_url(&url).await,
        }
    }

    /// Serve one cached file. A miss is an error and never triggers a refresh.
    pub async fn serve_file(&self, url: &str, name: &str) -> Result<FileRecord> {
        let url = parse_source_url(url)?;
        let key = EntityKey::file(url.as_str(), name);

        self.store
            .get_file(url.as_str(), name)
            .await?
            .ok_or_else(|| ZvError::NotFound(key.to_string()))
    }

    /// Fetch, parse and cache the archive regardless of freshness.
    pub async fn refresh(&self, url: &str) -> Result<ArchiveRecord> {
        let url = parse_source_url(url)?;
        self.refresh_url(&url).await
    }

    /// Fetch → parse → materialize every entry → one batched write.
    ///
    /// Nothing is written unless every entry materialized.
    async fn refresh_url(&self, url: &Url) -> Result<ArchiveRecord> {
        let data = self.fetcher.fetch(url).await?;
        let fetched_at = self.clock.now();

        let extractor = ZipExtractor::from_bytes(data);
        let entries = extractor.file_entries().await?;

        let mut batch = Vec::with_capacity(entries.len() + 1);
        let mut file_names = Vec::with_capacity(entries.len());
        let mut too_large = 0usize;

        for entry in &entries {
            let record = extractor.materialize(entry).await?;
            if record.too_large {
                too_large += 1;
            }
            file_names.push(record.name.clone());
            batch.push((
                EntityKey::file(url.as_str(), &record.name),
                Entity::File(record),
            ));
        }

        let archive = ArchiveRecord::new(url.to_string(), file_names, fetched_at);
        batch.insert(
            0,
            (
                EntityKey::archive(url.as_str()),
                Entity::Archive(archive.clone()),
            ),
        );

        self.store.put_batch(&batch).await?;

        info!(
            url = %url,
            files = archive.file_names.len(),
            too_large,
            "archive cached"
        );

        Ok(archive)
    }
}

fn parse_source_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(ZvError::Parse("missing url parameter".to_string()));
    }
    Url::parse(raw).map_err(|e| ZvError::Parse(format!("invalid url {raw:?}: {e}")))
}
