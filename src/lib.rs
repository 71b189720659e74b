//! # zipview
//!
//! An HTTP service that fetches remote ZIP archives, caches their listing and
//! file contents in a key-value store, and serves both back as JSON.
//!
//! A listing stays fresh for five minutes after it was fetched. Entries larger
//! than 1,000,000 bytes are listed but their content is not kept.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipview::{CacheStore, HttpFetcher, MemoryBackend, ZipService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = CacheStore::new(Arc::new(MemoryBackend::new()));
//!     let service = ZipService::new(store, Arc::new(HttpFetcher::new(None)?));
//!
//!     let listing = service.serve_listing("https://example.com/archive.zip").await?;
//!     for name in &listing.file_names {
//!         println!("{}", name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod model;
pub mod server;
pub mod service;
pub mod store;
pub mod zip;

pub use cli::{Cli, StoreKind};
pub use error::{Result, ZvError};
pub use io::{Fetcher, HttpFetcher, MemoryReader, ReadAt};
pub use model::{ArchiveRecord, Entity, EntityKey, FileRecord};
pub use service::{Clock, SystemClock, ZipService};
pub use store::{CacheStore, FsBackend, KvBackend, MemoryBackend};
pub use zip::{ZipExtractor, ZipFileEntry};
