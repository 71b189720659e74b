mod http;
mod memory;

pub use http::HttpFetcher;
pub use memory::MemoryReader;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Retrieves the raw bytes of a remote archive
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full body behind `url`. No retries.
    async fn fetch(&self, url: &Url) -> crate::error::Result<Bytes>;
}
