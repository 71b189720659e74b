use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use super::Fetcher;
use crate::error::{Result, ZvError};

/// Fetches whole archives with a single HTTP GET
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    ///
    /// Without a timeout the client waits as long as the transport allows.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let resp = self.client.get(url.clone()).send().await?;

        if !resp.status().is_success() {
            return Err(ZvError::Fetch(format!(
                "HTTP request for {} failed with status: {}",
                url,
                resp.status()
            )));
        }

        let bytes = resp.bytes().await?;
        debug!(url = %url, bytes = bytes.len(), "fetched archive");

        Ok(bytes)
    }
}
