//! Error types for zipview.
//!
//! Every kind is terminal for the request that hit it; the HTTP layer
//! flattens them to a 500.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZvError {
    /// Malformed source URL or a buffer that is not a ZIP archive.
    #[error("parse error: {0}")]
    Parse(String),

    /// Transport failure or non-success status while fetching the archive.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// An entry could not be read or decompressed.
    #[error("read error: {0}")]
    Read(String),

    /// No cached entity under the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The key-value backend failed.
    #[error("store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for ZvError {
    fn from(err: reqwest::Error) -> Self {
        ZvError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for ZvError {
    fn from(err: serde_json::Error) -> Self {
        ZvError::Store(err.to_string())
    }
}

impl From<std::io::Error> for ZvError {
    fn from(err: std::io::Error) -> Self {
        ZvError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZvError>;
