//! Cached entities and their keys.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long an archive listing stays fresh after a fetch.
pub const ARCHIVE_TTL: Duration = Duration::minutes(5);

/// Entries whose uncompressed size exceeds this are stored without content.
pub const MAX_ENTRY_SIZE: u64 = 1_000_000;

/// The cached listing of one remote archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    pub source_url: String,
    /// Non-directory entry names in archive order.
    pub file_names: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ArchiveRecord {
    /// Create a record fetched at `fetched_at`; it expires one TTL later.
    pub fn new(source_url: String, file_names: Vec<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source_url,
            file_names,
            fetched_at,
            expires_at: fetched_at + ARCHIVE_TTL,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// One archive entry, with content unless it was too large to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    #[serde(with = "base64_content")]
    pub content: Option<Vec<u8>>,
    pub too_large: bool,
}

impl FileRecord {
    pub fn with_content(name: String, content: Vec<u8>) -> Self {
        Self {
            name,
            content: Some(content),
            too_large: false,
        }
    }

    pub fn too_large(name: String) -> Self {
        Self {
            name,
            content: None,
            too_large: true,
        }
    }
}

/// Store key. File keys are nested under their archive's URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Archive { url: String },
    File { url: String, name: String },
}

impl EntityKey {
    pub fn archive(url: impl Into<String>) -> Self {
        EntityKey::Archive { url: url.into() }
    }

    pub fn file(url: impl Into<String>, name: impl Into<String>) -> Self {
        EntityKey::File {
            url: url.into(),
            name: name.into(),
        }
    }

    /// The archive this key belongs to.
    pub fn url(&self) -> &str {
        match self {
            EntityKey::Archive { url } | EntityKey::File { url, .. } => url,
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::Archive { url } => write!(f, "archive {url}"),
            EntityKey::File { url, name } => write!(f, "file {name} in {url}"),
        }
    }
}

/// Anything the cache persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Archive(ArchiveRecord),
    File(FileRecord),
}

/// File content travels as standard base64, or `null` when absent.
mod base64_content {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(content: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match content {
            Some(bytes) => s.serialize_str(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|encoded| STANDARD.decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}
