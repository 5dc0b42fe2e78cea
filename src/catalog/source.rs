//! Holding source metadata, the only mutable part of a Holding.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::CatalogError;

/// Field names that may be sent on a Holding patch.
pub const SOURCE_FIELDS: [&str; 3] = ["torrent_hash", "source_url", "source_desc"];

/// A torrent info-hash, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TorrentHash(String);

impl TorrentHash {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CatalogError::InvalidTorrentHash(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TorrentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Patch payload for `holdings/<id>`. There is no way to put any field
/// other than the three source fields into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_hash: Option<TorrentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_desc: Option<String>,
}

impl SourceMetadata {
    /// Build from arbitrary request fields, silently dropping every field
    /// that is not a source field.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut metadata = SourceMetadata::default();
        for (key, value) in fields {
            match key {
                "torrent_hash" => metadata.torrent_hash = Some(TorrentHash::parse(value)?),
                "source_url" => metadata.source_url = Some(value.to_string()),
                "source_desc" => metadata.source_desc = Some(value.to_string()),
                other => debug!("Dropping non-source field {:?} from holding patch", other),
            }
        }
        Ok(metadata)
    }

    pub fn is_empty(&self) -> bool {
        self.torrent_hash.is_none() && self.source_url.is_none() && self.source_desc.is_none()
    }
}
