//! Records sent to the catalog service.
//!
//! Bodies are form-encoded; `None` fields are omitted from the request.

use serde::Serialize;
use uuid::Uuid;

/// Catalog resource collections, addressed as `api/v1/<collection>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Format,
    Stack,
    HoldingGroup,
    Holding,
    Track,
    TrackMetadata,
}

impl Resource {
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Format => "formats",
            Resource::Stack => "stacks",
            Resource::HoldingGroup => "holding_groups",
            Resource::Holding => "holdings",
            Resource::Track => "tracks",
            Resource::TrackMetadata => "track_metadata",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatRecord {
    pub id: Uuid,
    pub name: String,
    pub physical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingGroupRecord {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    pub active: bool,
    pub stack_id: Uuid,
    #[serde(rename = "releasegroup_mbid", skip_serializing_if = "Option::is_none")]
    pub release_group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRecord {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub active: bool,
    pub holding_group_id: Uuid,
    pub format_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "release_mbid", skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
}

/// Value of `has_fcc` for tracks nobody has reviewed yet.
pub const HAS_FCC_UNKNOWN: &str = "UNKNOWN";

/// A track row. Its id is assigned by the catalog on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub file_path: String,
    pub track_num: i64,
    pub disc_num: i64,
    pub has_fcc: String,
    pub holding_id: Uuid,
    #[serde(rename = "track_mbid", skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMetadataRecord {
    pub key: String,
    pub value: String,
    pub track_id: String,
}

/// Any record that can be upserted into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogRecord {
    Format(FormatRecord),
    Stack(StackRecord),
    HoldingGroup(HoldingGroupRecord),
    Holding(HoldingRecord),
    Track(TrackRecord),
    TrackMetadata(TrackMetadataRecord),
}

impl CatalogRecord {
    pub fn resource(&self) -> Resource {
        match self {
            CatalogRecord::Format(_) => Resource::Format,
            CatalogRecord::Stack(_) => Resource::Stack,
            CatalogRecord::HoldingGroup(_) => Resource::HoldingGroup,
            CatalogRecord::Holding(_) => Resource::Holding,
            CatalogRecord::Track(_) => Resource::Track,
            CatalogRecord::TrackMetadata(_) => Resource::TrackMetadata,
        }
    }
}

/// Outcome of an idempotent create. Both variants mean the resource is now
/// present in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created { id: Option<String> },
    /// The catalog answered 409: the resource was already there.
    AlreadyExists { id: Option<String> },
}

impl UpsertOutcome {
    pub fn id(&self) -> Option<&str> {
        match self {
            UpsertOutcome::Created { id } | UpsertOutcome::AlreadyExists { id } => id.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created { .. } => "created",
            UpsertOutcome::AlreadyExists { .. } => "already_exists",
        }
    }
}
