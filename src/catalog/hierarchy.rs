//! Derivation of the catalog entity hierarchy from a tag record.
//!
//! Format and Stack → HoldingGroup → Holding → Track → TrackMetadata.
//! Every level above Track uses caller-supplied or well-known ids, so
//! replaying the whole sequence is safe.

use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    CatalogRecord, FormatRecord, HoldingGroupRecord, HoldingRecord, StackRecord,
    TrackMetadataRecord, TrackRecord, HAS_FCC_UNKNOWN,
};
use super::{CatalogApi, CatalogError};
use crate::blob_store::RelativePath;
use crate::tags::TagRecord;

/// Well-known id of the "digital" Format.
pub const DEFAULT_FORMAT_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000001);

/// Well-known id of the "default" Stack.
pub const DEFAULT_STACK_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_8000_000000000002);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogDefaults {
    pub format_id: Uuid,
    pub stack_id: Uuid,
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            format_id: DEFAULT_FORMAT_ID,
            stack_id: DEFAULT_STACK_ID,
        }
    }
}

impl CatalogDefaults {
    pub fn format_record(&self) -> FormatRecord {
        FormatRecord {
            id: self.format_id,
            name: "digital".to_string(),
            physical: false,
        }
    }

    pub fn stack_record(&self) -> StackRecord {
        StackRecord {
            id: self.stack_id,
            name: "default".to_string(),
        }
    }
}

/// Parse a track/disc tag. `"3"` and `"3/12"` give 3; anything else gives 0.
pub fn coerce_number(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.split('/').next())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

pub fn holding_group_record(
    holding_group_id: Uuid,
    defaults: &CatalogDefaults,
    tags: &TagRecord,
) -> HoldingGroupRecord {
    HoldingGroupRecord {
        id: holding_group_id,
        album_title: tags.album.clone(),
        album_artist: tags.effective_album_artist().map(str::to_string),
        active: true,
        stack_id: defaults.stack_id,
        release_group_id: tags.release_group_id.clone(),
    }
}

pub fn holding_record(
    holding_group_id: Uuid,
    holding_id: Uuid,
    defaults: &CatalogDefaults,
    tags: &TagRecord,
) -> HoldingRecord {
    HoldingRecord {
        id: holding_id,
        label: tags.label.clone(),
        active: true,
        holding_group_id,
        format_id: defaults.format_id,
        description: tags.comments.clone(),
        release_id: tags.release_id.clone(),
    }
}

pub fn track_record(holding_id: Uuid, path: &RelativePath, tags: &TagRecord) -> TrackRecord {
    TrackRecord {
        title: tags.title.clone(),
        artist: tags.artist.clone(),
        file_path: path.as_str().to_string(),
        track_num: coerce_number(tags.track.as_deref()),
        disc_num: coerce_number(tags.disc.as_deref()),
        has_fcc: HAS_FCC_UNKNOWN.to_string(),
        holding_id,
        track_id: tags.track_id.clone(),
    }
}

/// One metadata row per present tag field, values in their string form.
pub fn track_metadata_records(track_id: &str, tags: &TagRecord) -> Vec<TrackMetadataRecord> {
    tags.fields()
        .into_iter()
        .map(|(key, value)| TrackMetadataRecord {
            key: key.to_string(),
            value: value.to_string(),
            track_id: track_id.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedTrack {
    pub track_id: String,
    pub metadata_rows: usize,
}

/// Create (or confirm) every catalog row for one uploaded track.
///
/// Steps run strictly in order and the first failure aborts the rest.
/// Re-running with the same ids after a failure converges on the same rows.
pub async fn materialize_track(
    catalog: &dyn CatalogApi,
    defaults: &CatalogDefaults,
    holding_group_id: Uuid,
    holding_id: Uuid,
    path: &RelativePath,
    tags: &TagRecord,
) -> Result<MaterializedTrack, CatalogError> {
    catalog
        .upsert(&CatalogRecord::Format(defaults.format_record()))
        .await?;
    catalog
        .upsert(&CatalogRecord::Stack(defaults.stack_record()))
        .await?;

    let group = holding_group_record(holding_group_id, defaults, tags);
    let outcome = catalog.upsert(&CatalogRecord::HoldingGroup(group)).await?;
    debug!("Holding group {}: {}", holding_group_id, outcome.as_str());

    let holding = holding_record(holding_group_id, holding_id, defaults, tags);
    let outcome = catalog.upsert(&CatalogRecord::Holding(holding)).await?;
    debug!("Holding {}: {}", holding_id, outcome.as_str());

    let track = track_record(holding_id, path, tags);
    let outcome = catalog.upsert(&CatalogRecord::Track(track)).await?;
    let track_id = outcome.id().map(str::to_string).ok_or_else(|| {
        CatalogError::MalformedResponse("track response carried no id".to_string())
    })?;

    let rows = track_metadata_records(&track_id, tags);
    for row in &rows {
        catalog
            .upsert(&CatalogRecord::TrackMetadata(row.clone()))
            .await?;
    }

    info!(
        "Catalogued {} in holding {} as track {} ({} metadata rows)",
        path,
        holding_id,
        track_id,
        rows.len()
    );

    Ok(MaterializedTrack {
        track_id,
        metadata_rows: rows.len(),
    })
}
