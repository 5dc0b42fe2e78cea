//! Composes tag extraction, the catalog hierarchy and the blob store into
//! the operations exposed over HTTP.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::report::{BlobOutcome, CatalogOutcome, IngestionError, IngestionReport};
use crate::blob_store::{BlobStore, BlobStoreError, RelativePath};
use crate::catalog::{
    materialize_track, CatalogApi, CatalogDefaults, SourceMetadata, TorrentHash,
};
use crate::server::metrics::record_ingestion;
use crate::tags::{self, Extraction};

pub struct Orchestrator {
    catalog: Arc<dyn CatalogApi>,
    blob_store: Arc<dyn BlobStore>,
    defaults: CatalogDefaults,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        blob_store: Arc<dyn BlobStore>,
        defaults: CatalogDefaults,
    ) -> Self {
        Self {
            catalog,
            blob_store,
            defaults,
        }
    }

    pub fn defaults(&self) -> &CatalogDefaults {
        &self.defaults
    }

    /// Ingest one uploaded file.
    ///
    /// Tags are read first, then the bytes go to the blob store. Audio gets
    /// its catalog rows whatever happened in the blob store, except when the
    /// store refused the bytes because the Holding is locked: a locked
    /// Holding never gains a Track. Only an unusable path is rejected before
    /// any store is touched; every other failure is reported per store in
    /// the returned [`IngestionReport`].
    pub async fn create_track(
        &self,
        holding_group_id: Uuid,
        holding_id: Uuid,
        relative_path: &str,
        bytes: &[u8],
    ) -> Result<IngestionReport, IngestionError> {
        let path = RelativePath::parse(relative_path)?;
        let extraction = tags::extract(bytes);

        let blob = match self.blob_store.put_track(holding_id, &path, bytes).await {
            Ok(()) => BlobOutcome::Written,
            Err(err) => {
                warn!("Blob write for {} in {} failed: {}", path, holding_id, err);
                BlobOutcome::Failed(err)
            }
        };

        let catalog = match extraction {
            Extraction::Tagged(_)
                if matches!(blob, BlobOutcome::Failed(BlobStoreError::Locked(_))) =>
            {
                info!("Holding {} is locked, not cataloguing {}", holding_id, path);
                CatalogOutcome::Skipped
            }
            Extraction::Tagged(record) => {
                match materialize_track(
                    self.catalog.as_ref(),
                    &self.defaults,
                    holding_group_id,
                    holding_id,
                    &path,
                    &record,
                )
                .await
                {
                    Ok(track) => CatalogOutcome::Written {
                        track_id: track.track_id,
                    },
                    Err(err) => {
                        warn!("Catalog write for {} in {} failed: {}", path, holding_id, err);
                        CatalogOutcome::Failed(err)
                    }
                }
            }
            Extraction::NotAudio => {
                debug!("{} is not audio, not cataloguing it", path);
                CatalogOutcome::Skipped
            }
        };

        record_ingestion(catalog.as_str(), blob.as_str());
        let report = IngestionReport { catalog, blob };
        if report.is_complete() {
            info!(
                "Ingested {} into holding {} ({} bytes)",
                path,
                holding_id,
                bytes.len()
            );
        }
        Ok(report)
    }

    /// Album art goes to the blob store only.
    pub async fn create_album_art(
        &self,
        holding_id: Uuid,
        bytes: &[u8],
    ) -> Result<(), IngestionError> {
        self.blob_store.put_album_art(holding_id, bytes).await?;
        info!("Stored album art for holding {}", holding_id);
        Ok(())
    }

    /// Freeze the music of a Holding. The catalog is not consulted.
    pub async fn lock_holding(&self, holding_id: Uuid) -> Result<(), IngestionError> {
        self.blob_store.lock(holding_id).await?;
        info!("Locked holding {}", holding_id);
        Ok(())
    }

    pub async fn set_source_metadata(
        &self,
        holding_id: Uuid,
        metadata: &SourceMetadata,
    ) -> Result<(), IngestionError> {
        if metadata.is_empty() {
            debug!("No source fields for holding {}, nothing to patch", holding_id);
            return Ok(());
        }
        self.catalog.patch_source(holding_id, metadata).await?;
        info!("Updated source of holding {}", holding_id);
        Ok(())
    }

    /// Holding id recorded for a torrent, matching case-insensitively.
    pub async fn find_holding_by_torrent_hash(
        &self,
        raw_hash: &str,
    ) -> Result<Option<String>, IngestionError> {
        let hash = TorrentHash::parse(raw_hash)?;
        Ok(self.catalog.find_holding_by_torrent_hash(&hash).await?)
    }
}
