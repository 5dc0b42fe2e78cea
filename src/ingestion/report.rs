//! Outcome of one track ingestion across the two stores.

use thiserror::Error;

use crate::blob_store::{BlobStoreError, InvalidRelativePath};
use crate::catalog::CatalogError;

#[derive(Debug)]
pub enum CatalogOutcome {
    /// Every catalog row is present; carries the catalog's track id.
    Written { track_id: String },
    /// Nothing was catalogued: the bytes were not audio, or the blob store
    /// refused them because the Holding is locked.
    Skipped,
    Failed(CatalogError),
}

impl CatalogOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogOutcome::Written { .. } => "written",
            CatalogOutcome::Skipped => "skipped",
            CatalogOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub enum BlobOutcome {
    Written,
    Failed(BlobStoreError),
}

impl BlobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobOutcome::Written => "written",
            BlobOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    InvalidRelativePath(#[from] InvalidRelativePath),

    /// At least one store was not written. The flags say which one was.
    #[error("Ingestion incomplete (catalog written: {catalog_written}, blob written: {blob_written}): {}", describe(.catalog_error, .blob_error))]
    PartialFailure {
        catalog_written: bool,
        blob_written: bool,
        catalog_error: Option<CatalogError>,
        blob_error: Option<BlobStoreError>,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    BlobStore(#[from] BlobStoreError),
}

fn describe(catalog: &Option<CatalogError>, blob: &Option<BlobStoreError>) -> String {
    match (catalog, blob) {
        (Some(c), Some(b)) => format!("{}; {}", c, b),
        (Some(c), None) => c.to_string(),
        (None, Some(b)) => b.to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Both outcomes of a track ingestion.
///
/// A failed report is safe to retry: calling `create_track` again with the
/// same holding group id, holding id and relative path converges on a single
/// set of catalog rows and one blob, whatever was written the first time.
/// Callers retry until `into_result` is `Ok`.
#[derive(Debug)]
pub struct IngestionReport {
    pub catalog: CatalogOutcome,
    pub blob: BlobOutcome,
}

impl IngestionReport {
    /// True only when catalog rows were actually written.
    pub fn catalog_written(&self) -> bool {
        matches!(self.catalog, CatalogOutcome::Written { .. })
    }

    pub fn blob_written(&self) -> bool {
        matches!(self.blob, BlobOutcome::Written)
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.catalog, CatalogOutcome::Failed(_)) && self.blob_written()
    }

    /// Collapse into one status: the track id (none when cataloguing was
    /// skipped) or a [`IngestionError::PartialFailure`].
    pub fn into_result(self) -> Result<Option<String>, IngestionError> {
        let catalog_written = self.catalog_written();
        let blob_written = self.blob_written();

        let (track_id, catalog_error) = match self.catalog {
            CatalogOutcome::Written { track_id } => (Some(track_id), None),
            CatalogOutcome::Skipped => (None, None),
            CatalogOutcome::Failed(err) => (None, Some(err)),
        };
        let blob_error = match self.blob {
            BlobOutcome::Written => None,
            BlobOutcome::Failed(err) => Some(err),
        };

        if catalog_error.is_none() && blob_error.is_none() {
            return Ok(track_id);
        }
        Err(IngestionError::PartialFailure {
            catalog_written,
            blob_written,
            catalog_error,
            blob_error,
        })
    }
}
