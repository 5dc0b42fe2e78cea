//! Catalog service ("impala") access and the entity hierarchy built in it.
//!
//! Creates are idempotent: records with caller-supplied ids are PUT and a
//! 409 answer is treated as success, so an interrupted ingestion can be
//! replayed with the same ids without duplicating rows.

pub mod hierarchy;
pub mod models;
mod session;
mod source;

pub use hierarchy::{materialize_track, CatalogDefaults, MaterializedTrack};
pub use models::{CatalogRecord, Resource, UpsertOutcome};
pub use session::{CatalogCredentials, CatalogSession};
pub use source::{SourceMetadata, TorrentHash, SOURCE_FIELDS};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog rejected our credentials (status {0})")]
    AuthFailure(u16),

    #[error("Got {status} from catalog on {context}")]
    Remote { status: u16, context: String },

    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    #[error("Catalog unreachable: {0}")]
    Network(String),

    #[error("Invalid torrent hash {0:?}: must be alphanumeric")]
    InvalidTorrentHash(String),
}

/// Operations the ingestion pipeline needs from the catalog service.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Idempotent create. A conflict is reported as
    /// [`UpsertOutcome::AlreadyExists`], never as an error.
    async fn upsert(&self, record: &CatalogRecord) -> Result<UpsertOutcome, CatalogError>;

    /// Update the source fields of a Holding. Nothing but the fields of
    /// [`SourceMetadata`] is ever sent.
    async fn patch_source(
        &self,
        holding_id: Uuid,
        metadata: &SourceMetadata,
    ) -> Result<(), CatalogError>;

    /// Id of the first Holding with this torrent hash; `None` when there is
    /// no match.
    async fn find_holding_by_torrent_hash(
        &self,
        hash: &TorrentHash,
    ) -> Result<Option<String>, CatalogError>;
}
