//! Blob store ("moss") access.
//!
//! Every object lives in the namespace of a Holding:
//! - `<holdingId>/music/<relativePath>` for uploaded files,
//! - `<holdingId>/albumart` for the album cover,
//! - `<holdingId>/lock` to freeze the music namespace.

mod client;
mod lock;
mod memory;
mod path;

pub use client::MossClient;
pub use lock::{HoldingLockState, LockTransition};
pub use memory::MemoryBlobStore;
pub use path::{InvalidRelativePath, RelativePath};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The Holding is locked and the store refused the write.
    #[error("Holding {0} is locked")]
    Locked(Uuid),

    #[error("Blob store returned {status} on {operation}")]
    Status { operation: &'static str, status: u16 },

    #[error("Blob store unreachable: {0}")]
    Network(String),
}

impl BlobStoreError {
    /// Status code reported by the store, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BlobStoreError::Locked(_) => Some(423),
            BlobStoreError::Status { status, .. } => Some(*status),
            BlobStoreError::Network(_) => None,
        }
    }
}

/// Raw-bytes storage scoped by Holding id.
///
/// Writes are idempotent overwrites: the same (holding, path) pair may be
/// written any number of times and the last write wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_track(
        &self,
        holding_id: Uuid,
        path: &RelativePath,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError>;

    async fn put_album_art(&self, holding_id: Uuid, bytes: &[u8]) -> Result<(), BlobStoreError>;

    /// Lock the Holding. Locking an already-locked Holding succeeds.
    async fn lock(&self, holding_id: Uuid) -> Result<(), BlobStoreError>;
}
