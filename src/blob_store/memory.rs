//! In-process blob store, used for local runs without moss and by the tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{BlobStore, BlobStoreError, HoldingLockState, LockTransition, RelativePath};

#[derive(Debug, Default)]
struct HoldingObjects {
    lock_state: HoldingLockState,
    tracks: BTreeMap<String, Vec<u8>>,
    album_art: Option<Vec<u8>>,
}

/// Blob store kept in memory. Enforces the Holding lock the same way moss
/// does: track writes to a locked Holding are refused.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    holdings: Mutex<HashMap<Uuid, HoldingObjects>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_track(
        &self,
        holding_id: Uuid,
        path: &RelativePath,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        let mut holdings = self.holdings.lock().unwrap();
        let holding = holdings.entry(holding_id).or_default();
        if !holding.lock_state.accepts_track_writes() {
            debug!("Refusing write of {} to locked holding {}", path, holding_id);
            return Err(BlobStoreError::Locked(holding_id));
        }
        holding.tracks.insert(path.as_str().to_string(), bytes.to_vec());
        Ok(())
    }

    pub fn store_album_art(&self, holding_id: Uuid, bytes: &[u8]) -> Result<(), BlobStoreError> {
        let mut holdings = self.holdings.lock().unwrap();
        let holding = holdings.entry(holding_id).or_default();
        if !holding.lock_state.accepts_album_art_writes() {
            return Err(BlobStoreError::Locked(holding_id));
        }
        holding.album_art = Some(bytes.to_vec());
        Ok(())
    }

    pub fn lock_holding(&self, holding_id: Uuid) -> LockTransition {
        let mut holdings = self.holdings.lock().unwrap();
        holdings.entry(holding_id).or_default().lock_state.lock()
    }

    pub fn track(&self, holding_id: Uuid, path: &str) -> Option<Vec<u8>> {
        let holdings = self.holdings.lock().unwrap();
        holdings
            .get(&holding_id)
            .and_then(|h| h.tracks.get(path).cloned())
    }

    pub fn album_art(&self, holding_id: Uuid) -> Option<Vec<u8>> {
        let holdings = self.holdings.lock().unwrap();
        holdings.get(&holding_id).and_then(|h| h.album_art.clone())
    }

    pub fn track_paths(&self, holding_id: Uuid) -> Vec<String> {
        let holdings = self.holdings.lock().unwrap();
        holdings
            .get(&holding_id)
            .map(|h| h.tracks.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn lock_state(&self, holding_id: Uuid) -> HoldingLockState {
        let holdings = self.holdings.lock().unwrap();
        holdings
            .get(&holding_id)
            .map(|h| h.lock_state)
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_track(
        &self,
        holding_id: Uuid,
        path: &RelativePath,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        self.store_track(holding_id, path, bytes)
    }

    async fn put_album_art(&self, holding_id: Uuid, bytes: &[u8]) -> Result<(), BlobStoreError> {
        self.store_album_art(holding_id, bytes)
    }

    async fn lock(&self, holding_id: Uuid) -> Result<(), BlobStoreError> {
        self.lock_holding(holding_id);
        Ok(())
    }
}
