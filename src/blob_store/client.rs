//! HTTP client for the moss blob store.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{BlobStore, BlobStoreError, RelativePath};
use crate::server::metrics::record_blob_store_call;

/// Stateless client for the blob store. Holds no state besides the
/// connection pool; nothing is retried.
#[derive(Clone)]
pub struct MossClient {
    client: Client,
    base_url: String,
}

impl MossClient {
    /// Create a new MossClient.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the blob store (e.g., "http://localhost:8000")
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn track_url(&self, holding_id: Uuid, path: &RelativePath) -> String {
        format!(
            "{}/{}/music/{}",
            self.base_url,
            holding_id,
            path.url_encoded()
        )
    }

    fn album_art_url(&self, holding_id: Uuid) -> String {
        format!("{}/{}/albumart", self.base_url, holding_id)
    }

    fn lock_url(&self, holding_id: Uuid) -> String {
        format!("{}/{}/lock", self.base_url, holding_id)
    }

    async fn put(
        &self,
        operation: &'static str,
        holding_id: Uuid,
        url: String,
        body: Vec<u8>,
    ) -> Result<(), BlobStoreError> {
        debug!("PUT {} ({} bytes)", url, body.len());

        let response = match self.client.put(&url).body(body).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Blob store {} failed for holding {}: {}", operation, holding_id, err);
                record_blob_store_call(operation, "network_error");
                return Err(BlobStoreError::Network(err.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            record_blob_store_call(operation, "ok");
            return Ok(());
        }

        warn!(
            "Blob store returned {} on {} for holding {}",
            status, operation, holding_id
        );
        if status == StatusCode::LOCKED {
            record_blob_store_call(operation, "locked");
            Err(BlobStoreError::Locked(holding_id))
        } else {
            record_blob_store_call(operation, "error");
            Err(BlobStoreError::Status {
                operation,
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl BlobStore for MossClient {
    async fn put_track(
        &self,
        holding_id: Uuid,
        path: &RelativePath,
        bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        let url = self.track_url(holding_id, path);
        self.put("put_track", holding_id, url, bytes.to_vec()).await
    }

    async fn put_album_art(&self, holding_id: Uuid, bytes: &[u8]) -> Result<(), BlobStoreError> {
        let url = self.album_art_url(holding_id);
        self.put("put_album_art", holding_id, url, bytes.to_vec())
            .await
    }

    async fn lock(&self, holding_id: Uuid) -> Result<(), BlobStoreError> {
        let url = self.lock_url(holding_id);
        self.put("lock", holding_id, url, Vec::new()).await
    }
}
