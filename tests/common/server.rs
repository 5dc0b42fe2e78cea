//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated smuggler wired to its own fake catalog and
//! fake blob store.

use super::constants::*;
use super::fake_blob_store::{spawn_fake_blob_store, FakeBlobStore};
use super::fake_catalog::FakeCatalog;
use smuggler::blob_store::{MemoryBlobStore, MossClient};
use smuggler::catalog::{CatalogCredentials, CatalogDefaults, CatalogSession};
use smuggler::ingestion::Orchestrator;
use smuggler::server::{make_app, ApiUser, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance with its own downstream fakes
///
/// When dropped, the server and the fakes shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The fake catalog, for inspecting what smuggler created
    pub catalog: FakeCatalog,

    /// What the fake blob store holds
    pub blobs: Arc<MemoryBlobStore>,

    /// The fake blob store, for injecting failures
    pub blob_store: FakeBlobStore,

    // Private fields - keep resources alive until drop
    _shutdown_txs: Vec<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Starts a fake catalog and a fake blob store on random ports
    /// 2. Builds the real app against them
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within timeout.
    pub async fn spawn() -> Self {
        Self::spawn_with_catalog_credentials(CATALOG_USER, CATALOG_PASS).await
    }

    /// Spawns a test server that logs in to the fake catalog with the given
    /// credentials instead of the ones it accepts.
    pub async fn spawn_with_catalog_credentials(username: &str, password: &str) -> Self {
        let catalog = FakeCatalog::default();
        let (catalog_url, catalog_shutdown) = catalog.spawn().await;

        let blobs = Arc::new(MemoryBlobStore::new());
        let blob_store = FakeBlobStore::new(blobs.clone());
        let (blob_store_url, blob_store_shutdown) = spawn_fake_blob_store(blob_store.clone()).await;

        let session = CatalogSession::new(
            catalog_url,
            CatalogCredentials {
                username: username.to_string(),
                password: password.to_string(),
            },
            REQUEST_TIMEOUT_SECS,
        )
        .expect("Failed to create catalog session");
        let moss = MossClient::new(blob_store_url, REQUEST_TIMEOUT_SECS)
            .expect("Failed to create blob store client");
        let orchestrator = Orchestrator::new(
            Arc::new(session),
            Arc::new(moss),
            CatalogDefaults::default(),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            metrics_port: 0,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            users: vec![ApiUser {
                username: TEST_USER.to_string(),
                password: TEST_PASS.to_string(),
            }],
        };
        let app = make_app(config, Arc::new(orchestrator));

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog,
            blobs,
            blob_store,
            _shutdown_txs: vec![shutdown_tx, catalog_shutdown, blob_store_shutdown],
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the version endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/api/v1/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for tx in self._shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
    }
}
